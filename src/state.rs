use std::sync::Arc;

use crate::config::{AppConfig, JwtConfig};
use crate::events::EventBus;
use crate::store::{MemStore, Store};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub events: EventBus,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self {
            config,
            store: Arc::new(MemStore::new()),
            events: EventBus::new(EVENT_CHANNEL_CAPACITY),
        })
    }

    /// State with a fixed config, used by tests.
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "bidhouse".into(),
                audience: "bidhouse-clients".into(),
                ttl_minutes: 5,
            },
        });
        Self {
            config,
            store: Arc::new(MemStore::new()),
            events: EventBus::new(EVENT_CHANNEL_CAPACITY),
        }
    }
}
