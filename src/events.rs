use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::model::{AuctionView, Bid};

/// Events pushed to every connected websocket client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    AuctionCreated(AuctionView),
    #[serde(rename_all = "camelCase")]
    BidAccepted {
        auction_id: Uuid,
        bid: Bid,
        current_price: Decimal,
    },
}

/// Fan-out over a tokio broadcast channel. Delivery is fire-and-forget:
/// no subscribers, no acknowledgment, no replay for late joiners.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: ServerEvent) {
        // send only errors when nobody is listening, which is fine here
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }
}
