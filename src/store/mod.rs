use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{AuctionView, Bid, User};

pub mod memory;

pub use memory::MemStore;

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug)]
pub struct NewAuction {
    pub seller_id: Uuid,
    pub seller_name: String,
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub duration_hours: f64,
}

/// Outcome of an accepted bid: the appended record plus the price it set.
#[derive(Debug, Clone)]
pub struct BidAccepted {
    pub bid: Bid,
    pub current_price: Decimal,
}

/// Storage seam for the three ledgers. Handlers only see this trait, so the
/// in-memory tables can later be swapped for a database without touching
/// business logic.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user if neither the username nor the email is taken
    /// (case-sensitive exact match). Check and insert are atomic.
    async fn register_user(&self, new: NewUser) -> Result<User, AppError>;

    async fn user_by_email(&self, email: &str) -> Option<User>;

    /// Fails only when the requested duration cannot produce a
    /// representable end time; no validation is applied otherwise.
    async fn create_auction(&self, new: NewAuction) -> Result<AuctionView, AppError>;

    /// Every auction, enriched with derived price, bid count and time
    /// remaining (clamped at zero).
    async fn list_auctions(&self) -> Vec<AuctionView>;

    /// The bid-acceptance contract, atomic from lookup to append:
    /// the auction must exist and not be past its end time, and the amount
    /// must strictly exceed the price derived from the bid ledger.
    async fn place_bid(
        &self,
        auction_id: Uuid,
        bidder_id: Uuid,
        bidder_name: &str,
        amount: Decimal,
    ) -> Result<BidAccepted, AppError>;

    /// Bids for one auction, newest first. Unknown auctions yield an empty
    /// list rather than an error.
    async fn bids_for_auction(&self, auction_id: Uuid) -> Vec<Bid>;
}
