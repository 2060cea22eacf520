use async_trait::async_trait;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{Auction, AuctionStatus, AuctionView, Bid, User};
use crate::store::{BidAccepted, NewAuction, NewUser, Store};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    auctions: Vec<Auction>,
    bids: Vec<Bid>,
}

impl Tables {
    /// Single source of truth for an auction's price: max accepted bid,
    /// else the starting price.
    fn derived_price(&self, auction: &Auction) -> Decimal {
        self.bids
            .iter()
            .filter(|b| b.auction_id == auction.id)
            .map(|b| b.amount)
            .max()
            .unwrap_or(auction.starting_price)
    }

    fn view(&self, auction: &Auction, now: OffsetDateTime) -> AuctionView {
        let bid_count = self
            .bids
            .iter()
            .filter(|b| b.auction_id == auction.id)
            .count();
        let time_remaining_ms = (auction.end_time - now).whole_milliseconds().max(0) as i64;
        AuctionView {
            auction: auction.clone(),
            current_price: self.derived_price(auction),
            bid_count,
            time_remaining_ms,
        }
    }
}

/// End time for a new auction. `None` when the duration is not finite or
/// pushes the end time outside the representable datetime range.
fn auction_end(start: OffsetDateTime, duration_hours: f64) -> Option<OffsetDateTime> {
    let secs = duration_hours * 3600.0;
    // The bound keeps `seconds_f64` inside `Duration`'s range; datetime
    // overflow past that is caught by `checked_add`.
    if !secs.is_finite() || secs.abs() > 1e15 {
        return None;
    }
    start.checked_add(Duration::seconds_f64(secs))
}

/// In-memory store: three tables behind one `RwLock`, scanned linearly.
/// The single lock makes registration's uniqueness check and the bid
/// check-then-append sequence atomic under concurrent requests.
pub struct MemStore {
    tables: RwLock<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn register_user(&self, new: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.email == new.email || u.username == new.username)
        {
            return Err(AppError::DuplicateIdentity);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Option<User> {
        let tables = self.tables.read().await;
        tables.users.iter().find(|u| u.email == email).cloned()
    }

    async fn create_auction(&self, new: NewAuction) -> Result<AuctionView, AppError> {
        let now = OffsetDateTime::now_utc();
        let end_time = auction_end(now, new.duration_hours).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "auction duration of {} hours is out of range",
                new.duration_hours
            ))
        })?;
        let auction = Auction {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            starting_price: new.starting_price,
            seller_id: new.seller_id,
            seller_name: new.seller_name,
            start_time: now,
            end_time,
            status: AuctionStatus::Active,
            created_at: now,
        };
        let mut tables = self.tables.write().await;
        tables.auctions.push(auction.clone());
        Ok(tables.view(&auction, now))
    }

    async fn list_auctions(&self) -> Vec<AuctionView> {
        let now = OffsetDateTime::now_utc();
        let tables = self.tables.read().await;
        tables
            .auctions
            .iter()
            .map(|a| tables.view(a, now))
            .collect()
    }

    async fn place_bid(
        &self,
        auction_id: Uuid,
        bidder_id: Uuid,
        bidder_name: &str,
        amount: Decimal,
    ) -> Result<BidAccepted, AppError> {
        // Write lock held across the whole check-then-append sequence.
        let mut tables = self.tables.write().await;
        let now = OffsetDateTime::now_utc();

        let auction = tables
            .auctions
            .iter()
            .find(|a| a.id == auction_id)
            .cloned()
            .ok_or(AppError::AuctionNotFound)?;

        if auction.has_ended(now) {
            return Err(AppError::AuctionEnded);
        }

        let current_price = tables.derived_price(&auction);
        if amount <= current_price {
            return Err(AppError::BidTooLow { current_price });
        }

        let bid = Bid {
            id: Uuid::new_v4(),
            auction_id,
            bidder_id,
            bidder_name: bidder_name.to_string(),
            amount,
            timestamp: now,
        };
        tables.bids.push(bid.clone());
        debug!(auction_id = %auction_id, amount = %amount, "bid accepted");

        Ok(BidAccepted {
            bid,
            current_price: amount,
        })
    }

    async fn bids_for_auction(&self, auction_id: Uuid) -> Vec<Bid> {
        let tables = self.tables.read().await;
        let mut bids: Vec<Bid> = tables
            .bids
            .iter()
            .filter(|b| b.auction_id == auction_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        bids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seller() -> (Uuid, &'static str) {
        (Uuid::new_v4(), "alice")
    }

    async fn auction_with(store: &MemStore, starting_price: i64, duration_hours: f64) -> Uuid {
        let (id, name) = seller();
        store
            .create_auction(NewAuction {
                seller_id: id,
                seller_name: name.into(),
                title: "Widget".into(),
                description: "A widget".into(),
                starting_price: Decimal::from(starting_price),
                duration_hours,
            })
            .await
            .expect("auction created")
            .auction
            .id
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_and_username() {
        let store = MemStore::new();
        store
            .register_user(NewUser {
                username: "alice".into(),
                email: "alice@x.com".into(),
                password_hash: "h1".into(),
            })
            .await
            .expect("first registration");

        let same_email = store
            .register_user(NewUser {
                username: "other".into(),
                email: "alice@x.com".into(),
                password_hash: "h2".into(),
            })
            .await;
        assert!(matches!(same_email, Err(AppError::DuplicateIdentity)));

        let same_username = store
            .register_user(NewUser {
                username: "alice".into(),
                email: "other@x.com".into(),
                password_hash: "h3".into(),
            })
            .await;
        assert!(matches!(same_username, Err(AppError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let store = MemStore::new();
        store
            .register_user(NewUser {
                username: "alice".into(),
                email: "alice@x.com".into(),
                password_hash: "h".into(),
            })
            .await
            .unwrap();
        assert!(store.user_by_email("Alice@x.com").await.is_none());
        assert!(store.user_by_email("alice@x.com").await.is_some());
    }

    #[tokio::test]
    async fn price_defaults_to_starting_price_without_bids() {
        let store = MemStore::new();
        auction_with(&store, 10, 1.0).await;
        let views = store.list_auctions().await;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].current_price, Decimal::from(10));
        assert_eq!(views[0].bid_count, 0);
        assert!(views[0].time_remaining_ms > 0);
    }

    #[tokio::test]
    async fn accepted_bids_strictly_increase() {
        let store = MemStore::new();
        let auction_id = auction_with(&store, 10, 1.0).await;
        let bidder = Uuid::new_v4();

        for amount in [15, 20, 21] {
            let accepted = store
                .place_bid(auction_id, bidder, "bob", Decimal::from(amount))
                .await
                .expect("increasing bid accepted");
            assert_eq!(accepted.current_price, Decimal::from(amount));
        }

        // Equal to current price is rejected, as is anything below it.
        for amount in [21, 12] {
            let err = store
                .place_bid(auction_id, bidder, "bob", Decimal::from(amount))
                .await
                .unwrap_err();
            match err {
                AppError::BidTooLow { current_price } => {
                    assert_eq!(current_price, Decimal::from(21));
                }
                other => panic!("expected BidTooLow, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn self_bidding_is_allowed() {
        let store = MemStore::new();
        let (seller_id, seller_name) = seller();
        let view = store
            .create_auction(NewAuction {
                seller_id,
                seller_name: seller_name.into(),
                title: "Widget".into(),
                description: String::new(),
                starting_price: Decimal::from(10),
                duration_hours: 1.0,
            })
            .await
            .unwrap();
        store
            .place_bid(view.auction.id, Uuid::new_v4(), "bob", Decimal::from(15))
            .await
            .unwrap();
        let accepted = store
            .place_bid(view.auction.id, seller_id, seller_name, Decimal::from(20))
            .await
            .expect("seller may bid on own auction");
        assert_eq!(accepted.current_price, Decimal::from(20));
    }

    #[tokio::test]
    async fn bids_after_end_time_are_rejected() {
        let store = MemStore::new();
        let auction_id = auction_with(&store, 10, -1.0).await;
        let err = store
            .place_bid(auction_id, Uuid::new_v4(), "bob", Decimal::from(100))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuctionEnded));
    }

    #[tokio::test]
    async fn unknown_auction_is_not_found() {
        let store = MemStore::new();
        let err = store
            .place_bid(Uuid::new_v4(), Uuid::new_v4(), "bob", Decimal::from(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuctionNotFound));
        assert!(store.bids_for_auction(Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn ended_auction_lists_last_price_and_zero_remaining() {
        let store = MemStore::new();
        // Short but live window: bid lands before the end time passes.
        let auction_id = auction_with(&store, 10, 0.0002).await;
        store
            .place_bid(auction_id, Uuid::new_v4(), "bob", Decimal::from(15))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(800)).await;

        let views = store.list_auctions().await;
        assert_eq!(views[0].time_remaining_ms, 0);
        assert_eq!(views[0].current_price, Decimal::from(15));
        assert_eq!(views[0].bid_count, 1);

        let err = store
            .place_bid(auction_id, Uuid::new_v4(), "carol", Decimal::from(99))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuctionEnded));
    }

    #[tokio::test]
    async fn bids_list_newest_first() {
        let store = MemStore::new();
        let auction_id = auction_with(&store, 10, 1.0).await;
        let bidder = Uuid::new_v4();
        store
            .place_bid(auction_id, bidder, "bob", Decimal::from(15))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .place_bid(auction_id, bidder, "bob", Decimal::from(20))
            .await
            .unwrap();

        let bids = store.bids_for_auction(auction_id).await;
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].amount, Decimal::from(20));
        assert_eq!(bids[1].amount, Decimal::from(15));
    }

    #[tokio::test]
    async fn negative_starting_price_and_duration_are_accepted() {
        let store = MemStore::new();
        let (id, name) = seller();
        let view = store
            .create_auction(NewAuction {
                seller_id: id,
                seller_name: name.into(),
                title: String::new(),
                description: String::new(),
                starting_price: Decimal::from(-5),
                duration_hours: 0.0,
            })
            .await
            .unwrap();
        assert_eq!(view.current_price, Decimal::from(-5));
        assert_eq!(view.time_remaining_ms, 0);
    }

    #[tokio::test]
    async fn unrepresentable_durations_are_a_server_fault_not_a_panic() {
        let store = MemStore::new();
        let (id, name) = seller();
        for hours in [1e300, -1e300, f64::INFINITY, f64::NAN] {
            let err = store
                .create_auction(NewAuction {
                    seller_id: id,
                    seller_name: name.into(),
                    title: "Widget".into(),
                    description: String::new(),
                    starting_price: Decimal::from(10),
                    duration_hours: hours,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Internal(_)), "hours = {hours}");
        }
    }
}
