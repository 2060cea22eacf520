use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Request body for placing a bid.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidRequest {
    pub auction_id: Uuid,
    pub amount: Decimal,
}
