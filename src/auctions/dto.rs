use rust_decimal::Decimal;
use serde::Deserialize;

/// Request body for creating an auction. Duration is in hours; no bound or
/// sign check is applied to it or to the starting price.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starting_price: Decimal,
    pub duration: f64,
}
