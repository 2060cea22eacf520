use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser, bids::dto::PlaceBidRequest, error::AppError, events::ServerEvent, model::Bid,
    state::AppState,
};

pub fn bid_routes() -> Router<AppState> {
    Router::new().route("/bids", post(place_bid))
}

#[instrument(skip(state, payload))]
pub async fn place_bid(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceBidRequest>,
) -> Result<Json<Bid>, AppError> {
    let accepted = state
        .store
        .place_bid(payload.auction_id, user.id, &user.username, payload.amount)
        .await?;

    info!(
        auction_id = %payload.auction_id,
        bidder = %user.username,
        amount = %accepted.bid.amount,
        "bid accepted"
    );
    state.events.publish(ServerEvent::BidAccepted {
        auction_id: payload.auction_id,
        bid: accepted.bid.clone(),
        current_price: accepted.current_price,
    });

    Ok(Json(accepted.bid))
}
