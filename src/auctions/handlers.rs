use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auctions::dto::CreateAuctionRequest,
    auth::AuthUser,
    error::AppError,
    events::ServerEvent,
    model::{AuctionView, Bid},
    state::AppState,
    store::NewAuction,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/auctions", get(list_auctions))
        .route("/auctions/:id/bids", get(auction_bids))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/auctions", post(create_auction))
}

#[instrument(skip(state))]
pub async fn list_auctions(State(state): State<AppState>) -> Json<Vec<AuctionView>> {
    Json(state.store.list_auctions().await)
}

#[instrument(skip(state, payload))]
pub async fn create_auction(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAuctionRequest>,
) -> Result<Json<AuctionView>, AppError> {
    let view = state
        .store
        .create_auction(NewAuction {
            seller_id: user.id,
            seller_name: user.username,
            title: payload.title,
            description: payload.description,
            starting_price: payload.starting_price,
            duration_hours: payload.duration,
        })
        .await?;

    info!(auction_id = %view.auction.id, title = %view.auction.title, "auction created");
    state.events.publish(ServerEvent::AuctionCreated(view.clone()));

    Ok(Json(view))
}

#[instrument(skip(state))]
pub async fn auction_bids(
    State(state): State<AppState>,
    Path(auction_id): Path<Uuid>,
) -> Json<Vec<Bid>> {
    Json(state.store.bids_for_auction(auction_id).await)
}
