use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

/// Central error type surfaced by handlers and the store.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("username or email already taken")]
    DuplicateIdentity,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("auction not found")]
    AuctionNotFound,

    #[error("auction has ended")]
    AuctionEnded,

    #[error("bid must be higher than the current price")]
    BidTooLow { current_price: Decimal },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::DuplicateIdentity => (StatusCode::CONFLICT, "DUPLICATE_IDENTITY"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AppError::AuctionNotFound => (StatusCode::NOT_FOUND, "AUCTION_NOT_FOUND"),
            AppError::AuctionEnded => (StatusCode::BAD_REQUEST, "AUCTION_ENDED"),
            AppError::BidTooLow { .. } => (StatusCode::BAD_REQUEST, "BID_TOO_LOW"),
            AppError::Internal(err) => {
                // Detail stays in the logs; the client gets a generic 500.
                tracing::error!(error = %err, "unhandled server fault");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let mut body = json!({
            "error": code,
            "message": self.to_string(),
        });
        if let AppError::BidTooLow { current_price } = &self {
            body["currentPrice"] = json!(current_price);
        }

        (status, Json(body)).into_response()
    }
}
