pub mod app;
pub mod auctions;
pub mod auth;
pub mod bids;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod state;
pub mod store;
pub mod ws;
