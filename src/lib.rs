pub mod auction;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod money;
pub mod query;
pub mod session;
pub mod store;
pub mod watchlist;
