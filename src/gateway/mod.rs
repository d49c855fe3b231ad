pub mod client;
pub mod error;
pub mod models;

pub use client::{ItunesClient, SearchGateway};
pub use error::GatewayError;
pub use models::{SearchResponse, SearchResultItem};
