// billdesk-api: Async Rust client for the traditional telecom billing backend

pub mod client;
pub mod error;
pub mod packages;
pub mod transactions;
pub mod transport;
pub mod types;
pub mod users;

pub use client::BillingClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
