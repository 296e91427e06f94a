// Backend API module.
// Provides the client and types for the hosted database behind the team app.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::BackendClient;
pub use endpoints::DEFAULT_LIST_LIMIT;
pub use types::*;
