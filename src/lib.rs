// huddle: terminal client for team conversations.
// Cached conversation widgets and a virtualized schedule strip on a hosted backend.

pub mod app;
pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
pub mod ui;

pub use error::{HuddleError, Result};
