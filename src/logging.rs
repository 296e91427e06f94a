// Logging setup.
// The terminal UI owns stdout, so tracing output goes to a file in the cache dir.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{HuddleError, Result};

/// Environment variable holding the tracing filter directive.
pub const LOG_FILTER_VAR: &str = "HUDDLE_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Without a log path, events are discarded.
pub fn init(log_path: Option<&Path>) -> Result<()> {
    let result = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::sink)
            .try_init(),
    };

    result.map_err(|e| HuddleError::Other(format!("failed to initialize logging: {}", e)))
}
