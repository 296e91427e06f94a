// Application configuration.
// Reads backend credentials and cache settings from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_TTL, paths};
use crate::error::{HuddleError, Result};

pub const API_URL_VAR: &str = "HUDDLE_API_URL";
pub const API_KEY_VAR: &str = "HUDDLE_API_KEY";
pub const CACHE_TTL_VAR: &str = "HUDDLE_CACHE_TTL_SECS";
pub const CONVERSATION_VAR: &str = "HUDDLE_CONVERSATION";

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted backend.
    pub api_url: String,
    /// Public API key sent with every request.
    pub api_key: String,
    /// How long widget data stays fresh.
    pub cache_ttl: Duration,
    /// Base cache directory, if the platform provides one.
    pub cache_dir: Option<PathBuf>,
    /// Conversation to open on startup.
    pub conversation_id: Option<String>,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url =
            non_empty(lookup(API_URL_VAR)).ok_or(HuddleError::MissingConfig(API_URL_VAR))?;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(HuddleError::InvalidConfig(format!(
                "{} must be an http(s) URL, got {:?}",
                API_URL_VAR, api_url
            )));
        }

        let api_key =
            non_empty(lookup(API_KEY_VAR)).ok_or(HuddleError::MissingConfig(API_KEY_VAR))?;

        let cache_ttl = match non_empty(lookup(CACHE_TTL_VAR)) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| {
                    HuddleError::InvalidConfig(format!(
                        "{} must be a number of seconds",
                        CACHE_TTL_VAR
                    ))
                })?,
            None => DEFAULT_TTL,
        };

        Ok(Self {
            api_url,
            api_key,
            cache_ttl,
            cache_dir: paths::cache_dir(),
            conversation_id: non_empty(lookup(CONVERSATION_VAR)),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
