// Cache entry wrapper with expiry metadata.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Result;

/// Default TTL for widget data: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A persisted widget payload with its creation time and expiry marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// Namespaced key this entry is stored under.
    pub key: String,
    /// The cached payload.
    pub data: T,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// `timestamp + ttl` at write time.
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(key: impl Into<String>, data: T, ttl: Duration, now: DateTime<Utc>) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            key: key.into(),
            data,
            timestamp: now,
            expires_at,
        }
    }

    /// Time elapsed since the entry was written. Entries stamped in the
    /// future count as brand new.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.timestamp)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// An entry is stale once its age strictly exceeds the TTL.
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) > ttl
    }
}

impl<T: Serialize> CacheEntry<T> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T: DeserializeOwned> CacheEntry<T> {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_at_is_timestamp_plus_ttl() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", vec![1, 2], DEFAULT_TTL, now);

        assert_eq!(entry.timestamp, now);
        assert_eq!(entry.expires_at, now + chrono::Duration::minutes(5));
    }

    #[test]
    fn test_staleness_boundary() {
        let now = Utc::now();
        let ttl = Duration::from_secs(300);

        let fresh = CacheEntry::new("k", (), ttl, now - chrono::Duration::seconds(60));
        assert!(!fresh.is_stale(ttl, now));

        let exactly = CacheEntry::new("k", (), ttl, now - chrono::Duration::seconds(300));
        assert!(!exactly.is_stale(ttl, now));

        let stale = CacheEntry::new("k", (), ttl, now - chrono::Duration::seconds(400));
        assert!(stale.is_stale(ttl, now));
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", (), DEFAULT_TTL, now + chrono::Duration::hours(1));

        assert_eq!(entry.age(now), Duration::ZERO);
        assert!(!entry.is_stale(Duration::ZERO, now));
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let entry = CacheEntry::new("conversation_pinned_c1", vec!["m1"], DEFAULT_TTL, Utc::now());
        let json = entry.to_json().unwrap();
        assert!(json.contains("\"expiresAt\""));

        let parsed: CacheEntry<Vec<String>> = CacheEntry::from_json(&json).unwrap();
        assert_eq!(parsed.data, vec!["m1".to_string()]);
        assert_eq!(parsed.key, "conversation_pinned_c1");
    }

    #[test]
    fn test_corrupt_json_is_error() {
        let parsed = CacheEntry::<Vec<u32>>::from_json("{not json");
        assert!(parsed.is_err());
    }
}
