// Backend response types.
// Defines rows returned by the hosted database and the verification envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Result;

/// A message pinned to a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedMessage {
    pub id: String,
    pub conversation_id: String,
    pub content: String,
    pub sender_name: Option<String>,
    pub pinned_at: DateTime<Utc>,
}

/// Media attachment shared in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub conversation_id: String,
    pub url: String,
    #[serde(default)]
    pub media_type: MediaType,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    #[default]
    File,
    #[serde(other)]
    Unknown,
}

/// Aggregate activity figures for a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub media_count: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Person a scanned pass belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassHolder {
    pub user_id: String,
    pub name: String,
    pub team_id: Option<String>,
    pub event_id: Option<String>,
}

/// Outcome of a verification call, decoded once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification<T> {
    Valid { data: T },
    Invalid { reason: String },
}

/// Shapes the backend has used for verification responses over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVerification<T> {
    Envelope {
        valid: bool,
        data: Option<T>,
        reason: Option<String>,
    },
    Bare(T),
}

impl<T: DeserializeOwned> Verification<T> {
    /// Decode either a bare value or a `{ valid, data, reason }` envelope.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawVerification<T> = serde_json::from_value(value)?;
        Ok(match raw {
            RawVerification::Bare(data) => Verification::Valid { data },
            RawVerification::Envelope {
                valid: true,
                data: Some(data),
                ..
            } => Verification::Valid { data },
            RawVerification::Envelope {
                valid: true,
                data: None,
                ..
            } => Verification::Invalid {
                reason: "missing data".to_string(),
            },
            RawVerification::Envelope { reason, .. } => Verification::Invalid {
                reason: reason.unwrap_or_else(|| "unknown".to_string()),
            },
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }
}

impl<T> Verification<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid { .. })
    }
}

impl Verification<PassHolder> {
    /// One-line result shown after scanning a pass.
    pub fn summary(&self) -> String {
        match self {
            Verification::Valid { data } => match &data.team_id {
                Some(team) => format!("valid: {} ({})", data.name, team),
                None => format!("valid: {}", data.name),
            },
            Verification::Invalid { reason } => format!("invalid: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLDER: &str = r#"{"user_id":"u1","name":"Sam","team_id":"t1","event_id":null}"#;

    #[test]
    fn test_bare_value_is_valid() {
        let v: Verification<PassHolder> = Verification::from_json(HOLDER).unwrap();
        match v {
            Verification::Valid { data } => assert_eq!(data.name, "Sam"),
            other => panic!("expected valid, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_valid() {
        let json = format!(r#"{{"valid":true,"data":{}}}"#, HOLDER);
        let v: Verification<PassHolder> = Verification::from_json(&json).unwrap();
        assert!(v.is_valid());
    }

    #[test]
    fn test_envelope_invalid_with_reason() {
        let json = r#"{"valid":false,"reason":"expired"}"#;
        let v: Verification<PassHolder> = Verification::from_json(json).unwrap();
        assert_eq!(
            v,
            Verification::Invalid {
                reason: "expired".to_string()
            }
        );
    }

    #[test]
    fn test_envelope_edge_cases() {
        let v: Verification<PassHolder> = Verification::from_json(r#"{"valid":false}"#).unwrap();
        assert_eq!(
            v,
            Verification::Invalid {
                reason: "unknown".to_string()
            }
        );

        let v: Verification<PassHolder> = Verification::from_json(r#"{"valid":true}"#).unwrap();
        assert_eq!(
            v,
            Verification::Invalid {
                reason: "missing data".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_shape_is_error() {
        let v = Verification::<PassHolder>::from_json(r#"{"something":"else"}"#);
        assert!(v.is_err());
    }

    #[test]
    fn test_stats_missing_fields_default() {
        let stats: ConversationStats =
            serde_json::from_str(r#"{"conversation_id":"c1","message_count":12}"#).unwrap();
        assert_eq!(stats.message_count, 12);
        assert_eq!(stats.member_count, 0);
        assert!(stats.last_activity.is_none());
    }

    #[test]
    fn test_unknown_media_type() {
        let item: MediaItem = serde_json::from_str(
            r#"{"id":"1","conversation_id":"c1","url":"https://x/y.bin","media_type":"hologram","file_name":null,"created_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(item.media_type, MediaType::Unknown);
    }

    #[test]
    fn test_pass_summary() {
        let v: Verification<PassHolder> = Verification::from_json(HOLDER).unwrap();
        assert_eq!(v.summary(), "valid: Sam (t1)");

        let v: Verification<PassHolder> =
            Verification::from_json(r#"{"valid":false,"reason":"expired"}"#).unwrap();
        assert_eq!(v.summary(), "invalid: expired");
    }
}
