// Backend endpoint functions.
// Typed fetches for conversation widgets and pass verification.

use serde_json::json;

use crate::error::Result;
use crate::state::cached::ResourceSource;

use super::client::BackendClient;
use super::types::{ConversationStats, MediaItem, PassHolder, PinnedMessage, Verification};

/// Page size used when a caller does not pass a limit.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

impl BackendClient {
    /// Get messages pinned in a conversation, newest first.
    pub async fn get_pinned_messages(
        &self,
        conversation_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<PinnedMessage>> {
        let filter = format!("eq.{}", conversation_id);
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).to_string();
        let params = [
            ("conversation_id", filter.as_str()),
            ("order", "pinned_at.desc"),
            ("limit", limit.as_str()),
        ];
        let response = self.get_with_params("pinned_messages", &params).await?;
        let messages: Vec<PinnedMessage> = response.json().await?;
        Ok(messages)
    }

    /// Get media shared in a conversation, newest first.
    pub async fn get_shared_media(
        &self,
        conversation_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<MediaItem>> {
        let filter = format!("eq.{}", conversation_id);
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).to_string();
        let params = [
            ("conversation_id", filter.as_str()),
            ("order", "created_at.desc"),
            ("limit", limit.as_str()),
        ];
        let response = self.get_with_params("conversation_media", &params).await?;
        let media: Vec<MediaItem> = response.json().await?;
        Ok(media)
    }

    /// Get activity totals for a conversation.
    pub async fn get_conversation_stats(&self, conversation_id: &str) -> Result<ConversationStats> {
        let filter = format!("eq.{}", conversation_id);
        let params = [("conversation_id", filter.as_str()), ("limit", "1")];
        let response = self.get_with_params("conversation_stats", &params).await?;
        let rows: Vec<ConversationStats> = response.json().await?;
        Ok(rows.into_iter().next().unwrap_or_else(|| ConversationStats {
            conversation_id: conversation_id.to_string(),
            ..ConversationStats::default()
        }))
    }

    /// Verify a scanned pass code. Used by `huddle verify <code>`.
    pub async fn verify_pass(&self, code: &str) -> Result<Verification<PassHolder>> {
        let response = self
            .post_json("rpc/verify_pass", &json!({ "code": code }))
            .await?;
        let value: serde_json::Value = response.json().await?;
        Verification::from_value(value)
    }
}

impl ResourceSource<Vec<PinnedMessage>> for BackendClient {
    async fn fetch(&self, resource_id: &str, limit: Option<u32>) -> Result<Vec<PinnedMessage>> {
        self.get_pinned_messages(resource_id, limit).await
    }
}

impl ResourceSource<Vec<MediaItem>> for BackendClient {
    async fn fetch(&self, resource_id: &str, limit: Option<u32>) -> Result<Vec<MediaItem>> {
        self.get_shared_media(resource_id, limit).await
    }
}

impl ResourceSource<ConversationStats> for BackendClient {
    async fn fetch(&self, resource_id: &str, _limit: Option<u32>) -> Result<ConversationStats> {
        self.get_conversation_stats(resource_id).await
    }
}
