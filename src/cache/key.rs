// Cache key construction.
// Every widget key is namespaced by widget kind and resource id.

use std::fmt;

use crate::error::{HuddleError, Result};

/// Kind of cached conversation widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Pinned,
    Media,
    Stats,
}

impl WidgetKind {
    pub fn slug(&self) -> &'static str {
        match self {
            WidgetKind::Pinned => "pinned",
            WidgetKind::Media => "media",
            WidgetKind::Stats => "stats",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WidgetKind::Pinned => "Pinned",
            WidgetKind::Media => "Media",
            WidgetKind::Stats => "Stats",
        }
    }

    /// Message shown when there is nothing to display.
    pub fn empty_message(&self) -> &'static str {
        match self {
            WidgetKind::Pinned => "No pinned messages",
            WidgetKind::Media => "No shared media",
            WidgetKind::Stats => "No activity yet",
        }
    }
}

/// A store key such as `conversation_pinned_<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(kind: WidgetKind, resource_id: &str) -> Result<Self> {
        if resource_id.trim().is_empty() {
            return Err(HuddleError::EmptyResourceId);
        }
        Ok(Self(format!("conversation_{}_{}", kind.slug(), resource_id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced_by_kind() {
        let pinned = CacheKey::new(WidgetKind::Pinned, "c1").unwrap();
        let media = CacheKey::new(WidgetKind::Media, "c2").unwrap();
        let stats = CacheKey::new(WidgetKind::Stats, "c1").unwrap();

        assert_eq!(pinned.as_str(), "conversation_pinned_c1");
        assert_eq!(media.to_string(), "conversation_media_c2");
        assert_ne!(pinned, stats);
    }

    #[test]
    fn test_empty_resource_id_rejected() {
        assert!(matches!(
            CacheKey::new(WidgetKind::Pinned, ""),
            Err(HuddleError::EmptyResourceId)
        ));
        assert!(CacheKey::new(WidgetKind::Media, "   ").is_err());
    }
}
