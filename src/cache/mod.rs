// Cache module for widget data.
// Persists conversation widget payloads with expiry markers for instant repaint.

pub mod entry;
pub mod key;
pub mod paths;
pub mod store;

pub use entry::{CacheEntry, DEFAULT_TTL};
pub use key::{CacheKey, WidgetKind};
pub use store::{FileStore, KeyValueStore, MemoryStore};
