// State management module.
// Holds the cached conversation widgets and the schedule date strip.

pub mod cached;
pub mod date_strip;
pub mod scroll;

pub use cached::{
    CachedWidget, LoadOutcome, Refresh, RefreshOutcome, RefreshResult, ResourceSource, WidgetData,
    WidgetView,
};
pub use date_strip::{DateIndex, DateStrip, INITIAL_INDEX, StripViewport, TOTAL_DAYS, day_label};
pub use scroll::{Align, ScrollAck, ScrollController, ScrollError, ScrollEvent, VirtualList};
