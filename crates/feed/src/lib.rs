#![deny(unsafe_code)]

//! Scroll-anchored incremental list core.
//!
//! The list keeps the viewport pinned to the newest item while the reader is at the
//! bottom, asks its source for older items when the reader hits the top, and decides
//! which of the loading/empty/list states to show. Loading, paging and live delivery
//! stay with the injected [`ItemSource`]; drawing one item stays with the
//! [`ItemRenderer`]. Neither depends on a UI toolkit.

pub mod list;
pub mod render;
pub mod scroll;
pub mod settings;
pub mod source;

pub use list::ScrollAnchoredList;
pub use render::{
    DisplayState, ItemRenderer, ListView, Placeholder, RenderedRow, ScrollAnchor,
};
pub use scroll::{
    DEFAULT_BOTTOM_THRESHOLD, ScrollBehavior, ScrollMetrics, ScrollRequest, ScrollTarget,
    ViewState,
};
pub use settings::{FeedSettings, SettingsError, SettingsResult};
pub use source::{FeedItem, ItemSource, LoadState, SourceId, SourceIdError, Subscription};
