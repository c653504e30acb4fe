use std::fmt;
use std::hash::Hash;

use snafu::{Snafu, ensure};

/// Identity of the logical channel whose items the list shows, such as a chat room name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Parses a source identity, trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, SourceIdError> {
        let trimmed = raw.trim();
        ensure!(
            !trimmed.is_empty(),
            BlankSnafu {
                stage: "parse-source-id",
            }
        );
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SourceIdError {
    #[snafu(display("source id is blank on `{stage}`"))]
    Blank { stage: &'static str },
}

/// One displayable unit with a key that stays stable across reloads and live appends.
pub trait FeedItem: Clone + PartialEq {
    type Key: Clone + Eq + Hash + fmt::Debug;

    fn key(&self) -> Self::Key;
}

/// Snapshot of what the source knows about the active channel.
///
/// `items` is oldest first. The list only reads it; ordering and content belong to
/// the source.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadState<I> {
    /// Source the snapshot describes; `None` before the first load.
    pub source: Option<SourceId>,
    pub items: Vec<I>,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub has_more: bool,
}

impl<I> Default for LoadState<I> {
    fn default() -> Self {
        Self {
            source: None,
            items: Vec::new(),
            is_loading: false,
            is_loading_more: false,
            has_more: false,
        }
    }
}

impl<I> LoadState<I> {
    /// A state describing `source` with an initial load in flight.
    pub fn loading(source: SourceId) -> Self {
        Self {
            source: Some(source),
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn describes(&self, source: &SourceId) -> bool {
        self.source.as_ref() == Some(source)
    }
}

/// Loads, pages and streams items for one source at a time.
///
/// Calls are fire-and-forget: results come back as [`LoadState`] snapshots the host
/// forwards to the list.
pub trait ItemSource {
    type Item: FeedItem;

    /// Starts loading the newest page of `source`.
    fn load_initial(&self, source: &SourceId);

    /// Starts loading the page preceding the oldest loaded item of `source`.
    fn load_older(&self, source: &SourceId);

    /// Starts live delivery of new items for `source` until the handle is released.
    fn subscribe(&self, source: &SourceId) -> Subscription;
}

type ReleaseFn = Box<dyn FnOnce() + Send + 'static>;

/// Handle that stops live delivery when released or dropped.
///
/// Release runs at most once.
#[must_use = "dropping a subscription releases it immediately"]
pub struct Subscription {
    release: Option<ReleaseFn>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Releases the subscription now.
    pub fn release(mut self) {
        self.run_release();
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("released", &self.is_released())
            .finish()
    }
}
