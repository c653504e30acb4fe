use std::sync::Arc;

use crate::render::{DisplayState, ItemRenderer, ListView, RenderedRow, ScrollAnchor};
use crate::scroll::{ScrollMetrics, ScrollRequest, ViewState};
use crate::settings::FeedSettings;
use crate::source::{FeedItem, ItemSource, LoadState, SourceId, Subscription};

/// Source the list is currently bound to, with its live subscription.
struct ActiveSource {
    id: SourceId,
    // Dropped before the next source is bound, which releases live delivery.
    subscription: Subscription,
}

/// Scroll-anchored view over one source at a time.
///
/// The host drives it with four events: a source change, a scroll, a new snapshot from
/// the source, and a render pass. It keeps the viewport glued to the newest item while
/// the reader sits at the bottom and asks for older items when the reader reaches
/// the top.
pub struct ScrollAnchoredList<S: ItemSource> {
    source: Arc<S>,
    settings: FeedSettings,
    active: Option<ActiveSource>,
    view: ViewState,
    state: LoadState<S::Item>,
    // Set when `load_older` is issued, cleared once a snapshot shows the backfill
    // started or landed.
    backfill_requested: bool,
}

impl<S: ItemSource> ScrollAnchoredList<S> {
    pub fn new(source: Arc<S>, settings: FeedSettings) -> Self {
        Self {
            source,
            settings,
            active: None,
            view: ViewState::default(),
            state: LoadState::default(),
            backfill_requested: false,
        }
    }

    pub fn settings(&self) -> FeedSettings {
        self.settings
    }

    pub fn view_state(&self) -> ViewState {
        self.view
    }

    pub fn is_at_bottom(&self) -> bool {
        self.view.is_at_bottom
    }

    pub fn active_source(&self) -> Option<&SourceId> {
        self.active.as_ref().map(|active| &active.id)
    }

    /// Last accepted snapshot.
    pub fn state(&self) -> &LoadState<S::Item> {
        &self.state
    }

    /// Binds the list to `next`, releasing the previous source first.
    ///
    /// Re-binding the current source is a no-op. Binding `None` leaves the list idle
    /// with no source calls issued.
    pub fn set_source(&mut self, next: Option<SourceId>) {
        if self.active_source() == next.as_ref() {
            return;
        }

        self.teardown();
        self.view.reset();
        self.state = LoadState::default();
        self.backfill_requested = false;

        let Some(id) = next else {
            tracing::debug!("feed source cleared");
            return;
        };

        tracing::debug!(source = %id, "binding feed source");
        self.source.load_initial(&id);
        let subscription = self.source.subscribe(&id);
        self.active = Some(ActiveSource { id, subscription });
    }

    /// Releases the live subscription of the current source, if any.
    pub fn teardown(&mut self) {
        if let Some(previous) = self.active.take() {
            tracing::debug!(source = %previous.id, "releasing feed subscription");
            previous.subscription.release();
        }
    }

    /// Recomputes the bottom flag and requests a backfill when the top is reached.
    ///
    /// Returns whether `load_older` was issued.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        self.view.is_at_bottom = metrics.is_near_bottom(self.settings.bottom_threshold);

        if !metrics.is_at_top() || !self.state.has_more {
            return false;
        }

        let Some(active) = self.active.as_ref() else {
            return false;
        };

        if self.state.is_loading || self.state.is_loading_more || self.backfill_requested {
            tracing::trace!(source = %active.id, "backfill already in flight");
            return false;
        }

        tracing::debug!(
            source = %active.id,
            loaded = self.state.items.len(),
            "requesting older items"
        );
        self.backfill_requested = true;
        self.source.load_older(&active.id);
        true
    }

    /// Accepts a snapshot pushed by the source.
    ///
    /// Returns a scroll to the end when the item sequence changed while the viewport
    /// was at the bottom. Snapshots describing another source are dropped.
    pub fn apply_state(&mut self, next: LoadState<S::Item>) -> Option<ScrollRequest> {
        let Some(active) = self.active.as_ref() else {
            tracing::debug!("dropping feed snapshot with no bound source");
            return None;
        };

        if !next.describes(&active.id) {
            tracing::debug!(
                source = %active.id,
                snapshot = ?next.source,
                "dropping stale feed snapshot"
            );
            return None;
        }

        let was_at_bottom = self.view.is_at_bottom;
        let items_changed = self.state.items != next.items;

        if self.backfill_requested && backfill_observed(&self.state, &next) {
            self.backfill_requested = false;
        }
        self.state = next;

        (items_changed && was_at_bottom)
            .then(|| ScrollRequest::to_end(self.settings.scroll_behavior))
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState::of(&self.state)
    }

    pub fn render<R>(&self, renderer: &R) -> ListView<<S::Item as FeedItem>::Key, R::Element>
    where
        R: ItemRenderer<S::Item>,
    {
        match self.display_state() {
            DisplayState::Loading => ListView::Loading,
            DisplayState::Empty => ListView::Empty,
            DisplayState::List => ListView::List {
                loading_more: self.state.is_loading_more,
                rows: self
                    .state
                    .items
                    .iter()
                    .map(|item| RenderedRow {
                        key: item.key(),
                        element: renderer.render_item(item),
                    })
                    .collect(),
                anchor: ScrollAnchor::default(),
            },
        }
    }
}

/// Whether `next` reflects a requested backfill: in flight, finished with a new
/// `has_more`, or older items placed in front of the previous first item.
fn backfill_observed<I: FeedItem>(previous: &LoadState<I>, next: &LoadState<I>) -> bool {
    if next.is_loading_more || next.has_more != previous.has_more {
        return true;
    }

    let (Some(old_first), Some(new_first)) = (previous.items.first(), next.items.first()) else {
        return false;
    };
    let old_key = old_first.key();
    new_first.key() != old_key && next.items.iter().any(|item| item.key() == old_key)
}

impl<S: ItemSource> std::fmt::Debug for ScrollAnchoredList<S> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ScrollAnchoredList")
            .field("active_source", &self.active_source())
            .field("view", &self.view)
            .field("items", &self.state.items.len())
            .field("is_loading", &self.state.is_loading)
            .field("is_loading_more", &self.state.is_loading_more)
            .field("has_more", &self.state.has_more)
            .finish_non_exhaustive()
    }
}
