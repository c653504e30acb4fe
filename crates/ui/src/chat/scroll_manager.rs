use gpui::{Pixels, ScrollHandle};
use parlor_feed::{ScrollBehavior, ScrollMetrics, ScrollRequest};

/// Small delta used to ignore floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// Bridges the gpui scroll handle and the feed's scroll geometry.
///
/// gpui has no scroll events of its own for a plain scroll container, so movement is
/// detected once per frame by comparing offsets.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    pending_scroll: Option<ScrollBehavior>,
    last_scroll_top: Option<f32>,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            pending_scroll: None,
            last_scroll_top: None,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    pub fn request(&mut self, request: ScrollRequest) {
        self.pending_scroll = Some(request.behavior);
    }

    /// Forgets the previous room's offset. The next frame only records a baseline, so
    /// geometry left over from the previous room is never reported as a scroll.
    pub fn reset(&mut self) {
        self.last_scroll_top = None;
        self.pending_scroll = None;
    }

    pub fn metrics(&self) -> ScrollMetrics {
        let offset = self.scroll_handle.offset().y;
        let max_offset = self.scroll_handle.max_offset().height;
        let viewport = self.scroll_handle.bounds().size.height;
        viewport_metrics(f32::from(offset), f32::from(max_offset), f32::from(viewport))
    }

    /// Returns the current geometry when the viewport moved since the previous frame.
    pub fn take_scroll_change(&mut self) -> Option<ScrollMetrics> {
        if self.scroll_handle.bounds().size.height <= Pixels::ZERO {
            return None;
        }

        let metrics = self.metrics();
        let moved = scrolled_since(self.last_scroll_top, metrics.scroll_top);
        self.last_scroll_top = Some(metrics.scroll_top);

        moved.then_some(metrics)
    }

    pub fn apply_pending_scroll(&mut self) -> bool {
        let Some(behavior) = self.pending_scroll.take() else {
            return false;
        };

        // gpui scroll containers jump; smooth requests land on the same target.
        tracing::trace!(?behavior, "scrolling message list to the end");
        self.scroll_handle.scroll_to_bottom();
        true
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `scroll_top` moved past jitter since the baseline. No baseline means no move.
fn scrolled_since(baseline: Option<f32>, scroll_top: f32) -> bool {
    baseline.is_some_and(|last_scroll_top| {
        (last_scroll_top - scroll_top).abs() > SCROLL_DELTA_EPSILON
    })
}

/// Converts gpui offsets into top-down scroll geometry.
///
/// gpui uses negative Y offsets for scrolling down, so `-offset` is the distance from
/// the top and `max_offset + viewport` is the content height.
pub fn viewport_metrics(offset_y: f32, max_offset: f32, viewport_height: f32) -> ScrollMetrics {
    let max_offset = max_offset.max(0.0);
    let scroll_top = (-offset_y).clamp(0.0, max_offset);
    ScrollMetrics::new(max_offset + viewport_height, scroll_top, viewport_height)
}
