use serde::{Deserialize, Serialize};

/// Distance from the end, in layout units, under which the viewport counts as at the bottom.
pub const DEFAULT_BOTTOM_THRESHOLD: f32 = 50.0;

/// Viewport geometry reported with each scroll event.
///
/// All values are in the host's layout units, measured from the top of the content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Full height of the scrollable content.
    pub scroll_height: f32,
    /// Distance the content is scrolled down from its top.
    pub scroll_top: f32,
    /// Visible height of the viewport.
    pub client_height: f32,
}

impl ScrollMetrics {
    pub const fn new(scroll_height: f32, scroll_top: f32, client_height: f32) -> Self {
        Self {
            scroll_height,
            scroll_top,
            client_height,
        }
    }

    pub fn distance_from_bottom(&self) -> f32 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    pub fn is_near_bottom(&self, threshold: f32) -> bool {
        self.distance_from_bottom() < threshold
    }

    /// Overscroll past the top reports negative offsets on some hosts.
    pub fn is_at_top(&self) -> bool {
        self.scroll_top <= 0.0
    }
}

/// Scroll state owned by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub is_at_bottom: bool,
}

impl ViewState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self { is_at_bottom: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// The anchor rendered after the last row.
    End,
}

/// Scroll the host must perform after applying a new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: ScrollTarget,
    pub behavior: ScrollBehavior,
}

impl ScrollRequest {
    pub const fn to_end(behavior: ScrollBehavior) -> Self {
        Self {
            target: ScrollTarget::End,
            behavior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_bottom_is_strictly_below_threshold() {
        // 1000 - 450 - 500 = 50: exactly at the threshold is not at the bottom.
        assert!(!ScrollMetrics::new(1000.0, 450.0, 500.0).is_near_bottom(50.0));
        assert!(ScrollMetrics::new(1000.0, 451.0, 500.0).is_near_bottom(50.0));
        assert!(ScrollMetrics::new(1000.0, 500.0, 500.0).is_near_bottom(50.0));
        assert!(!ScrollMetrics::new(1000.0, 0.0, 500.0).is_near_bottom(50.0));
    }

    #[test]
    fn content_shorter_than_viewport_is_at_bottom() {
        let metrics = ScrollMetrics::new(200.0, 0.0, 500.0);
        assert!(metrics.is_near_bottom(DEFAULT_BOTTOM_THRESHOLD));
        assert!(metrics.is_at_top());
    }

    #[test]
    fn overscroll_counts_as_top() {
        assert!(ScrollMetrics::new(1000.0, -4.0, 500.0).is_at_top());
        assert!(!ScrollMetrics::new(1000.0, 0.5, 500.0).is_at_top());
    }

    #[test]
    fn view_state_resets_to_bottom() {
        let mut view = ViewState {
            is_at_bottom: false,
        };
        view.reset();
        assert!(view.is_at_bottom);
    }
}
