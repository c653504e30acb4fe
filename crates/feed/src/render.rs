use crate::source::LoadState;

/// Element id hosts give the marker after the last row.
pub const SCROLL_ANCHOR_ID: &str = "feed-scroll-anchor";

/// Draws one item into the host's element type.
pub trait ItemRenderer<I> {
    type Element;

    fn render_item(&self, item: &I) -> Self::Element;
}

/// Which of the three mutually exclusive views is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Loading,
    Empty,
    List,
}

impl DisplayState {
    /// Loading wins over everything, then an empty sequence, then the list.
    pub fn of<I>(state: &LoadState<I>) -> Self {
        if state.is_loading {
            Self::Loading
        } else if state.items.is_empty() {
            Self::Empty
        } else {
            Self::List
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    Empty,
    LoadingMore,
}

impl Placeholder {
    pub fn title(self) -> &'static str {
        match self {
            Self::Loading => "Loading messages...",
            Self::Empty => "No messages yet",
            Self::LoadingMore => "Loading more messages...",
        }
    }

    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::Empty => Some("Be the first to send a message!"),
            Self::Loading | Self::LoadingMore => None,
        }
    }
}

/// Marker placed after the last row; stick-to-bottom scrolls target it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub id: &'static str,
}

impl Default for ScrollAnchor {
    fn default() -> Self {
        Self {
            id: SCROLL_ANCHOR_ID,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow<K, E> {
    pub key: K,
    pub element: E,
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<K, E> {
    Loading,
    Empty,
    List {
        /// Show the [`Placeholder::LoadingMore`] indicator above the first row.
        loading_more: bool,
        rows: Vec<RenderedRow<K, E>>,
        anchor: ScrollAnchor,
    },
}

impl<K, E> ListView<K, E> {
    pub fn display_state(&self) -> DisplayState {
        match self {
            Self::Loading => DisplayState::Loading,
            Self::Empty => DisplayState::Empty,
            Self::List { .. } => DisplayState::List,
        }
    }

    /// Full-surface placeholder replacing the list, if any.
    pub fn placeholder(&self) -> Option<Placeholder> {
        match self {
            Self::Loading => Some(Placeholder::Loading),
            Self::Empty => Some(Placeholder::Empty),
            Self::List { .. } => None,
        }
    }
}
