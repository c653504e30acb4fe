use parlor_feed::{FeedItem, SourceId};

use super::ids::MessageId;

/// Messages per page for both the initial load and each backfill.
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room: SourceId,
    pub author: String,
    pub content: String,
    pub sent_at_unix_seconds: u64,
}

impl FeedItem for ChatMessage {
    type Key = MessageId;

    fn key(&self) -> MessageId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub author: String,
    pub content: String,
}

impl NewMessage {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }
}
