//! In-memory chat room source for the scroll-anchored feed.
//!
//! Rooms keep their full history in memory. The observed room is exposed one page at a
//! time through a `watch` channel, and live posts reach it only while a subscription for
//! that room is held.

pub mod error;
pub mod ids;
pub mod memory;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use ids::MessageId;
pub use memory::MemoryMessageStore;
pub use types::{ChatMessage, DEFAULT_PAGE_SIZE, NewMessage};
