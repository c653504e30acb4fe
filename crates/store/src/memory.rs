use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use parlor_feed::{ItemSource, LoadState, SourceId, Subscription};
use snafu::ensure;
use tokio::sync::watch;

use super::error::{BlankAuthorSnafu, BlankContentSnafu, StoreResult};
use super::ids::MessageId;
use super::types::{ChatMessage, DEFAULT_PAGE_SIZE, NewMessage};

#[derive(Debug, Default)]
struct StoreInner {
    history: HashMap<SourceId, Vec<ChatMessage>>,
    // Per room, index into its history of the oldest message already published.
    window_start: HashMap<SourceId, usize>,
    live: HashMap<SourceId, HashSet<u64>>,
    next_subscription: u64,
}

/// Chat rooms held in memory, published one room at a time.
///
/// Loads complete before returning; their progress is still published step by step
/// (`is_loading`, then the page) so observers see the same sequence a remote store
/// would produce.
#[derive(Debug)]
pub struct MemoryMessageStore {
    inner: Arc<Mutex<StoreInner>>,
    state: watch::Sender<LoadState<ChatMessage>>,
    page_size: usize,
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        let (state, _) = watch::channel(LoadState::default());
        Self {
            inner: Arc::new(Mutex::new(StoreInner::default())),
            state,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Receiver notified on every published snapshot.
    pub fn watch_state(&self) -> watch::Receiver<LoadState<ChatMessage>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LoadState<ChatMessage> {
        self.state.borrow().clone()
    }

    /// Appends history for `room` without live delivery.
    ///
    /// Seeding the room that is currently published leaves its snapshot untouched; the
    /// new messages appear on the next `load_initial` for that room.
    pub fn seed(
        &self,
        room: &SourceId,
        messages: impl IntoIterator<Item = NewMessage>,
    ) -> StoreResult<usize> {
        let messages = messages
            .into_iter()
            .map(|input| build_message(room, input))
            .collect::<StoreResult<Vec<_>>>()?;
        let seeded = messages.len();

        let mut inner = self.lock();
        inner
            .history
            .entry(room.clone())
            .or_default()
            .extend(messages);

        tracing::debug!(room = %room, seeded, "seeded room history");
        Ok(seeded)
    }

    /// Appends one message and delivers it to live subscribers of the observed room.
    pub fn post(&self, room: &SourceId, input: NewMessage) -> StoreResult<ChatMessage> {
        let message = build_message(room, input)?;

        let mut inner = self.lock();
        inner
            .history
            .entry(room.clone())
            .or_default()
            .push(message.clone());

        let has_live_subscribers = inner
            .live
            .get(room)
            .is_some_and(|tokens| !tokens.is_empty());
        if !has_live_subscribers {
            tracing::trace!(room = %room, message_id = %message.id, "stored without subscribers");
            return Ok(message);
        }

        let delivered = self.state.send_if_modified(|state| {
            // An in-flight initial load will pick the message up from history.
            if !state.describes(room)
                || state.is_loading
                || state.items.iter().any(|item| item.id == message.id)
            {
                return false;
            }
            state.items.push(message.clone());
            true
        });

        tracing::debug!(room = %room, message_id = %message.id, delivered, "posted message");
        Ok(message)
    }

    pub fn live_subscriptions(&self, room: &SourceId) -> usize {
        self.lock().live.get(room).map_or(0, HashSet::len)
    }

    pub fn history_len(&self, room: &SourceId) -> usize {
        self.lock().history.get(room).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        lock_inner(&self.inner)
    }
}

impl ItemSource for MemoryMessageStore {
    type Item = ChatMessage;

    fn load_initial(&self, room: &SourceId) {
        let mut inner = self.lock();
        self.state.send_replace(LoadState::loading(room.clone()));

        let history = inner.history.get(room).map(Vec::as_slice).unwrap_or_default();
        let start = history.len().saturating_sub(self.page_size);
        let items = history[start..].to_vec();
        inner.window_start.insert(room.clone(), start);

        tracing::debug!(
            room = %room,
            loaded = items.len(),
            has_more = start > 0,
            "loaded newest page"
        );
        self.state.send_replace(LoadState {
            source: Some(room.clone()),
            items,
            is_loading: false,
            is_loading_more: false,
            has_more: start > 0,
        });
    }

    fn load_older(&self, room: &SourceId) {
        let mut inner = self.lock();
        {
            let state = self.state.borrow();
            if !state.describes(room) {
                tracing::debug!(room = %room, "ignoring backfill for a room that is not loaded");
                return;
            }
            if state.is_loading || state.is_loading_more || !state.has_more {
                tracing::trace!(room = %room, "ignoring backfill while busy or exhausted");
                return;
            }
        }

        self.state.send_modify(|state| state.is_loading_more = true);

        let end = inner.window_start.get(room).copied().unwrap_or_default();
        let start = end.saturating_sub(self.page_size);
        let mut older = inner
            .history
            .get(room)
            .and_then(|history| history.get(start..end))
            .map(<[ChatMessage]>::to_vec)
            .unwrap_or_default();
        inner.window_start.insert(room.clone(), start);

        tracing::debug!(
            room = %room,
            loaded = older.len(),
            has_more = start > 0,
            "loaded older page"
        );
        self.state.send_modify(|state| {
            older.append(&mut state.items);
            state.items = older;
            state.has_more = start > 0;
            state.is_loading_more = false;
        });
    }

    fn subscribe(&self, room: &SourceId) -> Subscription {
        let token = {
            let mut inner = self.lock();
            let token = inner.next_subscription;
            inner.next_subscription += 1;
            inner.live.entry(room.clone()).or_default().insert(token);
            token
        };
        tracing::debug!(room = %room, token, "opened live subscription");

        let store = Arc::downgrade(&self.inner);
        let room = room.clone();
        Subscription::new(move || {
            let Some(store) = store.upgrade() else {
                return;
            };
            let mut inner = lock_inner(&store);
            let now_empty = match inner.live.get_mut(&room) {
                Some(tokens) => {
                    tokens.remove(&token);
                    tokens.is_empty()
                }
                None => false,
            };
            if now_empty {
                inner.live.remove(&room);
            }
            tracing::debug!(room = %room, token, "released live subscription");
        })
    }
}

fn lock_inner(inner: &Mutex<StoreInner>) -> MutexGuard<'_, StoreInner> {
    // Store state stays consistent between statements, so a poisoned lock is still usable.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn build_message(room: &SourceId, input: NewMessage) -> StoreResult<ChatMessage> {
    let author = input.author.trim().to_string();
    ensure!(
        !author.is_empty(),
        BlankAuthorSnafu {
            stage: "build-message-author",
            room: room.to_string(),
        }
    );
    ensure!(
        !input.content.trim().is_empty(),
        BlankContentSnafu {
            stage: "build-message-content",
            room: room.to_string(),
        }
    );

    Ok(ChatMessage {
        id: MessageId::new_v7(),
        room: room.clone(),
        author,
        content: input.content,
        sent_at_unix_seconds: unix_now_seconds(),
    })
}

fn unix_now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    fn room(name: &str) -> SourceId {
        SourceId::parse(name).expect("valid room name")
    }

    fn numbered(count: usize) -> Vec<NewMessage> {
        (0..count)
            .map(|index| NewMessage::new("ada", format!("message {index}")))
            .collect()
    }

    fn contents(state: &LoadState<ChatMessage>) -> Vec<String> {
        state.items.iter().map(|item| item.content.clone()).collect()
    }

    #[test]
    fn initial_load_publishes_newest_page() {
        let store = MemoryMessageStore::with_page_size(3);
        let general = room("general");
        store.seed(&general, numbered(5)).expect("seed");

        store.load_initial(&general);
        let state = store.snapshot();

        assert!(state.describes(&general));
        assert!(!state.is_loading);
        assert!(state.has_more);
        assert_eq!(contents(&state), ["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn unknown_room_loads_empty_without_more() {
        let store = MemoryMessageStore::new();
        let empty = room("empty");

        store.load_initial(&empty);
        let state = store.snapshot();

        assert!(state.describes(&empty));
        assert!(state.items.is_empty());
        assert!(!state.has_more);
    }

    #[test]
    fn backfill_prepends_pages_until_exhausted() {
        let store = MemoryMessageStore::with_page_size(2);
        let general = room("general");
        store.seed(&general, numbered(5)).expect("seed");
        store.load_initial(&general);

        store.load_older(&general);
        let state = store.snapshot();
        assert_eq!(
            contents(&state),
            ["message 1", "message 2", "message 3", "message 4"]
        );
        assert!(state.has_more);
        assert!(!state.is_loading_more);

        store.load_older(&general);
        let state = store.snapshot();
        assert_eq!(state.items.len(), 5);
        assert_eq!(state.items[0].content, "message 0");
        assert!(!state.has_more);

        // Exhausted history publishes nothing further.
        let mut receiver = store.watch_state();
        let _ = receiver.borrow_and_update();
        store.load_older(&general);
        assert!(!receiver.has_changed().expect("sender alive"));
    }

    #[test]
    fn seeding_the_published_room_shows_on_reload() {
        let store = MemoryMessageStore::with_page_size(2);
        let general = room("general");
        store.seed(&general, numbered(3)).expect("seed");
        store.load_initial(&general);
        let _live = store.subscribe(&general);

        store
            .seed(&general, vec![NewMessage::new("grace", "late seed")])
            .expect("seed");
        store
            .post(&general, NewMessage::new("ada", "live"))
            .expect("post");
        assert_eq!(contents(&store.snapshot()), ["message 1", "message 2", "live"]);

        // Backfill still walks the room's own window.
        store.load_older(&general);
        assert_eq!(
            contents(&store.snapshot()),
            ["message 0", "message 1", "message 2", "live"]
        );

        store.load_initial(&general);
        assert_eq!(contents(&store.snapshot()), ["late seed", "live"]);
        assert!(store.snapshot().has_more);
    }

    #[test]
    fn backfill_windows_are_kept_per_room() {
        let store = MemoryMessageStore::with_page_size(2);
        let general = room("general");
        let random = room("random");
        store.seed(&general, numbered(6)).expect("seed");
        store.seed(&random, numbered(3)).expect("seed");

        store.load_initial(&general);
        store.load_older(&general);
        store.load_initial(&random);
        store.load_older(&random);

        let state = store.snapshot();
        assert!(state.describes(&random));
        assert_eq!(contents(&state), ["message 0", "message 1", "message 2"]);
        assert!(!state.has_more);
    }

    #[test]
    fn backfill_for_another_room_is_ignored() {
        let store = MemoryMessageStore::with_page_size(2);
        let general = room("general");
        let random = room("random");
        store.seed(&general, numbered(4)).expect("seed");
        store.seed(&random, numbered(4)).expect("seed");
        store.load_initial(&general);

        store.load_older(&random);
        let state = store.snapshot();
        assert!(state.describes(&general));
        assert_eq!(state.items.len(), 2);
    }

    #[test]
    fn live_posts_reach_only_subscribed_observed_room() {
        let store = MemoryMessageStore::new();
        let general = room("general");
        store.load_initial(&general);

        store
            .post(&general, NewMessage::new("ada", "before subscribing"))
            .expect("post");
        assert!(store.snapshot().items.is_empty());

        let subscription = store.subscribe(&general);
        assert_eq!(store.live_subscriptions(&general), 1);
        store
            .post(&general, NewMessage::new("ada", "while subscribed"))
            .expect("post");
        assert_eq!(contents(&store.snapshot()), ["while subscribed"]);

        subscription.release();
        assert_eq!(store.live_subscriptions(&general), 0);
        store
            .post(&general, NewMessage::new("ada", "after release"))
            .expect("post");
        assert_eq!(store.snapshot().items.len(), 1);
        assert_eq!(store.history_len(&general), 3);
    }

    #[test]
    fn live_posts_for_other_rooms_stay_in_history() {
        let store = MemoryMessageStore::new();
        let general = room("general");
        let random = room("random");
        store.load_initial(&general);
        let _general_live = store.subscribe(&general);
        let _random_live = store.subscribe(&random);

        store
            .post(&random, NewMessage::new("grace", "elsewhere"))
            .expect("post");

        assert!(store.snapshot().items.is_empty());
        assert_eq!(store.history_len(&random), 1);
    }

    #[test]
    fn subscription_outliving_store_releases_quietly() {
        let store = MemoryMessageStore::new();
        let subscription = store.subscribe(&room("general"));
        drop(store);
        drop(subscription);
    }

    #[test]
    fn blank_messages_are_rejected() {
        let store = MemoryMessageStore::new();
        let general = room("general");

        assert!(matches!(
            store.post(&general, NewMessage::new("  ", "hi")),
            Err(StoreError::BlankAuthor { .. })
        ));
        assert!(matches!(
            store.post(&general, NewMessage::new("ada", " \n ")),
            Err(StoreError::BlankContent { .. })
        ));
        assert!(matches!(
            store.seed(&general, vec![NewMessage::new("ada", "")]),
            Err(StoreError::BlankContent { .. })
        ));
        assert_eq!(store.history_len(&general), 0);
    }

    #[test]
    fn page_size_is_at_least_one() {
        assert_eq!(MemoryMessageStore::with_page_size(0).page_size(), 1);
    }
}
