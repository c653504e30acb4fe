use std::sync::Arc;
use std::time::Duration;

use gpui::{AsyncApp, Task};
use parlor_feed::SourceId;
use parlor_store::{MemoryMessageStore, NewMessage, StoreResult};

pub const DEMO_ROOMS: [&str; 3] = ["general", "random", "announcements"];
pub const LIVE_ROOM: &str = "general";
pub const LIVE_MESSAGE_INTERVAL: Duration = Duration::from_secs(4);

const GENERAL_HISTORY_LEN: usize = 180;
const RANDOM_HISTORY_LEN: usize = 12;
const AUTHORS: [&str; 4] = ["ada", "grace", "linus", "margaret"];

pub fn demo_rooms() -> Vec<SourceId> {
    DEMO_ROOMS
        .iter()
        .filter_map(|name| SourceId::parse(name).ok())
        .collect()
}

/// Seeds `general` with several pages, `random` with one, and leaves `announcements` empty.
pub fn seed_demo_history(store: &MemoryMessageStore) -> StoreResult<()> {
    for (name, count) in [("general", GENERAL_HISTORY_LEN), ("random", RANDOM_HISTORY_LEN)] {
        let Ok(room) = SourceId::parse(name) else {
            continue;
        };
        store.seed(
            &room,
            (0..count).map(|index| {
                NewMessage::new(
                    AUTHORS[index % AUTHORS.len()],
                    format!("{name} history message {}", index + 1),
                )
            }),
        )?;
    }
    Ok(())
}

/// Posts a message into [`LIVE_ROOM`] on a fixed interval until the task is dropped.
pub fn spawn_live_ticker(store: Arc<MemoryMessageStore>, cx: &mut gpui::App) -> Task<()> {
    cx.spawn(async move |cx: &mut AsyncApp| {
        let Ok(room) = SourceId::parse(LIVE_ROOM) else {
            return;
        };

        let mut tick = 0_usize;
        loop {
            cx.background_executor().timer(LIVE_MESSAGE_INTERVAL).await;
            tick += 1;

            let author = AUTHORS[tick % AUTHORS.len()];
            let message = NewMessage::new(author, format!("live update #{tick}"));
            if let Err(error) = store.post(&room, message) {
                tracing::warn!("failed to post live demo message: {error}");
            }
        }
    })
}
