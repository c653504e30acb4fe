use std::path::PathBuf;
use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, list::ListItem, v_flex};
use parlor_feed::settings::{SETTINGS_DIRECTORY_NAME, SETTINGS_FILE_NAME};
use parlor_feed::{FeedSettings, SourceId};
use parlor_store::MemoryMessageStore;

use crate::chat::MessageList;
use crate::chat::demo::{demo_rooms, spawn_live_ticker};

/// Width of the room sidebar.
pub const SIDEBAR_WIDTH: f32 = 220.0;

gpui::actions!(shell, [Quit]);

/// Location of the feed settings file, falling back to `.parlor/` when the platform
/// has no config directory.
pub fn feed_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
        .unwrap_or_else(|| PathBuf::from(".parlor"))
        .join(SETTINGS_FILE_NAME)
}

/// Main window layout: room sidebar on the left, message list for the selected room on
/// the right.
pub struct ChatAppShell {
    message_list: Entity<MessageList>,
    rooms: Vec<SourceId>,
    _live_ticker: Task<()>,
}

impl ChatAppShell {
    pub fn new(
        store: Arc<MemoryMessageStore>,
        settings: FeedSettings,
        cx: &mut Context<Self>,
    ) -> Self {
        let rooms = demo_rooms();
        let message_list = cx.new(|cx| MessageList::new(Arc::clone(&store), settings, cx));

        if let Some(first_room) = rooms.first().cloned() {
            message_list.update(cx, |list, cx| list.set_room(Some(first_room), cx));
        }

        Self {
            message_list,
            rooms,
            _live_ticker: spawn_live_ticker(store, cx),
        }
    }

    fn select_room(&mut self, room: SourceId, cx: &mut Context<Self>) {
        tracing::info!(room = %room, "switching room");
        self.message_list
            .update(cx, |list, cx| list.set_room(Some(room), cx));
        cx.notify();
    }
}

impl Render for ChatAppShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let active_room = self.message_list.read(cx).active_room().cloned();

        h_flex()
            .size_full()
            .bg(theme.background)
            .child(
                v_flex()
                    .id("room-sidebar")
                    .w(px(SIDEBAR_WIDTH))
                    .h_full()
                    .p_2()
                    .gap_1()
                    .border_r_1()
                    .border_color(theme.border)
                    .children(self.rooms.iter().enumerate().map(|(index, room)| {
                        let is_selected = active_room.as_ref() == Some(room);
                        let label = format!("# {room}");
                        let room = room.clone();

                        ListItem::new(("room", index))
                            .w_full()
                            .px_3()
                            .py_2()
                            .rounded_md()
                            .selected(is_selected)
                            .on_click(cx.listener(move |this, _event: &ClickEvent, _window, cx| {
                                this.select_room(room.clone(), cx);
                            }))
                            .child(Label::new(label).text_sm())
                    })),
            )
            .child(
                v_flex()
                    .id("room-messages")
                    .flex_1()
                    .h_full()
                    .min_w_0()
                    .min_h_0()
                    .overflow_hidden()
                    .child(self.message_list.clone()),
            )
    }
}
