use std::sync::Arc;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, label::Label, v_flex};
use parlor_feed::{
    FeedSettings, ItemRenderer, ListView, LoadState, Placeholder, ScrollAnchoredList, SourceId,
};
use parlor_store::{ChatMessage, MemoryMessageStore};

use crate::chat::scroll_manager::ScrollManager;

/// Message list for the selected room.
///
/// Snapshots published by the store are forwarded into the feed by a task that lives
/// as long as the entity; dropping the entity releases the room subscription.
pub struct MessageList {
    feed: ScrollAnchoredList<MemoryMessageStore>,
    scroll_manager: ScrollManager,
    _state_task: Task<()>,
}

impl MessageList {
    pub fn new(
        store: Arc<MemoryMessageStore>,
        settings: FeedSettings,
        cx: &mut Context<Self>,
    ) -> Self {
        let mut snapshots = store.watch_state();
        let state_task = cx.spawn(async move |this, cx| {
            while snapshots.changed().await.is_ok() {
                let snapshot = snapshots.borrow_and_update().clone();
                if this
                    .update(cx, |this, cx| this.apply_snapshot(snapshot, cx))
                    .is_err()
                {
                    break;
                }
            }
        });

        Self {
            feed: ScrollAnchoredList::new(store, settings),
            scroll_manager: ScrollManager::new(),
            _state_task: state_task,
        }
    }

    pub fn active_room(&self) -> Option<&SourceId> {
        self.feed.active_source()
    }

    pub fn set_room(&mut self, room: Option<SourceId>, cx: &mut Context<Self>) {
        if self.feed.active_source() == room.as_ref() {
            return;
        }

        self.scroll_manager.reset();
        self.feed.set_source(room);
        cx.notify();
    }

    fn apply_snapshot(&mut self, snapshot: LoadState<ChatMessage>, cx: &mut Context<Self>) {
        if let Some(request) = self.feed.apply_state(snapshot) {
            self.scroll_manager.request(request);
        }
        cx.notify();
    }
}

struct MessageRowRenderer {
    author_color: Hsla,
    body_color: Hsla,
}

impl ItemRenderer<ChatMessage> for MessageRowRenderer {
    type Element = AnyElement;

    fn render_item(&self, message: &ChatMessage) -> AnyElement {
        v_flex()
            .w_full()
            .gap_1()
            .child(
                Label::new(message.author.clone())
                    .text_xs()
                    .text_color(self.author_color),
            )
            .child(
                Label::new(message.content.clone())
                    .text_sm()
                    .text_color(self.body_color),
            )
            .into_any_element()
    }
}

fn render_placeholder(placeholder: Placeholder, color: Hsla) -> AnyElement {
    v_flex()
        .size_full()
        .items_center()
        .justify_center()
        .gap_2()
        .child(Label::new(placeholder.title()).text_color(color))
        .when_some(placeholder.hint(), |column, hint| {
            column.child(Label::new(hint).text_sm().text_color(color))
        })
        .into_any_element()
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if let Some(metrics) = self.scroll_manager.take_scroll_change() {
            self.feed.on_scroll(metrics);
        }
        self.scroll_manager.apply_pending_scroll();

        let theme = cx.theme();
        let muted = theme.muted_foreground;
        let renderer = MessageRowRenderer {
            author_color: theme.foreground.opacity(0.5),
            body_color: theme.foreground,
        };

        let view = self.feed.render(&renderer);
        if let Some(placeholder) = view.placeholder() {
            return render_placeholder(placeholder, muted);
        }

        let ListView::List {
            loading_more,
            rows,
            anchor,
        } = view
        else {
            return div().into_any_element();
        };

        div()
            .id("message-list")
            .size_full()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .on_scroll_wheel(cx.listener(|_, _event: &ScrollWheelEvent, _window, cx| {
                cx.notify();
            }))
            .child(
                v_flex()
                    .w_full()
                    .px_4()
                    .py_3()
                    .gap_4()
                    .when(loading_more, |column| {
                        column.child(
                            div().w_full().flex().justify_center().py_2().child(
                                Label::new(Placeholder::LoadingMore.title())
                                    .text_sm()
                                    .text_color(muted),
                            ),
                        )
                    })
                    .children(rows.into_iter().map(|row| {
                        div()
                            .id(ElementId::Name(SharedString::from(format!(
                                "message-{}",
                                row.key
                            ))))
                            .w_full()
                            .child(row.element)
                    }))
                    .child(div().id(anchor.id).w_full().h(px(1.))),
            )
            .into_any_element()
    }
}
