use std::sync::Arc;

use gpui::*;
use gpui_component::Root;
use parlor_feed::FeedSettings;
use parlor_store::MemoryMessageStore;

use ui::app::{ChatAppShell, Quit, feed_settings_path};
use ui::chat::demo::seed_demo_history;

/// Application entry point.
///
/// Loads feed settings, seeds the demo rooms, then opens one window hosting the
/// room sidebar and message list.
fn main() {
    tracing_subscriber::fmt::init();

    let settings = FeedSettings::load_or_default(&feed_settings_path());
    let store = Arc::new(MemoryMessageStore::new());
    if let Err(error) = seed_demo_history(&store) {
        tracing::error!("failed to seed demo rooms: {error}");
    }

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        // Initialize gpui-component - REQUIRED before any Root usage
        gpui_component::init(cx);

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });
        cx.bind_keys([KeyBinding::new("cmd-q", Quit, None)]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(960.), px(720.)),
                        cx,
                    ))),
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| ChatAppShell::new(store, settings, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });
                if let Err(error) = opened {
                    tracing::error!("failed to open main window: {error}");
                }

                cx.activate(true);
            })
        })
        .detach();
    });
}
