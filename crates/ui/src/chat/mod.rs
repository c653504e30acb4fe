/// Demo rooms and the live message ticker.
pub mod demo;
pub mod message_list;
pub mod scroll_manager;

pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
