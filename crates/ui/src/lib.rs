#![deny(unsafe_code)]

/// Desktop shell: room sidebar next to the message list.
pub mod app;
/// Message list view and its scroll plumbing.
pub mod chat;
