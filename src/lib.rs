pub mod app;
pub mod chat;
pub mod config;
pub mod inference;
pub mod shared;
pub mod transcript;
pub mod tui;
