mod chat;

pub use chat::{is_chat_exit_command, run_chat_tui, CHAT_EXIT_COMMANDS, SIDEBAR_PREVIEW_CHARS};
