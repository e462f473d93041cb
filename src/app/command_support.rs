use crate::chat::{ChatContext, ChatOutcome};
use crate::config::{
    default_state_root_path, load_settings as config_load_settings, Settings, StatePaths,
};
use crate::shared::logging::ChatLog;
use crate::transcript::TranscriptStore;

pub fn state_paths() -> Result<StatePaths, String> {
    default_state_root_path()
        .map(StatePaths::new)
        .map_err(|e| e.to_string())
}

pub fn load_settings(paths: &StatePaths) -> Result<Settings, String> {
    config_load_settings(paths).map_err(|e| e.to_string())
}

pub fn chat_context(paths: &StatePaths, settings: &Settings) -> ChatContext {
    ChatContext::new(
        TranscriptStore::new(settings.resolve_transcript_path(paths)),
        ChatLog::new(paths.chat_log_path()),
    )
}

pub fn warning_lines(outcome: &ChatOutcome) -> Vec<String> {
    outcome
        .warnings
        .iter()
        .map(|warning| format!("warning={warning}"))
        .collect()
}

pub fn parse_index(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid message index `{raw}`; expected a non-negative integer"))
}
