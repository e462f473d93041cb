use crate::config::ConfigError;
use std::path::PathBuf;

pub const STATE_ROOT_DIR: &str = ".sugarchat";
pub const SETTINGS_FILE_NAME: &str = "config.yaml";
pub const TRANSCRIPT_FILE_NAME: &str = "chat_history.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }

    pub fn default_transcript_path(&self) -> PathBuf {
        self.root.join(TRANSCRIPT_FILE_NAME)
    }

    pub fn chat_log_path(&self) -> PathBuf {
        self.root.join("logs/chat.log")
    }
}

pub fn default_state_root_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(STATE_ROOT_DIR))
}
