use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Append-only JSON-lines log. Write failures are swallowed so logging never
/// interrupts a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLog {
    path: Option<PathBuf>,
}

impl ChatLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append(LogLevel::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append(LogLevel::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.append(LogLevel::Error, event, message);
    }

    pub fn append(&self, level: LogLevel, event: &str, message: &str) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": now_secs(),
            "level": level.as_str(),
            "event": event,
            "message": message,
        });
        let Ok(line) = serde_json::to_string(&payload) else {
            return;
        };

        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}

pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{ChatLog, LogLevel};
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn log_lines_are_json_objects_with_level_and_event() {
        let dir = tempdir().expect("tempdir");
        let log = ChatLog::new(dir.path().join("logs/chat.log"));
        log.info("session.loaded", "turns=0");
        log.append(LogLevel::Warn, "store.save_failed", "disk full");

        let raw = fs::read_to_string(dir.path().join("logs/chat.log")).expect("read log");
        let lines: Vec<Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["event"], "session.loaded");
        assert_eq!(lines[1]["level"], "warn");
        assert_eq!(lines[1]["message"], "disk full");
        assert!(lines[1]["timestamp"].as_i64().is_some());
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let log = ChatLog::disabled();
        assert!(log.path().is_none());
        log.error("inference.failed", "ignored");
    }
}
