use super::Transcript;
use crate::shared::fs_atomic::replace_file;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read transcript {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse transcript {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode transcript for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to create transcript directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write transcript {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Single-file transcript persistence. Every save rewrites the whole file;
/// there is no locking, so concurrent writers race and the last write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Transcript, StoreError> {
        if !self.path.exists() {
            return Ok(Transcript::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.display_path(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Transcript::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.display_path(),
            source,
        })
    }

    /// Like [`TranscriptStore::load`] but an unreadable or corrupt file yields
    /// an empty transcript alongside the error that caused it.
    pub fn load_or_empty(&self) -> (Transcript, Option<StoreError>) {
        match self.load() {
            Ok(transcript) => (transcript, None),
            Err(err) => (Transcript::new(), Some(err)),
        }
    }

    pub fn save(&self, transcript: &Transcript) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let mut body =
            serde_json::to_vec_pretty(transcript).map_err(|source| StoreError::Encode {
                path: self.display_path(),
                source,
            })?;
        body.push(b'\n');
        replace_file(&self.path, &body).map_err(|source| StoreError::Write {
            path: self.display_path(),
            source,
        })
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.save(&Transcript::new())
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}
