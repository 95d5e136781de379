use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{codes, AppError};

/// The last successful `/incidents` reply, kept verbatim in one JSON file.
///
/// This file is the only memory that survives between invocations.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted payload. A missing or unreadable file is `None`; the first run
    /// never has one.
    pub fn load(&self) -> Option<Value> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), err = %e, "no previous reply");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), err = %e, "ignoring corrupt previous reply");
                None
            }
        }
    }

    /// Replace the persisted payload. Temp file + rename, so readers see the old reply or the
    /// new one, never a torn write.
    pub fn save(&self, payload: &Value) -> Result<(), AppError> {
        let data = serde_json::to_vec(payload).map_err(|e| {
            AppError::new(codes::STORE_ENCODE_FAILED, "Failed to encode incidents reply")
                .with_details(e.to_string())
        })?;

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| write_failed(&parent, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| write_failed(&parent, e))?;
        tmp.write_all(&data).map_err(|e| write_failed(tmp.path(), e))?;
        tmp.flush().map_err(|e| write_failed(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| write_failed(&self.path, e.error))?;
        Ok(())
    }
}

fn write_failed(path: &Path, err: std::io::Error) -> AppError {
    AppError::new(codes::STORE_WRITE_FAILED, "Failed to persist incidents reply")
        .with_details(format!("path={}; err={}", path.display(), err))
}
