use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

use super::record::LogRecord;

/// Destination for completed-session records
pub trait LogStore: Send + Sync {
    /// Append one record after all existing ones
    fn append(&self, record: &LogRecord) -> Result<()>;

    /// Every record, oldest first
    fn records(&self) -> Result<Vec<LogRecord>>;
}

/// Records kept as a pretty-printed JSON array in a single file
///
/// Each append reads the whole file and rewrites it through a temporary
/// file. A missing or unreadable array is treated as empty.
pub struct JsonLogStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Study log at {}", path.display());
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<LogRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        match serde_json::from_str(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    "Ignoring malformed study log {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }
}

impl LogStore for JsonLogStore {
    fn append(&self, record: &LogRecord) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load()?;
        records.push(record.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }

        let json = serde_json::to_string_pretty(&records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }

    fn records(&self) -> Result<Vec<LogRecord>> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }
}

/// In-process store, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryLogStore {
    fn append(&self, record: &LogRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn records(&self) -> Result<Vec<LogRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
