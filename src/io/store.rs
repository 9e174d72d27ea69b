use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::io::lock::{LockError, StoreLock};
use crate::model::task::{Task, TaskList};

/// Key the task collection is stored under
pub const STORE_KEY: &str = "planner_tasks_v1";

/// Error type for store writes
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Key-value task store backed by a directory: one JSON file per key.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the task collection
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", STORE_KEY))
    }

    /// Take the write lock on the data directory, creating it if needed.
    ///
    /// Hold the guard across a load-modify-save so no other writer lands in
    /// between; save through [`Store::save_locked`] while holding it.
    pub fn lock(&self) -> Result<StoreLock, StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::WriteError {
            path: self.dir.clone(),
            source: e,
        })?;
        Ok(StoreLock::acquire_default(&self.dir)?)
    }

    /// Overwrite the stored collection with `tasks`, in order.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let lock = self.lock()?;
        self.save_locked(&lock, tasks)
    }

    /// [`Store::save`] for a caller already holding the lock
    pub fn save_locked(&self, _lock: &StoreLock, tasks: &[Task]) -> Result<(), StoreError> {
        let path = self.path();
        let content = serde_json::to_string_pretty(tasks)?;
        atomic_write(&path, content.as_bytes()).map_err(|e| {
            warn!(path = %path.display(), error = %e, "task store write failed");
            StoreError::WriteError {
                path: path.clone(),
                source: e,
            }
        })?;
        info!(count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Read the stored collection.
    ///
    /// `None` means there is no usable data: the key is absent, unreadable,
    /// or malformed. Malformed content (including an id too large to leave
    /// room for the counter) is copied aside as `.json.bak` and logged rather
    /// than returned as an error.
    pub fn load(&self) -> Option<TaskList> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read task store");
                return None;
            }
        };

        let list = parse_tasks(&content)
            .map_err(|e| e.to_string())
            .and_then(|tasks| {
                TaskList::from_tasks(tasks).ok_or_else(|| "task id too large".to_string())
            });
        match list {
            Ok(list) => {
                info!(count = list.len(), "loaded tasks");
                Some(list)
            }
            Err(e) => {
                let bak = path.with_extension("json.bak");
                let _ = fs::copy(&path, &bak);
                warn!(
                    path = %path.display(),
                    backup = %bak.display(),
                    error = %e,
                    "failed to load tasks"
                );
                None
            }
        }
    }
}

/// Parse a stored task array, reviving deadlines to canonical timestamps.
pub fn parse_tasks(content: &str) -> Result<Vec<Task>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Write to a temp file in the same directory, then rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
