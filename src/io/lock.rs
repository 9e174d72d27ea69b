use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

const LOCK_FILE: &str = ".planner.lock";
const RETRY_EVERY: Duration = Duration::from_millis(10);

/// Exclusive advisory lock on a data directory, held for the duration of a
/// store write.
///
/// The lock file itself is left in place: unlinking it on release would let
/// a waiter lock the old inode while a newcomer locks a fresh one.
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("timed out waiting for {path}: another planner process is writing")]
    Timeout { path: PathBuf },
}

impl StoreLock {
    /// Lock `data_dir`, retrying until `timeout` elapses.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        let mut attempts = 0u32;
        while !try_lock_exclusive(&file) {
            attempts += 1;
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path });
            }
            thread::sleep(RETRY_EVERY);
        }
        if attempts > 0 {
            debug!(attempts, "store lock acquired after contention");
        }
        Ok(StoreLock { _file: file })
    }

    /// Two seconds is well above any single save
    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, Duration::from_secs(2))
    }
}

#[cfg(unix)]
fn try_lock_exclusive(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    // Released when the descriptor closes
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_lock_exclusive(_file: &File) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn relock_after_drop() {
        let tmp = TempDir::new().unwrap();
        let first = StoreLock::acquire_default(tmp.path()).unwrap();
        drop(first);
        assert!(StoreLock::acquire(tmp.path(), Duration::from_millis(50)).is_ok());
        assert!(tmp.path().join(LOCK_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn contended_lock_times_out() {
        let tmp = TempDir::new().unwrap();
        let _held = StoreLock::acquire_default(tmp.path()).unwrap();
        let second = StoreLock::acquire(tmp.path(), Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }

    #[test]
    fn missing_dir_is_open_error() {
        let tmp = TempDir::new().unwrap();
        let res = StoreLock::acquire_default(&tmp.path().join("nope"));
        assert!(matches!(res, Err(LockError::Open { .. })));
    }
}
