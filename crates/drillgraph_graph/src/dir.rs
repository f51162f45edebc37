//! Graph store directory management.
//!
//! ```text
//! <graph_dir>/
//! ├─ LOCK                 # Advisory lock, one owner at a time
//! ├─ graph.journal        # Frame journal replayed on connect
//! └─ graph.journal.tmp    # Present only while compacting
//! ```

use crate::error::{GraphError, GraphResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const LOCK_FILE: &str = "LOCK";
const JOURNAL_FILE: &str = "graph.journal";
const JOURNAL_TEMP: &str = "graph.journal.tmp";

/// Delay between lock attempts while connecting.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// Holds the exclusive lock on a graph store directory.
///
/// The lock is released when the value is dropped.
#[derive(Debug)]
pub struct GraphDir {
    path: PathBuf,
    _lock_file: File,
}

impl GraphDir {
    /// Opens the directory, retrying the lock until `timeout` has passed.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Missing`] if the directory is absent and
    ///   `create_if_missing` is false
    /// - [`GraphError::Locked`] if another owner keeps the lock past `timeout`
    pub fn open(path: &Path, create_if_missing: bool, timeout: Duration) -> GraphResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(GraphError::Missing {
                    path: path.to_path_buf(),
                });
            }
        }
        if !path.is_dir() {
            return Err(GraphError::Missing {
                path: path.to_path_buf(),
            });
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        let deadline = Instant::now() + timeout;
        loop {
            if lock_file.try_lock_exclusive().is_ok() {
                break;
            }
            if Instant::now() >= deadline {
                return Err(GraphError::Locked {
                    path: path.to_path_buf(),
                });
            }
            thread::sleep(LOCK_RETRY_INTERVAL);
        }
        debug!(path = %path.display(), "graph directory locked");

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// The directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the live journal.
    #[must_use]
    pub fn journal_path(&self) -> PathBuf {
        self.path.join(JOURNAL_FILE)
    }

    /// Path compaction writes to before swapping it in.
    #[must_use]
    pub fn journal_temp_path(&self) -> PathBuf {
        self.path.join(JOURNAL_TEMP)
    }

    /// Renames the compacted journal over the live one and syncs the directory.
    pub fn install_compacted_journal(&self) -> GraphResult<()> {
        fs::rename(self.journal_temp_path(), self.journal_path())?;
        self.sync_directory()
    }

    /// Removes a temp journal left behind by an interrupted compaction.
    pub fn remove_stale_temp(&self) -> GraphResult<()> {
        let temp = self.journal_temp_path();
        if temp.exists() {
            debug!(path = %temp.display(), "removing stale compaction file");
            fs::remove_file(temp)?;
        }
        Ok(())
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> GraphResult<()> {
        File::open(&self.path)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> GraphResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph");
        let gd = GraphDir::open(&path, true, Duration::ZERO).unwrap();
        assert!(path.join(LOCK_FILE).exists());
        assert_eq!(gd.journal_path(), path.join(JOURNAL_FILE));
    }

    #[test]
    fn missing_directory_without_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent");
        let result = GraphDir::open(&path, false, Duration::ZERO);
        assert!(matches!(result, Err(GraphError::Missing { .. })));
    }

    #[test]
    fn second_owner_times_out() {
        let dir = tempdir().unwrap();
        let _first = GraphDir::open(dir.path(), true, Duration::ZERO).unwrap();
        let second = GraphDir::open(dir.path(), true, Duration::from_millis(60));
        assert!(matches!(second, Err(GraphError::Locked { .. })));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = tempdir().unwrap();
        {
            let _first = GraphDir::open(dir.path(), true, Duration::ZERO).unwrap();
        }
        assert!(GraphDir::open(dir.path(), true, Duration::ZERO).is_ok());
    }

    #[test]
    fn compacted_journal_replaces_live_one() {
        let dir = tempdir().unwrap();
        let gd = GraphDir::open(dir.path(), true, Duration::ZERO).unwrap();
        fs::write(gd.journal_path(), b"old").unwrap();
        fs::write(gd.journal_temp_path(), b"new").unwrap();
        gd.install_compacted_journal().unwrap();
        assert_eq!(fs::read(gd.journal_path()).unwrap(), b"new");
        assert!(!gd.journal_temp_path().exists());
        gd.remove_stale_temp().unwrap();
    }
}
