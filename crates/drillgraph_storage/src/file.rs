//! File-based storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// `flush()` hands data to the OS, `sync()` calls `File::sync_all()`.
/// The file handle and the cached size sit behind one mutex so a read never
/// sees a size that does not match the file.
///
/// ```no_run
/// use drillgraph_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("graph.journal")).unwrap();
/// backend.append(b"frame").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    inner: Mutex<FileState>,
}

#[derive(Debug)]
struct FileState {
    file: File,
    size: u64,
}

impl FileBackend {
    /// Opens or creates the file at `path` without truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(FileState { file, size }),
        })
    }

    /// Like [`open`](Self::open), creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut state = self.inner.lock();
        let size = state.size;
        let end = offset.saturating_add(len as u64);
        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }
        if len == 0 {
            return Ok(Vec::new());
        }

        state.file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; len];
        state.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut state = self.inner.lock();
        let offset = state.size;
        if data.is_empty() {
            return Ok(offset);
        }

        state.file.seek(SeekFrom::Start(offset))?;
        if let Err(e) = state.file.write_all(data) {
            // Drop whatever part of `data` reached the file.
            let _ = state.file.set_len(offset);
            return Err(e.into());
        }
        state.size += data.len() as u64;
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.inner.lock().file.flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.inner.lock().size)
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.inner.lock().file.sync_all()?;
        Ok(())
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        let mut state = self.inner.lock();
        if new_size > state.size {
            return Err(StorageError::TruncateBeyondEnd {
                requested: new_size,
                size: state.size,
            });
        }

        state.file.set_len(new_size)?;
        state.file.sync_all()?;
        state.size = new_size;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.journal");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn file_append_and_read_back() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("j")).unwrap();

        assert_eq!(backend.append(b"first").unwrap(), 0);
        assert_eq!(backend.append(b"second").unwrap(), 5);
        assert_eq!(backend.read_at(5, 6).unwrap(), b"second");
        assert_eq!(backend.read_all().unwrap(), b"firstsecond");
    }

    #[test]
    fn file_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("j");
        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"durable").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read_all().unwrap(), b"durable");
    }

    #[test]
    fn file_append_after_truncate_overwrites_tail() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("j")).unwrap();
        backend.append(b"good-torn").unwrap();
        backend.truncate(4).unwrap();
        backend.append(b"-next").unwrap();
        assert_eq!(backend.read_all().unwrap(), b"good-next");
    }

    #[test]
    fn file_read_past_end_fails() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("j")).unwrap();
        backend.append(b"abc").unwrap();
        assert!(matches!(
            backend.read_at(1, 5),
            Err(StorageError::ReadPastEnd { .. })
        ));
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("graph").join("j");
        let backend = FileBackend::open_with_create_dirs(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
    }
}
