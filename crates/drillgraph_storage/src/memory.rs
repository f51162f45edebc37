//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::sync::Arc;

/// An in-memory storage backend.
///
/// Clones share one buffer, so a journal can be "reopened" over the same
/// bytes after its first owner is dropped. That is how in-memory graph stores
/// are tested for replay without touching the file system.
///
/// # Example
///
/// ```rust
/// use drillgraph_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// let reopened = backend.clone();
/// backend.append(b"abc").unwrap();
/// assert_eq!(reopened.size().unwrap(), 3);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    data: Arc<RwLock<Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding `data`, e.g. a hand-built torn journal.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Returns a copy of the stored bytes.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let end = start.saturating_add(len);

        if offset > size || end > data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[start..end].to_vec())
    }

    fn append(&mut self, bytes: &[u8]) -> StorageResult<u64> {
        let mut data = self.data.write();
        let offset = data.len() as u64;
        data.extend_from_slice(bytes);
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        let mut data = self.data.write();
        let size = data.len() as u64;
        if new_size > size {
            return Err(StorageError::TruncateBeyondEnd {
                requested: new_size,
                size,
            });
        }
        data.truncate(new_size as usize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.read_all().unwrap().is_empty());
    }

    #[test]
    fn memory_append_returns_offsets() {
        let mut backend = InMemoryBackend::new();
        assert_eq!(backend.append(b"head").unwrap(), 0);
        assert_eq!(backend.append(b"tail").unwrap(), 4);
        assert_eq!(backend.read_all().unwrap(), b"headtail");
    }

    #[test]
    fn memory_read_past_end_fails() {
        let mut backend = InMemoryBackend::new();
        backend.append(b"hello").unwrap();

        assert!(matches!(
            backend.read_at(3, 10),
            Err(StorageError::ReadPastEnd { .. })
        ));
        assert!(matches!(
            backend.read_at(10, 0),
            Err(StorageError::ReadPastEnd { .. })
        ));
    }

    #[test]
    fn memory_clones_share_buffer() {
        let mut writer = InMemoryBackend::new();
        let reader = writer.clone();
        writer.append(b"journal").unwrap();
        assert_eq!(reader.read_at(0, 7).unwrap(), b"journal");
    }

    #[test]
    fn memory_truncate_cuts_tail() {
        let mut backend = InMemoryBackend::with_data(b"frame-1frame-2".to_vec());
        backend.truncate(7).unwrap();
        assert_eq!(backend.data(), b"frame-1");
        backend.truncate(0).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
    }

    #[test]
    fn memory_truncate_cannot_grow() {
        let mut backend = InMemoryBackend::with_data(b"abc".to_vec());
        assert!(matches!(
            backend.truncate(4),
            Err(StorageError::TruncateBeyondEnd {
                requested: 4,
                size: 3
            })
        ));
    }
}
