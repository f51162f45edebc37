//! Storage backend trait definition.

use crate::error::StorageResult;

/// An append-only byte store holding a graph journal.
///
/// The journal writer appends whole frames and replays them from offset zero
/// on open. A frame that was only partly written is cut off with
/// [`truncate`](StorageBackend::truncate) during replay, and a full wipe
/// truncates to zero.
///
/// # Invariants
///
/// - `append` returns the offset where the data starts
/// - `read_at` returns exactly the bytes previously written at that offset
/// - after `sync` returns, every appended byte survives process exit
/// - implementations are `Send + Sync` so one client can be shared
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadPastEnd`](crate::StorageError::ReadPastEnd)
    /// if the range is not fully inside the store, or an I/O error.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data and returns the offset it was written at.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Pushes buffered writes to the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Returns the current size in bytes, which is the next append offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Flushes data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Drops everything after `new_size`.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_size` is larger than the current size or the
    /// truncation fails.
    fn truncate(&mut self, new_size: u64) -> StorageResult<()>;

    /// Reads the whole store.
    ///
    /// # Errors
    ///
    /// Returns an error if the size or the read fails.
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let size = self.size()?;
        let len = usize::try_from(size).map_err(|_| {
            crate::StorageError::Corrupted(format!("store of {size} bytes does not fit in memory"))
        })?;
        self.read_at(0, len)
    }
}
