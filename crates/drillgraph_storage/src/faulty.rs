//! Fault-injecting wrapper backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared on/off switch for a [`FaultyBackend`].
///
/// The backend is usually moved into a graph client, so tests keep the switch
/// and flip it from outside.
#[derive(Debug, Clone, Default)]
pub struct FaultSwitch {
    failing: Arc<AtomicBool>,
    tear_next: Arc<AtomicBool>,
}

impl FaultSwitch {
    /// Creates a switch that starts healthy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns whether writes currently fail.
    #[must_use]
    pub fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }

    /// Makes the next append write only the first half of its data, then
    /// fail.
    pub fn tear_next_append(&self) {
        self.tear_next.store(true, Ordering::SeqCst);
    }

    fn take_tear(&self) -> bool {
        self.tear_next.swap(false, Ordering::SeqCst)
    }
}

/// Wraps a backend and refuses writes while its [`FaultSwitch`] is on.
///
/// Reads always pass through so replay of what was already written keeps
/// working.
#[derive(Debug)]
pub struct FaultyBackend<B: StorageBackend> {
    inner: B,
    switch: FaultSwitch,
}

impl<B: StorageBackend> FaultyBackend<B> {
    /// Wraps `inner`, returning the backend and the switch controlling it.
    pub fn new(inner: B) -> (Self, FaultSwitch) {
        let switch = FaultSwitch::new();
        (
            Self {
                inner,
                switch: switch.clone(),
            },
            switch,
        )
    }

    fn check(&self, op: &str) -> StorageResult<()> {
        if self.switch.is_failing() {
            return Err(StorageError::Injected(format!("{op} refused")));
        }
        Ok(())
    }
}

impl<B: StorageBackend> StorageBackend for FaultyBackend<B> {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        self.check("append")?;
        if self.switch.take_tear() {
            self.inner.append(&data[..data.len() / 2])?;
            return Err(StorageError::Injected("append torn".into()));
        }
        self.inner.append(data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.check("flush")?;
        self.inner.flush()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.check("sync")?;
        self.inner.sync()
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        self.check("truncate")?;
        self.inner.truncate(new_size)
    }
}
