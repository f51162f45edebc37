//! Per-document mutual exclusion.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One lock per document id.
///
/// Entries are created on first use and dropped once no thread holds or
/// waits for them, so the map only grows with concurrent activity.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock of `id`.
    ///
    /// The entry is released even if `f` panics.
    pub fn with_lock<T>(&self, id: &str, f: impl FnOnce() -> T) -> T {
        let entry = Arc::clone(self.locks.lock().entry(id.to_string()).or_default());
        let release = Release {
            locks: self,
            id,
            entry,
        };
        let _guard = release.entry.lock();
        f()
    }

    /// Number of ids with a live entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Whether no entry is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

/// Drops the table entry of `id` once nobody else holds or waits for it.
struct Release<'a> {
    locks: &'a DocumentLocks,
    id: &'a str,
    entry: Arc<Mutex<()>>,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        // Clones are only made under the table lock, so the count is stable
        // here: 2 means the table and us.
        let mut table = self.locks.locks.lock();
        if Arc::strong_count(&self.entry) == 2 {
            table.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn entries_are_pruned() {
        let locks = DocumentLocks::new();
        let value = locks.with_lock("a", || {
            assert_eq!(locks.len(), 1);
            42
        });
        assert_eq!(value, 42);
        assert!(locks.is_empty());
    }

    #[test]
    fn entry_is_released_after_panic() {
        let locks = DocumentLocks::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            locks.with_lock("a", || panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(locks.is_empty());

        assert_eq!(locks.with_lock("a", || 7), 7);
        assert!(locks.is_empty());
    }

    #[test]
    fn same_id_is_serialized() {
        let locks = Arc::new(DocumentLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    locks.with_lock("doc", || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[test]
    fn different_ids_do_not_block() {
        let locks = DocumentLocks::new();
        locks.with_lock("a", || {
            locks.with_lock("b", || {
                assert_eq!(locks.len(), 2);
            });
        });
        assert!(locks.is_empty());
    }
}
