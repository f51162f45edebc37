//! Append-only journal of graph mutations.
//!
//! Every frame is self-contained and checksummed:
//!
//! ```text
//! | magic "DGJF" (4) | version (2) | kind (1) | len (4) | CBOR payload (len) | crc32 (4) |
//! ```
//!
//! An `Upsert` frame carries a whole [`DocumentRecord`], so replacing one
//! document is a single frame: replay either sees all of it or none of it.

use crate::error::{GraphError, GraphResult};
use crate::model::DocumentRecord;
use drillgraph_storage::StorageBackend;
use tracing::{debug, warn};

/// Magic bytes opening every frame.
pub const FRAME_MAGIC: [u8; 4] = *b"DGJF";

/// Current frame format version.
pub const FRAME_VERSION: u16 = 1;

/// magic (4) + version (2) + kind (1) + length (4)
const HEADER_SIZE: usize = 11;

const CRC_SIZE: usize = 4;

/// A journaled graph mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalOp {
    /// Purge a document and rebuild it from the record.
    Upsert(DocumentRecord),
    /// Purge a document.
    Purge {
        /// Document to remove.
        document_id: String,
    },
}

impl JournalOp {
    fn kind(&self) -> u8 {
        match self {
            Self::Upsert(_) => 1,
            Self::Purge { .. } => 2,
        }
    }

    fn encode_payload(&self) -> GraphResult<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Self::Upsert(record) => ciborium::into_writer(record, &mut buf),
            Self::Purge { document_id } => ciborium::into_writer(document_id, &mut buf),
        }
        .map_err(GraphError::codec)?;
        Ok(buf)
    }

    fn decode_payload(kind: u8, payload: &[u8], offset: u64) -> GraphResult<Self> {
        match kind {
            1 => ciborium::from_reader(payload)
                .map(Self::Upsert)
                .map_err(|e| GraphError::corrupted(offset, format!("bad upsert payload: {e}"))),
            2 => ciborium::from_reader(payload)
                .map(|document_id| Self::Purge { document_id })
                .map_err(|e| GraphError::corrupted(offset, format!("bad purge payload: {e}"))),
            other => Err(GraphError::corrupted(
                offset,
                format!("unknown frame kind {other}"),
            )),
        }
    }
}

/// Encodes one frame, refusing frames above `max_frame_bytes`.
pub fn encode_frame(op: &JournalOp, max_frame_bytes: usize) -> GraphResult<Vec<u8>> {
    let payload = op.encode_payload()?;
    let size = HEADER_SIZE + payload.len() + CRC_SIZE;
    if size > max_frame_bytes {
        return Err(GraphError::FrameTooLarge {
            size,
            max: max_frame_bytes,
        });
    }
    let len = u32::try_from(payload.len()).map_err(|_| GraphError::FrameTooLarge {
        size,
        max: u32::MAX as usize,
    })?;

    let mut frame = Vec::with_capacity(size);
    frame.extend_from_slice(&FRAME_MAGIC);
    frame.extend_from_slice(&FRAME_VERSION.to_le_bytes());
    frame.push(op.kind());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    let crc = compute_crc32(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());
    Ok(frame)
}

/// How a scan of the journal bytes ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEnd {
    /// Every byte belonged to a valid frame.
    Clean,
    /// The tail from `offset` is an incomplete frame.
    Torn {
        /// Start of the incomplete frame.
        offset: u64,
    },
    /// A complete frame at `offset` failed validation.
    Corrupt {
        /// Start of the bad frame.
        offset: u64,
        /// Reason.
        message: String,
    },
}

/// Decodes frames from the start of `bytes` until the end or the first
/// invalid frame.
pub fn scan_frames(bytes: &[u8]) -> (Vec<JournalOp>, ScanEnd) {
    let mut ops = Vec::new();
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        let offset = cursor as u64;
        let rest = &bytes[cursor..];
        if rest.len() < HEADER_SIZE {
            return (ops, ScanEnd::Torn { offset });
        }
        if rest[0..4] != FRAME_MAGIC {
            return (
                ops,
                ScanEnd::Corrupt {
                    offset,
                    message: "bad magic".into(),
                },
            );
        }
        let version = u16::from_le_bytes([rest[4], rest[5]]);
        if version != FRAME_VERSION {
            return (
                ops,
                ScanEnd::Corrupt {
                    offset,
                    message: format!("unsupported frame version {version}"),
                },
            );
        }
        let kind = rest[6];
        let len = u32::from_le_bytes([rest[7], rest[8], rest[9], rest[10]]) as usize;
        let total = HEADER_SIZE + len + CRC_SIZE;
        if rest.len() < total {
            return (ops, ScanEnd::Torn { offset });
        }

        let body = &rest[..HEADER_SIZE + len];
        let stored = u32::from_le_bytes([
            rest[HEADER_SIZE + len],
            rest[HEADER_SIZE + len + 1],
            rest[HEADER_SIZE + len + 2],
            rest[HEADER_SIZE + len + 3],
        ]);
        let actual = compute_crc32(body);
        if stored != actual {
            return (
                ops,
                ScanEnd::Corrupt {
                    offset,
                    message: format!("checksum mismatch: expected {stored:08x}, got {actual:08x}"),
                },
            );
        }

        match JournalOp::decode_payload(kind, &body[HEADER_SIZE..], offset) {
            Ok(op) => ops.push(op),
            Err(e) => {
                return (
                    ops,
                    ScanEnd::Corrupt {
                        offset,
                        message: e.to_string(),
                    },
                )
            }
        }
        cursor += total;
    }

    (ops, ScanEnd::Clean)
}

/// Writer and replayer over a storage backend.
pub(crate) struct Journal {
    backend: Box<dyn StorageBackend>,
    sync_on_write: bool,
    max_frame_bytes: usize,
}

impl Journal {
    pub(crate) fn new(
        backend: Box<dyn StorageBackend>,
        sync_on_write: bool,
        max_frame_bytes: usize,
    ) -> Self {
        Self {
            backend,
            sync_on_write,
            max_frame_bytes,
        }
    }

    /// Appends one frame. A failed write is rolled back to the previous end.
    pub(crate) fn append(&mut self, op: &JournalOp) -> GraphResult<u64> {
        let frame = encode_frame(op, self.max_frame_bytes)?;
        let before = self.backend.size()?;

        let written = self.backend.append(&frame).and_then(|offset| {
            if self.sync_on_write {
                self.backend.sync()?;
            } else {
                self.backend.flush()?;
            }
            Ok(offset)
        });

        match written {
            Ok(offset) => Ok(offset),
            Err(e) => {
                // The backend's size may not count bytes of a partial write,
                // so cut back to the old end unconditionally.
                if let Err(rollback) = self.backend.truncate(before) {
                    warn!(error = %rollback, end = before, "journal rollback failed");
                }
                Err(e.into())
            }
        }
    }

    /// Reads every valid frame.
    ///
    /// A torn tail is cut off. A corrupt frame either fails the replay or,
    /// with `reset_on_corruption`, empties the journal.
    pub(crate) fn replay(&mut self, reset_on_corruption: bool) -> GraphResult<Vec<JournalOp>> {
        let bytes = self.backend.read_all()?;
        let (ops, end) = scan_frames(&bytes);
        match end {
            ScanEnd::Clean => {
                debug!(frames = ops.len(), bytes = bytes.len(), "journal replayed");
                Ok(ops)
            }
            ScanEnd::Torn { offset } => {
                warn!(
                    offset,
                    dropped = bytes.len() as u64 - offset,
                    "journal has a torn tail, truncating"
                );
                self.backend.truncate(offset)?;
                Ok(ops)
            }
            ScanEnd::Corrupt { offset, message } if reset_on_corruption => {
                warn!(offset, %message, "journal corrupted, discarding it");
                self.backend.truncate(0)?;
                Ok(Vec::new())
            }
            ScanEnd::Corrupt { offset, message } => Err(GraphError::Corrupted { offset, message }),
        }
    }

    /// Empties the journal.
    pub(crate) fn reset(&mut self) -> GraphResult<()> {
        self.backend.truncate(0)?;
        self.backend.sync()?;
        Ok(())
    }

    pub(crate) fn size(&self) -> GraphResult<u64> {
        Ok(self.backend.size()?)
    }

    pub(crate) fn sync(&mut self) -> GraphResult<()> {
        Ok(self.backend.sync()?)
    }
}

/// Computes the IEEE CRC32 of `data`.
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineRecord, WordRecord};
    use drillgraph_storage::{FaultyBackend, InMemoryBackend};

    fn record(id: &str, words: &[&str]) -> DocumentRecord {
        DocumentRecord {
            document_id: id.to_string(),
            paragraph: words.join(" "),
            lines: vec![LineRecord {
                text: words.join(" "),
                words: words
                    .iter()
                    .map(|w| WordRecord {
                        raw: (*w).to_string(),
                        normalized: w.to_lowercase(),
                    })
                    .collect(),
            }],
        }
    }

    fn journal(backend: InMemoryBackend) -> Journal {
        Journal::new(Box::new(backend), true, 1024 * 1024)
    }

    #[test]
    fn crc32_known_value() {
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(compute_crc32(b""), 0);
    }

    #[test]
    fn append_then_replay() {
        let backend = InMemoryBackend::new();
        let mut j = journal(backend.clone());
        let upsert = JournalOp::Upsert(record("a", &["The", "cat"]));
        let purge = JournalOp::Purge {
            document_id: "b".into(),
        };
        j.append(&upsert).unwrap();
        j.append(&purge).unwrap();

        let mut reopened = journal(backend);
        assert_eq!(reopened.replay(false).unwrap(), vec![upsert, purge]);
    }

    #[test]
    fn torn_tail_is_truncated() {
        let backend = InMemoryBackend::new();
        let mut j = journal(backend.clone());
        j.append(&JournalOp::Upsert(record("a", &["x"]))).unwrap();
        let good = backend.data().len();

        let frame = encode_frame(&JournalOp::Upsert(record("b", &["y"])), usize::MAX).unwrap();
        let mut torn = backend.data();
        torn.extend_from_slice(&frame[..frame.len() - 3]);
        let backend = InMemoryBackend::with_data(torn);

        let mut reopened = journal(backend.clone());
        let ops = reopened.replay(false).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(backend.data().len(), good);
    }

    #[test]
    fn checksum_mismatch_is_corruption() {
        let mut frame = encode_frame(
            &JournalOp::Purge {
                document_id: "a".into(),
            },
            usize::MAX,
        )
        .unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;

        let (ops, end) = scan_frames(&frame);
        assert!(ops.is_empty());
        assert!(matches!(end, ScanEnd::Corrupt { offset: 0, .. }));

        let mut strict = journal(InMemoryBackend::with_data(frame.clone()));
        assert!(matches!(
            strict.replay(false),
            Err(GraphError::Corrupted { offset: 0, .. })
        ));

        let backend = InMemoryBackend::with_data(frame);
        let mut lenient = journal(backend.clone());
        assert!(lenient.replay(true).unwrap().is_empty());
        assert!(backend.data().is_empty());
    }

    #[test]
    fn oversized_frame_is_refused() {
        let op = JournalOp::Upsert(record("big", &["word"; 64]));
        assert!(matches!(
            encode_frame(&op, 32),
            Err(GraphError::FrameTooLarge { max: 32, .. })
        ));
    }

    #[test]
    fn failed_append_leaves_journal_intact() {
        let (backend, switch) = FaultyBackend::new(InMemoryBackend::new());
        let mut j = Journal::new(Box::new(backend), false, usize::MAX);
        j.append(&JournalOp::Upsert(record("a", &["x"]))).unwrap();
        let size = j.size().unwrap();

        switch.set_failing(true);
        assert!(j.append(&JournalOp::Upsert(record("b", &["y"]))).is_err());
        assert_eq!(j.size().unwrap(), size);
    }

    #[test]
    fn torn_append_is_cut_back() {
        let inner = InMemoryBackend::new();
        let (backend, switch) = FaultyBackend::new(inner.clone());
        let mut j = Journal::new(Box::new(backend), false, usize::MAX);
        let kept = JournalOp::Upsert(record("a", &["x"]));
        j.append(&kept).unwrap();
        let size = inner.data().len();

        switch.tear_next_append();
        assert!(j.append(&JournalOp::Upsert(record("b", &["y", "z"]))).is_err());
        assert_eq!(inner.data().len(), size);

        let mut reopened = journal(inner);
        assert_eq!(reopened.replay(false).unwrap(), vec![kept]);
    }

    proptest::proptest! {
        #[test]
        fn any_prefix_replays_whole_frames(
            words in proptest::collection::vec("[a-z]{1,8}", 1..6),
            cut in 0usize..4096,
        ) {
            let words: Vec<&str> = words.iter().map(String::as_str).collect();
            let ops = vec![
                JournalOp::Upsert(record("a", &words)),
                JournalOp::Purge { document_id: "b".into() },
                JournalOp::Upsert(record("c", &words)),
            ];
            let mut bytes = Vec::new();
            let mut ends = Vec::new();
            for op in &ops {
                bytes.extend(encode_frame(op, usize::MAX).unwrap());
                ends.push(bytes.len());
            }

            let cut = cut % (bytes.len() + 1);
            let (replayed, end) = scan_frames(&bytes[..cut]);
            let whole = ends.iter().filter(|&&e| e <= cut).count();
            proptest::prop_assert_eq!(&replayed[..], &ops[..whole]);
            if ends.contains(&cut) || cut == 0 {
                proptest::prop_assert_eq!(end, ScanEnd::Clean);
            } else {
                let is_torn = matches!(end, ScanEnd::Torn { .. });
                proptest::prop_assert!(is_torn);
            }
        }
    }
}
