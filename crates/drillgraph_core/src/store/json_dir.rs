//! Document store backed by a directory of JSON files.
//!
//! ```text
//! <data_dir>/
//! ├─ <id>.json       # one file per document
//! └─ <id>.json.tmp   # only while a save is in flight
//! ```

use super::{validate_document_id, Document, DocumentStore};
use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const EXTENSION: &str = "json";

/// One pretty-printed JSON file per document.
///
/// Saves write a temp file, fsync it and rename it over the target, so a
/// reader sees either the old or the new document.
#[derive(Debug)]
pub struct JsonDirStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDirStore {
    /// Opens the directory, creating it if missing.
    pub fn open(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(path = %root.display(), "document directory opened");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// The directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> CoreResult<PathBuf> {
        validate_document_id(id)?;
        Ok(self.root.join(format!("{id}.{EXTENSION}")))
    }

    fn read_file(path: &Path, id: &str) -> CoreResult<Document> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(CoreError::not_found(id)),
            Err(e) => return Err(e.into()),
        };
        let mut document: Document = serde_json::from_slice(&bytes)?;
        // The file name is authoritative.
        document.id = id.to_string();
        Ok(document)
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> CoreResult<()> {
        File::open(&self.root)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> CoreResult<()> {
        Ok(())
    }
}

impl DocumentStore for JsonDirStore {
    fn list(&self) -> CoreResult<Vec<Document>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == EXTENSION))
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_document_id(id).is_err() {
                warn!(path = %path.display(), "skipping file with invalid document id");
                continue;
            }
            match Self::read_file(&path, id) {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable document"),
            }
        }
        Ok(documents)
    }

    fn load(&self, id: &str) -> CoreResult<Document> {
        let path = self.path_for(id)?;
        Self::read_file(&path, id)
    }

    fn save(&self, document: &Document) -> CoreResult<()> {
        let path = self.path_for(&document.id)?;
        let temp = path.with_extension(format!("{EXTENSION}.tmp"));
        let data = serde_json::to_vec_pretty(document)?;

        let _guard = self.write_lock.lock();
        let mut file = File::create(&temp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, &path)?;
        self.sync_directory()?;
        Ok(())
    }

    fn delete(&self, id: &str) -> CoreResult<bool> {
        let path = self.path_for(id)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_load_list_delete() {
        let dir = tempdir().unwrap();
        let store = JsonDirStore::open(dir.path().join("docs")).unwrap();

        store.save(&Document::new("b", "second")).unwrap();
        store.save(&Document::new("a", "first\nline")).unwrap();

        assert_eq!(store.load("a").unwrap().text, "first\nline");
        let ids: Vec<String> = store.list().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(store.delete("b").unwrap());
        assert!(!store.delete("b").unwrap());
        assert!(matches!(
            store.load("b"),
            Err(CoreError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        store.save(&Document::new("x", "text")).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["x.json"]);
    }

    #[test]
    fn reads_legacy_files_and_skips_broken_ones() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("old.json"),
            r#"{"id":"ignored","paragraph":"legacy text"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a document").unwrap();

        let store = JsonDirStore::open(dir.path()).unwrap();
        let docs = store.list().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "old");
        assert_eq!(docs[0].text, "legacy text");

        assert!(matches!(store.load("broken"), Err(CoreError::Json(_))));
    }

    #[test]
    fn rejects_path_like_ids() {
        let dir = tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        for id in ["../escape", ".hidden", "a/b"] {
            assert!(matches!(
                store.save(&Document::new(id, "x")),
                Err(CoreError::InvalidDocumentId { .. })
            ));
        }
    }
}
