use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::core::error::{StoreError, StoreResult};
use crate::core::note::Note;

pub const DEFAULT_STORE_FILE: &str = "notes.json";

const INDENT: &[u8] = b"    ";

/// Whole-file JSON store of notes.
///
/// Every operation reads the full array, mutates it in memory and writes the
/// full array back. Writes go through a temporary file in the same directory
/// that is renamed over the store, so readers only ever see a complete file.
pub struct NoteStore {
    path: PathBuf,
    // Highest id handed out by this handle, so a deleted note's id is not
    // reissued while the program is running.
    high_water: u64,
}

impl NoteStore {
    /// Opens the store at `path`, creating an empty array file if absent.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if !path.exists() {
            let dir = parent_dir(&path);
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            fs::write(&path, "[]").map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "created empty store");
        }

        Ok(Self {
            path,
            high_water: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_notes(&self) -> StoreResult<Vec<Note>> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let notes: Vec<Note> = serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        debug!(count = notes.len(), "read store");
        Ok(notes)
    }

    pub fn write_notes(&self, notes: &[Note]) -> StoreResult<()> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        notes.serialize(&mut ser)?;

        let dir = parent_dir(&self.path);
        let io_err = |source: std::io::Error| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&buf).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|err| StoreError::Persist {
            path: self.path.clone(),
            source: err.error,
        })?;

        debug!(count = notes.len(), bytes = buf.len(), "wrote store");
        Ok(())
    }

    /// Appends a note with the next free id and returns it.
    pub fn add(&mut self, text: &str) -> StoreResult<Note> {
        let mut notes = self.read_notes()?;
        let note = Note::new(self.next_id(&notes)?, text);
        notes.push(note.clone());
        self.write_notes(&notes)?;
        self.high_water = note.id;

        info!(id = note.id, "added note");
        Ok(note)
    }

    /// Removes every record carrying `id`, returning how many went away.
    pub fn delete(&mut self, id: u64) -> StoreResult<usize> {
        let notes = self.read_notes()?;
        let before = notes.len();
        let kept: Vec<Note> = notes.into_iter().filter(|note| note.id != id).collect();
        let removed = before - kept.len();
        self.write_notes(&kept)?;

        info!(id, removed, "deleted note");
        Ok(removed)
    }

    pub fn next_id(&self, notes: &[Note]) -> StoreResult<u64> {
        let stored = notes.iter().map(|note| note.id).max().unwrap_or(0);
        stored
            .max(self.high_water)
            .checked_add(1)
            .ok_or(StoreError::IdExhausted)
    }

    pub fn size_on_disk(&self) -> StoreResult<u64> {
        fs::metadata(&self.path)
            .map(|meta| meta.len())
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

// `Path::new("notes.json").parent()` is `Some("")`, which is not a usable dir.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_in(dir: &Path) -> NoteStore {
        NoteStore::open(dir.join(DEFAULT_STORE_FILE)).unwrap()
    }

    #[test]
    fn open_creates_empty_array() {
        let dir = tempdir().unwrap();
        let store = open_in(dir.path());

        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
        assert!(store.read_notes().unwrap().is_empty());
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let store = NoteStore::open(dir.path().join("a/b/notes.json")).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn open_leaves_existing_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILE);
        fs::write(&path, r#"[{"id": 3, "text": "kept"}]"#).unwrap();

        let store = NoteStore::open(&path).unwrap();
        assert_eq!(store.read_notes().unwrap(), vec![Note::new(3, "kept")]);
    }

    #[test]
    fn write_then_read_preserves_order() {
        let dir = tempdir().unwrap();
        let store = open_in(dir.path());
        let notes = vec![
            Note::new(2, "second first"),
            Note::new(1, "привет"),
            Note::new(9, "with \"quotes\""),
        ];

        store.write_notes(&notes).unwrap();
        assert_eq!(store.read_notes().unwrap(), notes);
    }

    #[test]
    fn writes_four_space_indent() {
        let dir = tempdir().unwrap();
        let store = open_in(dir.path());
        store.write_notes(&[Note::new(1, "a")]).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "[\n    {\n        \"id\": 1,\n        \"text\": \"a\"\n    }\n]");
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = open_in(dir.path());
        store.write_notes(&[Note::new(1, "a")]).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn corrupt_store_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let store = open_in(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.read_notes(), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn add_appends_count_plus_one() {
        let dir = tempdir().unwrap();
        let mut store = open_in(dir.path());
        store.write_notes(&[Note::new(1, "a"), Note::new(2, "b")]).unwrap();

        let note = store.add("c").unwrap();

        assert_eq!(note, Note::new(3, "c"));
        let notes = store.read_notes().unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes.last(), Some(&Note::new(3, "c")));
    }

    #[test]
    fn add_after_delete_does_not_reuse_id() {
        let dir = tempdir().unwrap();
        let mut store = open_in(dir.path());

        let a = store.add("A").unwrap();
        store.delete(a.id).unwrap();
        let b = store.add("B").unwrap();

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn add_never_collides_with_survivor() {
        let dir = tempdir().unwrap();
        let mut store = open_in(dir.path());
        store.write_notes(&[Note::new(1, "a"), Note::new(2, "b")]).unwrap();

        store.delete(1).unwrap();
        let note = store.add("c").unwrap();

        assert_eq!(note.id, 3);
        let ids: Vec<u64> = store.read_notes().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn add_fails_when_ids_run_out() {
        let dir = tempdir().unwrap();
        let mut store = open_in(dir.path());
        fs::write(store.path(), format!(r#"[{{"id": {}, "text": "x"}}]"#, u64::MAX)).unwrap();

        assert!(matches!(store.add("y"), Err(StoreError::IdExhausted)));
        assert_eq!(store.read_notes().unwrap(), vec![Note::new(u64::MAX, "x")]);
    }

    #[test]
    fn delete_removes_exactly_that_record() {
        let dir = tempdir().unwrap();
        let mut store = open_in(dir.path());
        for text in ["a", "b", "c"] {
            store.add(text).unwrap();
        }

        assert_eq!(store.delete(2).unwrap(), 1);
        assert_eq!(
            store.read_notes().unwrap(),
            vec![Note::new(1, "a"), Note::new(3, "c")]
        );
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let dir = tempdir().unwrap();
        let mut store = open_in(dir.path());
        store.add("a").unwrap();

        assert_eq!(store.delete(42).unwrap(), 0);
        assert_eq!(store.read_notes().unwrap().len(), 1);
    }

    #[test]
    fn delete_drops_legacy_duplicates() {
        let dir = tempdir().unwrap();
        let mut store = open_in(dir.path());
        store
            .write_notes(&[Note::new(1, "a"), Note::new(1, "b"), Note::new(2, "c")])
            .unwrap();

        assert_eq!(store.delete(1).unwrap(), 2);
        assert_eq!(store.read_notes().unwrap(), vec![Note::new(2, "c")]);
    }

    #[test]
    fn size_on_disk_tracks_file() {
        let dir = tempdir().unwrap();
        let mut store = open_in(dir.path());
        assert_eq!(store.size_on_disk().unwrap(), 2);

        store.add("hello").unwrap();
        assert!(store.size_on_disk().unwrap() > 2);
    }
}
