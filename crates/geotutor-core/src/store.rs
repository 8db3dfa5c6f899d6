//! Student record persistence.
//!
//! The session controller only sees the [`RecordStore`] trait. Two stores are
//! provided: an in-memory map for tests and short sessions, and a JSON file
//! holding every student keyed by id.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::StudentRecord;

/// Trait for loading and saving student records.
pub trait RecordStore {
    /// Fetch a student's record, or `None` if the student is unknown.
    fn load(&self, student_id: &str) -> Result<Option<StudentRecord>>;

    /// Insert or replace a record, keyed by its id.
    fn save(&mut self, record: &StudentRecord) -> Result<()>;

    /// Ids of every stored student, sorted.
    fn student_ids(&self) -> Result<Vec<String>>;
}

/// A store that keeps records in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: HashMap<String, StudentRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, student_id: &str) -> Result<Option<StudentRecord>> {
        Ok(self.records.get(student_id).cloned())
    }

    fn save(&mut self, record: &StudentRecord) -> Result<()> {
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn student_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// A store backed by one pretty-printed JSON object of `id -> record`.
///
/// The whole file is read on open and rewritten on every save.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: BTreeMap<String, StudentRecord>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. A file that is not valid JSON is
    /// moved aside to `<path>.bak_<unix micros>` and the store starts empty.
    /// Valid JSON whose records do not fit the schema is an error and the
    /// file is left in place.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!("no record file at {}, starting empty", path.display());
            return Ok(Self {
                path,
                records: BTreeMap::new(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read record file: {}", path.display()))?;

        let records = match serde_json::from_str::<BTreeMap<String, StudentRecord>>(&content) {
            Ok(mut records) => {
                for (id, record) in records.iter_mut() {
                    record.id = id.clone();
                }
                records
            }
            Err(e) if e.is_data() => {
                return Err(e).with_context(|| {
                    format!("record file {} has invalid records", path.display())
                });
            }
            Err(e) => {
                let backup = backup_path(&path);
                std::fs::rename(&path, &backup).with_context(|| {
                    format!("failed to back up corrupt record file: {}", path.display())
                })?;
                tracing::warn!(
                    "record file {} is corrupt ({e}); moved to {} and starting fresh",
                    path.display(),
                    backup.display()
                );
                BTreeMap::new()
            }
        };

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &BTreeMap<String, StudentRecord>) -> Result<()> {
        let json = serde_json::to_string_pretty(records).context("failed to serialize records")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write records to {}", self.path.display()))?;
        Ok(())
    }
}

/// A backup name next to `path` that no existing file uses.
fn backup_path(path: &Path) -> PathBuf {
    let stamp = chrono::Utc::now().timestamp_micros();
    let mut suffix = 0u32;
    loop {
        let mut name = path.as_os_str().to_owned();
        name.push(format!(".bak_{stamp}"));
        if suffix > 0 {
            name.push(format!("_{suffix}"));
        }
        let candidate = PathBuf::from(name);
        if !candidate.exists() {
            return candidate;
        }
        suffix += 1;
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self, student_id: &str) -> Result<Option<StudentRecord>> {
        Ok(self.records.get(student_id).cloned())
    }

    fn save(&mut self, record: &StudentRecord) -> Result<()> {
        anyhow::ensure!(!record.id.is_empty(), "cannot save a record without an id");
        // Only publish the record once it is on disk.
        let mut records = self.records.clone();
        records.insert(record.id.clone(), record.clone());
        self.write(&records)?;
        self.records = records;
        Ok(())
    }

    fn student_ids(&self) -> Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load("ana").unwrap().is_none());

        let mut record = StudentRecord::new("ana", 0.5);
        record.difficulty = Difficulty::Hard;
        store.save(&record).unwrap();

        assert_eq!(store.load("ana").unwrap(), Some(record));
        assert_eq!(store.student_ids().unwrap(), vec!["ana".to_string()]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("students.json")).unwrap();
        assert!(store.student_ids().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn json_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("students.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        let mut record = StudentRecord::new("202300123", 0.5);
        record.attempts = 4;
        record.correct = 3;
        record.mastery = 0.62;
        store.save(&record).unwrap();
        store.save(&StudentRecord::new("202300007", 0.5)).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.load("202300123").unwrap(), Some(record));
        assert_eq!(
            reopened.student_ids().unwrap(),
            vec!["202300007".to_string(), "202300123".to_string()]
        );
    }

    #[test]
    fn json_store_backs_up_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.student_ids().unwrap().is_empty());
        assert!(!path.exists());

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .starts_with("students.json.bak_")
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(
            std::fs::read_to_string(backups[0].path()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn json_store_keeps_every_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");

        std::fs::write(&path, "first corrupt").unwrap();
        JsonFileStore::open(&path).unwrap();
        std::fs::write(&path, "second corrupt").unwrap();
        JsonFileStore::open(&path).unwrap();

        let mut contents: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| std::fs::read_to_string(e.path()).unwrap())
            .collect();
        contents.sort();
        assert_eq!(contents, vec!["first corrupt", "second corrupt"]);
    }

    #[test]
    fn json_store_schema_error_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        let content = r#"{
  "ana": {"mastery": 0.4, "difficulty": "easy", "attempts": 2, "correct": 1},
  "ben": {"mastery": 0.6, "difficulty": "legendary", "attempts": 3, "correct": 2}
}"#;
        std::fs::write(&path, content).unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid records"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn json_store_failed_write_keeps_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        let original = StudentRecord::new("ana", 0.5);
        store.save(&original).unwrap();

        // A directory where the file should be makes every write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let mut updated = original.clone();
        updated.attempts = 1;
        updated.mastery = 0.55;
        assert!(store.save(&updated).is_err());
        assert!(store.save(&StudentRecord::new("ben", 0.5)).is_err());

        assert_eq!(store.load("ana").unwrap(), Some(original));
        assert!(store.load("ben").unwrap().is_none());
        assert_eq!(store.student_ids().unwrap(), vec!["ana".to_string()]);
    }

    #[test]
    fn json_store_reads_legacy_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students_data.json");
        std::fs::write(
            &path,
            r#"{
  "202300123": {
    "mastery": 0.42,
    "difficulty": "hard",
    "attempts": 9,
    "correct": 5,
    "last_login": "2024-11-02T14:05:11"
  }
}"#,
        )
        .unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        let record = store.load("202300123").unwrap().unwrap();
        assert_eq!(record.id, "202300123");
        assert_eq!(record.difficulty, Difficulty::Hard);
        assert_eq!(record.mastery, 0.42);
        assert_eq!(record.correct, 5);
    }

    #[test]
    fn json_store_rejects_anonymous_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("s.json")).unwrap();
        assert!(store.save(&StudentRecord::new("", 0.5)).is_err());
    }
}
