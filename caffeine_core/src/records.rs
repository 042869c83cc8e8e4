//! Intake record persistence.
//!
//! Records live in a single JSON array file. Mutations take an exclusive lock
//! on a sidecar `.lock` file for the whole load-modify-save cycle and replace
//! the data file atomically, so concurrent writers never lose an intake.
//! A missing or corrupt file reads as an empty history.

use crate::input::validate_amount_mg;
use crate::{Error, IntakeRecord, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Owner of the intake record collection
pub trait RecordStore {
    /// All records, newest first
    fn records(&self) -> Result<Vec<IntakeRecord>>;

    /// Add a record; non-positive amounts are rejected
    fn add(&mut self, record: IntakeRecord) -> Result<()>;

    /// Delete a record by id, returning whether it existed
    fn delete(&mut self, id: Uuid) -> Result<bool>;
}

/// JSON file-backed record store
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Run `f` over the stored records under the writer lock
    ///
    /// `f` returns its value and whether it changed the records; the file is
    /// only rewritten when it did.
    fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<IntakeRecord>) -> Result<(T, bool)>,
    {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;

        let mut records = load_records(&self.path);
        let result = f(&mut records);
        let saved = match result {
            Ok((value, true)) => save_records(&self.path, &mut records).map(|_| value),
            Ok((value, false)) => Ok(value),
            Err(e) => Err(e),
        };

        lock.unlock()?;
        saved
    }
}

impl RecordStore for JsonRecordStore {
    fn records(&self) -> Result<Vec<IntakeRecord>> {
        Ok(load_records(&self.path))
    }

    fn add(&mut self, record: IntakeRecord) -> Result<()> {
        validate_amount_mg(record.caffeine_mg)?;
        let id = record.id;
        self.mutate(|records| {
            if records.iter().any(|r| r.id == id) {
                return Err(Error::Record(format!("record {} already exists", id)));
            }
            records.push(record);
            Ok(((), true))
        })?;

        tracing::debug!("Added intake record {}", id);
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<bool> {
        let removed = self.mutate(|records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            let removed = records.len() != before;
            Ok((removed, removed))
        })?;

        if removed {
            tracing::debug!("Deleted intake record {}", id);
        } else {
            tracing::debug!("No intake record {} to delete", id);
        }
        Ok(removed)
    }
}

/// In-memory record store, for tests and embedding
#[derive(Clone, Debug, Default)]
pub struct MemoryRecordStore {
    records: Vec<IntakeRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn records(&self) -> Result<Vec<IntakeRecord>> {
        let mut records = self.records.clone();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn add(&mut self, record: IntakeRecord) -> Result<()> {
        validate_amount_mg(record.caffeine_mg)?;
        if self.records.iter().any(|r| r.id == record.id) {
            return Err(Error::Record(format!("record {} already exists", record.id)));
        }
        self.records.push(record);
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        Ok(self.records.len() != before)
    }
}

fn sort_newest_first(records: &mut [IntakeRecord]) {
    records.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));
}

/// Load records, treating a missing, unreadable or corrupt file as empty
fn load_records(path: &Path) -> Vec<IntakeRecord> {
    if !path.exists() {
        tracing::debug!("No records file at {:?}, starting empty", path);
        return Vec::new();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open records file {:?}: {}. Using empty history.", path, e);
            return Vec::new();
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock records file {:?}: {}. Using empty history.", path, e);
        return Vec::new();
    }

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let _ = file.unlock();
    if let Err(e) = read {
        tracing::warn!("Failed to read records file {:?}: {}. Using empty history.", path, e);
        return Vec::new();
    }

    match serde_json::from_str::<Vec<IntakeRecord>>(&contents) {
        Ok(mut records) => {
            sort_newest_first(&mut records);
            tracing::debug!("Loaded {} records from {:?}", records.len(), path);
            records
        }
        Err(e) => {
            tracing::warn!("Failed to parse records file {:?}: {}. Using empty history.", path, e);
            Vec::new()
        }
    }
}

/// Atomically replace the records file (temp file, fsync, rename)
fn save_records(path: &Path, records: &mut [IntakeRecord]) -> Result<()> {
    sort_newest_first(records);

    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "records path missing parent")
    })?;
    let temp = NamedTempFile::new_in(parent)?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(&*records)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved {} records to {:?}", records.len(), path);
    Ok(())
}
