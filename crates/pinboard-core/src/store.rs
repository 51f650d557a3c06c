//! Canonical ordered element list with a durable copy.
//!
//! The in-memory list is authoritative for the session. Every mutation is
//! written through to a single storage slot as a JSON array; a failed write
//! is logged and leaves the in-memory list untouched.

use crate::record::ElementRecord;
use crate::storage::KeyValueStore;
use std::collections::HashSet;
use thiserror::Error;

/// Record list errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Duplicate element id: {0}")]
    DuplicateId(String),
}

/// What happened to the durable copy after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// The list was written to storage.
    Saved,
    /// Storage already holds exactly this content; nothing was written.
    Unchanged,
    /// The write failed. The in-memory list still holds the change.
    Failed,
}

/// Ordered element records backed by one durable slot.
pub struct RecordStore<S: KeyValueStore> {
    storage: S,
    key: String,
    records: Vec<ElementRecord>,
    /// Payload most recently written to (or read from) storage.
    last_written: Option<String>,
    /// In-memory list differs from the durable copy.
    dirty: bool,
    /// The list was loaded or mutated in this session.
    loaded: bool,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Create an empty store writing to `key`. Call [`RecordStore::load`] to read prior state.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            records: Vec::new(),
            last_written: None,
            dirty: false,
            loaded: false,
        }
    }

    /// Read the durable list into memory and return it.
    ///
    /// Never fails: a missing slot, an unreadable slot or a malformed payload
    /// all yield an empty list. Individual entries that fail to decode are
    /// skipped, and repeated ids keep only their first occurrence.
    pub fn load(&mut self) -> &[ElementRecord] {
        self.records.clear();
        self.last_written = None;
        self.dirty = false;
        self.loaded = true;

        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::debug!("No stored elements under '{}'", self.key);
                return &self.records;
            }
            Err(e) => {
                log::warn!("Failed to read '{}': {}", self.key, e);
                return &self.records;
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Stored elements under '{}' are malformed, starting empty: {}", self.key, e);
                return &self.records;
            }
        };

        let mut seen = HashSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<ElementRecord>(entry) {
                Ok(record) => {
                    if seen.insert(record.id.clone()) {
                        self.records.push(record);
                    } else {
                        log::warn!("Dropping element #{} with repeated id {}", index, record.id);
                        self.dirty = true;
                    }
                }
                Err(e) => {
                    log::warn!("Skipping undecodable element #{}: {}", index, e);
                    self.dirty = true;
                }
            }
        }

        self.last_written = Some(raw);
        log::info!("Loaded {} elements from '{}'", self.records.len(), self.key);
        &self.records
    }

    /// Swap in a whole new list and write it.
    ///
    /// Rejects lists with repeated ids without touching the current state.
    pub fn replace_all(&mut self, records: Vec<ElementRecord>) -> Result<SaveStatus, RecordError> {
        let duplicate = {
            let mut seen = HashSet::new();
            records
                .iter()
                .find(|r| !seen.insert(r.id.as_str()))
                .map(|r| r.id.clone())
        };
        if let Some(id) = duplicate {
            return Err(RecordError::DuplicateId(id));
        }
        self.records = records;
        self.loaded = true;
        Ok(self.persist())
    }

    /// Add a record at the end of the z-order and write the list.
    pub fn append(&mut self, record: ElementRecord) -> Result<SaveStatus, RecordError> {
        if self.contains(&record.id) {
            return Err(RecordError::DuplicateId(record.id));
        }
        self.records.push(record);
        self.loaded = true;
        Ok(self.persist())
    }

    /// Replace the record sharing `record.id`, keeping its position.
    ///
    /// Returns `None` if no such record exists. A structurally equal record is
    /// not written again.
    pub fn update(&mut self, record: ElementRecord) -> Option<SaveStatus> {
        let slot = self.records.iter_mut().find(|r| r.id == record.id)?;
        if *slot == record {
            return Some(SaveStatus::Unchanged);
        }
        *slot = record;
        Some(self.persist())
    }

    /// Remove a record by id and write the list.
    pub fn remove(&mut self, id: &str) -> Option<(ElementRecord, SaveStatus)> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let removed = self.records.remove(index);
        Some((removed, self.persist()))
    }

    /// Get a record by id.
    pub fn get(&self, id: &str) -> Option<&ElementRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Check whether a record with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Records in z-order (back to front).
    pub fn records(&self) -> &[ElementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the in-memory list already holds this session's state.
    ///
    /// Once set, the list is authoritative and is not re-read from storage
    /// implicitly.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the in-memory list holds changes the durable copy lacks.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Storage slot key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) -> SaveStatus {
        let payload = match serde_json::to_string(&self.records) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Failed to serialize elements: {}", e);
                self.dirty = true;
                return SaveStatus::Failed;
            }
        };

        if self.last_written.as_deref() == Some(payload.as_str()) {
            self.dirty = false;
            return SaveStatus::Unchanged;
        }

        match self.storage.set(&self.key, &payload) {
            Ok(()) => {
                log::debug!("Persisted {} elements to '{}'", self.records.len(), self.key);
                self.last_written = Some(payload);
                self.dirty = false;
                SaveStatus::Saved
            }
            Err(e) => {
                log::warn!("Failed to persist elements to '{}', keeping in-memory state: {}", self.key, e);
                self.dirty = true;
                SaveStatus::Failed
            }
        }
    }
}
