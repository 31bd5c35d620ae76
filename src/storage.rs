use crate::models::DocumentRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_STORE_FILE: &str = "documents.json";

/// The store slot as it was found on load.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredCollection {
    Absent,
    Loaded(Vec<DocumentRecord>),
    /// A record array where some entries did not match the record schema.
    /// The readable entries are kept.
    Partial {
        records: Vec<DocumentRecord>,
        skipped: Vec<String>,
    },
    /// The slot holds something that is not a record collection.
    Malformed { reason: String },
}

impl StoredCollection {
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return StoredCollection::Absent;
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(raw) {
            Ok(entries) => entries,
            Err(e) => {
                return StoredCollection::Malformed {
                    reason: e.to_string(),
                }
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<DocumentRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => skipped.push(format!("entry {}: {}", index, e)),
            }
        }

        if skipped.is_empty() {
            StoredCollection::Loaded(records)
        } else {
            StoredCollection::Partial { records, skipped }
        }
    }

    /// Collapses the slot into the collection it stands for. A malformed slot
    /// counts as empty.
    pub fn into_records(self) -> Vec<DocumentRecord> {
        match self {
            StoredCollection::Absent => Vec::new(),
            StoredCollection::Loaded(records) => records,
            StoredCollection::Partial { records, skipped } => {
                for reason in &skipped {
                    warn!(%reason, "skipping unreadable stored record");
                }
                records
            }
            StoredCollection::Malformed { reason } => {
                warn!(%reason, "stored collection is malformed, treating it as empty");
                Vec::new()
            }
        }
    }
}

/// Whole-collection persistence. There is no partial update: every mutation
/// saves the full sequence.
pub trait DocumentStore: Send + Sync {
    fn load(&self) -> Result<StoredCollection>;
    fn save(&mut self, documents: &[DocumentRecord]) -> Result<()>;
}

/// A single JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<StoredCollection> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store file absent");
            return Ok(StoredCollection::Absent);
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file {}", self.path.display()))?;
        Ok(StoredCollection::decode(Some(&data)))
    }

    fn save(&mut self, documents: &[DocumentRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(documents)
            .context("Failed to serialize documents")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write store file {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps the serialized slot in memory, the way a browser key-value store
/// would hold it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<StoredCollection> {
        Ok(StoredCollection::decode(self.raw.as_deref()))
    }

    fn save(&mut self, documents: &[DocumentRecord]) -> Result<()> {
        let json = serde_json::to_string(documents).context("Failed to serialize documents")?;
        self.raw = Some(json);
        Ok(())
    }
}
