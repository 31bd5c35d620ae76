//! The document registry: validated CRUD over a [`DocumentStore`].
//!
//! Every operation loads the whole collection, changes it, and saves the
//! whole collection back.

use crate::error::{RegistryError, RegistryResult};
use crate::models::{format_display_date, DocumentInput, DocumentRecord};
use crate::storage::DocumentStore;
use crate::validate::{validate_input, LinkRule, ValidatedDocument};
use anyhow::Context;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_EXPORT_FILE: &str = "documents-backup.json";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always reports the same instant.
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// How an edit is applied to an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Keep id, date and position; replace the editable fields.
    #[default]
    InPlace,
    /// Drop the old record and append a new one with a fresh id and date.
    Recreate,
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in-place" | "inplace" => Ok(UpdateMode::InPlace),
            "recreate" => Ok(UpdateMode::Recreate),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateMode::InPlace => "in-place",
            UpdateMode::Recreate => "recreate",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    pub update_mode: UpdateMode,
    pub link_rule: LinkRule,
    pub export_file_name: String,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            update_mode: UpdateMode::default(),
            link_rule: LinkRule::default(),
            export_file_name: DEFAULT_EXPORT_FILE.to_string(),
        }
    }
}

/// A downloadable snapshot of the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content: String,
}

impl ExportArtifact {
    pub fn records(&self) -> anyhow::Result<Vec<DocumentRecord>> {
        serde_json::from_str(&self.content).context("Failed to parse export artifact")
    }
}

pub struct DocumentRegistry<S> {
    store: S,
    options: RegistryOptions,
    clock: Box<dyn Clock>,
    last_id: i64,
}

impl<S: DocumentStore> DocumentRegistry<S> {
    pub fn new(store: S, options: RegistryOptions) -> Self {
        Self::with_clock(store, options, SystemClock)
    }

    pub fn with_clock(store: S, options: RegistryOptions, clock: impl Clock + 'static) -> Self {
        Self {
            store,
            options,
            clock: Box::new(clock),
            last_id: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub fn list_documents(&self) -> RegistryResult<Vec<DocumentRecord>> {
        Ok(self.store.load()?.into_records())
    }

    pub fn get_document(&self, id: i64) -> RegistryResult<Option<DocumentRecord>> {
        Ok(self.list_documents()?.into_iter().find(|d| d.id == id))
    }

    /// The warning a caller should confirm before submitting `input`, if the
    /// link policy would let it through with one.
    pub fn link_warning(&self, input: &DocumentInput) -> Option<String> {
        let doc = validate_input(input).ok()?;
        self.options.link_rule.check(&doc.source).ok().flatten()
    }

    pub fn create_document(&mut self, input: &DocumentInput) -> RegistryResult<DocumentRecord> {
        let doc = self.accept(input)?;
        let mut documents = self.list_documents()?;

        let record = self.build_record(doc, &documents)?;
        documents.push(record.clone());
        self.store.save(&documents)?;

        info!(id = record.id, title = %record.title, "document created");
        Ok(record)
    }

    /// Returns whether a record was removed. An unknown id leaves the store
    /// untouched.
    pub fn delete_document(&mut self, id: i64) -> RegistryResult<bool> {
        let mut documents = self.list_documents()?;
        let before = documents.len();
        documents.retain(|d| d.id != id);

        if documents.len() == before {
            info!(id, "delete requested for unknown document");
            return Ok(false);
        }

        self.store.save(&documents)?;
        info!(id, "document deleted");
        Ok(true)
    }

    pub fn update_document(
        &mut self,
        id: i64,
        input: &DocumentInput,
    ) -> RegistryResult<DocumentRecord> {
        let doc = self.accept(input)?;
        let mut documents = self.list_documents()?;
        let position = documents
            .iter()
            .position(|d| d.id == id)
            .ok_or(RegistryError::NotFound(id))?;

        let updated = match self.options.update_mode {
            UpdateMode::InPlace => {
                let existing = &mut documents[position];
                existing.title = doc.title;
                existing.doc_type = doc.doc_type;
                existing.source = doc.source;
                existing.description = doc.description;
                existing.clone()
            }
            UpdateMode::Recreate => {
                documents.remove(position);
                let record = self.build_record(doc, &documents)?;
                documents.push(record.clone());
                record
            }
        };

        self.store.save(&documents)?;
        info!(
            id,
            new_id = updated.id,
            mode = %self.options.update_mode,
            "document updated"
        );
        Ok(updated)
    }

    pub fn export_all(&self) -> RegistryResult<ExportArtifact> {
        let documents = self.list_documents()?;
        let content = serde_json::to_string_pretty(&documents)
            .context("Failed to serialize export")?;

        Ok(ExportArtifact {
            file_name: self.options.export_file_name.clone(),
            content,
        })
    }

    fn accept(&self, input: &DocumentInput) -> RegistryResult<ValidatedDocument> {
        let doc = validate_input(input)?;
        if let Some(warning) = self.options.link_rule.check(&doc.source)? {
            warn!(title = %doc.title, "{warning}");
        }
        Ok(doc)
    }

    fn build_record(
        &mut self,
        doc: ValidatedDocument,
        existing: &[DocumentRecord],
    ) -> RegistryResult<DocumentRecord> {
        let now = self.clock.now();
        let id = self.next_id(now.timestamp_millis(), existing)?;

        Ok(DocumentRecord {
            id,
            title: doc.title,
            doc_type: doc.doc_type,
            source: doc.source,
            description: doc.description,
            date: format_display_date(&now),
        })
    }

    /// Millisecond timestamp, bumped past every id already handed out or
    /// stored so that ids stay unique and increasing.
    fn next_id(&mut self, now_millis: i64, existing: &[DocumentRecord]) -> anyhow::Result<i64> {
        let highest = existing
            .iter()
            .map(|d| d.id)
            .max()
            .unwrap_or(0)
            .max(self.last_id);
        let floor = highest
            .checked_add(1)
            .with_context(|| format!("No document id left after {}", highest))?;
        let id = now_millis.max(floor);
        self.last_id = id;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentSource, DocumentType, DEFAULT_DESCRIPTION};
    use crate::storage::{MemoryStore, StoredCollection};
    use crate::validate::{LinkPolicy, ValidationError};
    use chrono::TimeZone;

    fn fixed_clock() -> FixedClock {
        FixedClock(Local.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap())
    }

    fn registry() -> DocumentRegistry<MemoryStore> {
        DocumentRegistry::with_clock(MemoryStore::new(), RegistryOptions::default(), fixed_clock())
    }

    fn drive_input(title: &str) -> DocumentInput {
        DocumentInput {
            title: title.to_string(),
            doc_type: "policy".to_string(),
            link: Some(format!("https://drive.google.com/{}", title.replace(' ', "-"))),
            ..Default::default()
        }
    }

    #[test]
    fn empty_store_lists_nothing() {
        assert!(registry().list_documents().unwrap().is_empty());
    }

    #[test]
    fn create_defaults_description_and_dates_record() {
        let mut registry = registry();
        let created = registry.create_document(&drive_input("Policy A")).unwrap();

        assert_eq!(created.title, "Policy A");
        assert_eq!(created.doc_type, DocumentType::Policy);
        assert_eq!(created.description, DEFAULT_DESCRIPTION);
        assert_eq!(created.date, "Oct 19, 2026");

        let listed = registry.list_documents().unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut registry = registry();
        let first = registry.create_document(&drive_input("One")).unwrap();
        let second = registry.create_document(&drive_input("Two")).unwrap();
        let third = registry.create_document(&drive_input("Three")).unwrap();

        assert_eq!(first.id, fixed_clock().0.timestamp_millis());
        assert_eq!(second.id, first.id + 1);
        assert_eq!(third.id, second.id + 1);
    }

    #[test]
    fn ids_move_past_stored_records_from_later_clocks() {
        let stored = r#"[{"id": 9999999999999, "title": "Future", "type": "other",
            "link": "https://drive.google.com/f", "description": "d", "date": "Jan 1, 2286"}]"#;
        let mut registry = DocumentRegistry::with_clock(
            MemoryStore::with_raw(stored),
            RegistryOptions::default(),
            fixed_clock(),
        );

        let created = registry.create_document(&drive_input("Now")).unwrap();
        assert_eq!(created.id, 10_000_000_000_000);
    }

    #[test]
    fn exhausted_id_space_is_an_error_not_a_wrap() {
        let stored = format!(
            r#"[{{"id": {}, "title": "Last", "type": "other",
                "link": "https://drive.google.com/l", "description": "d", "date": "Oct 19, 2026"}}]"#,
            i64::MAX
        );
        let mut registry = DocumentRegistry::with_clock(
            MemoryStore::with_raw(stored.clone()),
            RegistryOptions::default(),
            fixed_clock(),
        );

        let err = registry.create_document(&drive_input("Overflow")).unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert_eq!(registry.store().raw(), Some(stored.as_str()));
    }

    #[test]
    fn one_unreadable_record_does_not_erase_the_others() {
        let stored = r#"[
            {"id": 1, "title": "Good", "type": "policy", "link": "https://drive.google.com/g",
             "description": "d", "date": "Oct 1, 2026"},
            {"id": 2, "title": "Odd", "type": "handbook", "link": "https://drive.google.com/o",
             "description": "d", "date": "Oct 2, 2026"},
            {"id": 3, "title": "Shouting", "type": "Report", "link": "https://drive.google.com/s",
             "description": "d", "date": "Oct 3, 2026"}
        ]"#;
        let mut registry = DocumentRegistry::with_clock(
            MemoryStore::with_raw(stored),
            RegistryOptions::default(),
            fixed_clock(),
        );

        let before: Vec<i64> = registry
            .list_documents()
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(before, vec![1, 3]);

        let created = registry.create_document(&drive_input("New")).unwrap();
        let after: Vec<i64> = registry
            .list_documents()
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(after, vec![1, 3, created.id]);
    }

    #[test]
    fn invalid_input_leaves_store_untouched() {
        let mut registry = registry();
        registry.create_document(&drive_input("Kept")).unwrap();
        let before = registry.store().raw().map(str::to_string);

        let err = registry
            .create_document(&DocumentInput {
                doc_type: "policy".to_string(),
                link: Some("https://drive.google.com/x".to_string()),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::MissingFields(ref f)) if f == &vec!["title"]
        ));
        assert_eq!(registry.store().raw().map(str::to_string), before);
        assert_eq!(registry.list_documents().unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_only_target_and_is_idempotent() {
        let mut registry = registry();
        let first = registry.create_document(&drive_input("First")).unwrap();
        let second = registry.create_document(&drive_input("Second")).unwrap();

        assert!(registry.delete_document(first.id).unwrap());
        assert!(!registry.delete_document(first.id).unwrap());
        assert_eq!(registry.list_documents().unwrap(), vec![second]);
    }

    #[test]
    fn delete_on_empty_store_does_not_create_slot() {
        let mut registry = registry();
        assert!(!registry.delete_document(123).unwrap());
        assert_eq!(registry.store().raw(), None);
    }

    #[test]
    fn in_place_update_keeps_identity_and_position() {
        let mut registry = registry();
        let first = registry.create_document(&drive_input("First")).unwrap();
        let second = registry.create_document(&drive_input("Second")).unwrap();

        let mut edit = DocumentInput::from_record(&first);
        edit.title = "First (revised)".to_string();
        edit.doc_type = "report".to_string();
        let updated = registry.update_document(first.id, &edit).unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.date, first.date);
        assert_eq!(updated.doc_type, DocumentType::Report);

        let listed = registry.list_documents().unwrap();
        assert_eq!(listed, vec![updated, second]);
    }

    #[test]
    fn recreate_update_moves_record_to_end_with_new_id() {
        let options = RegistryOptions {
            update_mode: UpdateMode::Recreate,
            ..RegistryOptions::default()
        };
        let mut registry =
            DocumentRegistry::with_clock(MemoryStore::new(), options, fixed_clock());
        let first = registry.create_document(&drive_input("First")).unwrap();
        let second = registry.create_document(&drive_input("Second")).unwrap();

        let mut edit = DocumentInput::from_record(&first);
        edit.description = Some("Now described".to_string());
        let updated = registry.update_document(first.id, &edit).unwrap();

        assert_ne!(updated.id, first.id);
        assert!(updated.id > second.id);
        assert_eq!(updated.description, "Now described");

        let ids: Vec<i64> = registry
            .list_documents()
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![second.id, updated.id]);
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let mut registry = registry();
        registry.create_document(&drive_input("Only")).unwrap();
        let err = registry
            .update_document(1, &drive_input("Ghost"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(1)));
        assert_eq!(registry.list_documents().unwrap().len(), 1);
    }

    #[test]
    fn invalid_update_does_not_drop_record() {
        let options = RegistryOptions {
            update_mode: UpdateMode::Recreate,
            ..RegistryOptions::default()
        };
        let mut registry =
            DocumentRegistry::with_clock(MemoryStore::new(), options, fixed_clock());
        let original = registry.create_document(&drive_input("Keep me")).unwrap();

        let mut edit = DocumentInput::from_record(&original);
        edit.title.clear();
        assert!(registry.update_document(original.id, &edit).is_err());
        assert_eq!(registry.list_documents().unwrap(), vec![original]);
    }

    #[test]
    fn export_round_trips_listed_collection() {
        let mut registry = registry();
        registry.create_document(&drive_input("A")).unwrap();
        registry
            .create_document(&DocumentInput {
                title: "Rota".to_string(),
                doc_type: "form".to_string(),
                file_name: Some("rota.xlsx".to_string()),
                file_size: Some(4096),
                ..Default::default()
            })
            .unwrap();

        let artifact = registry.export_all().unwrap();
        assert_eq!(artifact.file_name, DEFAULT_EXPORT_FILE);
        assert_eq!(artifact.records().unwrap(), registry.list_documents().unwrap());
    }

    #[test]
    fn malformed_slot_reads_as_empty_and_is_replaced_on_create() {
        let mut registry = DocumentRegistry::with_clock(
            MemoryStore::with_raw("not json"),
            RegistryOptions::default(),
            fixed_clock(),
        );
        assert!(matches!(
            registry.store().load().unwrap(),
            StoredCollection::Malformed { .. }
        ));
        assert!(registry.list_documents().unwrap().is_empty());

        registry.create_document(&drive_input("Fresh")).unwrap();
        assert_eq!(registry.list_documents().unwrap().len(), 1);
    }

    #[test]
    fn rejected_link_policy_blocks_create() {
        let options = RegistryOptions {
            link_rule: LinkRule {
                policy: LinkPolicy::Reject,
                ..LinkRule::default()
            },
            ..RegistryOptions::default()
        };
        let mut registry =
            DocumentRegistry::with_clock(MemoryStore::new(), options, fixed_clock());
        let input = DocumentInput {
            title: "Elsewhere".to_string(),
            doc_type: "other".to_string(),
            link: Some("https://example.com/x.pdf".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            registry.create_document(&input),
            Err(RegistryError::Validation(ValidationError::UntrustedLink { .. }))
        ));
        assert!(registry.list_documents().unwrap().is_empty());
    }

    #[test]
    fn warn_link_policy_creates_and_surfaces_warning() {
        let mut registry = registry();
        let input = DocumentInput {
            title: "Elsewhere".to_string(),
            doc_type: "other".to_string(),
            link: Some("https://example.com/x.pdf".to_string()),
            ..Default::default()
        };

        assert!(registry.link_warning(&input).is_some());
        let created = registry.create_document(&input).unwrap();
        assert_eq!(
            created.source,
            DocumentSource::Link {
                link: "https://example.com/x.pdf".to_string()
            }
        );
    }

    #[test]
    fn get_document_finds_by_id() {
        let mut registry = registry();
        let created = registry.create_document(&drive_input("Lookup")).unwrap();
        assert_eq!(registry.get_document(created.id).unwrap(), Some(created));
        assert_eq!(registry.get_document(5).unwrap(), None);
    }

    #[test]
    fn update_mode_parses_config_values() {
        assert_eq!("in-place".parse::<UpdateMode>(), Ok(UpdateMode::InPlace));
        assert_eq!("Recreate".parse::<UpdateMode>(), Ok(UpdateMode::Recreate));
        assert!("merge".parse::<UpdateMode>().is_err());
    }
}
