use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DESCRIPTION: &str = "No description provided";

/// `Oct 19, 2026`
const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DocumentType {
    Policy,
    Form,
    Report,
    Newsletter,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Policy,
        DocumentType::Form,
        DocumentType::Report,
        DocumentType::Newsletter,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Policy => "policy",
            DocumentType::Form => "form",
            DocumentType::Report => "report",
            DocumentType::Newsletter => "newsletter",
            DocumentType::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

impl TryFrom<String> for DocumentType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|unknown| format!("unknown document type '{}'", unknown))
    }
}

/// Where the document lives: an external link, or the metadata of a
/// simulated upload (the file contents are never stored).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentSource {
    Link {
        link: String,
    },
    File {
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "fileSize")]
        file_size: u64,
    },
}

impl DocumentSource {
    /// The string the card icon is derived from.
    pub fn locator(&self) -> &str {
        match self {
            DocumentSource::Link { link } => link,
            DocumentSource::File { file_name, .. } => file_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(flatten)]
    pub source: DocumentSource,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(alias = "uploadDate")]
    pub date: String,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

pub fn format_display_date<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Raw form submission. Every field may be blank; `validate::validate_input`
/// decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub doc_type: String,
    pub link: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub description: Option<String>,
}

impl DocumentInput {
    /// Prefills the form from an existing record, as the edit action does.
    pub fn from_record(record: &DocumentRecord) -> Self {
        let (link, file_name, file_size) = match &record.source {
            DocumentSource::Link { link } => (Some(link.clone()), None, None),
            DocumentSource::File {
                file_name,
                file_size,
            } => (None, Some(file_name.clone()), Some(*file_size)),
        };

        Self {
            title: record.title.clone(),
            doc_type: record.doc_type.to_string(),
            link,
            file_name,
            file_size,
            description: Some(record.description.clone()),
        }
    }
}
