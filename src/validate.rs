use crate::models::{DocumentInput, DocumentSource, DocumentType, DEFAULT_DESCRIPTION};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TRUSTED_HOST: &str = "drive.google.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please fill in all required fields (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("unknown document type '{0}' (expected one of: policy, form, report, newsletter, other)")]
    UnknownType(String),
    #[error("provide either a link or a file, not both")]
    ConflictingSource,
    #[error("link '{link}' is not hosted on {host}")]
    UntrustedLink { link: String, host: String },
}

/// The checked, normalized fields of a submission, ready to become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDocument {
    pub title: String,
    pub doc_type: DocumentType,
    pub source: DocumentSource,
    pub description: String,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Checks required-field presence. Every missing field is reported at once.
pub fn validate_input(input: &DocumentInput) -> Result<ValidatedDocument, ValidationError> {
    let title = input.title.trim();
    let doc_type = input.doc_type.trim();
    let link = non_blank(input.link.as_deref());
    let file_name = non_blank(input.file_name.as_deref());

    let mut missing = Vec::new();
    if title.is_empty() {
        missing.push("title");
    }
    if doc_type.is_empty() {
        missing.push("type");
    }
    if link.is_none() && file_name.is_none() {
        missing.push("link or file");
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let doc_type: DocumentType = doc_type.parse().map_err(ValidationError::UnknownType)?;

    let source = match (link, file_name) {
        (Some(_), Some(_)) => return Err(ValidationError::ConflictingSource),
        (Some(link), None) => DocumentSource::Link {
            link: link.to_string(),
        },
        (None, Some(file_name)) => DocumentSource::File {
            file_name: file_name.to_string(),
            file_size: input.file_size.unwrap_or(0),
        },
        (None, None) => return Err(ValidationError::MissingFields(vec!["link or file"])),
    };

    let description = non_blank(input.description.as_deref())
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();

    Ok(ValidatedDocument {
        title: title.to_string(),
        doc_type,
        source,
        description,
    })
}

/// What to do with a link that does not point at the trusted host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    Allow,
    #[default]
    Warn,
    Reject,
}

impl FromStr for LinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(LinkPolicy::Allow),
            "warn" => Ok(LinkPolicy::Warn),
            "reject" => Ok(LinkPolicy::Reject),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for LinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkPolicy::Allow => "allow",
            LinkPolicy::Warn => "warn",
            LinkPolicy::Reject => "reject",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRule {
    pub policy: LinkPolicy,
    pub trusted_host: String,
}

impl Default for LinkRule {
    fn default() -> Self {
        Self {
            policy: LinkPolicy::default(),
            trusted_host: DEFAULT_TRUSTED_HOST.to_string(),
        }
    }
}

impl LinkRule {
    /// `Ok(Some(warning))` when the link is untrusted but the policy lets it
    /// through. File sources are never checked.
    pub fn check(&self, source: &DocumentSource) -> Result<Option<String>, ValidationError> {
        let DocumentSource::Link { link } = source else {
            return Ok(None);
        };
        if self.policy == LinkPolicy::Allow || link.contains(&self.trusted_host) {
            return Ok(None);
        }

        match self.policy {
            LinkPolicy::Reject => Err(ValidationError::UntrustedLink {
                link: link.clone(),
                host: self.trusted_host.clone(),
            }),
            _ => Ok(Some(format!(
                "'{}' doesn't look like a {} link",
                link, self.trusted_host
            ))),
        }
    }
}
