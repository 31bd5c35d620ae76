use crate::registry::{RegistryOptions, UpdateMode, DEFAULT_EXPORT_FILE};
use crate::storage::DEFAULT_STORE_FILE;
use crate::validate::{LinkPolicy, LinkRule, DEFAULT_TRUSTED_HOST};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}='{value}' is invalid, expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// File holding the serialized collection.
    pub store_path: PathBuf,
    pub update_mode: UpdateMode,
    pub link_policy: LinkPolicy,
    pub trusted_host: String,
    pub export_file_name: String,
    /// Address the web panel listens on.
    pub bind_addr: String,
    /// `LOG_LEVEL`; each binary supplies its own fallback.
    pub log_level: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            update_mode: UpdateMode::default(),
            link_policy: LinkPolicy::default(),
            trusted_host: DEFAULT_TRUSTED_HOST.to_string(),
            export_file_name: DEFAULT_EXPORT_FILE.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            log_level: None,
        }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let update_mode = match lookup("DOC_REGISTRY_UPDATE_MODE") {
            Some(value) => value.parse::<UpdateMode>().map_err(|_| ConfigError::Invalid {
                var: "DOC_REGISTRY_UPDATE_MODE",
                value,
                expected: "'in-place' or 'recreate'",
            })?,
            None => defaults.update_mode,
        };

        let link_policy = match lookup("DOC_REGISTRY_LINK_POLICY") {
            Some(value) => value.parse::<LinkPolicy>().map_err(|_| ConfigError::Invalid {
                var: "DOC_REGISTRY_LINK_POLICY",
                value,
                expected: "'allow', 'warn' or 'reject'",
            })?,
            None => defaults.link_policy,
        };

        Ok(Self {
            store_path: lookup("DOC_REGISTRY_STORE")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            update_mode,
            link_policy,
            trusted_host: lookup("DOC_REGISTRY_TRUSTED_HOST").unwrap_or(defaults.trusted_host),
            export_file_name: lookup("DOC_REGISTRY_EXPORT_NAME")
                .unwrap_or(defaults.export_file_name),
            bind_addr: lookup("DOC_REGISTRY_BIND").unwrap_or(defaults.bind_addr),
            log_level: lookup("LOG_LEVEL").or(defaults.log_level),
        })
    }

    pub fn log_level_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.log_level.as_deref().unwrap_or(fallback)
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            update_mode: self.update_mode,
            link_rule: LinkRule {
                policy: self.link_policy,
                trusted_host: self.trusted_host.clone(),
            },
            export_file_name: self.export_file_name.clone(),
        }
    }
}
