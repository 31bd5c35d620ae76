pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;
pub mod render;
pub mod storage;
pub mod validate;
pub mod web;

pub use error::{RegistryError, RegistryResult};
pub use models::{DocumentInput, DocumentRecord, DocumentSource, DocumentType};
pub use registry::{DocumentRegistry, RegistryOptions, UpdateMode};
pub use storage::{DocumentStore, JsonFileStore, MemoryStore, StoredCollection};
