//! Relational-style record operations over a document store.
//!
//! Callers describe reads and writes with `where` / `select` / `orderBy` / `data` mappings;
//! [`query`] compiles them into native filter, projection and sort documents and
//! [`records::RecordService`] runs them against a [`store::DocumentStore`].

pub mod cli;
pub mod config;
pub mod errors;
pub mod identity;
pub mod logger;
pub mod query;
pub mod records;
pub mod store;
pub mod types;
pub mod utils;

pub use config::RecordsConfig;
pub use errors::{DbError, DbResult, StoreError};
pub use records::{AsyncRecordService, RecordService};
pub use store::{DocumentStore, MemoryStore};

use std::path::Path;
use std::sync::Arc;

/// Load configuration (see [`RecordsConfig::load`]), install logging when a log directory is
/// configured, and return a service over a fresh in-memory store.
///
/// # Errors
/// Configuration or logger setup failures.
pub fn init(config_path: Option<&Path>) -> DbResult<RecordService<Arc<MemoryStore>>> {
    let config = RecordsConfig::load(config_path)?;
    if config.log_dir.is_some() {
        logger::configure_from_config(&config)?;
    }
    log::debug!("records config: {config:?}");
    Ok(RecordService::with_config(Arc::new(MemoryStore::new()), config))
}
