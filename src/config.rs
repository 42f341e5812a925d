use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::DbError;
use crate::query::UnknownOperatorPolicy;
use crate::types::DEFAULT_ID_LENGTH;

pub const CONFIG_ENV: &str = "NEXUS_RECORDS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "nexus-records.toml";
const MAX_ID_LENGTH: usize = 256;

/// Settings for the record layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Length of generated identities.
    pub id_length: usize,
    /// Upper bound on `take`; also applied when a request has no `take`.
    pub max_take: Option<u64>,
    pub unknown_operators: UnknownOperatorPolicy,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            id_length: DEFAULT_ID_LENGTH,
            max_take: None,
            unknown_operators: UnknownOperatorPolicy::Ignore,
            log_dir: None,
            log_level: None,
        }
    }
}

impl RecordsConfig {
    /// # Errors
    /// Returns `Config` if the text is not valid TOML for this structure.
    pub fn from_toml_str(s: &str) -> Result<Self, DbError> {
        let cfg: Self = toml::from_str(s).map_err(|e| DbError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `Io` if the file cannot be read and `Config` if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, DbError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Load with precedence: explicit file > `NEXUS_RECORDS_CONFIG` > `./nexus-records.toml`
    /// > defaults, then environment overrides on top.
    ///
    /// # Errors
    /// Returns an error if a named file is unreadable or any source is malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, DbError> {
        let from_env = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let mut cfg = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(p) => Self::from_file(&p)?,
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if local.exists() { Self::from_file(&local)? } else { Self::default() }
            }
        };
        cfg.apply_env_from(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    /// Apply `NEXUS_RECORDS_*` overrides read through `lookup`.
    ///
    /// # Errors
    /// Returns `Config` when an override does not parse.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), DbError> {
        if let Some(v) = lookup("NEXUS_RECORDS_ID_LENGTH") {
            self.id_length = v
                .parse()
                .map_err(|_| DbError::Config(format!("NEXUS_RECORDS_ID_LENGTH: not a number: {v}")))?;
        }
        if let Some(v) = lookup("NEXUS_RECORDS_MAX_TAKE") {
            self.max_take = Some(
                v.parse()
                    .map_err(|_| DbError::Config(format!("NEXUS_RECORDS_MAX_TAKE: not a number: {v}")))?,
            );
        }
        if let Some(v) = lookup("NEXUS_RECORDS_UNKNOWN_OPERATORS") {
            self.unknown_operators = match v.to_ascii_lowercase().as_str() {
                "ignore" => UnknownOperatorPolicy::Ignore,
                "reject" => UnknownOperatorPolicy::Reject,
                _ => {
                    return Err(DbError::Config(format!(
                        "NEXUS_RECORDS_UNKNOWN_OPERATORS must be ignore or reject, got {v}"
                    )));
                }
            };
        }
        if let Some(v) = lookup("NEXUS_RECORDS_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("NEXUS_RECORDS_LOG_LEVEL") {
            self.log_level = Some(v);
        }
        self.validate()
    }

    /// # Errors
    /// Returns `Config` when `id_length` is zero or unreasonably large.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.id_length == 0 || self.id_length > MAX_ID_LENGTH {
            return Err(DbError::Config(format!(
                "id_length must be between 1 and {MAX_ID_LENGTH}, got {}",
                self.id_length
            )));
        }
        Ok(())
    }
}
