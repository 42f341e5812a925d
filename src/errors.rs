use thiserror::Error;

/// Failures raised by a document store implementation.
///
/// The record layer never translates these; they reach the caller wrapped in
/// [`DbError::Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: collection {collection} already holds _id {id}")]
    DuplicateKey { collection: String, id: String },

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("bad filter: {0}")]
    BadFilter(String),

    #[error("invalid regex: {0}")]
    InvalidRegex(String),

    #[error("immutable field: update would modify {0}")]
    ImmutableField(String),

    #[error("store task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
