use std::path::PathBuf;

use crate::errors::DbError;

/// Record operation names as they appear on the command line and in scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOp {
    FindMany,
    FindUnique,
    Create,
    Update,
    Delete,
    Count,
}

impl RecordOp {
    /// Accepts `findMany` as well as `find-many` / `find_many`, in any case.
    ///
    /// # Errors
    /// `InvalidArgument` for an unknown name.
    pub fn parse(name: &str) -> Result<Self, DbError> {
        let folded: String =
            name.chars().filter(|c| *c != '-' && *c != '_').map(|c| c.to_ascii_lowercase()).collect();
        match folded.as_str() {
            "findmany" => Ok(Self::FindMany),
            "findunique" => Ok(Self::FindUnique),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "count" => Ok(Self::Count),
            _ => Err(DbError::InvalidArgument(format!("unknown operation: {name}"))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FindMany => "findMany",
            Self::FindUnique => "findUnique",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Count => "count",
        }
    }
}

/// Where `exec` reads its script from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    Stdin,
    File(PathBuf),
}

impl ScriptSource {
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" { Self::Stdin } else { Self::File(PathBuf::from(arg)) }
    }
}

pub enum Command {
    /// Print the native query documents for one request without executing it.
    Compile { op: RecordOp, args_json: String },
    /// Run NDJSON request lines against a fresh in-memory store.
    Exec { script: ScriptSource },
}
