use std::path::PathBuf;

use bagmerge_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("failed to open input bag {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("output bag directory already exists: {0}")]
    OutputExists(PathBuf),

    #[error("failed to create output bag directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("topic {name} declared as {first_type} ({first_format}) and {other_type} ({other_format})")]
    TopicConflict {
        name: String,
        first_type: String,
        first_format: String,
        other_type: String,
        other_format: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type MergeResult<T> = Result<T, MergeError>;
