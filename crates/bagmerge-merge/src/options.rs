use std::path::{Path, PathBuf};

use bagmerge_storage::StorageOptions;
use serde::{Deserialize, Serialize};

use crate::catalog::TopicConflictPolicy;
use crate::error::{MergeError, MergeResult};

/// Everything a merge run needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Input bags. Their order decides ties between equal timestamps.
    pub inputs: Vec<PathBuf>,
    /// Output bag directory. Must not exist yet.
    pub output: Option<PathBuf>,
    /// Forwarded to the output bag, see [`StorageOptions::max_bagfile_size`].
    pub max_bagfile_size: u64,
    /// Forwarded to the output bag, see [`StorageOptions::max_bagfile_duration`].
    pub max_bagfile_duration: u64,
    pub topic_conflicts: TopicConflictPolicy,
}

impl MergeOptions {
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            output: Some(output.into()),
            ..Default::default()
        }
    }

    /// Check that the required arguments are present and return the output.
    pub fn validate(&self) -> MergeResult<&Path> {
        if self.inputs.is_empty() {
            return Err(MergeError::MissingArgument("input bags"));
        }
        self.output
            .as_deref()
            .ok_or(MergeError::MissingArgument("output bag name"))
    }

    /// Storage configuration for the output bag at `uri`.
    pub fn storage_options(&self, uri: &Path) -> StorageOptions {
        StorageOptions::new(uri)
            .with_max_bagfile_size(self.max_bagfile_size)
            .with_max_bagfile_duration(self.max_bagfile_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_inputs() {
        let opts = MergeOptions {
            output: Some("out".into()),
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(MergeError::MissingArgument("input bags"))
        ));
    }

    #[test]
    fn validate_requires_output() {
        let opts = MergeOptions {
            inputs: vec!["a".into()],
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(MergeError::MissingArgument("output bag name"))
        ));
    }

    #[test]
    fn validate_returns_output() {
        let opts = MergeOptions::new(vec!["a".into(), "b".into()], "merged");
        assert_eq!(opts.validate().unwrap(), Path::new("merged"));
    }

    #[test]
    fn storage_options_forward_limits() {
        let opts = MergeOptions {
            max_bagfile_size: 1024,
            max_bagfile_duration: 30,
            ..MergeOptions::new(vec!["a".into()], "out")
        };
        let storage = opts.storage_options(Path::new("/abs/out"));
        assert_eq!(storage.uri, PathBuf::from("/abs/out"));
        assert_eq!(storage.max_bagfile_size, 1024);
        assert_eq!(storage.max_bagfile_duration, 30);
    }
}
