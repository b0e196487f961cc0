use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where and how a bag is written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageOptions {
    /// Bag directory.
    pub uri: PathBuf,
    /// Split to a new segment once the current one exceeds this many bytes.
    /// Zero disables size-based splitting.
    pub max_bagfile_size: u64,
    /// Split to a new segment once it spans more than this many seconds.
    /// Zero disables duration-based splitting.
    pub max_bagfile_duration: u64,
}

impl StorageOptions {
    pub fn new(uri: impl Into<PathBuf>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_max_bagfile_size(mut self, bytes: u64) -> Self {
        self.max_bagfile_size = bytes;
        self
    }

    pub fn with_max_bagfile_duration(mut self, seconds: u64) -> Self {
        self.max_bagfile_duration = seconds;
        self
    }

    /// Duration limit in nanoseconds, or `None` when unlimited.
    pub fn max_duration_nanos(&self) -> Option<i64> {
        if self.max_bagfile_duration == 0 {
            return None;
        }
        let nanos = i128::from(self.max_bagfile_duration) * 1_000_000_000;
        Some(nanos.min(i128::from(i64::MAX)) as i64)
    }

    /// Size limit in bytes, or `None` when unlimited.
    pub fn max_size_bytes(&self) -> Option<u64> {
        (self.max_bagfile_size > 0).then_some(self.max_bagfile_size)
    }
}
