use std::fs;
use std::path::Path;

use bagmerge_types::{Timestamp, TopicMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Name of the index file inside every bag directory.
pub const METADATA_FILENAME: &str = "metadata.json";

/// Current bag layout version.
pub const BAG_FORMAT_VERSION: u32 = 1;

/// Identifier written into metadata for segment-file storage.
pub const STORAGE_IDENTIFIER: &str = "bagseg";

/// A topic declaration together with how many messages the bag holds for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInformation {
    pub topic_metadata: TopicMetadata,
    pub message_count: u64,
}

/// Per-segment summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInformation {
    pub path: String,
    pub starting_time: Timestamp,
    pub duration_ns: i64,
    pub message_count: u64,
}

/// Contents of `metadata.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagMetadata {
    pub version: u32,
    pub storage_identifier: String,
    /// Segment files in read order, relative to the bag directory.
    pub relative_file_paths: Vec<String>,
    pub files: Vec<FileInformation>,
    pub starting_time: Timestamp,
    pub duration_ns: i64,
    pub message_count: u64,
    /// Topics in registration order.
    pub topics_with_message_count: Vec<TopicInformation>,
    pub created_at: DateTime<Utc>,
}

impl BagMetadata {
    /// Build metadata from finished segments and registered topics.
    pub fn summarize(files: Vec<FileInformation>, topics: Vec<TopicInformation>) -> Self {
        let populated = || files.iter().filter(|f| f.message_count > 0);
        let start = populated().map(|f| f.starting_time).min();
        let end = populated()
            .map(|f| {
                Timestamp::from_nanos(f.starting_time.as_nanos().saturating_add(f.duration_ns))
            })
            .max();
        let (starting_time, duration_ns) = match (start, end) {
            (Some(start), Some(end)) => (start, end.nanos_since(start)),
            _ => (Timestamp::default(), 0),
        };

        Self {
            version: BAG_FORMAT_VERSION,
            storage_identifier: STORAGE_IDENTIFIER.into(),
            relative_file_paths: files.iter().map(|f| f.path.clone()).collect(),
            message_count: files.iter().map(|f| f.message_count).sum(),
            files,
            starting_time,
            duration_ns,
            topics_with_message_count: topics,
            created_at: Utc::now(),
        }
    }

    /// Read and validate `metadata.json` from a bag directory.
    pub fn load(bag_dir: &Path) -> StorageResult<Self> {
        let path = bag_dir.join(METADATA_FILENAME);
        if !path.is_file() {
            return Err(StorageError::NotFound(path));
        }
        let text = fs::read_to_string(&path)?;
        let metadata: Self = serde_json::from_str(&text).map_err(|e| StorageError::Metadata {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        if metadata.version != BAG_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion(metadata.version));
        }
        if metadata.storage_identifier != STORAGE_IDENTIFIER {
            return Err(StorageError::Metadata {
                path,
                reason: format!("unknown storage identifier '{}'", metadata.storage_identifier),
            });
        }
        Ok(metadata)
    }

    /// Write `metadata.json` into a bag directory, replacing any previous one.
    pub fn save(&self, bag_dir: &Path) -> StorageResult<()> {
        let path = bag_dir.join(METADATA_FILENAME);
        let text = serde_json::to_string_pretty(self).map_err(|e| StorageError::Metadata {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&path, text)?;
        Ok(())
    }

    /// Topic declarations in registration order.
    pub fn topics(&self) -> Vec<TopicMetadata> {
        self.topics_with_message_count
            .iter()
            .map(|t| t.topic_metadata.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, start: i64, duration_ns: i64, count: u64) -> FileInformation {
        FileInformation {
            path: path.into(),
            starting_time: Timestamp::from_nanos(start),
            duration_ns,
            message_count: count,
        }
    }

    fn topic(name: &str, count: u64) -> TopicInformation {
        TopicInformation {
            topic_metadata: TopicMetadata::new(name, "example_interfaces/msg/Int32", "cdr"),
            message_count: count,
        }
    }

    #[test]
    fn summarize_spans_all_segments() {
        let meta = BagMetadata::summarize(
            vec![file("b_0.bagseg", 100, 400, 3), file("b_1.bagseg", 600, 100, 2)],
            vec![topic("/a", 5)],
        );
        assert_eq!(meta.message_count, 5);
        assert_eq!(meta.starting_time, Timestamp::from_nanos(100));
        assert_eq!(meta.duration_ns, 600);
        assert_eq!(meta.relative_file_paths, vec!["b_0.bagseg", "b_1.bagseg"]);
    }

    #[test]
    fn summarize_ignores_empty_segments() {
        let meta = BagMetadata::summarize(
            vec![file("b_0.bagseg", 0, 0, 0), file("b_1.bagseg", 50, 10, 1)],
            vec![],
        );
        assert_eq!(meta.starting_time, Timestamp::from_nanos(50));
        assert_eq!(meta.duration_ns, 10);
    }

    #[test]
    fn summarize_empty_bag() {
        let meta = BagMetadata::summarize(vec![file("b_0.bagseg", 0, 0, 0)], vec![topic("/a", 0)]);
        assert_eq!(meta.message_count, 0);
        assert_eq!(meta.duration_ns, 0);
        assert_eq!(meta.topics().len(), 1);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let meta = BagMetadata::summarize(vec![file("b_0.bagseg", 1, 2, 3)], vec![topic("/x", 3)]);
        meta.save(dir.path()).unwrap();
        let loaded = BagMetadata::load(dir.path()).unwrap();
        assert_eq!(loaded, meta);
    }

    #[test]
    fn load_missing_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let err = BagMetadata::load(dir.path()).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn load_malformed_metadata() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(METADATA_FILENAME), "{ not json").unwrap();
        let err = BagMetadata::load(dir.path()).unwrap_err();
        assert!(matches!(err, StorageError::Metadata { .. }));
    }

    #[test]
    fn load_rejects_future_version() {
        let dir = tempfile::tempdir().unwrap();
        let mut meta = BagMetadata::summarize(vec![], vec![]);
        meta.version = 99;
        meta.save(dir.path()).unwrap();
        let err = BagMetadata::load(dir.path()).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedVersion(99)));
    }
}
