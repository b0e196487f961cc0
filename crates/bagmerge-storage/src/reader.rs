use std::path::{Path, PathBuf};

use bagmerge_types::{BagMessage, TopicMetadata};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::metadata::BagMetadata;
use crate::segment::SegmentReader;
use crate::traits::BagReader;

/// Streams the messages of an on-disk bag, one frame at a time.
///
/// Opening loads `metadata.json` and validates the header of every segment,
/// so a bag that opens successfully is only expected to fail later on frame
/// corruption or I/O errors. Segments are read lazily, in metadata order.
pub struct SequentialReader {
    uri: PathBuf,
    metadata: BagMetadata,
    segments: Vec<PathBuf>,
    next_segment: usize,
    current: Option<SegmentReader>,
    exhausted: bool,
}

impl SequentialReader {
    pub fn open(uri: &Path) -> StorageResult<Self> {
        if !uri.is_dir() {
            return Err(StorageError::NotFound(uri.to_path_buf()));
        }
        let metadata = BagMetadata::load(uri)?;
        let segments: Vec<PathBuf> = metadata
            .relative_file_paths
            .iter()
            .map(|rel| uri.join(rel))
            .collect();
        for segment in &segments {
            SegmentReader::open(segment)?;
        }
        debug!(
            uri = %uri.display(),
            segments = segments.len(),
            messages = metadata.message_count,
            "bag opened"
        );
        Ok(Self {
            uri: uri.to_path_buf(),
            metadata,
            segments,
            next_segment: 0,
            current: None,
            exhausted: false,
        })
    }

    pub fn uri(&self) -> &Path {
        &self.uri
    }

    pub fn metadata(&self) -> &BagMetadata {
        &self.metadata
    }
}

impl BagReader for SequentialReader {
    fn topics(&self) -> Vec<TopicMetadata> {
        self.metadata.topics()
    }

    fn message_count(&self) -> u64 {
        self.metadata.message_count
    }

    fn read_next(&mut self) -> StorageResult<Option<BagMessage>> {
        while !self.exhausted {
            if self.current.is_none() {
                match self.segments.get(self.next_segment) {
                    Some(path) => {
                        self.current = Some(SegmentReader::open(path)?);
                        self.next_segment += 1;
                    }
                    None => {
                        self.exhausted = true;
                        break;
                    }
                }
            }
            if let Some(segment) = self.current.as_mut() {
                match segment.next_message()? {
                    Some(message) => return Ok(Some(message)),
                    None => self.current = None,
                }
            }
        }
        Ok(None)
    }
}
