use std::collections::HashMap;

use bagmerge_types::{BagMessage, TopicMetadata};
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};
use crate::metadata::{BagMetadata, FileInformation, TopicInformation, METADATA_FILENAME};
use crate::options::StorageOptions;
use crate::segment::{SegmentWriter, SEGMENT_EXTENSION};
use crate::traits::BagWriter;

/// Writes a bag directory segment by segment.
///
/// The destination directory must already exist and must not hold a bag.
/// Segments are named `<dirname>_<index>.bagseg`. Before each message the
/// writer decides whether the current segment is full, by size or by the time
/// span since its first message, and if so starts the next one.
/// `metadata.json` is written by [`close`](BagWriter::close), or on drop.
pub struct SequentialWriter {
    options: StorageOptions,
    base_name: String,
    topics: Vec<TopicInformation>,
    topic_index: HashMap<String, usize>,
    segment: Option<SegmentWriter>,
    finished: Vec<FileInformation>,
    closed: bool,
}

impl SequentialWriter {
    pub fn open(options: StorageOptions) -> StorageResult<Self> {
        let dir = &options.uri;
        if !dir.is_dir() {
            return Err(StorageError::NotFound(dir.clone()));
        }
        if dir.join(METADATA_FILENAME).exists() {
            return Err(StorageError::AlreadyExists(dir.clone()));
        }

        let base_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bag".into());
        let segment = SegmentWriter::create(dir, segment_file_name(&base_name, 0))?;

        Ok(Self {
            options,
            base_name,
            topics: Vec::new(),
            topic_index: HashMap::new(),
            segment: Some(segment),
            finished: Vec::new(),
            closed: false,
        })
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    /// Number of segments started so far, the current one included.
    pub fn segment_count(&self) -> usize {
        self.finished.len() + usize::from(self.segment.is_some())
    }

    fn start_segment(&mut self) -> StorageResult<()> {
        let name = segment_file_name(&self.base_name, self.finished.len());
        self.segment = Some(SegmentWriter::create(&self.options.uri, name)?);
        Ok(())
    }

    fn should_split(&self, segment: &SegmentWriter, message: &BagMessage) -> bool {
        if segment.message_count() == 0 {
            return false;
        }
        let over_size = self
            .options
            .max_size_bytes()
            .is_some_and(|max| segment.bytes() > max);
        let over_duration = match (self.options.max_duration_nanos(), segment.first_timestamp()) {
            (Some(max), Some(first)) => message.timestamp.nanos_since(first) > max,
            _ => false,
        };
        over_size || over_duration
    }

    fn split(&mut self) -> StorageResult<()> {
        if let Some(segment) = self.segment.take() {
            self.finished.push(segment.finish()?);
        }
        debug!(segment = self.finished.len(), "splitting bag segment");
        self.start_segment()
    }

    fn finish(&mut self) -> StorageResult<()> {
        if let Some(segment) = self.segment.take() {
            self.finished.push(segment.finish()?);
        }
        let metadata = BagMetadata::summarize(self.finished.clone(), self.topics.clone());
        metadata.save(&self.options.uri)?;
        debug!(
            uri = %self.options.uri.display(),
            messages = metadata.message_count,
            segments = metadata.files.len(),
            "bag closed"
        );
        Ok(())
    }
}

fn segment_file_name(base_name: &str, index: usize) -> String {
    format!("{base_name}_{index}.{SEGMENT_EXTENSION}")
}

impl BagWriter for SequentialWriter {
    fn create_topic(&mut self, topic: &TopicMetadata) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        if self.topic_index.contains_key(&topic.name) {
            return Err(StorageError::DuplicateTopic(topic.name.clone()));
        }
        self.topic_index.insert(topic.name.clone(), self.topics.len());
        self.topics.push(TopicInformation {
            topic_metadata: topic.clone(),
            message_count: 0,
        });
        debug!(topic = %topic.name, type_name = %topic.type_name, "topic registered");
        Ok(())
    }

    fn write(&mut self, message: BagMessage) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        let topic = *self
            .topic_index
            .get(&message.topic_name)
            .ok_or_else(|| StorageError::UnknownTopic(message.topic_name.clone()))?;

        let split = match &self.segment {
            Some(segment) => self.should_split(segment, &message),
            None => true,
        };
        if split {
            self.split()?;
        }

        let segment = self.segment.as_mut().ok_or(StorageError::Closed)?;
        segment.append(&message)?;
        self.topics[topic].message_count += 1;
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.finish()
    }
}

impl Drop for SequentialWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(uri = %self.options.uri.display(), error = %e, "failed to close bag on drop");
        }
    }
}
