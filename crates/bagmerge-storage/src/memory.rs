use std::collections::{HashSet, VecDeque};
use std::io;

use bagmerge_types::{BagMessage, Timestamp, TopicMetadata};

use crate::error::{StorageError, StorageResult};
use crate::traits::{BagReader, BagWriter};

/// In-memory bag, read front to back.
///
/// Intended for tests and embedding. The message count reported through
/// [`BagReader::message_count`] is fixed at construction, like an on-disk
/// bag's metadata.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBag {
    topics: Vec<TopicMetadata>,
    messages: VecDeque<BagMessage>,
    message_count: u64,
}

impl InMemoryBag {
    pub fn new(topics: Vec<TopicMetadata>, messages: Vec<BagMessage>) -> Self {
        Self {
            topics,
            message_count: messages.len() as u64,
            messages: messages.into(),
        }
    }

    /// A bag with one topic and one empty-payload message per timestamp.
    pub fn single_topic(topic: &str, timestamps: &[i64]) -> Self {
        let messages = timestamps
            .iter()
            .map(|&ts| BagMessage::new(topic, Timestamp::from_nanos(ts), Vec::new()))
            .collect();
        Self::new(vec![TopicMetadata::new(topic, "std_msgs/msg/Empty", "cdr")], messages)
    }

    /// Messages not yet read.
    pub fn remaining(&self) -> usize {
        self.messages.len()
    }
}

impl BagReader for InMemoryBag {
    fn topics(&self) -> Vec<TopicMetadata> {
        self.topics.clone()
    }

    fn message_count(&self) -> u64 {
        self.message_count
    }

    fn read_next(&mut self) -> StorageResult<Option<BagMessage>> {
        Ok(self.messages.pop_front())
    }
}

/// In-memory bag writer that records every call it receives.
///
/// Enforces the same topic rules as the on-disk writer. Can be told to fail
/// after a number of writes to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryBagWriter {
    topics: Vec<TopicMetadata>,
    names: HashSet<String>,
    messages: Vec<BagMessage>,
    fail_after: Option<usize>,
    closed: bool,
}

impl InMemoryBagWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every write after the first `writes` succeed.
    pub fn failing_after(writes: usize) -> Self {
        Self {
            fail_after: Some(writes),
            ..Self::default()
        }
    }

    pub fn topics(&self) -> &[TopicMetadata] {
        &self.topics
    }

    pub fn messages(&self) -> &[BagMessage] {
        &self.messages
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl BagWriter for InMemoryBagWriter {
    fn create_topic(&mut self, topic: &TopicMetadata) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        if !self.names.insert(topic.name.clone()) {
            return Err(StorageError::DuplicateTopic(topic.name.clone()));
        }
        self.topics.push(topic.clone());
        Ok(())
    }

    fn write(&mut self, message: BagMessage) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        if !self.names.contains(&message.topic_name) {
            return Err(StorageError::UnknownTopic(message.topic_name));
        }
        if self.fail_after.is_some_and(|limit| self.messages.len() >= limit) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected write failure",
            )));
        }
        self.messages.push(message);
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.closed = true;
        Ok(())
    }
}
