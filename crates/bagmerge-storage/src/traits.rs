use bagmerge_types::{BagMessage, TopicMetadata};

use crate::error::StorageResult;

/// Read boundary for a recorded bag.
///
/// Implementations deliver messages in the order they were recorded. Once
/// `read_next` has returned `Ok(None)` it must keep doing so. A read error
/// must not consume the message it failed on: retrying fails again.
pub trait BagReader {
    /// All topics the bag declares, in declaration order.
    fn topics(&self) -> Vec<TopicMetadata>;

    /// Total number of messages in the bag, as recorded in its metadata.
    fn message_count(&self) -> u64;

    /// Read the next message, or `None` once the bag is exhausted.
    fn read_next(&mut self) -> StorageResult<Option<BagMessage>>;
}

/// Write boundary for a bag.
///
/// All topics must be registered before messages on them are written.
pub trait BagWriter {
    /// Register a topic. Registering the same name twice is an error; callers
    /// are expected to deduplicate.
    fn create_topic(&mut self, topic: &TopicMetadata) -> StorageResult<()>;

    /// Append a message. Its topic must have been registered.
    fn write(&mut self, message: BagMessage) -> StorageResult<()>;

    /// Flush everything and persist the bag index. Idempotent.
    fn close(&mut self) -> StorageResult<()>;
}
