use bagmerge_storage::{BagReader, StorageResult};
use bagmerge_types::{BagMessage, TopicMetadata};

/// One input bag with a single-message lookahead.
///
/// The lookahead always holds the next unread message of the bag, and is
/// empty exactly when the bag is exhausted. It changes only through
/// [`advance`](Self::advance).
pub struct InputStream<R> {
    reader: R,
    lookahead: Option<BagMessage>,
}

impl<R: BagReader> InputStream<R> {
    /// Wrap a reader and fill the lookahead with its first message.
    pub fn open(mut reader: R) -> StorageResult<Self> {
        let lookahead = reader.read_next()?;
        Ok(Self { reader, lookahead })
    }

    pub fn topics(&self) -> Vec<TopicMetadata> {
        self.reader.topics()
    }

    /// Total messages in the underlying bag, consumed or not.
    pub fn count(&self) -> u64 {
        self.reader.message_count()
    }

    pub fn peek(&self) -> Option<&BagMessage> {
        self.lookahead.as_ref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.lookahead.is_none()
    }

    /// Hand out the lookahead message and refill it from the bag.
    ///
    /// The refill happens first, so a read error leaves the lookahead in
    /// place and a retry hits the same error.
    /// On an exhausted stream this returns `Ok(None)` without reading.
    pub fn advance(&mut self) -> StorageResult<Option<BagMessage>> {
        if self.lookahead.is_none() {
            return Ok(None);
        }
        let next = self.reader.read_next()?;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn into_reader(self) -> R {
        self.reader
    }
}
