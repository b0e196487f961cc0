use std::iter::FusedIterator;

use bagmerge_storage::{BagReader, StorageResult};
use bagmerge_types::{BagMessage, Timestamp};

use crate::stream::InputStream;

/// Time-ordered k-way merge over a fixed set of input streams.
///
/// Every call to [`next_message`](Self::next_message) scans the lookahead of
/// each stream and hands out the one with the smallest timestamp. The scan
/// runs in stream order with a strict less-than comparison, so among equal
/// timestamps the lowest-indexed stream wins. The engine itself buffers
/// nothing beyond the one lookahead message per stream.
///
/// Once every stream is exhausted the engine keeps returning `None`.
pub struct MergeEngine<R> {
    streams: Vec<InputStream<R>>,
    total_count: u64,
}

impl<R: BagReader> MergeEngine<R> {
    /// Build an engine over streams in the order supplied. That order is the
    /// tie-break order.
    pub fn new(streams: Vec<InputStream<R>>) -> Self {
        let total_count = streams.iter().map(InputStream::count).sum();
        Self {
            streams,
            total_count,
        }
    }

    /// Open a stream on each reader and build an engine over them.
    pub fn from_readers(readers: impl IntoIterator<Item = R>) -> StorageResult<Self> {
        let streams = readers
            .into_iter()
            .map(InputStream::open)
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(Self::new(streams))
    }

    pub fn streams(&self) -> &[InputStream<R>] {
        &self.streams
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Sum of the message counts declared by every input.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn is_exhausted(&self) -> bool {
        self.streams.iter().all(InputStream::is_exhausted)
    }

    /// Index of the stream holding the earliest pending message.
    fn earliest(&self) -> Option<usize> {
        let mut earliest: Option<(usize, Timestamp)> = None;
        for (index, stream) in self.streams.iter().enumerate() {
            let Some(message) = stream.peek() else {
                continue;
            };
            match earliest {
                Some((_, best)) if message.timestamp >= best => {}
                _ => earliest = Some((index, message.timestamp)),
            }
        }
        earliest.map(|(index, _)| index)
    }

    /// Take the globally earliest pending message, or `None` once all
    /// streams are exhausted.
    pub fn next_message(&mut self) -> StorageResult<Option<BagMessage>> {
        match self.earliest() {
            Some(index) => self.streams[index].advance(),
            None => Ok(None),
        }
    }

    pub fn into_streams(self) -> Vec<InputStream<R>> {
        self.streams
    }
}

impl<R: BagReader> Iterator for MergeEngine<R> {
    type Item = StorageResult<BagMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_message().transpose()
    }
}

impl<R: BagReader> FusedIterator for MergeEngine<R> {}
