//! Synthetic Int32 bags for smoke tests and demos.
//!
//! A generated bag cycles round-robin through `num_topics` topics named
//! `<bagdir>_topic_<i>`. Each message carries one CDR-encoded Int32, taking
//! consecutive values from `start_data`, and timestamps advance by
//! `time_increment` from `start_time_offset`.

use std::fs;
use std::path::Path;

use bagmerge_types::{BagMessage, Timestamp, TopicMetadata};

use crate::error::StorageResult;
use crate::options::StorageOptions;
use crate::traits::BagWriter;
use crate::writer::SequentialWriter;

pub const INT32_TYPE: &str = "example_interfaces/msg/Int32";
pub const CDR_FORMAT: &str = "cdr";

/// CDR encapsulation header for little-endian plain CDR.
const CDR_LE_HEADER: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

/// Shape of a generated bag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticBag {
    pub num_topics: usize,
    pub num_samples: usize,
    pub start_data: i32,
    pub start_time_offset: i64,
    pub time_increment: i64,
}

impl Default for SyntheticBag {
    fn default() -> Self {
        Self {
            num_topics: 1,
            num_samples: 5,
            start_data: 0,
            start_time_offset: 0,
            time_increment: 100,
        }
    }
}

impl SyntheticBag {
    /// Topic declarations for a bag written to `bag_dir`.
    pub fn topics(&self, bag_dir: &Path) -> Vec<TopicMetadata> {
        (0..self.num_topics)
            .map(|i| TopicMetadata::new(topic_name(bag_dir, i), INT32_TYPE, CDR_FORMAT))
            .collect()
    }

    /// The messages a bag written to `bag_dir` will contain, in order.
    ///
    /// Empty when `num_topics` is zero.
    pub fn messages(&self, bag_dir: &Path) -> Vec<BagMessage> {
        if self.num_topics == 0 {
            return Vec::new();
        }
        (0..self.num_samples)
            .map(|k| {
                let value = self.start_data.wrapping_add(k as i32);
                let ts = self
                    .start_time_offset
                    .saturating_add(self.time_increment.saturating_mul(k as i64));
                BagMessage::new(
                    topic_name(bag_dir, k % self.num_topics),
                    Timestamp::from_nanos(ts),
                    encode_int32(value),
                )
            })
            .collect()
    }
}

/// Write a synthetic bag into `bag_dir`, creating the directory.
/// Returns the number of messages written.
pub fn generate_bag(bag_dir: &Path, shape: &SyntheticBag) -> StorageResult<u64> {
    fs::create_dir_all(bag_dir)?;
    let mut writer = SequentialWriter::open(StorageOptions::new(bag_dir))?;
    for topic in shape.topics(bag_dir) {
        writer.create_topic(&topic)?;
    }
    let mut written = 0;
    for message in shape.messages(bag_dir) {
        writer.write(message)?;
        written += 1;
    }
    writer.close()?;
    Ok(written)
}

pub fn topic_name(bag_dir: &Path, index: usize) -> String {
    let base = bag_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bag".into());
    format!("{base}_topic_{index}")
}

pub fn encode_int32(value: i32) -> Vec<u8> {
    let mut data = CDR_LE_HEADER.to_vec();
    data.extend_from_slice(&value.to_le_bytes());
    data
}

/// Decode a payload produced by [`encode_int32`].
pub fn decode_int32(data: &[u8]) -> Option<i32> {
    let (header, value) = data.split_first_chunk::<4>()?;
    if *header != CDR_LE_HEADER {
        return None;
    }
    let value: [u8; 4] = value.try_into().ok()?;
    Some(i32::from_le_bytes(value))
}
