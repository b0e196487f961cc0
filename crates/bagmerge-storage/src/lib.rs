//! Bag storage for bagmerge.
//!
//! A bag is a directory holding a `metadata.json` index and one or more
//! segment files. Segments are append-only sequences of CRC-checked,
//! length-prefixed frames, each carrying one bincode-encoded [`BagMessage`].
//!
//! # Architecture
//!
//! - **[`BagReader`] / [`BagWriter`]**: the read and write boundaries the merge
//!   engine is written against
//! - **[`SequentialReader`]**: streams messages from an on-disk bag, one frame
//!   at a time
//! - **[`SequentialWriter`]**: appends messages, splitting segments by size or
//!   duration
//! - **[`InMemoryBag`] / [`InMemoryBagWriter`]**: `Vec`-backed bags for tests
//!   and embedding
//!
//! # Design Rules
//!
//! 1. Payloads are opaque; storage never decodes message data.
//! 2. Opening a bag is all-or-nothing: every segment is checked up front.
//! 3. Corrupt frames are errors, never silently skipped.
//! 4. The writer expects non-decreasing timestamps; rollover by duration
//!    depends on it.
//!
//! [`BagMessage`]: bagmerge_types::BagMessage

pub mod error;
pub mod memory;
pub mod metadata;
pub mod options;
pub mod reader;
pub mod segment;
pub mod synthetic;
pub mod traits;
pub mod writer;

pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryBag, InMemoryBagWriter};
pub use metadata::{BagMetadata, FileInformation, TopicInformation, METADATA_FILENAME};
pub use options::StorageOptions;
pub use reader::SequentialReader;
pub use traits::{BagReader, BagWriter};
pub use writer::SequentialWriter;
