use std::io;
use std::path::PathBuf;

/// Errors produced while opening, reading, or writing bags.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error from the underlying file system.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The bag directory or one of its files does not exist.
    #[error("bag path not found: {0}")]
    NotFound(PathBuf),

    /// `metadata.json` could not be parsed or produced.
    #[error("invalid bag metadata in {path}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    /// Encoding or decoding a message frame failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Segment file does not start with the expected magic bytes.
    #[error("invalid segment magic in {path}: expected {expected}, got {actual}")]
    InvalidMagic {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Bag or segment was written by an incompatible format version.
    #[error("unsupported bag format version {0}")]
    UnsupportedVersion(u32),

    /// CRC integrity check failed for a segment frame.
    #[error("CRC integrity check failed in {path} at offset {offset}: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        path: PathBuf,
        offset: u64,
        expected: u32,
        actual: u32,
    },

    /// A frame header promises more bytes than the segment holds.
    #[error("truncated frame in {path} at offset {offset}")]
    TruncatedFrame { path: PathBuf, offset: u64 },

    /// The writer destination already holds a bag.
    #[error("bag already exists at {0}")]
    AlreadyExists(PathBuf),

    /// A topic with this name was already registered with the writer.
    #[error("topic already registered: {0}")]
    DuplicateTopic(String),

    /// A message was written for a topic that was never registered.
    #[error("message for unregistered topic: {0}")]
    UnknownTopic(String),

    /// The writer has been closed and cannot accept more messages.
    #[error("writer is closed")]
    Closed,
}

/// Convenience alias used throughout the storage crate.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
