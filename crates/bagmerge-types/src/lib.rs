//! Foundation types for bagmerge.
//!
//! Every other bagmerge crate depends on `bagmerge-types`.
//!
//! # Key Types
//!
//! - [`Timestamp`] — nanosecond receive time, ordered across all bags
//! - [`BagMessage`] — one timestamped, opaque payload on a single topic
//! - [`TopicMetadata`] — a topic declaration, identified by name alone

pub mod message;
pub mod temporal;
pub mod topic;

pub use message::BagMessage;
pub use temporal::Timestamp;
pub use topic::TopicMetadata;
