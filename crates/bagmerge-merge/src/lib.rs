//! Merge engine for bagmerge.
//!
//! Combines several time-ordered bags into a single time-ordered bag. Each
//! input is consumed lazily through an [`InputStream`] holding exactly one
//! lookahead message; the [`MergeEngine`] repeatedly hands out the earliest
//! pending message across all streams.
//!
//! # Ordering
//!
//! Output timestamps are non-decreasing. Equal timestamps resolve in favour of
//! the stream supplied first, so a merge is fully reproducible.
//!
//! # Components
//!
//! - [`InputStream`] — one bag plus its lookahead
//! - [`TopicCatalog`] — topic declarations deduplicated by name across inputs
//! - [`MergeEngine`] — earliest-first selection with index tie-break
//! - [`ProgressReporter`] — progress callbacks, kept out of the engine
//! - [`BagMerger`] — opens inputs, prepares the output, and drives the loop

pub mod catalog;
pub mod engine;
pub mod error;
pub mod merger;
pub mod options;
pub mod progress;
pub mod stream;

pub use catalog::{TopicCatalog, TopicConflictPolicy};
pub use engine::MergeEngine;
pub use error::{MergeError, MergeResult};
pub use merger::{merge_into, BagMerger, MergeSummary};
pub use options::MergeOptions;
pub use progress::{percent, NoProgress, ProgressReporter};
pub use stream::InputStream;
