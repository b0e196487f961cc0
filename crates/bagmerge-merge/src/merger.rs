use std::fs;
use std::path::{Path, PathBuf};

use bagmerge_storage::{BagReader, BagWriter, SequentialReader, SequentialWriter};
use tracing::{debug, info, warn};

use crate::catalog::TopicCatalog;
use crate::engine::MergeEngine;
use crate::error::{MergeError, MergeResult};
use crate::options::MergeOptions;
use crate::progress::ProgressReporter;
use crate::stream::InputStream;

/// Outcome of a completed merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeSummary {
    /// Absolute path of the output bag.
    pub output: PathBuf,
    pub inputs: usize,
    pub topics: usize,
    pub messages_written: u64,
}

/// Merges on-disk bags into a new on-disk bag.
///
/// A run either writes every input message or stops at the first error. On a
/// failure after the output directory was created, the partial bag is left
/// in place for inspection.
pub struct BagMerger {
    options: MergeOptions,
}

impl BagMerger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    pub fn run(&self, progress: &mut dyn ProgressReporter) -> MergeResult<MergeSummary> {
        let output = self.options.validate()?;

        let streams = open_inputs(&self.options.inputs)?;
        let catalog = TopicCatalog::merge(&streams, self.options.topic_conflicts)?;

        let output = prepare_output(output)?;
        let mut writer = SequentialWriter::open(self.options.storage_options(&output))?;

        let engine = MergeEngine::new(streams);
        let inputs = engine.stream_count();
        info!(
            output = %output.display(),
            inputs,
            topics = catalog.len(),
            messages = engine.total_count(),
            "merging bags"
        );

        let messages_written = match merge_into(engine, &catalog, &mut writer, progress) {
            Ok(written) => written,
            Err(e) => {
                warn!(
                    output = %output.display(),
                    error = %e,
                    "merge aborted, partial output bag left in place"
                );
                return Err(e);
            }
        };
        writer.close()?;

        info!(messages = messages_written, "merge complete");
        Ok(MergeSummary {
            output,
            inputs,
            topics: catalog.len(),
            messages_written,
        })
    }
}

/// Register the catalog with `writer`, then drain `engine` into it.
///
/// Topics are registered once each before any message is written, and
/// messages are written in exactly the order the engine yields them.
/// Returns the number of messages written.
pub fn merge_into<R, W>(
    mut engine: MergeEngine<R>,
    catalog: &TopicCatalog,
    writer: &mut W,
    progress: &mut dyn ProgressReporter,
) -> MergeResult<u64>
where
    R: BagReader,
    W: BagWriter + ?Sized,
{
    for topic in catalog {
        writer.create_topic(topic)?;
    }

    let total = engine.total_count();
    progress.start(total, engine.stream_count());

    let mut processed = 0u64;
    while let Some(message) = engine.next_message()? {
        writer.write(message)?;
        processed += 1;
        progress.update(processed, total);
    }

    progress.finish(processed);
    Ok(processed)
}

/// Open every input in order. The first failure aborts the whole set.
fn open_inputs(paths: &[PathBuf]) -> MergeResult<Vec<InputStream<SequentialReader>>> {
    paths
        .iter()
        .map(|path| -> MergeResult<InputStream<SequentialReader>> {
            let stream = SequentialReader::open(path)
                .and_then(InputStream::open)
                .map_err(|source| MergeError::Open {
                    path: path.clone(),
                    source,
                })?;
            debug!(path = %path.display(), messages = stream.count(), "input bag opened");
            Ok(stream)
        })
        .collect()
}

/// Resolve the output against the working directory, refuse to reuse an
/// existing path, and create the directory.
fn prepare_output(output: &Path) -> MergeResult<PathBuf> {
    let output = std::path::absolute(output).map_err(|source| MergeError::DirectoryCreate {
        path: output.to_path_buf(),
        source,
    })?;
    if output.exists() {
        return Err(MergeError::OutputExists(output));
    }
    info!(output = %output.display(), "creating output directory for destination bag");
    fs::create_dir_all(&output).map_err(|source| MergeError::DirectoryCreate {
        path: output.clone(),
        source,
    })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TopicConflictPolicy;
    use crate::progress::NoProgress;
    use bagmerge_storage::synthetic::{generate_bag, SyntheticBag};
    use bagmerge_storage::{InMemoryBag, InMemoryBagWriter, StorageError};
    use bagmerge_types::TopicMetadata;

    #[derive(Default)]
    struct Recorder {
        started: Option<(u64, usize)>,
        updates: Vec<u64>,
        finished: Option<u64>,
    }

    impl ProgressReporter for Recorder {
        fn start(&mut self, total: u64, inputs: usize) {
            self.started = Some((total, inputs));
        }

        fn update(&mut self, processed: u64, _total: u64) {
            self.updates.push(processed);
        }

        fn finish(&mut self, processed: u64) {
            self.finished = Some(processed);
        }
    }

    fn in_memory_engine() -> (MergeEngine<InMemoryBag>, TopicCatalog) {
        let engine = MergeEngine::from_readers(vec![
            InMemoryBag::single_topic("t0", &[0, 200, 400]),
            InMemoryBag::single_topic("t1", &[100, 300]),
        ])
        .unwrap();
        let catalog =
            TopicCatalog::merge(engine.streams(), TopicConflictPolicy::FirstWins).unwrap();
        (engine, catalog)
    }

    #[test]
    fn merge_into_registers_then_writes_in_order() {
        let (engine, catalog) = in_memory_engine();
        let mut writer = InMemoryBagWriter::new();
        let mut progress = Recorder::default();

        let written = merge_into(engine, &catalog, &mut writer, &mut progress).unwrap();
        assert_eq!(written, 5);

        let topics: Vec<&str> = writer.topics().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(topics, vec!["t0", "t1"]);
        let ts: Vec<i64> = writer.messages().iter().map(|m| m.timestamp.as_nanos()).collect();
        assert_eq!(ts, vec![0, 100, 200, 300, 400]);

        assert_eq!(progress.started, Some((5, 2)));
        assert_eq!(progress.updates, vec![1, 2, 3, 4, 5]);
        assert_eq!(progress.finished, Some(5));
    }

    #[test]
    fn merge_into_stops_at_write_failure() {
        let (engine, catalog) = in_memory_engine();
        let mut writer = InMemoryBagWriter::failing_after(2);
        let err = merge_into(engine, &catalog, &mut writer, &mut NoProgress).unwrap_err();
        assert!(matches!(err, MergeError::Storage(StorageError::Io(_))));
        assert_eq!(writer.messages().len(), 2);
    }

    #[test]
    fn merge_into_never_registers_a_topic_twice() {
        let engine = MergeEngine::from_readers(vec![
            InMemoryBag::single_topic("shared", &[1, 3]),
            InMemoryBag::single_topic("shared", &[2]),
        ])
        .unwrap();
        let catalog =
            TopicCatalog::merge(engine.streams(), TopicConflictPolicy::FirstWins).unwrap();
        let mut writer = InMemoryBagWriter::new();
        merge_into(engine, &catalog, &mut writer, &mut NoProgress).unwrap();
        assert_eq!(writer.topics().len(), 1);
        assert_eq!(writer.messages().len(), 3);
    }

    #[test]
    fn run_merges_bags_on_disk() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        let first = SyntheticBag {
            num_topics: 1,
            num_samples: 3,
            time_increment: 200,
            ..Default::default()
        };
        let second = SyntheticBag {
            num_samples: 2,
            start_time_offset: 100,
            ..first.clone()
        };
        generate_bag(&a, &first).unwrap();
        generate_bag(&b, &second).unwrap();

        let out = root.path().join("merged");
        let summary = BagMerger::new(MergeOptions::new(vec![a, b], &out))
            .run(&mut NoProgress)
            .unwrap();
        assert_eq!(summary.messages_written, 5);
        assert_eq!(summary.inputs, 2);
        assert_eq!(summary.topics, 2);
        assert_eq!(summary.output, out);

        let mut reader = SequentialReader::open(&out).unwrap();
        assert_eq!(reader.message_count(), 5);
        let mut seen = Vec::new();
        while let Some(m) = reader.read_next().unwrap() {
            seen.push((m.topic_name, m.timestamp.as_nanos()));
        }
        assert_eq!(
            seen,
            vec![
                ("a_topic_0".to_string(), 0),
                ("b_topic_0".to_string(), 100),
                ("a_topic_0".to_string(), 200),
                ("b_topic_0".to_string(), 300),
                ("a_topic_0".to_string(), 400),
            ]
        );
    }

    #[test]
    fn run_rejects_missing_arguments() {
        let err = BagMerger::new(MergeOptions::default())
            .run(&mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, MergeError::MissingArgument(_)));
    }

    #[test]
    fn run_refuses_existing_output() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("a");
        generate_bag(&a, &SyntheticBag::default()).unwrap();
        let out = root.path().join("exists");
        fs::create_dir(&out).unwrap();

        let err = BagMerger::new(MergeOptions::new(vec![a], &out))
            .run(&mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, MergeError::OutputExists(path) if path == out));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn run_fails_on_unreadable_input_without_creating_output() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("a");
        generate_bag(&a, &SyntheticBag::default()).unwrap();
        let missing = root.path().join("missing");
        let out = root.path().join("out");

        let err = BagMerger::new(MergeOptions::new(vec![a, missing.clone()], &out))
            .run(&mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, MergeError::Open { ref path, .. } if *path == missing));
        assert!(!out.exists());
    }

    #[test]
    fn run_reports_directory_create_failure() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("a");
        generate_bag(&a, &SyntheticBag::default()).unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = BagMerger::new(MergeOptions::new(vec![a], blocker.join("out")))
            .run(&mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, MergeError::DirectoryCreate { .. }));
    }

    #[test]
    fn run_strict_topics_rejects_mismatch_before_output() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        for (dir, type_name) in [(&a, "pkg/msg/First"), (&b, "pkg/msg/Second")] {
            fs::create_dir(dir).unwrap();
            let mut writer =
                SequentialWriter::open(bagmerge_storage::StorageOptions::new(dir)).unwrap();
            writer
                .create_topic(&TopicMetadata::new("/shared", type_name, "cdr"))
                .unwrap();
            writer.close().unwrap();
        }
        let out = root.path().join("out");
        let options = MergeOptions {
            topic_conflicts: TopicConflictPolicy::Reject,
            ..MergeOptions::new(vec![a, b], &out)
        };

        let err = BagMerger::new(options).run(&mut NoProgress).unwrap_err();
        assert!(matches!(err, MergeError::TopicConflict { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn run_forwards_rollover_options() {
        let root = tempfile::tempdir().unwrap();
        let a = root.path().join("a");
        generate_bag(&a, &SyntheticBag { num_samples: 40, ..Default::default() }).unwrap();
        let out = root.path().join("rolled");
        let options = MergeOptions {
            max_bagfile_size: 256,
            ..MergeOptions::new(vec![a], &out)
        };

        let summary = BagMerger::new(options).run(&mut NoProgress).unwrap();
        assert_eq!(summary.messages_written, 40);
        let reader = SequentialReader::open(&out).unwrap();
        assert!(reader.metadata().files.len() > 1);
        assert_eq!(reader.message_count(), 40);
    }
}
