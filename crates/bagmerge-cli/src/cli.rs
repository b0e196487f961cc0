use std::path::PathBuf;

use bagmerge_merge::{MergeOptions, TopicConflictPolicy};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "bag-merge",
    about = "Merge recorded bags into a single time-ordered bag",
    version,
)]
pub struct Cli {
    /// Output bag directory; must not exist yet
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_BAG")]
    pub output: Option<PathBuf>,

    /// Input bags; on equal timestamps earlier inputs come first
    #[arg(value_name = "INPUT_BAG")]
    pub inputs: Vec<PathBuf>,

    /// Split the output bag into segments of at most this many bytes (0 = off)
    #[arg(short = 'b', long, value_name = "BYTES", default_value_t = 0)]
    pub max_bagfile_size: u64,

    /// Split the output bag into segments spanning at most this many seconds (0 = off)
    #[arg(short = 'd', long, value_name = "SECONDS", default_value_t = 0)]
    pub max_bagfile_duration: u64,

    /// Fail when inputs declare the same topic with different types
    #[arg(long)]
    pub strict_topics: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_options(self) -> MergeOptions {
        MergeOptions {
            inputs: self.inputs,
            output: self.output,
            max_bagfile_size: self.max_bagfile_size,
            max_bagfile_duration: self.max_bagfile_duration,
            topic_conflicts: if self.strict_topics {
                TopicConflictPolicy::Reject
            } else {
                TopicConflictPolicy::FirstWins
            },
        }
    }
}
