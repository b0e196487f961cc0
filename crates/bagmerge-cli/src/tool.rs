use std::path::{Path, PathBuf};

use anyhow::Context;
use bagmerge_storage::synthetic::{decode_int32, generate_bag, SyntheticBag};
use bagmerge_storage::{BagReader, SequentialReader};
use bagmerge_types::{BagMessage, Timestamp};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

mod logging;

#[derive(Parser)]
#[command(
    name = "bag-tool",
    about = "Generate and inspect bags for bag-merge",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Write a synthetic Int32 bag
    Generate(GenerateArgs),
    /// Print every message of a bag
    Print(PrintArgs),
    /// Show a bag's metadata
    Info(InfoArgs),
}

#[derive(Args)]
struct GenerateArgs {
    num_topics: usize,
    num_samples: usize,
    #[arg(allow_negative_numbers = true)]
    start_data: i32,
    #[arg(allow_negative_numbers = true)]
    start_time_offset: i64,
    #[arg(allow_negative_numbers = true)]
    time_increment: i64,
    bag_path: PathBuf,
}

#[derive(Args)]
struct PrintArgs {
    bag: PathBuf,
}

#[derive(Args)]
struct InfoArgs {
    bag: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Command::Generate(args) => cmd_generate(args),
        Command::Print(args) => cmd_print(&args.bag),
        Command::Info(args) => cmd_info(&args.bag),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let shape = SyntheticBag {
        num_topics: args.num_topics,
        num_samples: args.num_samples,
        start_data: args.start_data,
        start_time_offset: args.start_time_offset,
        time_increment: args.time_increment,
    };
    let written = generate_bag(&args.bag_path, &shape)
        .with_context(|| format!("failed to generate bag {}", args.bag_path.display()))?;
    println!(
        "{} Generated {} messages on {} topics in {}",
        "✓".green().bold(),
        written,
        args.num_topics,
        args.bag_path.display().to_string().bold()
    );
    Ok(())
}

fn cmd_print(bag: &Path) -> anyhow::Result<()> {
    let mut reader = SequentialReader::open(bag)
        .with_context(|| format!("failed to open bag {}", bag.display()))?;
    while let Some(message) = reader.read_next()? {
        println!(
            "Topic: {}\tData: {}\tTime stamp: {}",
            message.topic_name,
            describe_payload(&message),
            message.timestamp
        );
    }
    Ok(())
}

fn cmd_info(bag: &Path) -> anyhow::Result<()> {
    let reader = SequentialReader::open(bag)
        .with_context(|| format!("failed to open bag {}", bag.display()))?;
    let meta = reader.metadata();
    println!("{}  {}", "Bag:".bold(), bag.display());
    println!("{}  {}", "Storage:".bold(), meta.storage_identifier);
    println!("{}  {}", "Segments:".bold(), meta.relative_file_paths.len());
    println!("{}  {}", "Messages:".bold(), meta.message_count);
    println!("{}  {}", "Start:".bold(), format_time(meta.starting_time));
    println!("{}  {:.9}s", "Duration:".bold(), meta.duration_ns as f64 / 1e9);
    println!("{}  {}", "Created:".bold(), meta.created_at.to_rfc3339());
    println!("{}", "Topics:".bold());
    for topic in &meta.topics_with_message_count {
        println!(
            "  {} | {} | {} | {} msgs",
            topic.topic_metadata.name.cyan(),
            topic.topic_metadata.type_name,
            topic.topic_metadata.serialization_format,
            topic.message_count
        );
    }
    Ok(())
}

/// Int32 payloads print as their value, anything else as a hex prefix.
fn describe_payload(message: &BagMessage) -> String {
    if let Some(value) = decode_int32(&message.data) {
        return value.to_string();
    }
    let shown = &message.data[..message.data.len().min(16)];
    let ellipsis = if message.data.len() > shown.len() { ".." } else { "" };
    format!("0x{}{ellipsis} ({} bytes)", hex::encode(shown), message.data.len())
}

fn format_time(ts: Timestamp) -> String {
    format!("{} ({ts} ns)", DateTime::<Utc>::from_timestamp_nanos(ts.as_nanos()).to_rfc3339())
}
