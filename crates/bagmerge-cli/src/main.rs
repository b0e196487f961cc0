use std::process::ExitCode;

use bagmerge_merge::{BagMerger, MergeSummary};
use clap::Parser;
use colored::Colorize;

mod cli;
mod logging;
mod progress;

fn main() -> ExitCode {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_failure_status(&e));
        }
    };
    logging::init(cli.verbose);

    ExitCode::from(report(run(cli)))
}

fn run(cli: cli::Cli) -> anyhow::Result<MergeSummary> {
    let merger = BagMerger::new(cli.into_options());
    let mut progress = progress::ConsoleProgress::stdout();
    Ok(merger.run(&mut progress)?)
}

/// Help and version requests exit 0, every other parse failure is a usage error.
fn parse_failure_status(e: &clap::Error) -> u8 {
    if e.use_stderr() {
        1
    } else {
        0
    }
}

/// Print the outcome of a merge and return the process exit status.
fn report(result: anyhow::Result<MergeSummary>) -> u8 {
    match result {
        Ok(summary) => {
            println!(
                "{} Merged {} messages on {} topics from {} bags into {}",
                "✓".green().bold(),
                summary.messages_written,
                summary.topics,
                summary.inputs,
                summary.output.display().to_string().bold()
            );
            0
        }
        Err(e) => {
            eprintln!("{}", error_line(&e));
            1
        }
    }
}

fn error_line(e: &anyhow::Error) -> String {
    format!("{} {e}", "error:".red().bold())
}
