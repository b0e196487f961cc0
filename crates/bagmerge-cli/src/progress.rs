use std::io::{self, Stdout, Write};

use bagmerge_merge::{percent, ProgressReporter};

/// In-place percentage on a terminal. Write errors are ignored; progress is
/// cosmetic.
pub struct ConsoleProgress<W: Write> {
    out: W,
    last: Option<u8>,
}

impl ConsoleProgress<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressReporter for ConsoleProgress<W> {
    fn start(&mut self, total: u64, inputs: usize) {
        let _ = writeln!(self.out, "Processing {total} messages from {inputs} input bags");
        let _ = write!(self.out, "{:>4}%", 0);
        let _ = self.out.flush();
        self.last = Some(0);
    }

    fn update(&mut self, processed: u64, total: u64) {
        let pct = percent(processed, total);
        if self.last == Some(pct) {
            return;
        }
        self.last = Some(pct);
        let _ = write!(self.out, "\r{pct:>4}%");
        let _ = self.out.flush();
    }

    fn finish(&mut self, _processed: u64) {
        let _ = writeln!(self.out, "\r{:>4}%", 100);
        let _ = writeln!(self.out, "Processing complete");
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(total: u64) -> String {
        let mut progress = ConsoleProgress::new(Vec::new());
        progress.start(total, 2);
        for processed in 1..=total {
            progress.update(processed, total);
        }
        progress.finish(total);
        String::from_utf8(progress.into_inner()).unwrap()
    }

    #[test]
    fn redraws_only_on_change() {
        let out = render(200);
        assert!(out.starts_with("Processing 200 messages from 2 input bags\n   0%"));
        assert_eq!(out.matches("\r  50%").count(), 1);
        assert!(out.ends_with("\r 100%\nProcessing complete\n"));
    }

    #[test]
    fn small_merge_shows_each_step() {
        let out = render(4);
        for pct in ["  25%", "  50%", "  75%"] {
            assert!(out.contains(pct), "missing {pct} in {out:?}");
        }
    }

    #[test]
    fn empty_merge_still_completes() {
        let out = render(0);
        assert!(out.contains("Processing 0 messages"));
        assert!(out.ends_with("Processing complete\n"));
    }
}
