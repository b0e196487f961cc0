/// Receives progress notifications from the merge loop.
///
/// `total` is the sum of the message counts the inputs declared, so it is an
/// estimate; `processed` may not reach it if the metadata was off.
pub trait ProgressReporter {
    fn start(&mut self, _total: u64, _inputs: usize) {}

    /// Called after every message written.
    fn update(&mut self, processed: u64, total: u64);

    fn finish(&mut self, _processed: u64) {}
}

/// Discards all progress notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn update(&mut self, _processed: u64, _total: u64) {}
}

/// Whole-number percentage of `processed` over `total`, capped at 100.
/// An empty merge counts as complete.
pub fn percent(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = u128::from(processed) * 100 / u128::from(total);
    pct.min(100) as u8
}
