/// Receives `(current, total, status)` updates during an export.
///
/// Calls are fire-and-forget. Implementations that drive a UI use them as the
/// point where the screen is redrawn.
pub trait ProgressSink {
    fn report(&mut self, current: usize, total: usize, status: &str);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _current: usize, _total: usize, _status: &str) {}
}

/// Emits updates as `info` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, current: usize, total: usize, status: &str) {
        tracing::info!(current, total, "{status}");
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize, &str),
{
    fn report(&mut self, current: usize, total: usize, status: &str) {
        self(current, total, status);
    }
}

/// Reports every `interval` items and once more on the last one.
pub(crate) fn report_every(
    sink: &mut dyn ProgressSink,
    interval: usize,
    done: usize,
    total: usize,
    status: &str,
) {
    if done == total || (interval > 0 && done % interval == 0) {
        sink.report(done, total, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_every_interval_and_last() {
        let mut seen = Vec::new();
        {
            let mut sink = |current: usize, total: usize, _: &str| seen.push((current, total));
            for done in 1..=250 {
                report_every(&mut sink, 100, done, 250, "Scanning");
            }
        }
        assert_eq!(seen, vec![(100, 250), (200, 250), (250, 250)]);
    }

    #[test]
    fn test_zero_interval_reports_only_last() {
        let mut count = 0;
        {
            let mut sink = |_: usize, _: usize, _: &str| count += 1;
            for done in 1..=5 {
                report_every(&mut sink, 0, done, 5, "Writing");
            }
        }
        assert_eq!(count, 1);
    }
}
