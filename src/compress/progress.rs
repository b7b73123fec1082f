// Progress bookkeeping shared between the driver thread and progress readers.

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Cumulative bytes consumed and produced by one encoder.
///
/// Both totals live behind one mutex. They only ever grow.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    totals: Mutex<Totals>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    processed_in: u64,
    processed_out: u64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Totals> {
        // A plain pair of integers cannot be left half-updated.
        self.totals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_in(&self, n: u64) {
        let mut t = self.lock();
        t.processed_in = t.processed_in.saturating_add(n);
    }

    /// Add `n` produced bytes and return both totals as of this update.
    pub fn add_out(&self, n: u64) -> (u64, u64) {
        let mut t = self.lock();
        t.processed_out = t.processed_out.saturating_add(n);
        (t.processed_in, t.processed_out)
    }

    /// `(consumed, produced)` so far.
    pub fn snapshot(&self) -> (u64, u64) {
        let t = self.lock();
        (t.processed_in, t.processed_out)
    }

    pub fn processed_in(&self) -> u64 {
        self.lock().processed_in
    }

    pub fn processed_out(&self) -> u64 {
        self.lock().processed_out
    }
}

// ---------------------------------------------------------------------------
// ProgressSink
// ---------------------------------------------------------------------------

/// Receiver of progress reports.
///
/// Called after every engine step that produced output. Returning an error
/// aborts the stream with that error.
pub trait ProgressSink {
    fn set_ratio_info(&mut self, in_size: u64, out_size: u64) -> io::Result<()>;
}

/// Sink that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_ratio_info(&mut self, _in_size: u64, _out_size: u64) -> io::Result<()> {
        Ok(())
    }
}

impl<F> ProgressSink for F
where
    F: FnMut(u64, u64) -> io::Result<()>,
{
    fn set_ratio_info(&mut self, in_size: u64, out_size: u64) -> io::Result<()> {
        self(in_size, out_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counters_accumulate() {
        let c = ProgressCounters::new();
        assert_eq!(c.snapshot(), (0, 0));
        c.add_in(100);
        c.add_in(0);
        assert_eq!(c.add_out(40), (100, 40));
        c.add_in(5);
        assert_eq!(c.snapshot(), (105, 40));
        assert_eq!(c.processed_in(), 105);
        assert_eq!(c.processed_out(), 40);
    }

    #[test]
    fn concurrent_readers_see_monotonic_totals() {
        let c = Arc::new(ProgressCounters::new());
        let reader = {
            let c = Arc::clone(&c);
            std::thread::spawn(move || {
                let mut last = (0, 0);
                for _ in 0..10_000 {
                    let now = c.snapshot();
                    assert!(now.0 >= last.0 && now.1 >= last.1);
                    last = now;
                }
            })
        };
        for _ in 0..10_000 {
            c.add_in(3);
            c.add_out(1);
        }
        reader.join().unwrap();
        assert_eq!(c.snapshot(), (30_000, 10_000));
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        let mut sink = |i: u64, o: u64| -> io::Result<()> {
            seen.push((i, o));
            Ok(())
        };
        sink.set_ratio_info(1, 2).unwrap();
        sink.set_ratio_info(3, 4).unwrap();
        assert_eq!(seen, vec![(1, 2), (3, 4)]);
    }
}
