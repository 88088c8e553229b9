use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

/// Typed counters and gauges the [`crate::Orchestrator`] updates at each
/// state transition.
///
/// Counters are monotonic and unsigned; the "current" fields are signed
/// gauges that move up on entry to `UPLOADING` and back down on any
/// terminal transition. Every update is a single atomic operation, so no
/// lock is held across a build.
#[derive(Default)]
pub struct StatsRegistry {
    write_success_count: AtomicU64,
    write_success_time_us: AtomicU64,
    write_failure_count: AtomicU64,
    write_failure_time_us: AtomicU64,
    submit_success_count: AtomicU64,
    submit_failure_count: AtomicU64,
    wait_time_us: AtomicU64,
    read_success_count: AtomicU64,
    read_success_time_us: AtomicU64,
    read_failure_count: AtomicU64,
    read_failure_time_us: AtomicU64,
    index_build_success_count: AtomicU64,
    index_build_failure_count: AtomicU64,
    current_flush_ops: AtomicI64,
    current_merge_ops: AtomicI64,
    current_flush_size: AtomicI64,
    current_merge_size: AtomicI64,
    cumulative_flush_time_us: AtomicU64,
    cumulative_merge_time_us: AtomicU64,
}

fn micros(d: Duration) -> u64 {
    d.as_micros().min(u128::from(u64::MAX)) as u64
}

impl StatsRegistry {
    /// Starts every counter and gauge at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_operation(&self, is_flush: bool, vector_bytes: i64) {
        let (ops, size) = if is_flush {
            (&self.current_flush_ops, &self.current_flush_size)
        } else {
            (&self.current_merge_ops, &self.current_merge_size)
        };
        ops.fetch_add(1, Ordering::Relaxed);
        size.fetch_add(vector_bytes, Ordering::Relaxed);
    }

    pub(crate) fn end_operation(&self, is_flush: bool, vector_bytes: i64, elapsed: Duration) {
        let (ops, size, cumulative) = if is_flush {
            (
                &self.current_flush_ops,
                &self.current_flush_size,
                &self.cumulative_flush_time_us,
            )
        } else {
            (
                &self.current_merge_ops,
                &self.current_merge_size,
                &self.cumulative_merge_time_us,
            )
        };
        ops.fetch_sub(1, Ordering::Relaxed);
        size.fetch_sub(vector_bytes, Ordering::Relaxed);
        cumulative.fetch_add(micros(elapsed), Ordering::Relaxed);
    }

    pub(crate) fn record_write_success(&self, elapsed: Duration) {
        self.write_success_count.fetch_add(1, Ordering::Relaxed);
        self.write_success_time_us.fetch_add(micros(elapsed), Ordering::Relaxed);
    }

    pub(crate) fn record_write_failure(&self, elapsed: Duration) {
        self.write_failure_count.fetch_add(1, Ordering::Relaxed);
        self.write_failure_time_us.fetch_add(micros(elapsed), Ordering::Relaxed);
    }

    pub(crate) fn record_submit_success(&self) {
        self.submit_success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_submit_failure(&self) {
        self.submit_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_wait_time(&self, elapsed: Duration) {
        self.wait_time_us.fetch_add(micros(elapsed), Ordering::Relaxed);
    }

    pub(crate) fn record_read_success(&self, elapsed: Duration) {
        self.read_success_count.fetch_add(1, Ordering::Relaxed);
        self.read_success_time_us.fetch_add(micros(elapsed), Ordering::Relaxed);
    }

    pub(crate) fn record_read_failure(&self, elapsed: Duration) {
        self.read_failure_count.fetch_add(1, Ordering::Relaxed);
        self.read_failure_time_us.fetch_add(micros(elapsed), Ordering::Relaxed);
    }

    pub(crate) fn record_index_build_success(&self) {
        self.index_build_success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_index_build_failure(&self) {
        self.index_build_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of every counter and gauge, for metrics
    /// export or test assertions.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            write_success_count: self.write_success_count.load(Ordering::Relaxed),
            write_success_time_us: self.write_success_time_us.load(Ordering::Relaxed),
            write_failure_count: self.write_failure_count.load(Ordering::Relaxed),
            write_failure_time_us: self.write_failure_time_us.load(Ordering::Relaxed),
            submit_success_count: self.submit_success_count.load(Ordering::Relaxed),
            submit_failure_count: self.submit_failure_count.load(Ordering::Relaxed),
            wait_time_us: self.wait_time_us.load(Ordering::Relaxed),
            read_success_count: self.read_success_count.load(Ordering::Relaxed),
            read_success_time_us: self.read_success_time_us.load(Ordering::Relaxed),
            read_failure_count: self.read_failure_count.load(Ordering::Relaxed),
            read_failure_time_us: self.read_failure_time_us.load(Ordering::Relaxed),
            index_build_success_count: self.index_build_success_count.load(Ordering::Relaxed),
            index_build_failure_count: self.index_build_failure_count.load(Ordering::Relaxed),
            current_flush_ops: self.current_flush_ops.load(Ordering::Relaxed),
            current_merge_ops: self.current_merge_ops.load(Ordering::Relaxed),
            current_flush_size: self.current_flush_size.load(Ordering::Relaxed),
            current_merge_size: self.current_merge_size.load(Ordering::Relaxed),
            cumulative_flush_time_us: self.cumulative_flush_time_us.load(Ordering::Relaxed),
            cumulative_merge_time_us: self.cumulative_merge_time_us.load(Ordering::Relaxed),
        }
    }
}

/// A consistent-enough (not atomically joint) read of every
/// [`StatsRegistry`] field at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub write_success_count: u64,
    pub write_success_time_us: u64,
    pub write_failure_count: u64,
    pub write_failure_time_us: u64,
    pub submit_success_count: u64,
    pub submit_failure_count: u64,
    pub wait_time_us: u64,
    pub read_success_count: u64,
    pub read_success_time_us: u64,
    pub read_failure_count: u64,
    pub read_failure_time_us: u64,
    pub index_build_success_count: u64,
    pub index_build_failure_count: u64,
    pub current_flush_ops: i64,
    pub current_merge_ops: i64,
    pub current_flush_size: i64,
    pub current_merge_size: i64,
    pub cumulative_flush_time_us: u64,
    pub cumulative_merge_time_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_and_end_operation_nets_to_zero_on_the_right_gauge() {
        let stats = StatsRegistry::new();
        stats.begin_operation(true, 1024);
        assert_eq!(stats.snapshot().current_flush_ops, 1);
        assert_eq!(stats.snapshot().current_flush_size, 1024);

        stats.end_operation(true, 1024, Duration::from_millis(5));
        let snap = stats.snapshot();
        assert_eq!(snap.current_flush_ops, 0);
        assert_eq!(snap.current_flush_size, 0);
        assert_eq!(snap.current_merge_ops, 0);
        assert!(snap.cumulative_flush_time_us >= 5_000);
        assert_eq!(snap.cumulative_merge_time_us, 0);
    }

    #[test]
    fn phase_counters_are_independent_of_each_other() {
        let stats = StatsRegistry::new();
        stats.record_write_success(Duration::from_millis(1));
        stats.record_submit_failure();
        stats.record_index_build_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.write_success_count, 1);
        assert_eq!(snap.submit_failure_count, 1);
        assert_eq!(snap.index_build_failure_count, 1);
        assert_eq!(snap.write_failure_count, 0);
        assert_eq!(snap.index_build_success_count, 0);
    }
}
