//! Polling-based wait mechanisms.
//!
//! Every bounded wait in Cuadro is an explicit loop: sample the condition,
//! check the deadline, sleep one interval, repeat. There is no recursive
//! scheduling and no racing construct with abandoned work; when the
//! governing timeout fires the loop has already stopped.

use std::time::Duration;

use tracing::trace;

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval (30ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30;

/// Options for wait operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout for the whole wait
    pub timeout: Duration,
    /// Interval between condition samples
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Poll `condition` until it holds or the timeout budget is spent.
///
/// The condition is sampled once immediately, so a zero timeout still
/// observes an already-true condition. Between samples the loop suspends
/// through `sleep` (normally [`crate::driver::Driver::wait_for_timeout`]),
/// which lets a test driver run the loop on virtual time. The budget is
/// accounted in poll intervals, so the loop never blocks past
/// `timeout + poll_interval`.
///
/// Returns `true` iff the condition was observed before the deadline.
pub fn poll_until<C>(options: &WaitOptions, sleep: &dyn Fn(Duration), mut condition: C) -> bool
where
    C: FnMut() -> bool,
{
    // A zero interval would spin forever on a false condition.
    let interval = options.poll_interval.max(Duration::from_millis(1));
    let mut waited = Duration::ZERO;

    loop {
        if condition() {
            trace!(waited_ms = waited.as_millis() as u64, "condition met");
            return true;
        }
        if waited >= options.timeout {
            trace!(
                timeout_ms = options.timeout.as_millis() as u64,
                "condition not met before deadline"
            );
            return false;
        }
        sleep(interval);
        waited += interval;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Instant;

    fn no_sleep(_: Duration) {}

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
            assert_eq!(
                opts.poll_interval,
                Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
            );
        }

        #[test]
        fn test_builders() {
            let opts = WaitOptions::new()
                .with_timeout(Duration::from_millis(200))
                .with_poll_interval(Duration::from_millis(5));
            assert_eq!(opts.timeout, Duration::from_millis(200));
            assert_eq!(opts.poll_interval, Duration::from_millis(5));
        }
    }

    mod poll_until_tests {
        use super::*;

        #[test]
        fn test_immediate_success() {
            let opts = WaitOptions::new().with_timeout(Duration::ZERO);
            assert!(poll_until(&opts, &no_sleep, || true));
        }

        #[test]
        fn test_timeout_returns_false() {
            let opts = WaitOptions::new()
                .with_timeout(Duration::from_millis(20))
                .with_poll_interval(Duration::from_millis(5));
            assert!(!poll_until(&opts, &no_sleep, || false));
        }

        #[test]
        fn test_condition_becomes_true() {
            let count = Cell::new(0u32);
            let opts = WaitOptions::new()
                .with_timeout(Duration::from_millis(100))
                .with_poll_interval(Duration::from_millis(5));
            let hit = poll_until(&opts, &no_sleep, || {
                count.set(count.get() + 1);
                count.get() >= 4
            });
            assert!(hit);
            assert_eq!(count.get(), 4);
        }

        #[test]
        fn test_sample_count_bounded_by_budget() {
            let count = Cell::new(0u32);
            let opts = WaitOptions::new()
                .with_timeout(Duration::from_millis(50))
                .with_poll_interval(Duration::from_millis(10));
            let hit = poll_until(&opts, &no_sleep, || {
                count.set(count.get() + 1);
                false
            });
            assert!(!hit);
            // One immediate sample plus one per interval in the budget.
            assert_eq!(count.get(), 6);
        }

        #[test]
        fn test_never_blocks_past_timeout_plus_interval() {
            let opts = WaitOptions::new()
                .with_timeout(Duration::from_millis(60))
                .with_poll_interval(Duration::from_millis(10));
            let start = Instant::now();
            let hit = poll_until(&opts, &std::thread::sleep, || false);
            assert!(!hit);
            assert!(start.elapsed() <= Duration::from_millis(60 + 10 + 40));
        }

        #[test]
        fn test_zero_interval_does_not_spin_forever() {
            let opts = WaitOptions::new()
                .with_timeout(Duration::from_millis(5))
                .with_poll_interval(Duration::ZERO);
            assert!(!poll_until(&opts, &no_sleep, || false));
        }
    }
}
