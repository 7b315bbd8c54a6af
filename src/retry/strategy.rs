//! Strategies deciding how many attempts a retried operation gets,
//! and how long to wait between them.

use std::time::Duration;

/// Decides whether a failed operation gets another attempt,
/// and how long to wait before making it.
pub trait Strategy: Send + Sync {
    /// Returns the delay to wait before retry number `retry` (starting from 1),
    /// or `None` if no more retries should be attempted.
    fn next_delay(&self, retry: u32) -> Option<Duration>;
}

/// Retries immediately, up to `max_retries` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
}

impl Count {
    /// Creates a new [Count] strategy.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl Strategy for Count {
    fn next_delay(&self, retry: u32) -> Option<Duration> {
        (retry <= self.max_retries).then_some(Duration::ZERO)
    }
}

/// Retries up to `max_retries` times, waiting the same `interval`
/// before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linear {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Time to wait before each retry.
    pub interval: Duration,
}

impl Linear {
    /// Creates a new [Linear] strategy.
    #[must_use]
    pub fn new(max_retries: u32, interval: Duration) -> Self {
        Self {
            max_retries,
            interval,
        }
    }
}

impl Strategy for Linear {
    fn next_delay(&self, retry: u32) -> Option<Duration> {
        (retry <= self.max_retries).then_some(self.interval)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn count_retries_immediately_until_exhausted() {
        let strategy = Count::new(2);

        assert_eq!(Some(Duration::ZERO), strategy.next_delay(1));
        assert_eq!(Some(Duration::ZERO), strategy.next_delay(2));
        assert_eq!(None, strategy.next_delay(3));
    }

    #[test]
    fn linear_waits_the_same_interval_before_each_retry() {
        let strategy = Linear::new(3, Duration::from_millis(25));

        for retry in 1..=3 {
            assert_eq!(Some(Duration::from_millis(25)), strategy.next_delay(retry));
        }

        assert_eq!(None, strategy.next_delay(4));
    }

    #[test]
    fn zero_retries_never_retries() {
        assert_eq!(None, Count::new(0).next_delay(1));
        assert_eq!(None, Linear::new(0, Duration::from_secs(1)).next_delay(1));
    }
}
