//! Bounded exponential backoff for read-back polling.
//!
//! After the settle delay the verifier reads the property back once. If the
//! host has not caught up yet it asks this schedule for another delay until
//! the schedule runs out.

use std::time::Duration;

use crate::config::VerifyConfig;

/// Exponential delay calculator with a retry cap
#[derive(Debug, Clone)]
pub struct PollSchedule {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    max_retries: u32,
    attempt: u32,
}

impl PollSchedule {
    /// Build a schedule from verification settings
    pub fn from_config(config: &VerifyConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.initial_backoff_ms),
            max: Duration::from_millis(config.max_backoff_ms),
            multiplier: config.multiplier.max(1.0),
            max_retries: config.max_retries,
            attempt: 0,
        }
    }

    /// Next delay, or `None` once every retry is spent
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }

        let base = self.initial.as_millis() as f64;
        let scaled = base * self.multiplier.powi(self.attempt as i32);
        let capped = scaled.min(self.max.as_millis() as f64);
        self.attempt += 1;
        Some(Duration::from_millis(capped as u64))
    }

    /// Retries handed out so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_retries: u32) -> VerifyConfig {
        VerifyConfig {
            settle_delay_ms: 0,
            max_retries,
            initial_backoff_ms: 100,
            max_backoff_ms: 300,
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_exponential_with_cap() {
        let mut schedule = PollSchedule::from_config(&config(4));

        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(200)));
        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(300)));
        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(300)));
        assert!(schedule.next_delay().is_none());
        assert_eq!(schedule.attempt(), 4);
    }

    #[test]
    fn test_zero_retries_means_single_read() {
        let mut schedule = PollSchedule::from_config(&config(0));
        assert!(schedule.next_delay().is_none());
    }

    #[test]
    fn test_multiplier_never_shrinks() {
        let mut cfg = config(2);
        cfg.multiplier = 0.5;
        let mut schedule = PollSchedule::from_config(&cfg);

        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(100)));
    }
}
