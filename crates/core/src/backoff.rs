//! Whole-cycle retry delays.

use std::time::Duration;

/// Default whole-cycle retry delays: 5s, 10s, 30s, 60s.
pub fn default_retry_delays() -> Vec<Duration> {
    [5, 10, 30, 60].into_iter().map(Duration::from_secs).collect()
}

/// Fixed list of retry delays walked once per failure episode.
///
/// Each consecutive failure takes the next delay; `None` means the list is
/// used up and the caller should give up. A successful cycle calls
/// [`RetrySchedule::reset`].
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
    next: usize,
}

impl RetrySchedule {
    /// Schedule walking `delays` in order.
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays, next: 0 }
    }

    /// Delay for the next failure, or `None` once every delay is used.
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.delays.get(self.next).copied()?;
        self.next += 1;
        Some(delay)
    }

    /// Start a new episode after a successful cycle.
    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Failures seen in the current episode that were given a delay.
    pub fn attempts(&self) -> usize {
        self.next
    }

    /// No delay left for another failure.
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.delays.len()
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self::new(default_retry_delays())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_walks_literal_delays() {
        let mut s = RetrySchedule::default();
        assert_eq!(s.next_delay(), Some(Duration::from_secs(5)));
        assert_eq!(s.next_delay(), Some(Duration::from_secs(10)));
        assert_eq!(s.next_delay(), Some(Duration::from_secs(30)));
        assert_eq!(s.next_delay(), Some(Duration::from_secs(60)));
        assert!(s.is_exhausted());
        assert_eq!(s.next_delay(), None);
        assert_eq!(s.next_delay(), None);
    }

    #[test]
    fn reset_starts_a_new_episode() {
        let mut s = RetrySchedule::default();
        s.next_delay();
        s.next_delay();
        assert_eq!(s.attempts(), 2);
        s.reset();
        assert_eq!(s.attempts(), 0);
        assert_eq!(s.next_delay(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn empty_schedule_gives_up_immediately() {
        let mut s = RetrySchedule::new(vec![]);
        assert!(s.is_exhausted());
        assert_eq!(s.next_delay(), None);
    }
}
