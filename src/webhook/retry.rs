use std::time::Duration;

/// Bounded linear backoff: the n-th failed attempt waits `n * base_delay` before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first attempt and is at least one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after `attempt` (1-based) failed, or `None` when it was the last one.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_attempts).then(|| self.base_delay * attempt)
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn worst_case_delay(&self) -> Duration {
        (1..self.max_attempts).map(|attempt| self.base_delay * attempt).sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::RetryPolicy;
    use std::time::Duration;

    #[test]
    fn default_policy_sleeps_twice_between_three_attempts() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (1..=policy.max_attempts())
            .filter_map(|attempt| policy.delay_after(attempt))
            .collect();

        assert_eq!(3, policy.max_attempts());
        assert_eq!(vec![Duration::from_secs(1), Duration::from_secs(2)], delays);
        assert_eq!(Duration::from_secs(3), policy.worst_case_delay());
    }

    #[test]
    fn last_attempt_has_no_delay() {
        let policy = RetryPolicy::new(4, Duration::from_millis(500));

        assert_eq!(Some(Duration::from_millis(1500)), policy.delay_after(3));
        assert_eq!(None, policy.delay_after(4));
        assert_eq!(None, policy.delay_after(5));
    }

    #[test]
    fn at_least_one_attempt_is_made() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));

        assert_eq!(1, policy.max_attempts());
        assert_eq!(None, policy.delay_after(1));
        assert_eq!(Duration::ZERO, policy.worst_case_delay());
    }
}
