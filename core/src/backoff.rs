//! The fixed retry schedule shared between the delivery worker and its tests.

use std::time::Duration;

/// Maximum number of attempts (including the first) made for a single webhook_id.
pub const MAX_ATTEMPTS: u32 = 5;

/// `BACKOFF[attempt - 1]` is the delay to wait before retrying after `attempt` has failed,
/// for `attempt` in `1..=MAX_ATTEMPTS-1`.
pub const BACKOFF: [Duration; 5] = [
    Duration::from_secs(10),
    Duration::from_secs(30),
    Duration::from_secs(60),
    Duration::from_secs(300),
    Duration::from_secs(900),
];

/// Returns the delay to wait before retrying after `failed_attempt` has failed, or `None`
/// if `failed_attempt` has exhausted the retry budget.
pub fn delay_after(failed_attempt: u32) -> Option<Duration> {
    if failed_attempt >= MAX_ATTEMPTS {
        return None;
    }
    BACKOFF.get((failed_attempt - 1) as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_matches_spec() {
        assert_eq!(delay_after(1), Some(Duration::from_secs(10)));
        assert_eq!(delay_after(2), Some(Duration::from_secs(30)));
        assert_eq!(delay_after(3), Some(Duration::from_secs(60)));
        assert_eq!(delay_after(4), Some(Duration::from_secs(300)));
        assert_eq!(delay_after(5), None);
    }

    #[test]
    fn no_retry_past_max_attempts() {
        assert_eq!(delay_after(MAX_ATTEMPTS), None);
        assert_eq!(delay_after(MAX_ATTEMPTS + 1), None);
    }
}
