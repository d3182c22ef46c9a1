//! Sliding-window attempt counting over millisecond timestamps.

pub const ONE_HOUR_MS: i64 = 60 * 60 * 1000;

/// Limit applied by the server per hashed client address.
pub const SERVER_WINDOW: AttemptWindow = AttemptWindow::new(ONE_HOUR_MS, 5);
/// Stricter limit the browser applies before touching the network.
pub const CLIENT_WINDOW: AttemptWindow = AttemptWindow::new(ONE_HOUR_MS, 3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptWindow {
    pub window_ms: i64,
    pub max_attempts: usize,
}

impl AttemptWindow {
    pub const fn new(window_ms: i64, max_attempts: usize) -> Self {
        Self {
            window_ms,
            max_attempts,
        }
    }

    pub fn is_recent(&self, attempt_ms: i64, now_ms: i64) -> bool {
        now_ms - attempt_ms < self.window_ms
    }

    /// Drop attempts that fell out of the window, in place.
    pub fn prune(&self, attempts: &mut Vec<i64>, now_ms: i64) {
        attempts.retain(|attempt| self.is_recent(*attempt, now_ms));
    }

    pub fn allows(&self, attempts: &[i64], now_ms: i64) -> bool {
        let recent = attempts
            .iter()
            .filter(|attempt| self.is_recent(**attempt, now_ms))
            .count();
        recent < self.max_attempts
    }

    /// Prune, then admit and record `now_ms` if there is room. Returns whether
    /// the attempt was admitted.
    pub fn check_and_record(&self, attempts: &mut Vec<i64>, now_ms: i64) -> bool {
        self.prune(attempts, now_ms);
        if attempts.len() >= self.max_attempts {
            return false;
        }
        attempts.push(now_ms);
        true
    }

    /// Record an attempt unconditionally and return only the recent ones.
    pub fn record(&self, attempts: &[i64], now_ms: i64) -> Vec<i64> {
        let mut updated = attempts.to_vec();
        updated.push(now_ms);
        self.prune(&mut updated, now_ms);
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_window_denies_sixth_attempt_within_an_hour() {
        let mut attempts = Vec::new();
        let start = 1_700_000_000_000;
        for offset in 0..5 {
            assert!(SERVER_WINDOW.check_and_record(&mut attempts, start + offset * 60_000));
        }
        assert!(!SERVER_WINDOW.check_and_record(&mut attempts, start + 10 * 60_000));
        assert_eq!(attempts.len(), 5);
    }

    #[test]
    fn expired_attempts_free_up_room() {
        let mut attempts = vec![0, 1, 2, 3, 4];
        assert!(SERVER_WINDOW.check_and_record(&mut attempts, ONE_HOUR_MS + 1));
        assert_eq!(attempts, vec![2, 3, 4, ONE_HOUR_MS + 1]);
    }

    #[test]
    fn client_window_allows_three() {
        let now = 10 * ONE_HOUR_MS;
        let mut attempts = Vec::new();
        for _ in 0..3 {
            assert!(CLIENT_WINDOW.allows(&attempts, now));
            attempts = CLIENT_WINDOW.record(&attempts, now);
        }
        assert!(!CLIENT_WINDOW.allows(&attempts, now));
        assert!(CLIENT_WINDOW.allows(&attempts, now + ONE_HOUR_MS));
    }

    #[test]
    fn record_discards_stale_entries() {
        let updated = CLIENT_WINDOW.record(&[1, 2], ONE_HOUR_MS * 3);
        assert_eq!(updated, vec![ONE_HOUR_MS * 3]);
    }
}
