use std::time::{Duration, Instant};

/// Quiet period before a typed search is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Holds the latest value until no new one has arrived for `delay`.
///
/// Time is passed in explicitly so callers can drive it from their own
/// tick loop.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Default for Debounce<T> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if ready {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Take the pending value immediately (e.g. on Enter).
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_after_quiet_period() {
        let start = Instant::now();
        let mut d = Debounce::default();

        d.push("ca", start);
        d.push("cam", start + Duration::from_millis(150));
        assert_eq!(d.poll(start + Duration::from_millis(300)), None);
        assert_eq!(d.poll(start + Duration::from_millis(350)), Some("cam"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn flush_skips_the_wait() {
        let mut d = Debounce::new(Duration::from_secs(10));
        d.push(1, Instant::now());
        assert_eq!(d.flush(), Some(1));
        assert_eq!(d.flush(), None);
    }
}
