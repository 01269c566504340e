use std::time::Duration;

/// Frame clock that stops accumulating time while paused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed: Duration,
    paused: bool,
}

impl Stopwatch {
    /// Creates a running stopwatch at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            paused: false,
        }
    }

    /// Total running time, excluding paused spans.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the stopwatch is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stops accumulating time. Pausing twice has no further effect.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes accumulating time.
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Flips between paused and running; returns whether it is now paused.
    pub fn toggle(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Feeds host time into the stopwatch and returns the portion that counts.
    pub fn advance(&mut self, host_dt: Duration) -> Duration {
        if self.paused {
            return Duration::ZERO;
        }
        self.elapsed = self.elapsed.saturating_add(host_dt);
        host_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_spans_are_not_counted() {
        let mut stopwatch = Stopwatch::new();
        assert_eq!(
            stopwatch.advance(Duration::from_millis(10)),
            Duration::from_millis(10)
        );

        stopwatch.pause();
        stopwatch.pause();
        assert_eq!(stopwatch.advance(Duration::from_secs(5)), Duration::ZERO);

        stopwatch.unpause();
        let _ = stopwatch.advance(Duration::from_millis(15));
        assert_eq!(stopwatch.elapsed(), Duration::from_millis(25));
        assert!(stopwatch.toggle());
        assert!(!stopwatch.toggle());
    }
}
