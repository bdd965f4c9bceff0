use std::thread;
use std::time::Duration;

/// Tick counter for the control loop, optionally paced against wall-clock time.
///
/// A bounded clock yields indices `0..total`; an unbounded clock never runs
/// out. With pacing enabled every tick after the first sleeps for the pacing
/// interval before it is handed out.
///
/// # Examples
///
/// ```
/// use hvac_sim::sim::clock::Clock;
///
/// let mut clock = Clock::bounded(3);
/// let mut ticks = Vec::new();
///
/// clock.run(|tick| ticks.push(tick));
/// assert_eq!(ticks, vec![0, 1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    current: usize,
    total: Option<usize>,
    pacing: Option<Duration>,
}

impl Clock {
    /// A clock that yields exactly `total` ticks.
    pub fn bounded(total: usize) -> Self {
        Self {
            current: 0,
            total: Some(total),
            pacing: None,
        }
    }

    /// A clock that never runs out of ticks.
    pub fn unbounded() -> Self {
        Self {
            current: 0,
            total: None,
            pacing: None,
        }
    }

    /// Sleeps `dt_s / factor` seconds between ticks. A non-positive or
    /// non-finite factor disables pacing, as does an interval too long for
    /// a [`Duration`].
    pub fn paced(mut self, dt_s: f64, factor: f64) -> Self {
        self.pacing = if factor.is_finite() && factor > 0.0 && dt_s > 0.0 {
            Duration::try_from_secs_f64(dt_s / factor).ok()
        } else {
            None
        };
        self
    }

    /// Pacing interval, if any.
    pub fn pacing(&self) -> Option<Duration> {
        self.pacing
    }

    /// Ticks handed out so far.
    pub fn elapsed_ticks(&self) -> usize {
        self.current
    }

    /// Advances to the next tick.
    ///
    /// Returns `None` once a bounded clock is exhausted.
    pub fn tick(&mut self) -> Option<usize> {
        if self.total.is_some_and(|total| self.current >= total) {
            return None;
        }
        if self.current > 0 {
            if let Some(pause) = self.pacing {
                thread::sleep(pause);
            }
        }
        let tick = self.current;
        self.current += 1;
        Some(tick)
    }

    /// Calls `f` for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(usize)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn bounded_clock_stops() {
        let mut clock = Clock::bounded(2);
        assert_eq!(clock.tick(), Some(0));
        assert_eq!(clock.tick(), Some(1));
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.elapsed_ticks(), 2);
    }

    #[test]
    fn empty_clock_never_calls() {
        let mut clock = Clock::bounded(0);
        let mut called = false;
        clock.run(|_| called = true);
        assert!(!called);
    }

    #[test]
    fn unbounded_clock_keeps_going() {
        let mut clock = Clock::unbounded();
        for expected in 0..10_000 {
            assert_eq!(clock.tick(), Some(expected));
        }
    }

    #[test]
    fn pacing_sleeps_between_ticks() {
        let mut clock = Clock::bounded(3).paced(60.0, 6000.0);
        assert_eq!(clock.pacing(), Some(Duration::from_millis(10)));
        let start = Instant::now();
        clock.run(|_| {});
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn invalid_factor_disables_pacing() {
        assert_eq!(Clock::bounded(1).paced(60.0, 0.0).pacing(), None);
        assert_eq!(Clock::bounded(1).paced(60.0, f64::NAN).pacing(), None);
    }

    #[test]
    fn overflowing_interval_disables_pacing() {
        let clock = Clock::bounded(2).paced(60.0, 1e-300);
        assert_eq!(clock.pacing(), None);
        let mut ticks = Vec::new();
        let mut clock = clock;
        clock.run(|t| ticks.push(t));
        assert_eq!(ticks, vec![0, 1]);
    }
}
