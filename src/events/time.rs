//! Pluggable time sources for delayed delivery.
//!
//! The bus never reads a clock directly. It asks its [`TimeSource`] for the
//! current time in seconds, which lets tests and replays drive delayed events
//! deterministically with a [`ManualClock`].

use chrono::Utc;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Zero-argument function returning the current time in seconds.
#[derive(Clone)]
pub struct TimeSource(Rc<dyn Fn() -> f64>);

impl TimeSource {
    pub fn from_fn<F>(now: F) -> Self
    where
        F: Fn() -> f64 + 'static,
    {
        Self(Rc::new(now))
    }

    /// Seconds since the Unix epoch, from the system wall clock.
    pub fn wall_clock() -> Self {
        Self::from_fn(|| Utc::now().timestamp_micros() as f64 / 1_000_000.0)
    }

    /// Seconds elapsed since this source was created.
    pub fn monotonic() -> Self {
        let start = Instant::now();
        Self::from_fn(move || start.elapsed().as_secs_f64())
    }

    pub fn now(&self) -> f64 {
        (self.0)()
    }
}

impl fmt::Debug for TimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TimeSource").finish_non_exhaustive()
    }
}

/// Clock that only moves when told to.
///
/// # Example
///
/// ```rust
/// use tickstate::events::ManualClock;
///
/// let clock = ManualClock::new(1000.0);
/// let source = clock.source();
/// clock.advance(1.0);
/// assert_eq!(source.now(), 1001.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn now(&self) -> f64 {
        self.0.get()
    }

    pub fn set(&self, seconds: f64) {
        self.0.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.0.set(self.0.get() + seconds);
    }

    /// Time source reading this clock.
    pub fn source(&self) -> TimeSource {
        let cell = Rc::clone(&self.0);
        TimeSource::from_fn(move || cell.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_drives_its_sources() {
        let clock = ManualClock::new(5.0);
        let source = clock.source();
        assert_eq!(source.now(), 5.0);

        clock.set(10.0);
        assert_eq!(source.now(), 10.0);

        clock.advance(0.5);
        assert_eq!(source.now(), 10.5);
    }

    #[test]
    fn monotonic_source_never_goes_backwards() {
        let source = TimeSource::monotonic();
        let first = source.now();
        let second = source.now();
        assert!(first >= 0.0);
        assert!(second >= first);
    }

    #[test]
    fn wall_clock_is_after_2020() {
        assert!(TimeSource::wall_clock().now() > 1_577_836_800.0);
    }

    #[test]
    fn from_fn_wraps_any_closure() {
        let source = TimeSource::from_fn(|| 42.0);
        assert_eq!(source.clone().now(), 42.0);
    }
}
