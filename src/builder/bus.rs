//! Builder for event buses.

use crate::events::{EventBus, TimeSource};

/// Builder for constructing an [`EventBus`] with a fluent API.
///
/// ```rust
/// use tickstate::events::{EventBus, ManualClock};
///
/// let clock = ManualClock::new(0.0);
/// let bus = EventBus::builder()
///     .time_source(clock.source())
///     .verbose(true)
///     .build();
/// assert!(bus.has_time_source());
/// assert!(bus.is_verbose());
/// ```
#[derive(Default)]
pub struct EventBusBuilder {
    time_source: Option<TimeSource>,
    verbose: bool,
}

impl EventBusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock used to schedule and deliver delayed events.
    pub fn time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = Some(time_source);
        self
    }

    /// Log subscriptions and dispatches at debug level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> EventBus {
        EventBus::from_parts(self.time_source, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BusError, Message};

    #[test]
    fn default_builder_has_no_time_source() {
        let bus = EventBusBuilder::new().build();

        assert!(!bus.has_time_source());
        assert!(!bus.is_verbose());
        assert_eq!(
            bus.trigger_after(1.0, "late", Message::empty(), None),
            Err(BusError::MissingTimeSource)
        );
    }

    #[test]
    fn builder_applies_time_source() {
        let bus = EventBusBuilder::new()
            .time_source(TimeSource::from_fn(|| 42.0))
            .build();

        assert!(bus.has_time_source());
        assert!(bus.trigger_after(1.0, "late", Message::empty(), None).is_ok());
        assert_eq!(bus.pending_delayed(), 1);
    }
}
