//! Time abstraction for testable timing operations.
//!
//! The rollback window threshold depends on "now", so handlers read time
//! through an injected clock. Production uses `RealClock`; tests pin time
//! with `TestClock` for deterministic window boundaries.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Clock abstraction for time operations.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant for duration measurements.
    fn now(&self) -> Instant;

    /// Returns the current system time for timestamps.
    fn now_system(&self) -> SystemTime;

    /// Returns the current moment as a UTC datetime.
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.now_system())
    }
}

/// Production clock backed by system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    /// Creates a new real clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_system(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Fixed clock for deterministic tests.
///
/// Always reports the moment it was constructed with, so window arithmetic
/// in tests is exact.
#[derive(Debug, Clone)]
pub struct TestClock {
    instant: Instant,
    system: SystemTime,
}

impl TestClock {
    /// Creates a test clock pinned to the given UTC moment.
    pub fn at(moment: DateTime<Utc>) -> Self {
        let since_epoch = Duration::from_millis(
            u64::try_from(moment.timestamp_millis().max(0)).unwrap_or_default(),
        );
        Self { instant: Instant::now(), system: UNIX_EPOCH + since_epoch }
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.instant
    }

    fn now_system(&self) -> SystemTime {
        self.system
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_clock_reports_pinned_moment() {
        let moment = Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap();
        let clock = TestClock::at(moment);

        assert_eq!(clock.now_utc(), moment);
    }

    #[test]
    fn real_clock_is_monotonic() {
        let clock = RealClock::new();
        let first = clock.now();
        let second = clock.now();

        assert!(second >= first);
    }
}
