//! Wall-clock source for presence timestamps and message times.
//!
//! The sweeper and the chat core never call `OffsetDateTime::now_utc` directly;
//! they ask a [`Clock`], so tests can drive time by hand with [`ManualClock`].

use std::{sync::Mutex, time::Duration};

use time::OffsetDateTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Milliseconds since the Unix epoch, the unit `lastStatus` is stored in.
pub fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// `HH:MM:SS`, the format of a message's `time` field.
pub fn wall_time(at: OffsetDateTime) -> String {
    format!("{:02}:{:02}:{:02}", at.hour(), at.minute(), at.second())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new(start());
        assert_eq!(clock.now(), start());

        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now(), start() + Duration::from_secs(90));

        clock.set(start());
        assert_eq!(clock.now(), start());
    }

    #[test]
    fn millis_and_wall_time() {
        // 2023-11-14T22:13:20Z
        assert_eq!(unix_millis(start()), 1_700_000_000_000);
        assert_eq!(wall_time(start()), "22:13:20");
        assert_eq!(wall_time(start() + Duration::from_millis(1_500)), "22:13:21");
    }
}
