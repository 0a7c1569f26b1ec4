//! When scheduled jobs fire.

use super::types::JobError;
use chrono::{DateTime, Days, NaiveTime, TimeZone};
use std::fmt;
use std::time::Duration;

/// Fires once per day at a fixed local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    hour: u32,
    minute: u32,
}

impl DailyTrigger {
    /// # Errors
    ///
    /// Returns [`JobError::InvalidTrigger`] for an hour above 23 or a minute
    /// above 59.
    pub fn new(hour: u32, minute: u32) -> Result<Self, JobError> {
        if hour > 23 || minute > 59 {
            return Err(JobError::InvalidTrigger { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// The first firing strictly after `now`.
    ///
    /// A firing time that does not exist on a given day (skipped by a DST
    /// change) moves to the next day.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default();
        let tz = now.timezone();
        let mut day = now.date_naive();

        loop {
            if let Some(candidate) = tz.from_local_datetime(&day.and_time(time)).earliest() {
                if candidate > *now {
                    return candidate;
                }
            }
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => return now.clone(),
            };
        }
    }

    /// Time from `now` until the next firing.
    pub fn duration_until<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        (self.next_after(now) - now.clone())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl fmt::Display for DailyTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "daily at {:02}:{:02}", self.hour, self.minute)
    }
}

/// A job cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fixed local time every day
    Daily(DailyTrigger),
    /// Fixed period, first firing one period after scheduling
    Interval(Duration),
}

impl Trigger {
    /// Delay from `now` until the next firing, plus the wall-clock time of
    /// that firing for daily triggers.
    ///
    /// `last_fired` is the daily firing the caller last handled. The result
    /// is always strictly after it, so a sleep that wakes slightly before
    /// the wall-clock time cannot run the same firing twice.
    pub fn next_firing<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        last_fired: Option<&DateTime<Tz>>,
    ) -> (Duration, Option<DateTime<Tz>>) {
        match self {
            Self::Daily(daily) => {
                let from = match last_fired {
                    Some(last) if last > now => last,
                    _ => now,
                };
                let at = daily.next_after(from);
                let delay = (at.clone() - now.clone())
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                (delay, Some(at))
            }
            Self::Interval(period) => (*period, None),
        }
    }
}

impl From<DailyTrigger> for Trigger {
    fn from(daily: DailyTrigger) -> Self {
        Self::Daily(daily)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily(daily) => write!(f, "{}", daily),
            Self::Interval(period) => write!(f, "every {}s", period.as_secs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeDelta, Utc};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_rejects_invalid_time() {
        assert!(DailyTrigger::new(24, 0).is_err());
        assert!(DailyTrigger::new(2, 60).is_err());
        assert!(DailyTrigger::new(23, 59).is_ok());
    }

    #[test]
    fn test_later_today() {
        let trigger = DailyTrigger::new(2, 0).unwrap();
        assert_eq!(
            trigger.next_after(&utc(2024, 6, 1, 1, 30)),
            utc(2024, 6, 1, 2, 0)
        );
    }

    #[test]
    fn test_already_passed_rolls_to_tomorrow() {
        let trigger = DailyTrigger::new(2, 0).unwrap();
        assert_eq!(
            trigger.next_after(&utc(2024, 6, 1, 2, 0)),
            utc(2024, 6, 2, 2, 0)
        );
        assert_eq!(
            trigger.next_after(&utc(2024, 12, 31, 23, 0)),
            utc(2025, 1, 1, 2, 0)
        );
    }

    #[test]
    fn test_uses_local_wall_clock() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = ist.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
        let trigger = DailyTrigger::new(2, 0).unwrap();

        let next = trigger.next_after(&now);
        assert_eq!(next, ist.with_ymd_and_hms(2024, 6, 2, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_duration_until() {
        let trigger = DailyTrigger::new(2, 0).unwrap();
        assert_eq!(
            trigger.duration_until(&utc(2024, 6, 1, 1, 30)),
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn test_display() {
        let trigger = DailyTrigger::new(2, 5).unwrap();
        assert_eq!(trigger.to_string(), "daily at 02:05");
        assert_eq!(Trigger::Interval(Duration::from_secs(60)).to_string(), "every 60s");
    }

    #[test]
    fn test_daily_firing_from_now() {
        let trigger = Trigger::from(DailyTrigger::new(2, 0).unwrap());
        let (delay, at) = trigger.next_firing(&utc(2024, 6, 1, 1, 0), None);
        assert_eq!(delay, Duration::from_secs(3600));
        assert_eq!(at, Some(utc(2024, 6, 1, 2, 0)));
    }

    #[test]
    fn test_early_wake_does_not_repeat_firing() {
        let trigger = Trigger::from(DailyTrigger::new(2, 0).unwrap());
        let fired = utc(2024, 6, 1, 2, 0);
        let woke_early = fired - TimeDelta::milliseconds(100);

        // without the handled firing the same 02:00 would come round again
        let (_, at) = trigger.next_firing(&woke_early, None);
        assert_eq!(at, Some(fired));

        let (delay, at) = trigger.next_firing(&woke_early, Some(&fired));
        assert_eq!(at, Some(utc(2024, 6, 2, 2, 0)));
        assert!(delay > Duration::from_secs(86_399));
    }

    #[test]
    fn test_stale_handled_firing_is_ignored() {
        let trigger = Trigger::from(DailyTrigger::new(2, 0).unwrap());
        let (_, at) = trigger.next_firing(&utc(2024, 6, 3, 1, 0), Some(&utc(2024, 6, 1, 2, 0)));
        assert_eq!(at, Some(utc(2024, 6, 3, 2, 0)));
    }

    #[test]
    fn test_interval_firing_has_no_wall_clock_time() {
        let trigger = Trigger::Interval(Duration::from_secs(60));
        let (delay, at) = trigger.next_firing(&utc(2024, 6, 1, 1, 0), None);
        assert_eq!(delay, Duration::from_secs(60));
        assert_eq!(at, None);
    }
}
