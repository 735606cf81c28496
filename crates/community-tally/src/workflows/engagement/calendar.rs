use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use std::sync::Mutex;

/// Source of the current instant, injected so quota windows can be tested deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for demos and tests.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self
            .instant
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self
            .instant
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .instant
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Half-open `[start, end)` span of absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
        let instant = instant.with_timezone(&Utc);
        self.start <= instant && instant < self.end
    }
}

/// Civil calendar pinned to a single UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    pub fn civil_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.localize(instant).date_naive()
    }

    /// Monday of the week containing `date`.
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
    }

    pub fn day_window(&self, date: NaiveDate) -> TimeWindow {
        let start = self.local_midnight(date);
        TimeWindow {
            start,
            end: start + Duration::days(1),
        }
    }

    pub fn week_window(&self, date: NaiveDate) -> TimeWindow {
        let start = self.local_midnight(Self::week_start(date));
        TimeWindow {
            start,
            end: start + Duration::days(7),
        }
    }

    fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN);
        (local - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-10-15 is a Wednesday.
        let monday = Calendar::week_start(date(2025, 10, 15));
        assert_eq!(monday, date(2025, 10, 13));
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert_eq!(Calendar::week_start(date(2025, 10, 13)), date(2025, 10, 13));
        assert_eq!(Calendar::week_start(date(2025, 10, 19)), date(2025, 10, 13));
    }

    #[test]
    fn civil_date_follows_configured_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("valid offset");
        let calendar = Calendar::new(ist);
        let late_utc = Utc
            .with_ymd_and_hms(2025, 10, 14, 20, 0, 0)
            .single()
            .expect("valid instant");
        assert_eq!(calendar.civil_date(late_utc), date(2025, 10, 15));
        assert_eq!(Calendar::utc().civil_date(late_utc), date(2025, 10, 14));
    }

    #[test]
    fn day_window_is_local_midnight_to_midnight() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("valid offset");
        let window = Calendar::new(ist).day_window(date(2025, 10, 15));
        let expected_start = Utc
            .with_ymd_and_hms(2025, 10, 14, 18, 30, 0)
            .single()
            .expect("valid instant");
        assert_eq!(window.start, expected_start);
        assert_eq!(window.end - window.start, Duration::days(1));

        let inside = ist
            .with_ymd_and_hms(2025, 10, 15, 23, 59, 59)
            .single()
            .expect("valid instant");
        let next_day = ist
            .with_ymd_and_hms(2025, 10, 16, 0, 0, 0)
            .single()
            .expect("valid instant");
        assert!(window.contains(&inside));
        assert!(!window.contains(&next_day));
    }

    #[test]
    fn week_window_spans_seven_days_from_monday() {
        let window = Calendar::utc().week_window(date(2025, 10, 19));
        assert_eq!(window.start.date_naive(), date(2025, 10, 13));
        assert_eq!(window.end.date_naive(), date(2025, 10, 20));
    }

    #[test]
    fn fixed_clock_advances() {
        let start = Utc
            .with_ymd_and_hms(2025, 10, 13, 9, 0, 0)
            .single()
            .expect("valid instant");
        let clock = FixedClock::new(start);
        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), start + Duration::hours(2));
    }
}
