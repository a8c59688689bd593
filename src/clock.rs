use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of "now" in the configured zone. Everything that needs the date
/// or a timestamp goes through this so tests can pin time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Tz>,
}

impl FixedClock {
    pub fn new(at: DateTime<Tz>) -> Self {
        Self { at }
    }

    /// Noon of `date` in `tz`, which exists in every zone regardless of DST.
    pub fn at_noon(tz: Tz, date: NaiveDate) -> Option<Self> {
        let naive = date.and_hms_opt(12, 0, 0)?;
        naive
            .and_local_timezone(tz)
            .single()
            .map(|at| Self { at })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Warsaw;

    #[test]
    fn today_follows_configured_zone() {
        // 23:30 UTC on Jan 4th is already Jan 5th in Warsaw.
        let utc = Utc.with_ymd_and_hms(2026, 1, 4, 23, 30, 0).unwrap();
        let clock = FixedClock::new(utc.with_timezone(&Warsaw));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    }

    #[test]
    fn at_noon_keeps_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        let clock = FixedClock::at_noon(Warsaw, date).unwrap();
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().to_rfc3339(), "2026-03-29T12:00:00+02:00");
    }
}
