use chrono::{DateTime, Duration, NaiveDate, Utc};

/// A simple clock abstraction so services and tests share one time source.
///
/// Every aggregation in this crate takes an explicit reference date; the
/// clock only exists so callers can resolve "today" deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Returns the current calendar date (UTC) according to the clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic timestamp for tests and examples (2026-01-09T12:00:00Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_767_960_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns the calendar date of [`fixed_now`] (a Friday).
#[must_use]
pub fn fixed_today() -> NaiveDate {
    fixed_now().date_naive()
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    #[test]
    fn fixed_clock_resolves_expected_date() {
        let clock = fixed_clock();
        assert_eq!(clock.today(), fixed_today());
        assert_eq!(clock.today().weekday(), Weekday::Fri);
    }

    #[test]
    fn advance_moves_fixed_clocks_only() {
        let mut clock = fixed_clock();
        clock.advance(Duration::days(1));
        assert_eq!(clock.today(), fixed_today().succ_opt().unwrap());

        let mut system = Clock::Default;
        system.advance(Duration::days(1));
        assert!(matches!(system, Clock::Default));
    }
}
