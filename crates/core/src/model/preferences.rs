use chrono::{NaiveTime, Weekday};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error("at least one preferred day is required")]
    EmptyPreferredDays,

    #[error("daily end time must be strictly after the start time")]
    InvalidDailyWindow,

    #[error("max hours per day must be between 1 and 24")]
    InvalidMaxHoursPerDay,

    #[error("session duration must be between 15 and 240 minutes")]
    InvalidSessionDuration,
}

/// Per-user constraints the session generator plans within.
///
/// The generator itself lives outside this crate; preferences are
/// persisted and edited here.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerPreferences {
    preferred_days_mask: u8,
    daily_start: NaiveTime,
    daily_end: NaiveTime,
    max_hours_per_day: u32,
    session_duration_minutes: u32,
    avoid_early_morning: bool,
    avoid_late_evening: bool,
}

impl PlannerPreferences {
    /// Creates school-week defaults: Monday through Friday, revising
    /// between 17:00 and 21:00 in 50-minute blocks, capped at 4 hours a
    /// day.
    #[must_use]
    pub fn default_school_week() -> Self {
        Self {
            preferred_days_mask: preferred_days_mask(&[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            daily_start: NaiveTime::from_hms_opt(17, 0, 0).expect("valid time"),
            daily_end: NaiveTime::from_hms_opt(21, 0, 0).expect("valid time"),
            max_hours_per_day: 4,
            session_duration_minutes: 50,
            avoid_early_morning: true,
            avoid_late_evening: false,
        }
    }

    /// Creates custom preferences.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` if any bound is violated.
    pub fn new(
        preferred_days_mask: u8,
        daily_start: NaiveTime,
        daily_end: NaiveTime,
        max_hours_per_day: u32,
        session_duration_minutes: u32,
        avoid_early_morning: bool,
        avoid_late_evening: bool,
    ) -> Result<Self, PreferencesError> {
        if preferred_days_mask == 0 {
            return Err(PreferencesError::EmptyPreferredDays);
        }
        if daily_end <= daily_start {
            return Err(PreferencesError::InvalidDailyWindow);
        }
        if !(1..=24).contains(&max_hours_per_day) {
            return Err(PreferencesError::InvalidMaxHoursPerDay);
        }
        if !(15..=240).contains(&session_duration_minutes) {
            return Err(PreferencesError::InvalidSessionDuration);
        }

        Ok(Self {
            preferred_days_mask,
            daily_start,
            daily_end,
            max_hours_per_day,
            session_duration_minutes,
            avoid_early_morning,
            avoid_late_evening,
        })
    }

    // Accessors
    #[must_use]
    pub fn preferred_days_mask(&self) -> u8 {
        self.preferred_days_mask
    }

    #[must_use]
    pub fn is_preferred_day(&self, weekday: Weekday) -> bool {
        self.preferred_days_mask & weekday_bit(weekday) != 0
    }

    #[must_use]
    pub fn daily_start(&self) -> NaiveTime {
        self.daily_start
    }

    #[must_use]
    pub fn daily_end(&self) -> NaiveTime {
        self.daily_end
    }

    #[must_use]
    pub fn max_hours_per_day(&self) -> u32 {
        self.max_hours_per_day
    }

    #[must_use]
    pub fn session_duration_minutes(&self) -> u32 {
        self.session_duration_minutes
    }

    #[must_use]
    pub fn avoid_early_morning(&self) -> bool {
        self.avoid_early_morning
    }

    #[must_use]
    pub fn avoid_late_evening(&self) -> bool {
        self.avoid_late_evening
    }
}

fn weekday_bit(weekday: Weekday) -> u8 {
    match weekday {
        Weekday::Mon => 1 << 0,
        Weekday::Tue => 1 << 1,
        Weekday::Wed => 1 << 2,
        Weekday::Thu => 1 << 3,
        Weekday::Fri => 1 << 4,
        Weekday::Sat => 1 << 5,
        Weekday::Sun => 1 << 6,
    }
}

/// Builds the bitmask form used in storage from a list of weekdays.
#[must_use]
pub fn preferred_days_mask(days: &[Weekday]) -> u8 {
    days.iter().fold(0, |mask, day| mask | weekday_bit(*day))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn default_school_week_covers_weekdays_only() {
        let prefs = PlannerPreferences::default_school_week();
        assert!(prefs.is_preferred_day(Weekday::Mon));
        assert!(prefs.is_preferred_day(Weekday::Fri));
        assert!(!prefs.is_preferred_day(Weekday::Sat));
        assert!(!prefs.is_preferred_day(Weekday::Sun));
        assert_eq!(prefs.session_duration_minutes(), 50);
    }

    #[test]
    fn new_rejects_empty_mask() {
        let err = PlannerPreferences::new(0, t(17, 0), t(21, 0), 4, 50, true, false).unwrap_err();
        assert_eq!(err, PreferencesError::EmptyPreferredDays);
    }

    #[test]
    fn new_rejects_inverted_window() {
        let mask = preferred_days_mask(&[Weekday::Wed]);
        let err =
            PlannerPreferences::new(mask, t(21, 0), t(17, 0), 4, 50, true, false).unwrap_err();
        assert_eq!(err, PreferencesError::InvalidDailyWindow);
    }

    #[test]
    fn new_rejects_out_of_range_limits() {
        let mask = preferred_days_mask(&[Weekday::Sat, Weekday::Sun]);
        let err =
            PlannerPreferences::new(mask, t(9, 0), t(18, 0), 0, 50, false, false).unwrap_err();
        assert_eq!(err, PreferencesError::InvalidMaxHoursPerDay);

        let err =
            PlannerPreferences::new(mask, t(9, 0), t(18, 0), 6, 10, false, false).unwrap_err();
        assert_eq!(err, PreferencesError::InvalidSessionDuration);

        let err =
            PlannerPreferences::new(mask, t(9, 0), t(18, 0), 6, 300, false, false).unwrap_err();
        assert_eq!(err, PreferencesError::InvalidSessionDuration);
    }
}
