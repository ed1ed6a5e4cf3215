use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{SessionId, SubjectId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("end time must be strictly after start time")]
    InvalidTimeRange,

    #[error("invalid time of day (expected HH:MM): {raw}")]
    InvalidTimeOfDay { raw: String },

    #[error("session is already {status}")]
    AlreadyFinalized { status: SessionStatus },
}

/// Lifecycle status of a revision session.
///
/// `Done` and `Skipped` are terminal: the planner offers no way back to
/// `Planned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Planned,
    Done,
    Skipped,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Planned)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::Done => "done",
            SessionStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a wall-clock time of day in strict `HH:MM` form.
///
/// Anything else is rejected up front so aggregation only ever sees
/// well-formed times.
///
/// # Errors
///
/// Returns `SessionError::InvalidTimeOfDay` when the input does not parse.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, SessionError> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| SessionError::InvalidTimeOfDay {
        raw: raw.to_owned(),
    })
}

/// A dated, timed block of study tied to one subject (or none, for a
/// generic block).
///
/// Sessions never cross midnight: start and end are times of day on the
/// same calendar date, and end is strictly after start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionSession {
    id: SessionId,
    user_id: UserId,
    subject_id: Option<SubjectId>,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    status: SessionStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl RevisionSession {
    /// Creates a freshly planned session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTimeRange` if `end` is not strictly
    /// after `start`.
    pub fn new(
        id: SessionId,
        user_id: UserId,
        subject_id: Option<SubjectId>,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        Self::from_persisted(
            id,
            user_id,
            subject_id,
            date,
            start,
            end,
            SessionStatus::Planned,
            notes,
            created_at,
        )
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTimeRange` if the stored times are
    /// not strictly ordered.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionId,
        user_id: UserId,
        subject_id: Option<SubjectId>,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        status: SessionStatus,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if end <= start {
            return Err(SessionError::InvalidTimeRange);
        }

        let notes = notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());

        Ok(Self {
            id,
            user_id,
            subject_id,
            date,
            start,
            end,
            status,
            notes,
            created_at,
        })
    }

    /// Marks a planned session as completed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyFinalized` if the session is done or
    /// skipped.
    pub fn mark_done(&mut self) -> Result<(), SessionError> {
        self.transition_to(SessionStatus::Done)
    }

    /// Marks a planned session as skipped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyFinalized` if the session is done or
    /// skipped.
    pub fn mark_skipped(&mut self) -> Result<(), SessionError> {
        self.transition_to(SessionStatus::Skipped)
    }

    fn transition_to(&mut self, next: SessionStatus) -> Result<(), SessionError> {
        if self.status.is_terminal() {
            return Err(SessionError::AlreadyFinalized {
                status: self.status,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Session length in whole minutes; always positive under the time
    /// range invariant.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Session length in hours.
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn subject_id(&self) -> Option<SubjectId> {
        self.subject_id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{fixed_now, fixed_today};

    fn build_session(start: &str, end: &str) -> RevisionSession {
        RevisionSession::new(
            SessionId::generate(),
            UserId::generate(),
            Some(SubjectId::generate()),
            fixed_today(),
            parse_time_of_day(start).unwrap(),
            parse_time_of_day(end).unwrap(),
            None,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_inverted_time_range() {
        let err = RevisionSession::new(
            SessionId::generate(),
            UserId::generate(),
            None,
            fixed_today(),
            parse_time_of_day("10:00").unwrap(),
            parse_time_of_day("09:00").unwrap(),
            None,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionError::InvalidTimeRange);
    }

    #[test]
    fn new_rejects_zero_length_session() {
        let at = parse_time_of_day("09:00").unwrap();
        let err = RevisionSession::new(
            SessionId::generate(),
            UserId::generate(),
            None,
            fixed_today(),
            at,
            at,
            None,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionError::InvalidTimeRange);
    }

    #[test]
    fn duration_uses_minute_difference() {
        let session = build_session("09:00", "10:30");
        assert_eq!(session.duration_minutes(), 90);
        assert!((session.duration_hours() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn done_and_skipped_are_terminal() {
        let mut session = build_session("09:00", "10:00");
        session.mark_done().unwrap();
        assert_eq!(session.status(), SessionStatus::Done);

        let err = session.mark_skipped().unwrap_err();
        assert_eq!(
            err,
            SessionError::AlreadyFinalized {
                status: SessionStatus::Done
            }
        );

        let mut skipped = build_session("09:00", "10:00");
        skipped.mark_skipped().unwrap();
        assert!(skipped.mark_done().is_err());
    }

    #[test]
    fn notes_are_trimmed_and_emptied() {
        let session = RevisionSession::new(
            SessionId::generate(),
            UserId::generate(),
            None,
            fixed_today(),
            parse_time_of_day("14:00").unwrap(),
            parse_time_of_day("14:45").unwrap(),
            Some("   ".into()),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(session.notes(), None);
    }

    #[test]
    fn parse_time_of_day_is_strict() {
        assert_eq!(
            parse_time_of_day("08:05").unwrap(),
            NaiveTime::from_hms_opt(8, 5, 0).unwrap()
        );
        assert!(parse_time_of_day("8h05").is_err());
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("").is_err());
    }
}
