use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{EventId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventError {
    #[error("event title cannot be empty")]
    EmptyTitle,

    #[error("event end must be strictly after its start")]
    InvalidTimeRange,
}

/// Category of a calendar commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Course,
    Work,
    Personal,
    Other,
}

impl EventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Course => "course",
            EventKind::Work => "work",
            EventKind::Personal => "personal",
            EventKind::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-revision commitment shown alongside sessions in the day agenda.
///
/// Blocking events mark time the planner must not schedule over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    id: EventId,
    user_id: UserId,
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    is_blocking: bool,
    kind: EventKind,
    subject_name: Option<String>,
}

impl CalendarEvent {
    /// Creates a new calendar event.
    ///
    /// # Errors
    ///
    /// Returns `EventError::EmptyTitle` for a blank title and
    /// `EventError::InvalidTimeRange` if `end` is not after `start`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EventId,
        user_id: UserId,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        is_blocking: bool,
        kind: EventKind,
        subject_name: Option<String>,
    ) -> Result<Self, EventError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(EventError::EmptyTitle);
        }
        if end <= start {
            return Err(EventError::InvalidTimeRange);
        }

        let subject_name = subject_name
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        Ok(Self {
            id,
            user_id,
            title: title.trim().to_owned(),
            start,
            end,
            is_blocking,
            kind,
            subject_name,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.is_blocking
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[must_use]
    pub fn subject_name(&self) -> Option<&str> {
        self.subject_name.as_deref()
    }
}
