use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use revise_core::model::{
    CalendarEvent, EventId, EventKind, RevisionSession, Subject, SubjectId, UserId,
};
use storage::repository::{EventRepository, SessionRepository, SubjectRepository};

use crate::error::AgendaError;

/// One row of the Planning screen: a revision session (with its subject
/// resolved for display) or a calendar commitment.
#[derive(Debug, Clone)]
pub enum AgendaEntry {
    Session {
        session: RevisionSession,
        subject: Option<Subject>,
    },
    Event(CalendarEvent),
}

impl AgendaEntry {
    /// Start time of day used for ordering the agenda. Event instants are
    /// read in UTC, matching how they are stored.
    #[must_use]
    pub fn start_time(&self) -> NaiveTime {
        match self {
            AgendaEntry::Session { session, .. } => session.start(),
            AgendaEntry::Event(event) => event.start().time(),
        }
    }
}

/// Field values for adding a calendar event.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_blocking: bool,
    pub kind: EventKind,
    pub subject_name: Option<String>,
}

/// Merges one day's sessions and events into a start-ordered agenda.
#[derive(Clone)]
pub struct AgendaService {
    sessions: Arc<dyn SessionRepository>,
    events: Arc<dyn EventRepository>,
    subjects: Arc<dyn SubjectRepository>,
}

impl AgendaService {
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        events: Arc<dyn EventRepository>,
        subjects: Arc<dyn SubjectRepository>,
    ) -> Self {
        Self {
            sessions,
            events,
            subjects,
        }
    }

    /// Build the agenda for one day: the day's sessions with their
    /// subjects resolved, interleaved with the day's events, ordered by
    /// start time.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::Storage` if repository access fails.
    pub async fn day_agenda(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<AgendaEntry>, AgendaError> {
        let sessions = self
            .sessions
            .list_sessions(user_id, date, date, None)
            .await?;

        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let events = self
            .events
            .list_events(user_id, day_start, day_start + Duration::days(1))
            .await?;

        let subjects: HashMap<SubjectId, Subject> = self
            .subjects
            .list_subjects(user_id, None)
            .await?
            .into_iter()
            .map(|subject| (subject.id(), subject))
            .collect();

        let mut entries: Vec<AgendaEntry> = sessions
            .into_iter()
            .map(|session| {
                let subject = session
                    .subject_id()
                    .and_then(|id| subjects.get(&id).cloned());
                AgendaEntry::Session { session, subject }
            })
            .chain(events.into_iter().map(AgendaEntry::Event))
            .collect();
        entries.sort_by_key(AgendaEntry::start_time);

        Ok(entries)
    }

    /// Add a calendar event.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::Event` for validation failures and
    /// `AgendaError::Storage` if persistence fails.
    pub async fn add_event(
        &self,
        user_id: UserId,
        input: EventInput,
    ) -> Result<EventId, AgendaError> {
        let event = CalendarEvent::new(
            EventId::generate(),
            user_id,
            input.title,
            input.start,
            input.end,
            input.is_blocking,
            input.kind,
            input.subject_name,
        )?;
        self.events.upsert_event(&event).await?;
        debug!(event = %event.id(), "added calendar event");
        Ok(event.id())
    }

    /// Remove a calendar event.
    ///
    /// # Errors
    ///
    /// Returns `AgendaError::Storage` if the event is missing or
    /// repository access fails.
    pub async fn remove_event(&self, user_id: UserId, id: EventId) -> Result<(), AgendaError> {
        self.events.delete_event(user_id, id).await?;
        Ok(())
    }
}
