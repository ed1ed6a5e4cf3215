use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use revise_core::model::{
    CalendarEvent, EventId, PlannerPreferences, Profile, RevisionSession, SessionId,
    SessionStatus, Subject, SubjectId, SubjectStatus, UserId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for subjects.
///
/// Every query carries the owning `UserId`; rows belonging to other users
/// are invisible to it.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Persist or update a subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be stored.
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError>;

    /// Fetch a subject by ID. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_subject(
        &self,
        user_id: UserId,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError>;

    /// List the user's subjects ordered by name, optionally filtered by
    /// lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_subjects(
        &self,
        user_id: UserId,
        status: Option<SubjectStatus>,
    ) -> Result<Vec<Subject>, StorageError>;

    /// Delete a subject row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no row matched.
    async fn delete_subject(&self, user_id: UserId, id: SubjectId) -> Result<(), StorageError>;
}

/// Repository contract for revision sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist or update a session. Writes are last-writer-wins; no
    /// concurrency token is carried.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn upsert_session(&self, session: &RevisionSession) -> Result<(), StorageError>;

    /// Fetch a session by ID. `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_session(
        &self,
        user_id: UserId,
        id: SessionId,
    ) -> Result<Option<RevisionSession>, StorageError>;

    /// List sessions dated within `from ..= until`, ordered by date then
    /// start time, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_sessions(
        &self,
        user_id: UserId,
        from: NaiveDate,
        until: NaiveDate,
        status: Option<SessionStatus>,
    ) -> Result<Vec<RevisionSession>, StorageError>;

    /// List every session the user has, ordered by date then start time,
    /// optionally filtered by status. The per-subject hour totals are
    /// all-time, so they re-derive from this list on every call.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_all_sessions(
        &self,
        user_id: UserId,
        status: Option<SessionStatus>,
    ) -> Result<Vec<RevisionSession>, StorageError>;

    /// Delete a session row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no row matched.
    async fn delete_session(&self, user_id: UserId, id: SessionId) -> Result<(), StorageError>;

    /// Distinct dates in `from ..= until` carrying at least one done
    /// session. One range query feeds the whole streak walk.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn done_dates(
        &self,
        user_id: UserId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StorageError>;
}

/// Repository contract for calendar events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persist or update an event.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the event cannot be stored.
    async fn upsert_event(&self, event: &CalendarEvent) -> Result<(), StorageError>;

    /// List events starting within `from .. until`, ordered by start.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_events(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, StorageError>;

    /// Delete an event row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no row matched.
    async fn delete_event(&self, user_id: UserId, id: EventId) -> Result<(), StorageError>;
}

/// Repository contract for the per-user profile and planner preferences
/// (one row of each per user).
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the user's profile. `Ok(None)` before first save.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError>;

    /// Persist or replace the user's profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, user_id: UserId, profile: &Profile)
    -> Result<(), StorageError>;

    /// Fetch the user's planner preferences. `Ok(None)` before first save.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_preferences(
        &self,
        user_id: UserId,
    ) -> Result<Option<PlannerPreferences>, StorageError>;

    /// Persist or replace the user's planner preferences.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the preferences cannot be stored.
    async fn upsert_preferences(
        &self,
        user_id: UserId,
        preferences: &PlannerPreferences,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    subjects: Arc<Mutex<HashMap<(UserId, SubjectId), Subject>>>,
    sessions: Arc<Mutex<HashMap<(UserId, SessionId), RevisionSession>>>,
    events: Arc<Mutex<HashMap<(UserId, EventId), CalendarEvent>>>,
    profiles: Arc<Mutex<HashMap<UserId, Profile>>>,
    preferences: Arc<Mutex<HashMap<UserId, PlannerPreferences>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, StorageError> {
        m.lock().map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SubjectRepository for InMemoryRepository {
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.subjects)?;
        guard.insert((subject.user_id(), subject.id()), subject.clone());
        Ok(())
    }

    async fn get_subject(
        &self,
        user_id: UserId,
        id: SubjectId,
    ) -> Result<Option<Subject>, StorageError> {
        let guard = Self::lock(&self.subjects)?;
        Ok(guard.get(&(user_id, id)).cloned())
    }

    async fn list_subjects(
        &self,
        user_id: UserId,
        status: Option<SubjectStatus>,
    ) -> Result<Vec<Subject>, StorageError> {
        let guard = Self::lock(&self.subjects)?;
        let mut subjects: Vec<Subject> = guard
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, subject)| subject.clone())
            .filter(|subject| status.is_none_or(|s| subject.status() == s))
            .collect();
        subjects.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(subjects)
    }

    async fn delete_subject(&self, user_id: UserId, id: SubjectId) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.subjects)?;
        guard
            .remove(&(user_id, id))
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn upsert_session(&self, session: &RevisionSession) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.sessions)?;
        guard.insert((session.user_id(), session.id()), session.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        user_id: UserId,
        id: SessionId,
    ) -> Result<Option<RevisionSession>, StorageError> {
        let guard = Self::lock(&self.sessions)?;
        Ok(guard.get(&(user_id, id)).cloned())
    }

    async fn list_sessions(
        &self,
        user_id: UserId,
        from: NaiveDate,
        until: NaiveDate,
        status: Option<SessionStatus>,
    ) -> Result<Vec<RevisionSession>, StorageError> {
        let guard = Self::lock(&self.sessions)?;
        let mut sessions: Vec<RevisionSession> = guard
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, session)| session.clone())
            .filter(|session| (from..=until).contains(&session.date()))
            .filter(|session| status.is_none_or(|s| session.status() == s))
            .collect();
        sessions.sort_by_key(|session| (session.date(), session.start()));
        Ok(sessions)
    }

    async fn list_all_sessions(
        &self,
        user_id: UserId,
        status: Option<SessionStatus>,
    ) -> Result<Vec<RevisionSession>, StorageError> {
        let guard = Self::lock(&self.sessions)?;
        let mut sessions: Vec<RevisionSession> = guard
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, session)| session.clone())
            .filter(|session| status.is_none_or(|s| session.status() == s))
            .collect();
        sessions.sort_by_key(|session| (session.date(), session.start()));
        Ok(sessions)
    }

    async fn delete_session(&self, user_id: UserId, id: SessionId) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.sessions)?;
        guard
            .remove(&(user_id, id))
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn done_dates(
        &self,
        user_id: UserId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StorageError> {
        let guard = Self::lock(&self.sessions)?;
        let mut dates: Vec<NaiveDate> = guard
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, session)| session)
            .filter(|session| session.status() == SessionStatus::Done)
            .map(revise_core::model::RevisionSession::date)
            .filter(|date| (from..=until).contains(date))
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn upsert_event(&self, event: &CalendarEvent) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.events)?;
        guard.insert((event.user_id(), event.id()), event.clone());
        Ok(())
    }

    async fn list_events(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, StorageError> {
        let guard = Self::lock(&self.events)?;
        let mut events: Vec<CalendarEvent> = guard
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, event)| event.clone())
            .filter(|event| event.start() >= from && event.start() < until)
            .collect();
        events.sort_by_key(revise_core::model::CalendarEvent::start);
        Ok(events)
    }

    async fn delete_event(&self, user_id: UserId, id: EventId) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.events)?;
        guard
            .remove(&(user_id, id))
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let guard = Self::lock(&self.profiles)?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn upsert_profile(
        &self,
        user_id: UserId,
        profile: &Profile,
    ) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.profiles)?;
        guard.insert(user_id, profile.clone());
        Ok(())
    }

    async fn get_preferences(
        &self,
        user_id: UserId,
    ) -> Result<Option<PlannerPreferences>, StorageError> {
        let guard = Self::lock(&self.preferences)?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn upsert_preferences(
        &self,
        user_id: UserId,
        preferences: &PlannerPreferences,
    ) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.preferences)?;
        guard.insert(user_id, preferences.clone());
        Ok(())
    }
}

/// Aggregates the planner repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub subjects: Arc<dyn SubjectRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub events: Arc<dyn EventRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            subjects: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            events: Arc::new(repo.clone()),
            profiles: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revise_core::model::parse_time_of_day;
    use revise_core::time::{fixed_now, fixed_today};

    fn build_subject(user_id: UserId, name: &str) -> Subject {
        Subject::new(
            SubjectId::generate(),
            user_id,
            name,
            "#4f46e5",
            None,
            None,
            Some(20.0),
            None,
            None,
            None,
            fixed_now(),
        )
        .unwrap()
    }

    fn build_session(
        user_id: UserId,
        subject_id: Option<SubjectId>,
        date: NaiveDate,
        status: SessionStatus,
    ) -> RevisionSession {
        RevisionSession::from_persisted(
            SessionId::generate(),
            user_id,
            subject_id,
            date,
            parse_time_of_day("09:00").unwrap(),
            parse_time_of_day("10:00").unwrap(),
            status,
            None,
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn subjects_are_scoped_to_their_owner() {
        let repo = InMemoryRepository::new();
        let alice = UserId::generate();
        let bob = UserId::generate();
        repo.upsert_subject(&build_subject(alice, "Maths")).await.unwrap();
        repo.upsert_subject(&build_subject(bob, "Physique")).await.unwrap();

        let listed = repo.list_subjects(alice, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name(), "Maths");
    }

    #[tokio::test]
    async fn list_subjects_filters_archived() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let mut archived = build_subject(user, "Latin");
        archived.archive();
        repo.upsert_subject(&archived).await.unwrap();
        repo.upsert_subject(&build_subject(user, "Anglais")).await.unwrap();

        let active = repo
            .list_subjects(user, Some(SubjectStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name(), "Anglais");

        let all = repo.list_subjects(user, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn done_dates_are_distinct_and_sorted() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let today = fixed_today();
        let yesterday = today.pred_opt().unwrap();

        repo.upsert_session(&build_session(user, None, today, SessionStatus::Done))
            .await
            .unwrap();
        repo.upsert_session(&build_session(user, None, today, SessionStatus::Done))
            .await
            .unwrap();
        repo.upsert_session(&build_session(user, None, yesterday, SessionStatus::Planned))
            .await
            .unwrap();

        let dates = repo.done_dates(user, yesterday, today).await.unwrap();
        assert_eq!(dates, vec![today]);
    }

    #[tokio::test]
    async fn delete_session_reports_missing_rows() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let err = repo
            .delete_session(user, SessionId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
