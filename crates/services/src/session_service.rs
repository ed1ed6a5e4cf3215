use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use revise_core::Clock;
use revise_core::model::{RevisionSession, SessionId, SessionStatus, SubjectId, UserId};
use storage::repository::{SessionRepository, StorageError};

use crate::error::SessionServiceError;

/// Field values for planning a new revision session.
#[derive(Debug, Clone)]
pub struct PlanSessionInput {
    pub subject_id: Option<SubjectId>,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub notes: Option<String>,
}

/// Orchestrates the revision-session lifecycle: plan, finalize, delete.
///
/// Status transitions go through the domain model, so a finalized session
/// can never be flipped back; the write itself is a plain last-writer-wins
/// upsert.
#[derive(Clone)]
pub struct SessionService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
}

impl SessionService {
    #[must_use]
    pub fn new(clock: Clock, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { clock, sessions }
    }

    /// Plan a new session and persist it.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Session` if the time range is
    /// invalid, or `SessionServiceError::Storage` if persistence fails.
    pub async fn plan_session(
        &self,
        user_id: UserId,
        input: PlanSessionInput,
    ) -> Result<SessionId, SessionServiceError> {
        let session = RevisionSession::new(
            SessionId::generate(),
            user_id,
            input.subject_id,
            input.date,
            input.start,
            input.end,
            input.notes,
            self.clock.now(),
        )?;
        self.sessions.upsert_session(&session).await?;
        debug!(session = %session.id(), date = %session.date(), "planned session");
        Ok(session.id())
    }

    /// List one day's sessions ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if repository access fails.
    pub async fn list_day(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<RevisionSession>, SessionServiceError> {
        let sessions = self
            .sessions
            .list_sessions(user_id, date, date, None)
            .await?;
        Ok(sessions)
    }

    /// List sessions dated within `from ..= until`, optionally filtered by
    /// status.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if repository access fails.
    pub async fn list_range(
        &self,
        user_id: UserId,
        from: NaiveDate,
        until: NaiveDate,
        status: Option<SessionStatus>,
    ) -> Result<Vec<RevisionSession>, SessionServiceError> {
        let sessions = self
            .sessions
            .list_sessions(user_id, from, until, status)
            .await?;
        Ok(sessions)
    }

    /// Mark a planned session as done.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Session` if the session is already
    /// finalized, or `SessionServiceError::Storage` if it is missing or
    /// repository access fails.
    pub async fn mark_done(
        &self,
        user_id: UserId,
        id: SessionId,
    ) -> Result<(), SessionServiceError> {
        self.finalize(user_id, id, SessionStatus::Done).await
    }

    /// Mark a planned session as skipped.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Session` if the session is already
    /// finalized, or `SessionServiceError::Storage` if it is missing or
    /// repository access fails.
    pub async fn mark_skipped(
        &self,
        user_id: UserId,
        id: SessionId,
    ) -> Result<(), SessionServiceError> {
        self.finalize(user_id, id, SessionStatus::Skipped).await
    }

    async fn finalize(
        &self,
        user_id: UserId,
        id: SessionId,
        status: SessionStatus,
    ) -> Result<(), SessionServiceError> {
        let mut session = self
            .sessions
            .get_session(user_id, id)
            .await?
            .ok_or(StorageError::NotFound)?;

        match status {
            SessionStatus::Done => session.mark_done()?,
            SessionStatus::Skipped => session.mark_skipped()?,
            SessionStatus::Planned => {}
        }

        self.sessions.upsert_session(&session).await?;
        debug!(session = %id, %status, "finalized session");
        Ok(())
    }

    /// Delete a session entirely.
    ///
    /// # Errors
    ///
    /// Returns `SessionServiceError::Storage` if the session is missing or
    /// repository access fails.
    pub async fn delete_session(
        &self,
        user_id: UserId,
        id: SessionId,
    ) -> Result<(), SessionServiceError> {
        self.sessions.delete_session(user_id, id).await?;
        Ok(())
    }
}
