use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use revise_core::Clock;
use revise_core::model::{Subject, SubjectId, SubjectStatus, UserId};
use storage::repository::{StorageError, SubjectRepository};

use crate::error::SubjectServiceError;

/// Field values for creating or updating a subject, as they arrive from
/// the Matières form.
#[derive(Debug, Clone, Default)]
pub struct SubjectInput {
    pub name: String,
    pub color: String,
    pub exam_date: Option<NaiveDate>,
    pub exam_weight: Option<f64>,
    pub target_hours: Option<f64>,
    pub notes: Option<String>,
    pub exam_type: Option<String>,
    pub difficulty_level: Option<u8>,
}

/// Orchestrates subject creation and persistence.
#[derive(Clone)]
pub struct SubjectService {
    clock: Clock,
    subjects: Arc<dyn SubjectRepository>,
}

impl SubjectService {
    #[must_use]
    pub fn new(clock: Clock, subjects: Arc<dyn SubjectRepository>) -> Self {
        Self { clock, subjects }
    }

    /// Create a new subject for the user and persist it.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Subject` for validation failures.
    /// Returns `SubjectServiceError::Storage` if persistence fails.
    pub async fn create_subject(
        &self,
        user_id: UserId,
        input: SubjectInput,
    ) -> Result<SubjectId, SubjectServiceError> {
        let subject = Subject::new(
            SubjectId::generate(),
            user_id,
            input.name,
            input.color,
            input.exam_date,
            input.exam_weight,
            input.target_hours,
            input.notes,
            input.exam_type,
            input.difficulty_level,
            self.clock.now(),
        )?;
        self.subjects.upsert_subject(&subject).await?;
        debug!(subject = %subject.id(), "created subject");
        Ok(subject.id())
    }

    /// List the user's active subjects ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn list_active(&self, user_id: UserId) -> Result<Vec<Subject>, SubjectServiceError> {
        let subjects = self
            .subjects
            .list_subjects(user_id, Some(SubjectStatus::Active))
            .await?;
        Ok(subjects)
    }

    /// List every subject the user has, archived included.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn list_all(&self, user_id: UserId) -> Result<Vec<Subject>, SubjectServiceError> {
        let subjects = self.subjects.list_subjects(user_id, None).await?;
        Ok(subjects)
    }

    /// Fetch a subject by ID.
    ///
    /// Returns `Ok(None)` when the subject does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn get_subject(
        &self,
        user_id: UserId,
        id: SubjectId,
    ) -> Result<Option<Subject>, SubjectServiceError> {
        let subject = self.subjects.get_subject(user_id, id).await?;
        Ok(subject)
    }

    /// Replace a subject's editable fields while preserving its lifecycle
    /// status and creation time.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Subject` if validation fails.
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn update_subject(
        &self,
        user_id: UserId,
        id: SubjectId,
        input: SubjectInput,
    ) -> Result<(), SubjectServiceError> {
        let existing = self
            .subjects
            .get_subject(user_id, id)
            .await?
            .ok_or(StorageError::NotFound)?;

        let updated = Subject::from_persisted(
            existing.id(),
            existing.user_id(),
            input.name,
            input.color,
            input.exam_date,
            input.exam_weight,
            input.target_hours,
            input.notes,
            input.exam_type,
            input.difficulty_level,
            existing.status(),
            existing.created_at(),
        )?;
        self.subjects.upsert_subject(&updated).await?;
        Ok(())
    }

    /// Archive a subject, removing it from the active list.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if the subject is missing or
    /// repository access fails.
    pub async fn archive_subject(
        &self,
        user_id: UserId,
        id: SubjectId,
    ) -> Result<(), SubjectServiceError> {
        let mut subject = self
            .subjects
            .get_subject(user_id, id)
            .await?
            .ok_or(StorageError::NotFound)?;
        subject.archive();
        self.subjects.upsert_subject(&subject).await?;
        debug!(subject = %id, "archived subject");
        Ok(())
    }

    /// Delete a subject row entirely.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if the subject is missing or
    /// repository access fails.
    pub async fn delete_subject(
        &self,
        user_id: UserId,
        id: SubjectId,
    ) -> Result<(), SubjectServiceError> {
        self.subjects.delete_subject(user_id, id).await?;
        Ok(())
    }
}
