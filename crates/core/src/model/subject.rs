use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{SubjectId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,

    #[error("target hours must be a non-negative number")]
    InvalidTargetHours,

    #[error("exam weight must be a non-negative number")]
    InvalidExamWeight,

    #[error("difficulty level must be between 1 and 5")]
    InvalidDifficultyLevel,
}

/// Lifecycle status of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectStatus {
    Active,
    Archived,
}

impl SubjectStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectStatus::Active => "active",
            SubjectStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for SubjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-defined topic of study with an optional exam and hour goal.
///
/// The color tag is presentation data and is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    id: SubjectId,
    user_id: UserId,
    name: String,
    color: String,
    exam_date: Option<NaiveDate>,
    exam_weight: Option<f64>,
    target_hours: Option<f64>,
    notes: Option<String>,
    exam_type: Option<String>,
    difficulty_level: Option<u8>,
    status: SubjectStatus,
    created_at: DateTime<Utc>,
}

impl Subject {
    /// Creates a new active subject.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if the name is empty or a numeric field is
    /// out of range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SubjectId,
        user_id: UserId,
        name: impl Into<String>,
        color: impl Into<String>,
        exam_date: Option<NaiveDate>,
        exam_weight: Option<f64>,
        target_hours: Option<f64>,
        notes: Option<String>,
        exam_type: Option<String>,
        difficulty_level: Option<u8>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SubjectError> {
        Self::from_persisted(
            id,
            user_id,
            name,
            color,
            exam_date,
            exam_weight,
            target_hours,
            notes,
            exam_type,
            difficulty_level,
            SubjectStatus::Active,
            created_at,
        )
    }

    /// Rehydrate a subject from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if a stored field fails validation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SubjectId,
        user_id: UserId,
        name: impl Into<String>,
        color: impl Into<String>,
        exam_date: Option<NaiveDate>,
        exam_weight: Option<f64>,
        target_hours: Option<f64>,
        notes: Option<String>,
        exam_type: Option<String>,
        difficulty_level: Option<u8>,
        status: SubjectStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SubjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SubjectError::EmptyName);
        }
        if let Some(hours) = target_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(SubjectError::InvalidTargetHours);
            }
        }
        if let Some(weight) = exam_weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SubjectError::InvalidExamWeight);
            }
        }
        if let Some(level) = difficulty_level {
            if !(1..=5).contains(&level) {
                return Err(SubjectError::InvalidDifficultyLevel);
            }
        }

        let notes = notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
        let exam_type = exam_type
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());

        Ok(Self {
            id,
            user_id,
            name: name.trim().to_owned(),
            color: color.into(),
            exam_date,
            exam_weight,
            target_hours,
            notes,
            exam_type,
            difficulty_level,
            status,
            created_at,
        })
    }

    /// Moves the subject out of the active list. Idempotent.
    pub fn archive(&mut self) {
        self.status = SubjectStatus::Archived;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SubjectStatus::Active
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn exam_date(&self) -> Option<NaiveDate> {
        self.exam_date
    }

    #[must_use]
    pub fn exam_weight(&self) -> Option<f64> {
        self.exam_weight
    }

    #[must_use]
    pub fn target_hours(&self) -> Option<f64> {
        self.target_hours
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn exam_type(&self) -> Option<&str> {
        self.exam_type.as_deref()
    }

    #[must_use]
    pub fn difficulty_level(&self) -> Option<u8> {
        self.difficulty_level
    }

    #[must_use]
    pub fn status(&self) -> SubjectStatus {
        self.status
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
