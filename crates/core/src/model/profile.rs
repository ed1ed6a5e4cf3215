use thiserror::Error;

/// Per-user settings shown on the profile screen.
///
/// The weekly revision goal feeds the weekly progress overview; everything
/// else is descriptive.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Profile {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    school: Option<String>,
    level: Option<String>,
    study_domain: Option<String>,
    main_exam_period: Option<String>,
    weekly_goal_hours: Option<f64>,
}

/// Unvalidated profile input as it arrives from an edit form.
#[derive(Clone, Debug, Default)]
pub struct ProfileDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub school: Option<String>,
    pub level: Option<String>,
    pub study_domain: Option<String>,
    pub main_exam_period: Option<String>,
    pub weekly_goal_hours: Option<f64>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("weekly goal must be a non-negative number of hours")]
    InvalidWeeklyGoal,
}

impl ProfileDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::InvalidWeeklyGoal` if the goal is present but
    /// negative or not finite.
    pub fn validate(self) -> Result<Profile, ProfileError> {
        if let Some(goal) = self.weekly_goal_hours {
            if !goal.is_finite() || goal < 0.0 {
                return Err(ProfileError::InvalidWeeklyGoal);
            }
        }

        Ok(Profile {
            first_name: normalize_optional(self.first_name),
            last_name: normalize_optional(self.last_name),
            email: normalize_optional(self.email),
            school: normalize_optional(self.school),
            level: normalize_optional(self.level),
            study_domain: normalize_optional(self.study_domain),
            main_exam_period: normalize_optional(self.main_exam_period),
            weekly_goal_hours: self.weekly_goal_hours,
        })
    }
}

impl Profile {
    /// Rehydrate a profile from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if a stored field fails validation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
        school: Option<String>,
        level: Option<String>,
        study_domain: Option<String>,
        main_exam_period: Option<String>,
        weekly_goal_hours: Option<f64>,
    ) -> Result<Self, ProfileError> {
        ProfileDraft {
            first_name,
            last_name,
            email,
            school,
            level,
            study_domain,
            main_exam_period,
            weekly_goal_hours,
        }
        .validate()
    }

    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn school(&self) -> Option<&str> {
        self.school.as_deref()
    }

    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    #[must_use]
    pub fn study_domain(&self) -> Option<&str> {
        self.study_domain.as_deref()
    }

    #[must_use]
    pub fn main_exam_period(&self) -> Option<&str> {
        self.main_exam_period.as_deref()
    }

    #[must_use]
    pub fn weekly_goal_hours(&self) -> Option<f64> {
        self.weekly_goal_hours
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
