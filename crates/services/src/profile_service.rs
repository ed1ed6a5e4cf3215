use std::sync::Arc;

use tracing::debug;

use revise_core::model::{PlannerPreferences, Profile, ProfileDraft, UserId};
use storage::repository::ProfileRepository;

use crate::error::ProfileServiceError;

/// Reads and writes the per-user profile and planner preferences edited on
/// the Paramètres screen.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Fetch the user's profile, empty before the first save.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if repository access fails.
    pub async fn profile(&self, user_id: UserId) -> Result<Profile, ProfileServiceError> {
        let profile = self.profiles.get_profile(user_id).await?;
        Ok(profile.unwrap_or_default())
    }

    /// Validate and persist a profile edit.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for validation failures and
    /// `ProfileServiceError::Storage` if persistence fails.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        draft: ProfileDraft,
    ) -> Result<Profile, ProfileServiceError> {
        let profile = draft.validate()?;
        self.profiles.upsert_profile(user_id, &profile).await?;
        debug!(user = %user_id, "updated profile");
        Ok(profile)
    }

    /// Fetch the user's planner preferences, falling back to the
    /// school-week defaults before the first save.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if repository access fails.
    pub async fn preferences(
        &self,
        user_id: UserId,
    ) -> Result<PlannerPreferences, ProfileServiceError> {
        let preferences = self.profiles.get_preferences(user_id).await?;
        Ok(preferences.unwrap_or_else(PlannerPreferences::default_school_week))
    }

    /// Persist planner preferences (already validated by construction).
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if persistence fails.
    pub async fn update_preferences(
        &self,
        user_id: UserId,
        preferences: PlannerPreferences,
    ) -> Result<(), ProfileServiceError> {
        self.profiles
            .upsert_preferences(user_id, &preferences)
            .await?;
        debug!(user = %user_id, "updated planner preferences");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Weekday;
    use revise_core::model::{ProfileError, parse_time_of_day, preferred_days_mask};
    use storage::repository::InMemoryRepository;

    fn service() -> ProfileService {
        ProfileService::new(Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn profile_is_empty_before_first_save() {
        let service = service();
        let profile = service.profile(UserId::generate()).await.unwrap();
        assert_eq!(profile, Profile::default());
    }

    #[tokio::test]
    async fn update_profile_persists_normalized_values() {
        let service = service();
        let user = UserId::generate();

        service
            .update_profile(
                user,
                ProfileDraft {
                    first_name: Some("  Marie ".into()),
                    weekly_goal_hours: Some(12.0),
                    ..ProfileDraft::new()
                },
            )
            .await
            .unwrap();

        let fetched = service.profile(user).await.unwrap();
        assert_eq!(fetched.first_name(), Some("Marie"));
        assert_eq!(fetched.weekly_goal_hours(), Some(12.0));
    }

    #[tokio::test]
    async fn update_profile_rejects_invalid_goal() {
        let service = service();
        let err = service
            .update_profile(
                UserId::generate(),
                ProfileDraft {
                    weekly_goal_hours: Some(-4.0),
                    ..ProfileDraft::new()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProfileServiceError::Profile(ProfileError::InvalidWeeklyGoal)
        ));
    }

    #[tokio::test]
    async fn preferences_default_until_saved() {
        let service = service();
        let user = UserId::generate();

        let defaults = service.preferences(user).await.unwrap();
        assert_eq!(defaults, PlannerPreferences::default_school_week());

        let custom = PlannerPreferences::new(
            preferred_days_mask(&[Weekday::Sat, Weekday::Sun]),
            parse_time_of_day("09:00").unwrap(),
            parse_time_of_day("18:00").unwrap(),
            6,
            45,
            false,
            true,
        )
        .unwrap();
        service.update_preferences(user, custom.clone()).await.unwrap();

        let fetched = service.preferences(user).await.unwrap();
        assert_eq!(fetched, custom);
    }
}
