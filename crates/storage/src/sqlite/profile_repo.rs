use async_trait::async_trait;

use revise_core::model::{PlannerPreferences, Profile, UserId};

use super::SqliteRepository;
use super::mapping::{map_preferences_row, map_profile_row};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT first_name, last_name, email, school, level,
                       study_domain, main_exam_period, weekly_goal_hours
                FROM profiles
                WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn upsert_profile(
        &self,
        user_id: UserId,
        profile: &Profile,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO profiles (
                    user_id, first_name, last_name, email, school, level,
                    study_domain, main_exam_period, weekly_goal_hours
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(user_id) DO UPDATE SET
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    email = excluded.email,
                    school = excluded.school,
                    level = excluded.level,
                    study_domain = excluded.study_domain,
                    main_exam_period = excluded.main_exam_period,
                    weekly_goal_hours = excluded.weekly_goal_hours
            ",
        )
        .bind(user_id.to_string())
        .bind(profile.first_name())
        .bind(profile.last_name())
        .bind(profile.email())
        .bind(profile.school())
        .bind(profile.level())
        .bind(profile.study_domain())
        .bind(profile.main_exam_period())
        .bind(profile.weekly_goal_hours())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_preferences(
        &self,
        user_id: UserId,
    ) -> Result<Option<PlannerPreferences>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT preferred_days_mask, daily_start, daily_end,
                       max_hours_per_day, session_duration_minutes,
                       avoid_early_morning, avoid_late_evening
                FROM planner_preferences
                WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_preferences_row).transpose()
    }

    async fn upsert_preferences(
        &self,
        user_id: UserId,
        preferences: &PlannerPreferences,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO planner_preferences (
                    user_id, preferred_days_mask, daily_start, daily_end,
                    max_hours_per_day, session_duration_minutes,
                    avoid_early_morning, avoid_late_evening
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(user_id) DO UPDATE SET
                    preferred_days_mask = excluded.preferred_days_mask,
                    daily_start = excluded.daily_start,
                    daily_end = excluded.daily_end,
                    max_hours_per_day = excluded.max_hours_per_day,
                    session_duration_minutes = excluded.session_duration_minutes,
                    avoid_early_morning = excluded.avoid_early_morning,
                    avoid_late_evening = excluded.avoid_late_evening
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(preferences.preferred_days_mask()))
        .bind(preferences.daily_start())
        .bind(preferences.daily_end())
        .bind(i64::from(preferences.max_hours_per_day()))
        .bind(i64::from(preferences.session_duration_minutes()))
        .bind(preferences.avoid_early_morning())
        .bind(preferences.avoid_late_evening())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
