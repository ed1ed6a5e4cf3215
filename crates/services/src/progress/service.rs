use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use revise_core::Clock;
use revise_core::model::{SessionStatus, SubjectStatus, UserId};
use revise_core::progress::{
    MAX_STREAK_PROBES, days_until, streak_from_dates, subject_hours, target_progress,
    week_bounds, weekly_done_hours,
};
use storage::repository::{ProfileRepository, SessionRepository, SubjectRepository};

use super::overview::{ProgressOverview, SubjectProgress, WeeklyOverview};
use crate::error::ProgressError;

/// Derives the progress surfaces from stored sessions and subjects.
///
/// Every call works on a fresh snapshot; nothing is cached between
/// invocations. The service owns the time source so "today" and the ISO
/// week resolve the same way everywhere.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    subjects: Arc<dyn SubjectRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        subjects: Arc<dyn SubjectRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            clock,
            sessions,
            subjects,
            profiles,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        let repo = storage::repository::InMemoryRepository::new();
        Self::new(
            clock,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        )
    }

    /// Hours of completed revision in the current ISO week, against the
    /// profile's weekly goal.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on repository failures.
    pub async fn weekly_overview(&self, user_id: UserId) -> Result<WeeklyOverview, ProgressError> {
        let today = self.clock.today();
        let (week_start, week_end) = week_bounds(today);

        let sessions = self
            .sessions
            .list_sessions(user_id, week_start, week_end, Some(SessionStatus::Done))
            .await?;
        let done_hours = weekly_done_hours(&sessions, today);

        let goal_hours = self
            .profiles
            .get_profile(user_id)
            .await?
            .and_then(|profile| profile.weekly_goal_hours());
        let percent = target_progress(done_hours, goal_hours);

        Ok(WeeklyOverview {
            week_start,
            week_end,
            done_hours,
            goal_hours,
            percent,
        })
    }

    /// Consecutive days with at least one completed session, today
    /// forgiven once.
    ///
    /// One range query materializes the done dates for the whole probe
    /// window; the walk itself runs in memory.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on repository failures.
    pub async fn streak_days(&self, user_id: UserId) -> Result<u32, ProgressError> {
        let today = self.clock.today();
        let window_start = today - Duration::days(i64::from(MAX_STREAK_PROBES) - 1);

        let done: HashSet<NaiveDate> = self
            .sessions
            .done_dates(user_id, window_start, today)
            .await?
            .into_iter()
            .collect();

        let streak = streak_from_dates(&done, today);
        debug!(days = streak, "computed streak");
        Ok(streak)
    }

    /// Per-subject accumulated hours, target percentages, and exam
    /// countdowns for the user's active subjects.
    ///
    /// Subjects with no sessions yet appear with zero hours; the hour map
    /// simply has no entry for them.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on repository failures.
    pub async fn subject_progress(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SubjectProgress>, ProgressError> {
        let today = self.clock.today();

        let subjects = self
            .subjects
            .list_subjects(user_id, Some(SubjectStatus::Active))
            .await?;
        let sessions = self.sessions.list_all_sessions(user_id, None).await?;
        let totals = subject_hours(&sessions);

        let items = subjects
            .into_iter()
            .map(|subject| {
                let hours = totals.get(&subject.id()).copied().unwrap_or_default();
                SubjectProgress {
                    subject_id: subject.id(),
                    name: subject.name().to_owned(),
                    color: subject.color().to_owned(),
                    hours,
                    target_hours: subject.target_hours(),
                    target_percent: target_progress(hours.done, subject.target_hours()),
                    days_until_exam: days_until(subject.exam_date(), today),
                }
            })
            .collect();

        Ok(items)
    }

    /// Everything the Progression screen needs in one call.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on repository failures.
    pub async fn progression(&self, user_id: UserId) -> Result<ProgressOverview, ProgressError> {
        let weekly = self.weekly_overview(user_id).await?;
        let streak_days = self.streak_days(user_id).await?;
        let subjects = self.subject_progress(user_id).await?;

        Ok(ProgressOverview {
            weekly,
            streak_days,
            subjects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use revise_core::model::{
        ProfileDraft, RevisionSession, SessionId, Subject, SubjectId, parse_time_of_day,
    };
    use revise_core::time::{fixed_clock, fixed_now, fixed_today};
    use storage::repository::InMemoryRepository;

    fn service(repo: InMemoryRepository) -> ProgressService {
        ProgressService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        )
    }

    async fn seed_subject(
        repo: &InMemoryRepository,
        user: UserId,
        name: &str,
        target_hours: Option<f64>,
        exam_in_days: Option<i64>,
    ) -> SubjectId {
        let subject = Subject::new(
            SubjectId::generate(),
            user,
            name,
            "#3b82f6",
            exam_in_days.map(|days| fixed_today() + Duration::days(days)),
            None,
            target_hours,
            None,
            None,
            None,
            fixed_now(),
        )
        .unwrap();
        repo.upsert_subject(&subject).await.unwrap();
        subject.id()
    }

    async fn seed_session(
        repo: &InMemoryRepository,
        user: UserId,
        subject: Option<SubjectId>,
        date: NaiveDate,
        start: &str,
        end: &str,
        status: SessionStatus,
    ) {
        let session = RevisionSession::from_persisted(
            SessionId::generate(),
            user,
            subject,
            date,
            parse_time_of_day(start).unwrap(),
            parse_time_of_day(end).unwrap(),
            status,
            None,
            fixed_now(),
        )
        .unwrap();
        repo.upsert_session(&session).await.unwrap();
    }

    #[tokio::test]
    async fn weekly_overview_measures_against_profile_goal() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();

        let profile = ProfileDraft {
            weekly_goal_hours: Some(12.0),
            ..ProfileDraft::new()
        }
        .validate()
        .unwrap();
        repo.upsert_profile(user, &profile).await.unwrap();

        // fixed_today() is Friday 2026-01-09; Monday and Wednesday of the
        // same week carry 1.5h each, the previous Sunday must not count.
        let monday = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        seed_session(&repo, user, None, monday, "18:00", "19:30", SessionStatus::Done).await;
        seed_session(
            &repo,
            user,
            None,
            monday + Duration::days(2),
            "18:00",
            "19:30",
            SessionStatus::Done,
        )
        .await;
        seed_session(
            &repo,
            user,
            None,
            monday - Duration::days(1),
            "18:00",
            "19:30",
            SessionStatus::Done,
        )
        .await;

        let weekly = service(repo).weekly_overview(user).await.unwrap();
        assert_eq!(weekly.week_start, monday);
        assert_eq!(weekly.week_end, monday + Duration::days(6));
        assert!((weekly.done_hours - 3.0).abs() < 1e-9);
        assert_eq!(weekly.goal_hours, Some(12.0));
        assert!((weekly.percent.unwrap() - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn weekly_overview_without_goal_has_no_percent() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();

        let weekly = service(repo).weekly_overview(user).await.unwrap();
        assert!((weekly.done_hours - 0.0).abs() < 1e-9);
        assert_eq!(weekly.goal_hours, None);
        assert_eq!(weekly.percent, None);
    }

    #[tokio::test]
    async fn streak_forgives_an_unfinished_today() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let today = fixed_today();

        for back in 1..=3 {
            seed_session(
                &repo,
                user,
                None,
                today - Duration::days(back),
                "18:00",
                "19:00",
                SessionStatus::Done,
            )
            .await;
        }
        // Today only has a planned session, which does not count yet.
        seed_session(&repo, user, None, today, "18:00", "19:00", SessionStatus::Planned).await;

        let streak = service(repo).streak_days(user).await.unwrap();
        assert_eq!(streak, 3);
    }

    #[tokio::test]
    async fn subject_progress_reports_targets_and_countdowns() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();

        let maths = seed_subject(&repo, user, "Maths", Some(20.0), Some(5)).await;
        let philo = seed_subject(&repo, user, "Philo", None, None).await;

        seed_session(
            &repo,
            user,
            Some(maths),
            fixed_today(),
            "09:00",
            "10:30",
            SessionStatus::Done,
        )
        .await;
        seed_session(
            &repo,
            user,
            Some(maths),
            fixed_today(),
            "14:00",
            "14:45",
            SessionStatus::Planned,
        )
        .await;

        let items = service(repo).subject_progress(user).await.unwrap();
        assert_eq!(items.len(), 2);

        let maths_item = items.iter().find(|i| i.subject_id == maths).unwrap();
        assert!((maths_item.hours.done - 1.5).abs() < 1e-9);
        assert!((maths_item.hours.planned - 2.25).abs() < 1e-9);
        assert!((maths_item.target_percent.unwrap() - 7.5).abs() < 1e-9);
        assert_eq!(maths_item.days_until_exam, Some(5));

        // No target, no sessions: zero hours and no percent, but present.
        let philo_item = items.iter().find(|i| i.subject_id == philo).unwrap();
        assert!((philo_item.hours.done - 0.0).abs() < 1e-9);
        assert_eq!(philo_item.target_percent, None);
        assert_eq!(philo_item.days_until_exam, None);
    }

    #[tokio::test]
    async fn archived_subjects_are_left_out() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();

        let id = seed_subject(&repo, user, "Latin", Some(5.0), None).await;
        let mut subject = repo.get_subject(user, id).await.unwrap().unwrap();
        subject.archive();
        repo.upsert_subject(&subject).await.unwrap();

        let items = service(repo).subject_progress(user).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn progression_assembles_all_three_surfaces() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();

        seed_subject(&repo, user, "Maths", Some(10.0), Some(30)).await;
        seed_session(
            &repo,
            user,
            None,
            fixed_today() - Duration::days(1),
            "18:00",
            "19:00",
            SessionStatus::Done,
        )
        .await;

        let overview = service(repo).progression(user).await.unwrap();
        assert_eq!(overview.streak_days, 1);
        assert_eq!(overview.subjects.len(), 1);
        assert_eq!(overview.weekly.percent, None);
    }
}
