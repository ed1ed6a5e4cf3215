//! Aggregation for the progress surfaces: per-subject hour totals, the
//! weekly total against a goal, the day streak, target percentages, and
//! exam countdowns.
//!
//! Everything here is a pure function over already-fetched data. Fetch
//! failures are the caller's concern; given well-formed input these
//! operations always terminate and always return a value.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};

use crate::model::{RevisionSession, SessionStatus, SubjectId};

/// Upper bound on backward day probes when walking a streak. A defensive
/// cap, not a domain rule; streaks beyond it are not reported accurately.
pub const MAX_STREAK_PROBES: u32 = 366;

/// Hour totals for one subject.
///
/// `planned` accumulates every session ever scheduled for the subject,
/// whatever its status — done and skipped included. It is the backdrop of
/// the stacked progress bar, with `done` drawn over it. Both buckets are
/// recomputed from scratch on every call; nothing is carried between
/// calls.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubjectHours {
    pub done: f64,
    pub planned: f64,
}

/// Accumulates per-subject hours over a list of sessions.
///
/// Sessions without a subject are ignored. Subjects with no sessions are
/// absent from the map; callers default to zero on a lookup miss.
#[must_use]
pub fn subject_hours(sessions: &[RevisionSession]) -> HashMap<SubjectId, SubjectHours> {
    let mut totals: HashMap<SubjectId, SubjectHours> = HashMap::new();
    for session in sessions {
        let Some(subject_id) = session.subject_id() else {
            continue;
        };
        let hours = session.duration_hours();
        let entry = totals.entry(subject_id).or_default();
        entry.planned += hours;
        if session.status() == SessionStatus::Done {
            entry.done += hours;
        }
    }
    totals
}

/// Returns the Monday and Sunday of the ISO week containing `date`.
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// Sums the hours of done sessions dated within the ISO week
/// (Monday ..= Sunday) containing `reference`. Zero for an empty set.
#[must_use]
pub fn weekly_done_hours(sessions: &[RevisionSession], reference: NaiveDate) -> f64 {
    let (monday, sunday) = week_bounds(reference);
    sessions
        .iter()
        .filter(|s| s.status() == SessionStatus::Done)
        .filter(|s| (monday..=sunday).contains(&s.date()))
        .map(RevisionSession::duration_hours)
        .sum()
}

/// Counts consecutive days with at least one done session, walking
/// backward from `reference`.
///
/// The reference day itself is forgiven exactly once: if it has no done
/// session yet, the walk moves on without counting it and without ending
/// the streak. Any later empty day ends the walk. `done_on` is a
/// collaborator predicate so the walk can be tested with a stub.
pub fn streak<F>(mut done_on: F, reference: NaiveDate) -> u32
where
    F: FnMut(NaiveDate) -> bool,
{
    let mut count = 0;
    let mut day = reference;
    for _ in 0..MAX_STREAK_PROBES {
        if done_on(day) {
            count += 1;
        } else if day != reference {
            break;
        }
        let Some(prev) = day.pred_opt() else { break };
        day = prev;
    }
    count
}

/// Streak over a materialized set of done dates.
///
/// Callers fetch the distinct done dates for the probe window in one
/// range query and walk the set in memory; the observable value matches
/// the day-by-day probe exactly.
#[must_use]
pub fn streak_from_dates(done_dates: &HashSet<NaiveDate>, reference: NaiveDate) -> u32 {
    streak(|day| done_dates.contains(&day), reference)
}

/// Percentage of a target reached, clamped to 100.
///
/// `None` when the target is absent, zero, or negative — a subject
/// without a target has no progress bar, which is not the same thing as a
/// bar at zero.
#[must_use]
pub fn target_progress(done_hours: f64, target_hours: Option<f64>) -> Option<f64> {
    let target = target_hours?;
    if !target.is_finite() || target <= 0.0 {
        return None;
    }
    Some((done_hours / target * 100.0).min(100.0))
}

/// Whole days until an exam, or `None` when there is no exam or it has
/// already passed (a past exam must not render a negative countdown).
#[must_use]
pub fn days_until(exam_date: Option<NaiveDate>, reference: NaiveDate) -> Option<i64> {
    let exam = exam_date?;
    let days = (exam - reference).num_days();
    (days >= 0).then_some(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SessionId, UserId, parse_time_of_day};
    use crate::time::{fixed_now, fixed_today};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(
        subject: Option<SubjectId>,
        on: NaiveDate,
        start: &str,
        end: &str,
        status: SessionStatus,
    ) -> RevisionSession {
        RevisionSession::from_persisted(
            SessionId::generate(),
            UserId::generate(),
            subject,
            on,
            parse_time_of_day(start).unwrap(),
            parse_time_of_day(end).unwrap(),
            status,
            None,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn subject_hours_splits_done_and_planned_buckets() {
        // done 09:00-10:30 = 1.5h; planned 14:00-14:45 = 0.75h; the
        // planned bucket counts both.
        let subject = SubjectId::generate();
        let sessions = vec![
            session(
                Some(subject),
                fixed_today(),
                "09:00",
                "10:30",
                SessionStatus::Done,
            ),
            session(
                Some(subject),
                fixed_today(),
                "14:00",
                "14:45",
                SessionStatus::Planned,
            ),
        ];

        let totals = subject_hours(&sessions);
        let hours = totals[&subject];
        assert!((hours.done - 1.5).abs() < 1e-9);
        assert!((hours.planned - 2.25).abs() < 1e-9);
    }

    #[test]
    fn subject_hours_counts_skipped_toward_planned_only() {
        let subject = SubjectId::generate();
        let sessions = vec![session(
            Some(subject),
            fixed_today(),
            "10:00",
            "11:00",
            SessionStatus::Skipped,
        )];

        let totals = subject_hours(&sessions);
        let hours = totals[&subject];
        assert!((hours.done - 0.0).abs() < 1e-9);
        assert!((hours.planned - 1.0).abs() < 1e-9);
    }

    #[test]
    fn subject_hours_is_additive_over_concatenation() {
        let subject = SubjectId::generate();
        let first = vec![session(
            Some(subject),
            fixed_today(),
            "09:00",
            "10:00",
            SessionStatus::Done,
        )];
        let second = vec![session(
            Some(subject),
            fixed_today(),
            "11:00",
            "11:30",
            SessionStatus::Done,
        )];

        let mut concatenated = first.clone();
        concatenated.extend(second.clone());

        let merged = subject_hours(&concatenated);
        let a = subject_hours(&first);
        let b = subject_hours(&second);

        let expected_done = a[&subject].done + b[&subject].done;
        let expected_planned = a[&subject].planned + b[&subject].planned;
        assert!((merged[&subject].done - expected_done).abs() < 1e-9);
        assert!((merged[&subject].planned - expected_planned).abs() < 1e-9);
    }

    #[test]
    fn subject_hours_on_empty_input_is_empty() {
        assert!(subject_hours(&[]).is_empty());
    }

    #[test]
    fn subject_hours_ignores_generic_sessions() {
        let sessions = vec![session(
            None,
            fixed_today(),
            "09:00",
            "10:00",
            SessionStatus::Done,
        )];
        assert!(subject_hours(&sessions).is_empty());
    }

    #[test]
    fn week_bounds_are_monday_through_sunday() {
        // 2026-01-09 is a Friday.
        let (monday, sunday) = week_bounds(date(2026, 1, 9));
        assert_eq!(monday, date(2026, 1, 5));
        assert_eq!(sunday, date(2026, 1, 11));

        // A Monday is its own week start.
        let (monday, _) = week_bounds(date(2026, 1, 5));
        assert_eq!(monday, date(2026, 1, 5));
    }

    #[test]
    fn weekly_total_includes_monday_excludes_prior_sunday() {
        let subject = SubjectId::generate();
        let reference = date(2026, 1, 9);
        let sessions = vec![
            // Monday of the reference week: counted.
            session(
                Some(subject),
                date(2026, 1, 5),
                "09:00",
                "10:00",
                SessionStatus::Done,
            ),
            // Sunday before the reference week: not counted.
            session(
                Some(subject),
                date(2026, 1, 4),
                "09:00",
                "10:00",
                SessionStatus::Done,
            ),
            // In the week but still planned: not counted.
            session(
                Some(subject),
                date(2026, 1, 7),
                "09:00",
                "10:00",
                SessionStatus::Planned,
            ),
        ];

        let total = weekly_done_hours(&sessions, reference);
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weekly_total_of_nothing_is_zero() {
        assert!((weekly_done_hours(&[], fixed_today()) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn streak_forgives_an_empty_reference_day_once() {
        // Done on N-4..N-1, nothing today: streak is 4, not 0.
        let today = fixed_today();
        let done: HashSet<NaiveDate> = (1..=4).map(|back| today - Duration::days(back)).collect();
        assert_eq!(streak_from_dates(&done, today), 4);
    }

    #[test]
    fn streak_stops_at_the_first_real_gap() {
        // Done on N-1 and N-3 but not N-2: only N-1 counts.
        let today = fixed_today();
        let done: HashSet<NaiveDate> = [today - Duration::days(1), today - Duration::days(3)]
            .into_iter()
            .collect();
        assert_eq!(streak_from_dates(&done, today), 1);
    }

    #[test]
    fn streak_counts_the_reference_day_when_done() {
        let today = fixed_today();
        let done: HashSet<NaiveDate> = [today, today - Duration::days(1)].into_iter().collect();
        assert_eq!(streak_from_dates(&done, today), 2);
    }

    #[test]
    fn streak_is_zero_when_yesterday_breaks_immediately() {
        let done = HashSet::new();
        assert_eq!(streak_from_dates(&done, fixed_today()), 0);
    }

    #[test]
    fn streak_is_capped_by_probe_bound() {
        let walked = streak(|_| true, fixed_today());
        assert_eq!(walked, MAX_STREAK_PROBES);
    }

    #[test]
    fn target_progress_clamps_over_achievement() {
        let percent = target_progress(25.0, Some(20.0)).unwrap();
        assert!((percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn target_progress_distinguishes_no_target_from_zero() {
        assert_eq!(target_progress(5.0, None), None);
        assert_eq!(target_progress(5.0, Some(0.0)), None);
        assert_eq!(target_progress(5.0, Some(-3.0)), None);

        let zero = target_progress(0.0, Some(20.0)).unwrap();
        assert!((zero - 0.0).abs() < 1e-9);
    }

    #[test]
    fn target_progress_reports_partial_completion() {
        let percent = target_progress(5.0, Some(20.0)).unwrap();
        assert!((percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn days_until_counts_forward_only() {
        let reference = date(2026, 1, 10);
        assert_eq!(days_until(Some(date(2026, 1, 15)), reference), Some(5));
        assert_eq!(days_until(Some(reference), reference), Some(0));
        assert_eq!(days_until(Some(date(2026, 1, 5)), reference), None);
        assert_eq!(days_until(None, reference), None);
    }
}
