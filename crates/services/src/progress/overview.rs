use chrono::NaiveDate;

use revise_core::model::SubjectId;
use revise_core::progress::SubjectHours;

/// Weekly hours against the profile goal.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// `percent` is `None` when the profile carries no usable weekly goal; a
/// gauge without a goal is simply not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyOverview {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub done_hours: f64,
    pub goal_hours: Option<f64>,
    pub percent: Option<f64>,
}

/// Per-subject line of the Matières/Progression screens.
///
/// `hours.planned` is the backdrop of the stacked bar and `hours.done`
/// the overlay; `target_percent` is `None` for subjects without a target,
/// `days_until_exam` is `None` without an upcoming exam.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectProgress {
    pub subject_id: SubjectId,
    pub name: String,
    pub color: String,
    pub hours: SubjectHours,
    pub target_hours: Option<f64>,
    pub target_percent: Option<f64>,
    pub days_until_exam: Option<i64>,
}

/// Everything the Progression screen shows in one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressOverview {
    pub weekly: WeeklyOverview,
    pub streak_days: u32,
    pub subjects: Vec<SubjectProgress>,
}
