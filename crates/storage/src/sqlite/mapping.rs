use sqlx::Row;
use uuid::Uuid;

use revise_core::model::{
    CalendarEvent, EventId, EventKind, PlannerPreferences, Profile, RevisionSession, SessionId,
    SessionStatus, Subject, SubjectId, SubjectStatus, UserId,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn uuid_from_text(field: &'static str, raw: &str) -> Result<Uuid, StorageError> {
    raw.parse::<Uuid>()
        .map_err(|_| StorageError::Serialization(format!("invalid {field}: {raw}")))
}

pub(crate) fn user_id_from_text(raw: &str) -> Result<UserId, StorageError> {
    Ok(UserId::new(uuid_from_text("user_id", raw)?))
}

pub(crate) fn subject_id_from_text(raw: &str) -> Result<SubjectId, StorageError> {
    Ok(SubjectId::new(uuid_from_text("subject_id", raw)?))
}

pub(crate) fn session_id_from_text(raw: &str) -> Result<SessionId, StorageError> {
    Ok(SessionId::new(uuid_from_text("session_id", raw)?))
}

pub(crate) fn event_id_from_text(raw: &str) -> Result<EventId, StorageError> {
    Ok(EventId::new(uuid_from_text("event_id", raw)?))
}

pub(crate) fn parse_subject_status(s: &str) -> Result<SubjectStatus, StorageError> {
    match s {
        "active" => Ok(SubjectStatus::Active),
        "archived" => Ok(SubjectStatus::Archived),
        _ => Err(StorageError::Serialization(format!("invalid status: {s}"))),
    }
}

pub(crate) fn parse_session_status(s: &str) -> Result<SessionStatus, StorageError> {
    match s {
        "planned" => Ok(SessionStatus::Planned),
        "done" => Ok(SessionStatus::Done),
        "skipped" => Ok(SessionStatus::Skipped),
        _ => Err(StorageError::Serialization(format!("invalid status: {s}"))),
    }
}

pub(crate) fn parse_event_kind(s: &str) -> Result<EventKind, StorageError> {
    match s {
        "course" => Ok(EventKind::Course),
        "work" => Ok(EventKind::Work),
        "personal" => Ok(EventKind::Personal),
        "other" => Ok(EventKind::Other),
        _ => Err(StorageError::Serialization(format!("invalid kind: {s}"))),
    }
}

fn difficulty_from_i64(v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid difficulty: {v}")))
}

pub(crate) fn map_subject_row(row: &sqlx::sqlite::SqliteRow) -> Result<Subject, StorageError> {
    let status_str: String = row.try_get("status").map_err(ser)?;

    Subject::from_persisted(
        subject_id_from_text(&row.try_get::<String, _>("id").map_err(ser)?)?,
        user_id_from_text(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("color").map_err(ser)?,
        row.try_get("exam_date").map_err(ser)?,
        row.try_get("exam_weight").map_err(ser)?,
        row.try_get("target_hours").map_err(ser)?,
        row.try_get("notes").map_err(ser)?,
        row.try_get("exam_type").map_err(ser)?,
        row.try_get::<Option<i64>, _>("difficulty_level")
            .map_err(ser)?
            .map(difficulty_from_i64)
            .transpose()?,
        parse_subject_status(status_str.as_str())?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_session_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<RevisionSession, StorageError> {
    let status_str: String = row.try_get("status").map_err(ser)?;

    RevisionSession::from_persisted(
        session_id_from_text(&row.try_get::<String, _>("id").map_err(ser)?)?,
        user_id_from_text(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        row.try_get::<Option<String>, _>("subject_id")
            .map_err(ser)?
            .map(|raw| subject_id_from_text(&raw))
            .transpose()?,
        row.try_get("date").map_err(ser)?,
        row.try_get("start_time").map_err(ser)?,
        row.try_get("end_time").map_err(ser)?,
        parse_session_status(status_str.as_str())?,
        row.try_get("notes").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_event_row(row: &sqlx::sqlite::SqliteRow) -> Result<CalendarEvent, StorageError> {
    let kind_str: String = row.try_get("kind").map_err(ser)?;

    CalendarEvent::new(
        event_id_from_text(&row.try_get::<String, _>("id").map_err(ser)?)?,
        user_id_from_text(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get("start_at").map_err(ser)?,
        row.try_get("end_at").map_err(ser)?,
        row.try_get("is_blocking").map_err(ser)?,
        parse_event_kind(kind_str.as_str())?,
        row.try_get("subject_name").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_profile_row(row: &sqlx::sqlite::SqliteRow) -> Result<Profile, StorageError> {
    Profile::from_persisted(
        row.try_get("first_name").map_err(ser)?,
        row.try_get("last_name").map_err(ser)?,
        row.try_get("email").map_err(ser)?,
        row.try_get("school").map_err(ser)?,
        row.try_get("level").map_err(ser)?,
        row.try_get("study_domain").map_err(ser)?,
        row.try_get("main_exam_period").map_err(ser)?,
        row.try_get("weekly_goal_hours").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_preferences_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<PlannerPreferences, StorageError> {
    let mask_i64: i64 = row.try_get("preferred_days_mask").map_err(ser)?;
    let mask = u8::try_from(mask_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid days mask: {mask_i64}")))?;
    let max_hours = u32::try_from(row.try_get::<i64, _>("max_hours_per_day").map_err(ser)?)
        .map_err(|_| StorageError::Serialization("invalid max_hours_per_day".into()))?;
    let duration = u32::try_from(
        row.try_get::<i64, _>("session_duration_minutes")
            .map_err(ser)?,
    )
    .map_err(|_| StorageError::Serialization("invalid session_duration_minutes".into()))?;

    PlannerPreferences::new(
        mask,
        row.try_get("daily_start").map_err(ser)?,
        row.try_get("daily_end").map_err(ser)?,
        max_hours,
        duration,
        row.try_get("avoid_early_morning").map_err(ser)?,
        row.try_get("avoid_late_evening").map_err(ser)?,
    )
    .map_err(ser)
}
