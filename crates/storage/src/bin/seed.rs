use std::fmt;

use chrono::{DateTime, Duration, Utc};
use revise_core::model::{
    CalendarEvent, EventId, EventKind, ProfileDraft, RevisionSession, SessionId, Subject,
    SubjectId, UserId, parse_time_of_day,
};
use storage::repository::{
    EventRepository, ProfileRepository, SessionRepository, Storage, SubjectRepository,
};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => {
                write!(f, "invalid --user value (expected UUID): {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("REVISE_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user_id = std::env::var("REVISE_USER_ID")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok())
            .unwrap_or_else(UserId::generate);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user_id = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value })?;
                    now = Some(parsed.with_timezone(&Utc));
                }
                other => return Err(ArgsError::UnknownArg(other.to_string())),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            now,
        })
    }
}

struct SubjectSpec {
    name: &'static str,
    color: &'static str,
    target_hours: f64,
    exam_in_days: i64,
}

const SUBJECTS: &[SubjectSpec] = &[
    SubjectSpec {
        name: "Mathématiques",
        color: "#3b82f6",
        target_hours: 20.0,
        exam_in_days: 30,
    },
    SubjectSpec {
        name: "Physique-Chimie",
        color: "#10b981",
        target_hours: 15.0,
        exam_in_days: 45,
    },
    SubjectSpec {
        name: "Histoire-Géo",
        color: "#8b5cf6",
        target_hours: 10.0,
        exam_in_days: 60,
    },
];

async fn seed(storage: &Storage, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let now = args.now.unwrap_or_else(Utc::now);
    let today = now.date_naive();
    let user_id = args.user_id;

    let profile = ProfileDraft {
        first_name: Some("Marie".into()),
        level: Some("Terminale".into()),
        weekly_goal_hours: Some(12.0),
        ..ProfileDraft::new()
    }
    .validate()?;
    storage.profiles.upsert_profile(user_id, &profile).await?;

    let mut subject_ids = Vec::new();
    for spec in SUBJECTS {
        let subject = Subject::new(
            SubjectId::generate(),
            user_id,
            spec.name,
            spec.color,
            Some(today + Duration::days(spec.exam_in_days)),
            None,
            Some(spec.target_hours),
            None,
            None,
            None,
            now,
        )?;
        storage.subjects.upsert_subject(&subject).await?;
        subject_ids.push(subject.id());
    }

    // A done session on each of the past four days keeps a streak alive,
    // plus a planned one for this evening.
    for back in 1..=4 {
        let subject = subject_ids[back % subject_ids.len()];
        let mut session = RevisionSession::new(
            SessionId::generate(),
            user_id,
            Some(subject),
            today - Duration::days(back as i64),
            parse_time_of_day("18:00")?,
            parse_time_of_day("19:30")?,
            None,
            now,
        )?;
        session.mark_done()?;
        storage.sessions.upsert_session(&session).await?;
    }

    let planned = RevisionSession::new(
        SessionId::generate(),
        user_id,
        Some(subject_ids[0]),
        today,
        parse_time_of_day("18:00")?,
        parse_time_of_day("19:00")?,
        Some("réviser les intégrales".into()),
        now,
    )?;
    storage.sessions.upsert_session(&planned).await?;

    let course = CalendarEvent::new(
        EventId::generate(),
        user_id,
        "Cours de maths",
        now,
        now + Duration::hours(2),
        true,
        EventKind::Course,
        Some("Mathématiques".into()),
    )?;
    storage.events.upsert_event(&course).await?;

    println!("seeded {} subjects for user {user_id}", subject_ids.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("usage: seed [--db <url>] [--user <uuid>] [--now <rfc3339>]");
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    seed(&storage, &args).await
}
