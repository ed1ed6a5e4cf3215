use std::fmt;

use chrono::NaiveDate;
use revise_core::model::UserId;
use services::{AgendaEntry, AppServices, Clock};
use tracing::info;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidDate { raw: String },
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
            ArgsError::InvalidDate { raw } => {
                write!(f, "invalid --date value (expected YYYY-MM-DD): {raw}")
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

struct Args {
    db_url: String,
    user_id: UserId,
    date: Option<NaiveDate>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] --user <uuid> [--date <YYYY-MM-DD>]");
    eprintln!();
    eprintln!("Prints the day agenda and the progress overview for one user.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:dev.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  REVISE_DB_URL, REVISE_USER_ID");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("REVISE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut user_id = std::env::var("REVISE_USER_ID")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok());
        let mut date = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(args, "--user")?;
                    let parsed = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value })?;
                    user_id = Some(parsed);
                }
                "--date" => {
                    let value = require_value(args, "--date")?;
                    let parsed = value
                        .parse::<NaiveDate>()
                        .map_err(|_| ArgsError::InvalidDate { raw: value })?;
                    date = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let user_id = user_id.ok_or(ArgsError::MissingValue { flag: "--user" })?;

        Ok(Self {
            db_url,
            user_id,
            date,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn print_agenda(entries: &[AgendaEntry]) {
    if entries.is_empty() {
        println!("  (nothing planned)");
        return;
    }
    for entry in entries {
        match entry {
            AgendaEntry::Session { session, subject } => {
                let label = subject.as_ref().map_or("révision libre", |s| s.name());
                println!(
                    "  {} - {}  {}  [{}]",
                    session.start().format("%H:%M"),
                    session.end().format("%H:%M"),
                    label,
                    session.status()
                );
            }
            AgendaEntry::Event(event) => {
                println!(
                    "  {} - {}  {}  [{}]",
                    event.start().format("%H:%M"),
                    event.end().format("%H:%M"),
                    event.title(),
                    event.kind()
                );
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let clock = Clock::default();
    let app = AppServices::new_sqlite(&args.db_url, clock).await?;
    info!(user = %args.user_id, "loading planner overview");

    let date = args.date.unwrap_or_else(|| clock.today());

    let agenda = app.agenda().day_agenda(args.user_id, date).await?;
    println!("Agenda {date}");
    print_agenda(&agenda);

    let overview = app.progress().progression(args.user_id).await?;
    println!();
    println!(
        "Semaine {} au {}: {:.1} h",
        overview.weekly.week_start, overview.weekly.week_end, overview.weekly.done_hours
    );
    if let (Some(goal), Some(percent)) = (overview.weekly.goal_hours, overview.weekly.percent) {
        println!("  objectif {goal:.1} h ({percent:.0}%)");
    }
    println!("Série: {} jours", overview.streak_days);

    if !overview.subjects.is_empty() {
        println!();
        println!("Par matière:");
        for item in &overview.subjects {
            let mut line = format!(
                "  {}  {:.1} h / {:.1} h planifiées",
                item.name, item.hours.done, item.hours.planned
            );
            if let Some(percent) = item.target_percent {
                line.push_str(&format!("  objectif {percent:.0}%"));
            }
            if let Some(days) = item.days_until_exam {
                line.push_str(&format!("  examen dans {days} j"));
            }
            println!("{line}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
