use std::fmt;

use chrono::{DateTime, Utc};
use storage::repository::Storage;
use tutor_core::model::{Exercise, ExerciseKind, Lesson, LessonId, Section, Subject, UserId};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    lesson_id: LessonId,
    tutor_id: UserId,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLessonId { raw: String },
    InvalidTutorId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLessonId { raw } => write!(f, "invalid --lesson-id value: {raw}"),
            ArgsError::InvalidTutorId { raw } => write!(f, "invalid --tutor-id value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
            std::env::var("TUTOR_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut lesson_id = std::env::var("TUTOR_LESSON_ID")
            .ok()
            .and_then(|value| value.parse::<LessonId>().ok())
            .unwrap_or_else(LessonId::random);
        let mut tutor_id = std::env::var("TUTOR_TUTOR_ID")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok())
            .unwrap_or_else(UserId::random);
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
                "--lesson-id" => {
                    let value = require_value(&mut args, "--lesson-id")?;
                    lesson_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLessonId { raw: value.clone() })?;
                }
                "--tutor-id" => {
                    let value = require_value(&mut args, "--tutor-id")?;
                    tutor_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTutorId { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            lesson_id,
            tutor_id,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --lesson-id <uuid>        Lesson id to upsert (default: random)");
    eprintln!("  --tutor-id <uuid>         Owning tutor id (default: random)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  TUTOR_DB_URL, TUTOR_LESSON_ID, TUTOR_TUTOR_ID");
}

fn sample_lesson(args: &Args, now: DateTime<Utc>) -> Result<Lesson, Box<dyn std::error::Error>> {
    let exercises = vec![
        Exercise::new(
            "Quelle est la capitale de la France ?",
            ExerciseKind::MultipleChoice,
            vec!["Lyon".into(), "Paris".into(), "Marseille".into()],
            "Paris",
            "Paris est la capitale depuis le Moyen Âge.",
            10,
        )?,
        Exercise::new(
            "La Loire est le plus long fleuve de France.",
            ExerciseKind::TrueFalse,
            vec![],
            "true",
            "Elle mesure environ 1 000 km.",
            5,
        )?,
        Exercise::new(
            "Quel océan borde la côte ouest de la France ?",
            ExerciseKind::ShortAnswer,
            vec![],
            "Atlantique",
            "L'océan Atlantique.",
            5,
        )?,
    ];

    let lesson = Lesson::new(
        args.lesson_id,
        args.tutor_id,
        "La géographie de la France",
        "Fleuves, capitales et océans",
        Subject::History,
        now,
    )?
    .with_level("CM1")
    .with_duration_minutes(15)
    .with_content(vec![
        Section::new("Les villes", "Paris est la capitale et la plus grande ville."),
        Section::new("Les fleuves", "La Loire, la Seine, le Rhône et la Garonne."),
    ])
    .with_exercises(exercises)
    .published(true);

    Ok(lesson)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let lesson = sample_lesson(&args, now)?;
    storage.lessons.upsert_lesson(&lesson).await?;

    log::info!(
        "seeded lesson {} ({} exercises, {} points)",
        lesson.id(),
        lesson.exercises().len(),
        lesson.total_points()
    );
    println!(
        "Seeded lesson {} for tutor {} into {}",
        lesson.id(),
        lesson.tutor_id(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
