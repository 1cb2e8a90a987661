use sqlx::Row;
use tutor_core::model::{
    AnswerSheet, Exercise, Lesson, LessonId, LessonProgress, QuizAttempt, Section, Subject, UserId,
};

use crate::repository::{AttemptRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn lesson_id_from_str(raw: &str) -> Result<LessonId, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn user_id_from_str(raw: &str) -> Result<UserId, StorageError> {
    raw.parse().map_err(ser)
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn content_to_json(content: &[Section]) -> Result<String, StorageError> {
    serde_json::to_string(content).map_err(ser)
}

pub(crate) fn exercises_to_json(exercises: &[Exercise]) -> Result<String, StorageError> {
    serde_json::to_string(exercises).map_err(ser)
}

pub(crate) fn answers_to_json(answers: &AnswerSheet) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn map_lesson_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lesson, StorageError> {
    let id = lesson_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let tutor_id = user_id_from_str(&row.try_get::<String, _>("tutor_id").map_err(ser)?)?;
    let subject = Subject::parse(&row.try_get::<String, _>("subject").map_err(ser)?).map_err(ser)?;
    let content: Vec<Section> =
        serde_json::from_str(&row.try_get::<String, _>("content").map_err(ser)?).map_err(ser)?;
    let exercises: Vec<Exercise> =
        serde_json::from_str(&row.try_get::<String, _>("exercises").map_err(ser)?).map_err(ser)?;
    let duration = u32_from_i64(
        "duration_minutes",
        row.try_get::<i64, _>("duration_minutes").map_err(ser)?,
    )?;

    let lesson = Lesson::new(
        id,
        tutor_id,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        subject,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)?
    .with_level(row.try_get::<String, _>("level").map_err(ser)?)
    .with_duration_minutes(duration)
    .with_content(content)
    .with_exercises(exercises)
    .published(row.try_get::<bool, _>("is_published").map_err(ser)?);

    Ok(lesson)
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptRow, StorageError> {
    let answers: AnswerSheet =
        serde_json::from_str(&row.try_get::<String, _>("answers").map_err(ser)?).map_err(ser)?;
    let attempt = QuizAttempt::new(
        user_id_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        lesson_id_from_str(&row.try_get::<String, _>("lesson_id").map_err(ser)?)?,
        u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        u32_from_i64("total_points", row.try_get::<i64, _>("total_points").map_err(ser)?)?,
        answers,
        row.try_get("submitted_at").map_err(ser)?,
    )
    .map_err(ser)?;

    Ok(AttemptRow::new(row.try_get("id").map_err(ser)?, attempt))
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<LessonProgress, StorageError> {
    Ok(LessonProgress {
        user_id: user_id_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        lesson_id: lesson_id_from_str(&row.try_get::<String, _>("lesson_id").map_err(ser)?)?,
        completed: row.try_get("completed").map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_sheet_json_keeps_integer_indices() {
        let mut answers = AnswerSheet::new();
        answers.insert(0, "paris".into());
        answers.insert(3, "TRUE".into());
        let json = answers_to_json(&answers).unwrap();
        assert_eq!(json, r#"{"0":"paris","3":"TRUE"}"#);
        let back: AnswerSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }

    #[test]
    fn malformed_ids_are_serialization_errors() {
        assert!(matches!(
            lesson_id_from_str("42"),
            Err(StorageError::Serialization(_))
        ));
    }
}
