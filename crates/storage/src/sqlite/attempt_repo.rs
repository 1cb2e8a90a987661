use tutor_core::model::{LessonId, QuizAttempt, UserId};

use super::SqliteRepository;
use super::mapping::{answers_to_json, conn, map_attempt_row};
use crate::repository::{AttemptId, AttemptRepository, AttemptRow, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn record_attempt(&self, attempt: &QuizAttempt) -> Result<AttemptId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (
                    user_id, lesson_id, score, total_points, answers, submitted_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(attempt.user_id().to_string())
        .bind(attempt.lesson_id().to_string())
        .bind(i64::from(attempt.score()))
        .bind(i64::from(attempt.total_points()))
        .bind(answers_to_json(attempt.answers())?)
        .bind(attempt.submitted_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::NotFound,
            other => conn(other),
        })?;

        Ok(res.last_insert_rowid())
    }

    async fn list_attempts(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, lesson_id, score, total_points, answers, submitted_at
                FROM quiz_attempts
                WHERE user_id = ?1 AND lesson_id = ?2
                ORDER BY submitted_at DESC, id DESC
                LIMIT ?3
            ",
        )
        .bind(user_id.to_string())
        .bind(lesson_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_attempt_row).collect()
    }
}
