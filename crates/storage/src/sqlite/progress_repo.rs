use tutor_core::model::{LessonProgress, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_progress_row};
use crate::repository::{LessonProgressRepository, StorageError};

#[async_trait::async_trait]
impl LessonProgressRepository for SqliteRepository {
    async fn upsert_progress(&self, progress: &LessonProgress) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lesson_progress (user_id, lesson_id, completed, completed_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                    completed = excluded.completed,
                    completed_at = excluded.completed_at
            ",
        )
        .bind(progress.user_id.to_string())
        .bind(progress.lesson_id.to_string())
        .bind(progress.completed)
        .bind(progress.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::NotFound,
            other => conn(other),
        })?;

        Ok(())
    }

    async fn list_progress(&self, user_id: UserId) -> Result<Vec<LessonProgress>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT user_id, lesson_id, completed, completed_at
                FROM lesson_progress
                WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_progress_row).collect()
    }
}
