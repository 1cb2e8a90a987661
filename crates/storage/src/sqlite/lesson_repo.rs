use tutor_core::model::{Lesson, LessonId, Subject, UserId};

use super::SqliteRepository;
use super::mapping::{conn, content_to_json, exercises_to_json, map_lesson_row};
use crate::repository::{LessonRepository, StorageError};

const LESSON_COLUMNS: &str = r"
    id, tutor_id, title, description, subject, level, duration_minutes,
    content, exercises, is_published, created_at
";

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lessons (
                    id, tutor_id, title, description, subject, level, duration_minutes,
                    content, exercises, is_published, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(id) DO UPDATE SET
                    tutor_id = excluded.tutor_id,
                    title = excluded.title,
                    description = excluded.description,
                    subject = excluded.subject,
                    level = excluded.level,
                    duration_minutes = excluded.duration_minutes,
                    content = excluded.content,
                    exercises = excluded.exercises,
                    is_published = excluded.is_published
            ",
        )
        .bind(lesson.id().to_string())
        .bind(lesson.tutor_id().to_string())
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.subject().as_str())
        .bind(lesson.level())
        .bind(i64::from(lesson.duration_minutes()))
        .bind(content_to_json(lesson.content())?)
        .bind(exercises_to_json(lesson.exercises())?)
        .bind(lesson.is_published())
        .bind(lesson.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Lesson, StorageError> {
        let sql = format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_lesson_row(&row)
    }

    async fn list_published(&self, subject: Subject) -> Result<Vec<Lesson>, StorageError> {
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons
             WHERE subject = ?1 AND is_published = 1
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(subject.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn list_by_tutor(&self, tutor_id: UserId) -> Result<Vec<Lesson>, StorageError> {
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons
             WHERE tutor_id = ?1
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(tutor_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn set_published(&self, id: LessonId, is_published: bool) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE lessons SET is_published = ?1 WHERE id = ?2")
            .bind(is_published)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM lessons WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
