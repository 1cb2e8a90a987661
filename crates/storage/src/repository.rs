use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tutor_core::model::{Lesson, LessonId, LessonProgress, QuizAttempt, Subject, UserId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage identifier for a recorded quiz attempt.
///
/// `i64` to match `SQLite` row IDs.
pub type AttemptId = i64;

/// A persisted attempt together with its storage ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRow {
    pub id: AttemptId,
    pub attempt: QuizAttempt,
}

impl AttemptRow {
    #[must_use]
    pub fn new(id: AttemptId, attempt: QuizAttempt) -> Self {
        Self { id, attempt }
    }
}

/// Repository contract for lessons (the `lessons` table).
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Persist or replace a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Fetch a lesson with its content and exercises.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_lesson(&self, id: LessonId) -> Result<Lesson, StorageError>;

    /// Published lessons of a subject, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_published(&self, subject: Subject) -> Result<Vec<Lesson>, StorageError>;

    /// Every lesson authored by a tutor, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_by_tutor(&self, tutor_id: UserId) -> Result<Vec<Lesson>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn set_published(&self, id: LessonId, is_published: bool) -> Result<(), StorageError>;

    /// Delete a lesson along with its progress rows and attempts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError>;
}

/// Repository contract for the attempt history (the `quiz_attempts` table).
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append a submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn record_attempt(&self, attempt: &QuizAttempt) -> Result<AttemptId, StorageError>;

    /// Attempts of one user on one lesson, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_attempts(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError>;
}

/// Repository contract for per-user lesson completion (the `lesson_progress` table).
#[async_trait]
pub trait LessonProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn upsert_progress(&self, progress: &LessonProgress) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<LessonProgress>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    lessons: Arc<Mutex<HashMap<LessonId, Lesson>>>,
    attempts: Arc<Mutex<Vec<AttemptRow>>>,
    progress: Arc<Mutex<HashMap<(UserId, LessonId), LessonProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Mirrors the foreign keys of the SQLite schema.
    fn ensure_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        if guard.contains_key(&id) {
            Ok(())
        } else {
            Err(StorageError::NotFound)
        }
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lessons.lock().map_err(poisoned)?;
        guard.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Lesson, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_published(&self, subject: Subject) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        let mut found: Vec<Lesson> = guard
            .values()
            .filter(|l| l.subject() == subject && l.is_published())
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then(a.id().cmp(&b.id())));
        Ok(found)
    }

    async fn list_by_tutor(&self, tutor_id: UserId) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        let mut found: Vec<Lesson> = guard
            .values()
            .filter(|l| l.tutor_id() == tutor_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        Ok(found)
    }

    async fn set_published(&self, id: LessonId, is_published: bool) -> Result<(), StorageError> {
        let mut guard = self.lessons.lock().map_err(poisoned)?;
        let lesson = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        lesson.set_published(is_published);
        Ok(())
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        {
            let mut guard = self.lessons.lock().map_err(poisoned)?;
            guard.remove(&id).ok_or(StorageError::NotFound)?;
        }
        self.progress
            .lock()
            .map_err(poisoned)?
            .retain(|(_, lesson_id), _| *lesson_id != id);
        self.attempts
            .lock()
            .map_err(poisoned)?
            .retain(|row| row.attempt.lesson_id() != id);
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn record_attempt(&self, attempt: &QuizAttempt) -> Result<AttemptId, StorageError> {
        self.ensure_lesson(attempt.lesson_id())?;
        let mut guard = self.attempts.lock().map_err(poisoned)?;
        let id = guard.last().map_or(1, |row| row.id + 1);
        guard.push(AttemptRow::new(id, attempt.clone()));
        Ok(id)
    }

    async fn list_attempts(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut found: Vec<AttemptRow> = guard
            .iter()
            .filter(|row| row.attempt.user_id() == user_id && row.attempt.lesson_id() == lesson_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.attempt
                .submitted_at()
                .cmp(&a.attempt.submitted_at())
                .then(b.id.cmp(&a.id))
        });
        found.truncate(limit);
        Ok(found)
    }
}

#[async_trait]
impl LessonProgressRepository for InMemoryRepository {
    async fn upsert_progress(&self, progress: &LessonProgress) -> Result<(), StorageError> {
        self.ensure_lesson(progress.lesson_id)?;
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert((progress.user_id, progress.lesson_id), progress.clone());
        Ok(())
    }

    async fn list_progress(&self, user_id: UserId) -> Result<Vec<LessonProgress>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub lessons: Arc<dyn LessonRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub progress: Arc<dyn LessonProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            lessons: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            progress: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tutor_core::model::{AnswerSheet, Exercise, ExerciseKind};
    use tutor_core::time::fixed_now;

    fn lesson(tutor: UserId, subject: Subject, minutes_after: i64) -> Lesson {
        Lesson::new(
            LessonId::random(),
            tutor,
            "Lesson",
            "",
            subject,
            fixed_now() + Duration::minutes(minutes_after),
        )
        .unwrap()
        .with_exercises(vec![
            Exercise::new("Q", ExerciseKind::ShortAnswer, vec![], "a", "", 1).unwrap(),
        ])
    }

    #[tokio::test]
    async fn missing_lesson_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get_lesson(LessonId::random()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn published_listing_filters_subject_and_status() {
        let repo = InMemoryRepository::new();
        let tutor = UserId::random();
        let visible = lesson(tutor, Subject::Math, 0).published(true);
        let draft = lesson(tutor, Subject::Math, 1);
        let other = lesson(tutor, Subject::Arts, 2).published(true);
        for l in [&visible, &draft, &other] {
            repo.upsert_lesson(l).await.unwrap();
        }

        let listed = repo.list_published(Subject::Math).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), visible.id());

        let mine = repo.list_by_tutor(tutor).await.unwrap();
        assert_eq!(mine.len(), 3);
        assert_eq!(mine[0].id(), other.id());
    }

    #[tokio::test]
    async fn delete_cascades_to_attempts_and_progress() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let l = lesson(UserId::random(), Subject::French, 0);
        repo.upsert_lesson(&l).await.unwrap();
        let attempt =
            QuizAttempt::new(user, l.id(), 1, 1, AnswerSheet::new(), fixed_now()).unwrap();
        repo.record_attempt(&attempt).await.unwrap();
        repo.upsert_progress(&LessonProgress::completed(user, l.id(), fixed_now()))
            .await
            .unwrap();

        repo.delete_lesson(l.id()).await.unwrap();

        assert!(repo.list_attempts(user, l.id(), 10).await.unwrap().is_empty());
        assert!(repo.list_progress(user).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete_lesson(l.id()).await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[tokio::test]
    async fn attempts_require_an_existing_lesson() {
        let repo = InMemoryRepository::new();
        let attempt = QuizAttempt::new(
            UserId::random(),
            LessonId::random(),
            0,
            1,
            AnswerSheet::new(),
            fixed_now(),
        )
        .unwrap();
        assert!(matches!(
            repo.record_attempt(&attempt).await.unwrap_err(),
            StorageError::NotFound
        ));
    }
}
