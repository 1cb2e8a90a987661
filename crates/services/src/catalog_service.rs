use std::collections::HashSet;
use std::sync::Arc;

use storage::repository::{LessonProgressRepository, LessonRepository};
use tutor_core::model::{Lesson, LessonId, LessonProgress, Subject, UserId};

use crate::Clock;
use crate::error::LessonServiceError;

/// A published lesson as listed on a subject page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonListItem {
    pub lesson_id: LessonId,
    pub title: String,
    pub description: String,
    pub level: String,
    pub duration_minutes: u32,
    pub exercise_count: usize,
    pub is_completed: bool,
}

impl LessonListItem {
    fn from_lesson(lesson: &Lesson, is_completed: bool) -> Self {
        Self {
            lesson_id: lesson.id(),
            title: lesson.title().to_owned(),
            description: lesson.description().to_owned(),
            level: lesson.level().to_owned(),
            duration_minutes: lesson.duration_minutes(),
            exercise_count: lesson.exercises().len(),
            is_completed,
        }
    }
}

/// Student-side browsing of published lessons and completion tracking.
#[derive(Clone)]
pub struct LessonCatalogService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    progress: Arc<dyn LessonProgressRepository>,
}

impl LessonCatalogService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lessons: Arc<dyn LessonRepository>,
        progress: Arc<dyn LessonProgressRepository>,
    ) -> Self {
        Self {
            clock,
            lessons,
            progress,
        }
    }

    /// Published lessons of `subject` with `user_id`'s completion flags.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if repository access fails.
    pub async fn list_subject(
        &self,
        user_id: UserId,
        subject: Subject,
    ) -> Result<Vec<LessonListItem>, LessonServiceError> {
        let lessons = self.lessons.list_published(subject).await?;
        let completed: HashSet<LessonId> = self
            .progress
            .list_progress(user_id)
            .await?
            .into_iter()
            .filter(|p| p.completed)
            .map(|p| p.lesson_id)
            .collect();

        Ok(lessons
            .iter()
            .map(|lesson| LessonListItem::from_lesson(lesson, completed.contains(&lesson.id())))
            .collect())
    }

    /// Fetch a lesson for reading.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` if the lesson does not exist.
    pub async fn lesson(&self, lesson_id: LessonId) -> Result<Lesson, LessonServiceError> {
        Ok(self.lessons.get_lesson(lesson_id).await?)
    }

    /// Mark a lesson as finished by a student.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` if the lesson does not exist.
    pub async fn mark_completed(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<(), LessonServiceError> {
        let progress = LessonProgress::completed(user_id, lesson_id, self.clock.now());
        self.progress.upsert_progress(&progress).await?;
        log::debug!("user {user_id} completed lesson {lesson_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use tutor_core::time::{fixed_clock, fixed_now};

    async fn seed(repo: &InMemoryRepository, title: &str, subject: Subject, published: bool) -> LessonId {
        let lesson = Lesson::new(LessonId::random(), UserId::random(), title, "", subject, fixed_now())
            .unwrap()
            .published(published);
        repo.upsert_lesson(&lesson).await.unwrap();
        lesson.id()
    }

    #[tokio::test]
    async fn lists_published_lessons_with_completion() {
        let repo = InMemoryRepository::new();
        let done = seed(&repo, "Les volcans", Subject::Science, true).await;
        let todo = seed(&repo, "Les plantes", Subject::Science, true).await;
        seed(&repo, "Brouillon", Subject::Science, false).await;
        seed(&repo, "Les nombres", Subject::Math, true).await;

        let svc = LessonCatalogService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo));
        let student = UserId::random();
        svc.mark_completed(student, done).await.unwrap();

        let items = svc.list_subject(student, Subject::Science).await.unwrap();
        assert_eq!(items.len(), 2);
        let flag = |id| items.iter().find(|i| i.lesson_id == id).map(|i| i.is_completed);
        assert_eq!(flag(done), Some(true));
        assert_eq!(flag(todo), Some(false));

        let other = svc.list_subject(UserId::random(), Subject::Science).await.unwrap();
        assert!(other.iter().all(|i| !i.is_completed));
    }

    #[tokio::test]
    async fn missing_lesson_is_not_found() {
        let repo = InMemoryRepository::new();
        let svc = LessonCatalogService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo));
        assert!(matches!(
            svc.lesson(LessonId::random()).await,
            Err(LessonServiceError::NotFound)
        ));
    }
}
