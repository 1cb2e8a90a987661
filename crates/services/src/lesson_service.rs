use std::sync::Arc;

use storage::repository::LessonRepository;
use tutor_core::model::{Exercise, Lesson, LessonId, Section, Subject, UserId};

use crate::Clock;
use crate::error::LessonServiceError;

/// Fields a tutor fills in when authoring a lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonDraft {
    pub title: String,
    pub description: String,
    pub subject: Subject,
    pub level: String,
    pub duration_minutes: u32,
    pub content: Vec<Section>,
    pub exercises: Vec<Exercise>,
    pub is_published: bool,
}

/// Tutor-side lesson management: authoring, publishing, deleting.
#[derive(Clone)]
pub struct LessonService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
}

impl LessonService {
    #[must_use]
    pub fn new(clock: Clock, lessons: Arc<dyn LessonRepository>) -> Self {
        Self { clock, lessons }
    }

    /// Create and persist a new lesson owned by `tutor_id`.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Lesson` for validation failures.
    /// Returns `LessonServiceError::Storage` if persistence fails.
    pub async fn create_lesson(
        &self,
        tutor_id: UserId,
        draft: LessonDraft,
    ) -> Result<LessonId, LessonServiceError> {
        let lesson = build(LessonId::random(), tutor_id, draft, self.clock.now())?;
        self.lessons.upsert_lesson(&lesson).await?;
        log::info!("tutor {tutor_id} created lesson {}", lesson.id());
        Ok(lesson.id())
    }

    /// Replace an existing lesson's fields, keeping its owner and creation time.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` if the lesson does not exist.
    /// Returns `LessonServiceError::Lesson` for validation failures.
    pub async fn save_lesson(
        &self,
        lesson_id: LessonId,
        draft: LessonDraft,
    ) -> Result<Lesson, LessonServiceError> {
        let existing = self.lessons.get_lesson(lesson_id).await?;
        let lesson = build(lesson_id, existing.tutor_id(), draft, existing.created_at())?;
        self.lessons.upsert_lesson(&lesson).await?;
        Ok(lesson)
    }

    /// Lessons authored by `tutor_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if repository access fails.
    pub async fn list_for_tutor(&self, tutor_id: UserId) -> Result<Vec<Lesson>, LessonServiceError> {
        Ok(self.lessons.list_by_tutor(tutor_id).await?)
    }

    /// Flip the published flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` if the lesson does not exist.
    pub async fn toggle_publish(&self, lesson_id: LessonId) -> Result<bool, LessonServiceError> {
        let lesson = self.lessons.get_lesson(lesson_id).await?;
        let published = !lesson.is_published();
        self.lessons.set_published(lesson_id, published).await?;
        log::debug!("lesson {lesson_id} published={published}");
        Ok(published)
    }

    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` if the lesson does not exist.
    pub async fn delete_lesson(&self, lesson_id: LessonId) -> Result<(), LessonServiceError> {
        self.lessons.delete_lesson(lesson_id).await?;
        log::info!("deleted lesson {lesson_id}");
        Ok(())
    }
}

fn build(
    id: LessonId,
    tutor_id: UserId,
    draft: LessonDraft,
    created_at: chrono::DateTime<chrono::Utc>,
) -> Result<Lesson, LessonServiceError> {
    let lesson = Lesson::new(
        id,
        tutor_id,
        draft.title,
        draft.description,
        draft.subject,
        created_at,
    )?
    .with_level(draft.level)
    .with_duration_minutes(draft.duration_minutes)
    .with_content(draft.content)
    .with_exercises(draft.exercises)
    .published(draft.is_published);
    Ok(lesson)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use tutor_core::model::{ExerciseKind, LessonError};
    use tutor_core::time::fixed_clock;

    fn draft(title: &str) -> LessonDraft {
        LessonDraft {
            title: title.to_owned(),
            description: "Les fractions simples".to_owned(),
            subject: Subject::Math,
            level: "CM1".to_owned(),
            duration_minutes: 20,
            content: vec![Section::new("Introduction", "Une fraction a un numérateur.")],
            exercises: vec![
                Exercise::new("1/2 + 1/2 ?", ExerciseKind::ShortAnswer, vec![], "1", "", 5)
                    .unwrap(),
            ],
            is_published: false,
        }
    }

    fn service() -> LessonService {
        LessonService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn create_then_toggle_publish() {
        let svc = service();
        let tutor = UserId::random();
        let id = svc.create_lesson(tutor, draft("Fractions")).await.unwrap();

        assert!(svc.toggle_publish(id).await.unwrap());
        assert!(!svc.toggle_publish(id).await.unwrap());

        let listed = svc.list_for_tutor(tutor).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title(), "Fractions");
        assert_eq!(listed[0].total_points(), 5);
    }

    #[tokio::test]
    async fn save_keeps_owner_and_rejects_blank_title() {
        let svc = service();
        let tutor = UserId::random();
        let id = svc.create_lesson(tutor, draft("Fractions")).await.unwrap();

        let saved = svc.save_lesson(id, draft("Fractions 2")).await.unwrap();
        assert_eq!(saved.tutor_id(), tutor);
        assert_eq!(saved.title(), "Fractions 2");

        let err = svc.save_lesson(id, draft("  ")).await.unwrap_err();
        assert!(matches!(err, LessonServiceError::Lesson(LessonError::EmptyTitle)));
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_found() {
        let svc = service();
        let missing = LessonId::random();
        assert!(matches!(
            svc.toggle_publish(missing).await,
            Err(LessonServiceError::NotFound)
        ));
        assert!(matches!(
            svc.delete_lesson(missing).await,
            Err(LessonServiceError::NotFound)
        ));
    }
}
