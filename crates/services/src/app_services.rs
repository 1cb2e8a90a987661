use std::sync::{Arc, Mutex, PoisonError};

use storage::repository::Storage;
use tokio::sync::mpsc::{self, Receiver};
use tutor_core::narration::VoiceSettings;

use crate::Clock;
use crate::catalog_service::LessonCatalogService;
use crate::config::AppConfig;
use crate::error::AppServicesError;
use crate::lesson_service::LessonService;
use crate::narration::{NarrationController, NarrationSession, Narrator};
use crate::quiz::{Advisory, QuizLoopService};

/// Advisories buffered before newer ones are dropped.
pub const ADVISORY_BUFFER: usize = 32;

/// Assembles app-facing services over one storage backend and one speech channel.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    catalog: Arc<LessonCatalogService>,
    lessons: Arc<LessonService>,
    narration: Arc<NarrationSession>,
    voice: VoiceSettings,
    advisories: Arc<Mutex<Option<Receiver<Advisory>>>>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage at `config.db_url`.
    ///
    /// Pass `None` as `narrator` where speech synthesis is unavailable.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        config: &AppConfig,
        clock: Clock,
        narrator: Option<Arc<dyn Narrator>>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        log::info!("storage ready at {}", config.db_url);
        Ok(Self::from_storage(&storage, config.voice.clone(), clock, narrator))
    }

    /// Build services over in-memory repositories.
    #[must_use]
    pub fn in_memory(clock: Clock, narrator: Option<Arc<dyn Narrator>>) -> Self {
        Self::from_storage(&Storage::in_memory(), VoiceSettings::default(), clock, narrator)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        voice: VoiceSettings,
        clock: Clock,
        narrator: Option<Arc<dyn Narrator>>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(ADVISORY_BUFFER);
        let quiz_loop = Arc::new(
            QuizLoopService::new(
                clock,
                Arc::clone(&storage.lessons),
                Arc::clone(&storage.attempts),
            )
            .with_advisories(tx),
        );
        let catalog = Arc::new(LessonCatalogService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.progress),
        ));
        let lessons = Arc::new(LessonService::new(clock, Arc::clone(&storage.lessons)));
        let narration = Arc::new(NarrationSession::from_option(narrator));
        if !narration.is_available() {
            log::info!("speech synthesis unavailable; narration disabled");
        }

        Self {
            quiz_loop,
            catalog,
            lessons,
            narration,
            voice,
            advisories: Arc::new(Mutex::new(Some(rx))),
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<LessonCatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    #[must_use]
    pub fn narration(&self) -> Arc<NarrationSession> {
        Arc::clone(&self.narration)
    }

    #[must_use]
    pub fn voice(&self) -> &VoiceSettings {
        &self.voice
    }

    /// A controller for one view, using the configured voice.
    #[must_use]
    pub fn narration_controller(&self) -> NarrationController {
        self.narration.controller(self.voice.clone())
    }

    /// Receiver for advisories such as unsaved attempts. Only the first call gets it.
    ///
    /// Until it is taken, at most `ADVISORY_BUFFER` advisories are kept.
    #[must_use]
    pub fn take_advisories(&self) -> Option<Receiver<Advisory>> {
        self.advisories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::time::fixed_clock;

    #[test]
    fn advisories_are_handed_out_once() {
        let services = AppServices::in_memory(fixed_clock(), None);
        assert!(services.take_advisories().is_some());
        assert!(services.clone().take_advisories().is_none());
    }

    #[test]
    fn narration_without_engine_is_unavailable() {
        let services = AppServices::in_memory(fixed_clock(), None);
        assert!(!services.narration().is_available());
        assert_eq!(services.narration_controller().voice(), &VoiceSettings::default());
    }
}
