#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod config;
pub mod error;
pub mod lesson_service;
pub mod narration;
pub mod quiz;

pub use tutor_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{LessonCatalogService, LessonListItem};
pub use config::AppConfig;
pub use error::{AppServicesError, ConfigError, LessonServiceError, QuizServiceError};
pub use lesson_service::{LessonDraft, LessonService};
pub use narration::{NarrationController, NarrationSession, Narrator, NarratorError, UtteranceId};
pub use quiz::{
    Advisory, AttemptListItem, AttemptWrite, PersistenceStatus, QuizLoopService, QuizSubmission,
};
