//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tutor_core::model::{AttemptError, LessonError};
use tutor_core::narration::VoiceSettingsError;
use tutor_core::quiz::QuizError;

/// Errors emitted by `QuizLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("lesson not found")]
    NotFound,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for QuizServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by `LessonService` and `LessonCatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("lesson not found")]
    NotFound,
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for LessonServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} is not a number: {raw}")]
    InvalidNumber { var: &'static str, raw: String },
    #[error("{var} cannot be empty")]
    Empty { var: &'static str },
    #[error(transparent)]
    Voice(#[from] VoiceSettingsError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_maps_to_typed_not_found() {
        assert!(matches!(
            QuizServiceError::from(StorageError::NotFound),
            QuizServiceError::NotFound
        ));
        assert!(matches!(
            LessonServiceError::from(StorageError::Conflict),
            LessonServiceError::Storage(StorageError::Conflict)
        ));
    }
}
