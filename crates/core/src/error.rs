use thiserror::Error;

use crate::model::{AttemptError, ExerciseError, LessonError};
use crate::narration::VoiceSettingsError;
use crate::quiz::QuizError;

/// Any domain validation failure, for callers that do not care which model rejected input.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Voice(#[from] VoiceSettingsError),
}
