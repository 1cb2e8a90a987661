mod attempt;
mod exercise;
mod ids;
mod lesson;
mod progress;

pub use ids::{LessonId, ParseIdError, UserId};

pub use attempt::{AnswerSheet, AttemptError, QuizAttempt};
pub use exercise::{Exercise, ExerciseError, ExerciseKind, TRUE_FALSE_CHOICES};
pub use lesson::{Lesson, LessonError, Section, Subject};
pub use progress::LessonProgress;
