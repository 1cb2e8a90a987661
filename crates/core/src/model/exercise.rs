use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise question cannot be empty")]
    EmptyQuestion,

    #[error("multiple choice exercise needs at least one option")]
    MissingOptions,
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// How an exercise is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl ExerciseKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::MultipleChoice => "multiple_choice",
            ExerciseKind::TrueFalse => "true_false",
            ExerciseKind::ShortAnswer => "short_answer",
        }
    }
}

/// Answer values offered for a true/false exercise.
pub const TRUE_FALSE_CHOICES: [&str; 2] = ["true", "false"];

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// A single quiz question with its grading key and point value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExercise")]
pub struct Exercise {
    question: String,
    #[serde(rename = "type")]
    kind: ExerciseKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
    points: u32,
}

#[derive(Deserialize)]
struct RawExercise {
    question: String,
    #[serde(rename = "type")]
    kind: ExerciseKind,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    points: u32,
}

impl TryFrom<RawExercise> for Exercise {
    type Error = ExerciseError;

    fn try_from(raw: RawExercise) -> Result<Self, Self::Error> {
        Exercise::new(
            raw.question,
            raw.kind,
            raw.options,
            raw.correct_answer,
            raw.explanation,
            raw.points,
        )
    }
}

impl Exercise {
    /// Creates a validated exercise.
    ///
    /// Options are only kept for multiple choice exercises.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::EmptyQuestion` for a blank question and
    /// `ExerciseError::MissingOptions` for a multiple choice exercise without options.
    pub fn new(
        question: impl Into<String>,
        kind: ExerciseKind,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
        points: u32,
    ) -> Result<Self, ExerciseError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(ExerciseError::EmptyQuestion);
        }

        let options = match kind {
            ExerciseKind::MultipleChoice if options.is_empty() => {
                return Err(ExerciseError::MissingOptions);
            }
            ExerciseKind::MultipleChoice => options,
            ExerciseKind::TrueFalse | ExerciseKind::ShortAnswer => Vec::new(),
        };

        Ok(Self {
            question,
            kind,
            options,
            correct_answer: correct_answer.into(),
            explanation: explanation.into(),
            points,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Values the student can pick from; empty for free-text answers.
    #[must_use]
    pub fn choices(&self) -> Vec<&str> {
        match self.kind {
            ExerciseKind::MultipleChoice => self.options.iter().map(String::as_str).collect(),
            ExerciseKind::TrueFalse => TRUE_FALSE_CHOICES.to_vec(),
            ExerciseKind::ShortAnswer => Vec::new(),
        }
    }

    /// Case-insensitive exact comparison against the grading key.
    ///
    /// Only case is folded: whitespace and accents must match as written.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.to_lowercase() == self.correct_answer.to_lowercase()
    }

    /// Text read aloud for this question: the prompt followed by its options.
    #[must_use]
    pub fn narration_text(&self) -> String {
        if self.options.is_empty() {
            return self.question.clone();
        }
        format!("{} {}", self.question, self.options.join(", "))
    }
}
