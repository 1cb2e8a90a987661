use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{LessonId, UserId};
use crate::quiz::percentage;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("score ({score}) exceeds total points ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// Answers keyed by exercise index.
pub type AnswerSheet = BTreeMap<usize, String>;

/// A submitted quiz as recorded in the attempt history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttempt {
    user_id: UserId,
    lesson_id: LessonId,
    score: u32,
    total_points: u32,
    answers: AnswerSheet,
    submitted_at: DateTime<Utc>,
}

impl QuizAttempt {
    /// Build an attempt record, from a fresh submission or from storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::ScoreExceedsTotal` if the score is larger than the total.
    pub fn new(
        user_id: UserId,
        lesson_id: LessonId,
        score: u32,
        total_points: u32,
        answers: AnswerSheet,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if score > total_points {
            return Err(AttemptError::ScoreExceedsTotal {
                score,
                total: total_points,
            });
        }
        Ok(Self {
            user_id,
            lesson_id,
            score,
            total_points,
            answers,
            submitted_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_score_above_total() {
        let err = QuizAttempt::new(
            UserId::random(),
            LessonId::random(),
            11,
            10,
            AnswerSheet::new(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, AttemptError::ScoreExceedsTotal { score: 11, total: 10 });
    }

    #[test]
    fn exposes_percentage() {
        let attempt = QuizAttempt::new(
            UserId::random(),
            LessonId::random(),
            7,
            10,
            AnswerSheet::new(),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(attempt.percentage(), 70);
    }
}
