//! In-memory quiz engine.
//!
//! A `QuizSession` is built from a lesson's exercises, stepped through with
//! `next`/`previous`, filled with `record_answer` and graded once by `submit`.
//! It performs no I/O; loading and persisting attempts live in the services crate.

use thiserror::Error;

use crate::model::{AnswerSheet, Exercise, Lesson, LessonId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("lesson has no exercises")]
    EmptyQuiz,

    #[error("{} exercise(s) still unanswered", missing.len())]
    IncompleteAnswers { missing: Vec<usize> },

    #[error("exercise index {index} out of range for {len} exercise(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("quiz already submitted")]
    AlreadySubmitted,
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Rounded percentage of `score` over `total`, half rounding up.
///
/// A zero total yields 0.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score);
    let total = u64::from(total);
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Grading of a single exercise after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseResult {
    pub index: usize,
    pub question: String,
    pub given: String,
    pub correct_answer: String,
    pub explanation: String,
    pub is_correct: bool,
    pub points_awarded: u32,
}

/// Frozen result of a submitted quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    score: u32,
    total_points: u32,
    results: Vec<ExerciseResult>,
}

impl QuizOutcome {
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total_points)
    }

    #[must_use]
    pub fn results(&self) -> &[ExerciseResult] {
        &self.results
    }
}

/// Sum of the exercises' points, saturating at `u32::MAX`.
#[must_use]
pub fn points_total(exercises: &[Exercise]) -> u32 {
    exercises
        .iter()
        .map(Exercise::points)
        .fold(0, u32::saturating_add)
}

/// Grades every exercise against the answer sheet.
///
/// Unanswered exercises score zero.
#[must_use]
pub fn grade(exercises: &[Exercise], answers: &AnswerSheet) -> QuizOutcome {
    let mut score = 0_u32;
    let mut results = Vec::with_capacity(exercises.len());

    for (index, exercise) in exercises.iter().enumerate() {
        let given = answers.get(&index).cloned().unwrap_or_default();
        let is_correct = answers.contains_key(&index) && exercise.is_correct(&given);
        let points_awarded = if is_correct { exercise.points() } else { 0 };

        score = score.saturating_add(points_awarded);
        results.push(ExerciseResult {
            index,
            question: exercise.question().to_owned(),
            given,
            correct_answer: exercise.correct_answer().to_owned(),
            explanation: exercise.explanation().to_owned(),
            is_correct,
            points_awarded,
        });
    }

    QuizOutcome {
        score,
        total_points: points_total(exercises),
        results,
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Input the quiz screen dispatches to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    Answer { index: usize, answer: String },
    Next,
    Previous,
    Submit,
}

/// One student's in-progress attempt at a lesson's exercises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    lesson_id: LessonId,
    exercises: Vec<Exercise>,
    current: usize,
    answers: AnswerSheet,
    outcome: Option<QuizOutcome>,
}

impl QuizSession {
    /// Start a session on a copy of the lesson's exercises.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyQuiz` if the lesson has no exercises.
    pub fn load(lesson: &Lesson) -> Result<Self, QuizError> {
        Self::from_exercises(lesson.id(), lesson.exercises().to_vec())
    }

    /// Start a session from an explicit exercise list.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyQuiz` if `exercises` is empty.
    pub fn from_exercises(lesson_id: LessonId, exercises: Vec<Exercise>) -> Result<Self, QuizError> {
        if exercises.is_empty() {
            return Err(QuizError::EmptyQuiz);
        }
        Ok(Self {
            lesson_id,
            exercises,
            current: 0,
            answers: AnswerSheet::new(),
            outcome: None,
        })
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Always false: construction rejects empty exercise lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_exercise(&self) -> &Exercise {
        &self.exercises[self.current]
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.exercises.len()
    }

    /// `(current + 1) / len`, in `(0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        (self.current + 1) as f64 / self.exercises.len() as f64
    }

    pub fn next(&mut self) {
        if self.current + 1 < self.exercises.len() {
            self.current += 1;
        }
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Store `answer` for `index`, replacing any earlier answer. Not graded until submit.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::IndexOutOfRange` for an index past the last exercise and
    /// `QuizError::AlreadySubmitted` once the answers are frozen.
    pub fn record_answer(&mut self, index: usize, answer: impl Into<String>) -> Result<(), QuizError> {
        if self.outcome.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }
        if index >= self.exercises.len() {
            return Err(QuizError::IndexOutOfRange {
                index,
                len: self.exercises.len(),
            });
        }
        self.answers.insert(index, answer.into());
        Ok(())
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    /// Indices with no recorded answer, ascending.
    #[must_use]
    pub fn missing_answers(&self) -> Vec<usize> {
        (0..self.exercises.len())
            .filter(|i| !self.answers.contains_key(i))
            .collect()
    }

    /// True when every exercise has an answer and the quiz is not yet submitted.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.outcome.is_none() && self.missing_answers().is_empty()
    }

    /// Grade the session and freeze answers and score.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::IncompleteAnswers` listing unanswered indices, or
    /// `QuizError::AlreadySubmitted` on a second call.
    pub fn submit(&mut self) -> Result<&QuizOutcome, QuizError> {
        if self.outcome.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }
        let missing = self.missing_answers();
        if !missing.is_empty() {
            return Err(QuizError::IncompleteAnswers { missing });
        }
        Ok(self.outcome.insert(grade(&self.exercises, &self.answers)))
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    /// Score of the submitted quiz; `None` before submission.
    #[must_use]
    pub fn score(&self) -> Option<u32> {
        self.outcome.as_ref().map(QuizOutcome::score)
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        points_total(&self.exercises)
    }

    /// Apply a UI event.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation.
    pub fn dispatch(&mut self, event: QuizEvent) -> Result<(), QuizError> {
        match event {
            QuizEvent::Answer { index, answer } => self.record_answer(index, answer),
            QuizEvent::Next => {
                self.next();
                Ok(())
            }
            QuizEvent::Previous => {
                self.previous();
                Ok(())
            }
            QuizEvent::Submit => self.submit().map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExerciseKind, Subject, UserId};
    use crate::time::fixed_now;

    fn exercise(correct: &str, points: u32) -> Exercise {
        Exercise::new("Q", ExerciseKind::ShortAnswer, vec![], correct, "why", points).unwrap()
    }

    fn session(n: usize) -> QuizSession {
        let exercises = (0..n).map(|i| exercise(&format!("a{i}"), 1)).collect();
        QuizSession::from_exercises(LessonId::random(), exercises).unwrap()
    }

    fn paris_quiz() -> QuizSession {
        QuizSession::from_exercises(
            LessonId::random(),
            vec![exercise("Paris", 10), exercise("true", 5)],
        )
        .unwrap()
    }

    #[test]
    fn load_starts_at_first_exercise() {
        for n in 1..=5 {
            let s = session(n);
            assert_eq!(s.current_index(), 0);
            assert!((s.progress_fraction() - 1.0 / n as f64).abs() < f64::EPSILON);
            assert!(s.answers().is_empty());
            assert!(!s.is_submitted());
        }
    }

    #[test]
    fn load_rejects_lesson_without_exercises() {
        let lesson = Lesson::new(
            LessonId::random(),
            UserId::random(),
            "Vide",
            "",
            Subject::French,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(QuizSession::load(&lesson).unwrap_err(), QuizError::EmptyQuiz);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut s = QuizSession::from_exercises(
            LessonId::random(),
            vec![exercise("a", u32::MAX), exercise("b", 1)],
        )
        .unwrap();
        assert_eq!(s.total_points(), u32::MAX);

        s.record_answer(0, "a").unwrap();
        s.record_answer(1, "b").unwrap();
        let outcome = s.submit().unwrap().clone();
        assert_eq!(outcome.total_points(), u32::MAX);
        assert_eq!(outcome.score(), u32::MAX);
        assert_eq!(s.total_points(), outcome.total_points());
    }

    #[test]
    fn navigation_is_bounded() {
        let mut s = session(3);
        s.previous();
        assert_eq!(s.current_index(), 0);

        s.next();
        s.next();
        assert!(s.is_last());
        s.next();
        s.next();
        assert_eq!(s.current_index(), 2);
        assert!((s.progress_fraction() - 1.0).abs() < f64::EPSILON);

        s.previous();
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn progress_never_decreases_while_moving_forward() {
        let mut s = session(4);
        let mut last = s.progress_fraction();
        for _ in 0..6 {
            s.next();
            let now = s.progress_fraction();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn answers_overwrite_and_accept_any_index() {
        let mut s = session(3);
        s.record_answer(2, "first").unwrap();
        s.record_answer(2, "second").unwrap();
        assert_eq!(s.answer(2), Some("second"));
        assert_eq!(s.current_index(), 0);
        assert_eq!(
            s.record_answer(3, "x").unwrap_err(),
            QuizError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn submit_requires_every_index() {
        let mut s = session(3);
        s.record_answer(0, "a0").unwrap();
        s.record_answer(2, "a2").unwrap();
        assert!(!s.can_submit());
        assert_eq!(
            s.submit().unwrap_err(),
            QuizError::IncompleteAnswers { missing: vec![1] }
        );
        assert!(!s.is_submitted());

        s.record_answer(1, "a1").unwrap();
        assert!(s.can_submit());
        assert_eq!(s.submit().unwrap().score(), 3);
    }

    #[test]
    fn scoring_is_case_insensitive() {
        let mut s = paris_quiz();
        s.record_answer(0, "paris").unwrap();
        s.record_answer(1, "TRUE").unwrap();
        let outcome = s.submit().unwrap();
        assert_eq!(outcome.score(), 15);
        assert_eq!(outcome.total_points(), 15);
        assert_eq!(outcome.percentage(), 100);
    }

    #[test]
    fn near_miss_scores_nothing() {
        let mut s = paris_quiz();
        s.record_answer(0, "Pariss").unwrap();
        s.record_answer(1, "true").unwrap();
        let outcome = s.submit().unwrap();
        assert_eq!(outcome.score(), 5);
        assert!(!outcome.results()[0].is_correct);
        assert_eq!(outcome.results()[0].points_awarded, 0);
        assert_eq!(outcome.results()[1].points_awarded, 5);
    }

    #[test]
    fn submitted_session_is_frozen() {
        let mut s = paris_quiz();
        s.record_answer(0, "Paris").unwrap();
        s.record_answer(1, "false").unwrap();
        s.submit().unwrap();

        assert_eq!(
            s.record_answer(1, "true").unwrap_err(),
            QuizError::AlreadySubmitted
        );
        assert_eq!(s.submit().unwrap_err(), QuizError::AlreadySubmitted);
        assert_eq!(s.score(), Some(10));
        assert_eq!(s.answer(1), Some("false"));
    }

    #[test]
    fn dispatch_drives_the_same_transitions() {
        let mut s = session(2);
        s.dispatch(QuizEvent::Answer {
            index: 0,
            answer: "A0".into(),
        })
        .unwrap();
        s.dispatch(QuizEvent::Next).unwrap();
        assert_eq!(s.current_index(), 1);
        assert!(matches!(
            s.dispatch(QuizEvent::Submit),
            Err(QuizError::IncompleteAnswers { .. })
        ));
        s.dispatch(QuizEvent::Answer {
            index: 1,
            answer: "nope".into(),
        })
        .unwrap();
        s.dispatch(QuizEvent::Previous).unwrap();
        s.dispatch(QuizEvent::Submit).unwrap();
        assert_eq!(s.score(), Some(1));
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(7, 10), 70);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 0), 0);
    }
}
