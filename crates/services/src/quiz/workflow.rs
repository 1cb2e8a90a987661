use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::repository::{AttemptId, AttemptRepository, AttemptRow, LessonRepository};
use tokio::runtime::Handle;
use tokio::sync::mpsc::Sender;
use tutor_core::model::{LessonId, QuizAttempt, UserId};
use tutor_core::quiz::QuizSession;

use super::submission::{Advisory, AttemptWrite, PersistenceStatus, QuizSubmission};
use crate::Clock;
use crate::error::QuizServiceError;

/// One row of a student's attempt history for a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub submitted_at: DateTime<Utc>,
    pub score: u32,
    pub total_points: u32,
    pub percentage: u32,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_row(row: &AttemptRow) -> Self {
        Self {
            id: row.id,
            submitted_at: row.attempt.submitted_at(),
            score: row.attempt.score(),
            total_points: row.attempt.total_points(),
            percentage: row.attempt.percentage(),
        }
    }
}

/// Loads quizzes from the lesson store and hands submitted attempts to the history store.
///
/// Grading itself happens synchronously in `QuizSession`; the history write is
/// spawned afterwards and never affects the returned outcome.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    attempts: Arc<dyn AttemptRepository>,
    advisories: Option<Sender<Advisory>>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lessons: Arc<dyn LessonRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            lessons,
            attempts,
            advisories: None,
        }
    }

    /// Route persistence warnings to `tx` in addition to the log.
    ///
    /// Advisories that do not fit in the channel are dropped.
    #[must_use]
    pub fn with_advisories(mut self, tx: Sender<Advisory>) -> Self {
        self.advisories = Some(tx);
        self
    }

    /// Fetch a lesson and start a fresh quiz on its exercises.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotFound` if the lesson does not exist,
    /// `QuizServiceError::Quiz(QuizError::EmptyQuiz)` if it has no exercises,
    /// or `QuizServiceError::Storage` for other storage failures.
    pub async fn start_quiz(&self, lesson_id: LessonId) -> Result<QuizSession, QuizServiceError> {
        let lesson = self.lessons.get_lesson(lesson_id).await?;
        Ok(QuizSession::load(&lesson)?)
    }

    /// Grade the session, then record the attempt in the background.
    ///
    /// The outcome is final as soon as this returns; a failed write only yields
    /// a warning and an `Advisory::AttemptNotSaved`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` if answers are missing or the session was
    /// already submitted.
    pub fn submit(
        &self,
        user_id: UserId,
        session: &mut QuizSession,
    ) -> Result<QuizSubmission, QuizServiceError> {
        let outcome = session.submit()?.clone();
        let attempt = QuizAttempt::new(
            user_id,
            session.lesson_id(),
            outcome.score(),
            outcome.total_points(),
            session.answers().clone(),
            self.clock.now(),
        )?;

        let write = self.spawn_record(attempt);
        Ok(QuizSubmission { outcome, write })
    }

    /// Most recent attempts of a user on a lesson, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the history cannot be read.
    pub async fn attempt_history(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        limit: u32,
    ) -> Result<Vec<AttemptListItem>, QuizServiceError> {
        let rows = self.attempts.list_attempts(user_id, lesson_id, limit).await?;
        Ok(rows.iter().map(AttemptListItem::from_row).collect())
    }

    fn spawn_record(&self, attempt: QuizAttempt) -> AttemptWrite {
        let lesson_id = attempt.lesson_id();
        let Ok(runtime) = Handle::try_current() else {
            let reason = "no async runtime to record the attempt".to_owned();
            log::warn!("quiz attempt for lesson {lesson_id} not saved: {reason}");
            self.advise(Advisory::AttemptNotSaved { lesson_id, reason });
            return AttemptWrite::not_attempted();
        };

        let attempts = Arc::clone(&self.attempts);
        let advisories = self.advisories.clone();
        let handle = runtime.spawn(async move {
            match attempts.record_attempt(&attempt).await {
                Ok(id) => {
                    log::debug!(
                        "recorded attempt {id} for lesson {lesson_id}: {}/{}",
                        attempt.score(),
                        attempt.total_points()
                    );
                    PersistenceStatus::Recorded(id)
                }
                Err(err) => {
                    let reason = err.to_string();
                    log::warn!("quiz attempt for lesson {lesson_id} not saved: {reason}");
                    if let Some(tx) = &advisories {
                        advise(
                            tx,
                            Advisory::AttemptNotSaved {
                                lesson_id,
                                reason: reason.clone(),
                            },
                        );
                    }
                    PersistenceStatus::Failed(reason)
                }
            }
        });
        AttemptWrite::spawned(handle)
    }

    fn advise(&self, advisory: Advisory) {
        if let Some(tx) = &self.advisories {
            advise(tx, advisory);
        }
    }
}

fn advise(tx: &Sender<Advisory>, advisory: Advisory) {
    if let Err(err) = tx.try_send(advisory) {
        log::debug!("advisory dropped: {err}");
    }
}
