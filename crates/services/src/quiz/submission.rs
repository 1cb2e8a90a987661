use tokio::task::JoinHandle;
use tutor_core::model::LessonId;
use tutor_core::quiz::QuizOutcome;

use storage::repository::AttemptId;

/// Non-blocking notices for the UI (e.g. a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Advisory {
    /// The score was shown but could not be saved to the attempt history.
    AttemptNotSaved { lesson_id: LessonId, reason: String },
}

/// Where the attempt-history write ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    Recorded(AttemptId),
    Failed(String),
    /// No async runtime was available to run the write.
    NotAttempted,
}

/// Handle on the background attempt-history write.
///
/// Dropping it detaches the write; it still runs to completion.
#[derive(Debug)]
pub struct AttemptWrite {
    handle: Option<JoinHandle<PersistenceStatus>>,
}

impl AttemptWrite {
    pub(crate) fn spawned(handle: JoinHandle<PersistenceStatus>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub(crate) fn not_attempted() -> Self {
        Self { handle: None }
    }

    /// Wait for the write to settle.
    pub async fn wait(self) -> PersistenceStatus {
        match self.handle {
            Some(handle) => handle
                .await
                .unwrap_or_else(|e| PersistenceStatus::Failed(e.to_string())),
            None => PersistenceStatus::NotAttempted,
        }
    }
}

/// Local result of a submission plus the pending remote write.
#[derive(Debug)]
pub struct QuizSubmission {
    pub outcome: QuizOutcome,
    pub write: AttemptWrite,
}
