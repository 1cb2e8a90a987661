use std::fmt;

use thiserror::Error;
use tutor_core::narration::VoiceSettings;

/// Identifies one utterance handed to the speech engine.
///
/// Completion and error callbacks carry it so that late notifications for a
/// cancelled utterance do not touch the one that replaced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(u64);

impl UtteranceId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UtteranceId({})", self.0)
    }
}

/// Failures reported by a speech engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NarratorError {
    #[error("speech synthesis is not available")]
    Unavailable,
    #[error("speech synthesis failed: {0}")]
    Platform(String),
}

/// Platform text-to-speech capability.
///
/// Implementations report the end of an utterance through
/// `NarrationSession::on_finished` / `NarrationSession::on_failed`, never from
/// inside one of these calls.
pub trait Narrator: Send + Sync {
    /// Start speaking `text` from the beginning.
    ///
    /// # Errors
    ///
    /// Returns `NarratorError` if the engine rejects the request.
    fn speak(
        &self,
        utterance: UtteranceId,
        text: &str,
        voice: &VoiceSettings,
    ) -> Result<(), NarratorError>;

    /// # Errors
    ///
    /// Returns `NarratorError` if the engine cannot pause.
    fn pause(&self) -> Result<(), NarratorError>;

    /// # Errors
    ///
    /// Returns `NarratorError` if the engine cannot resume.
    fn resume(&self) -> Result<(), NarratorError>;

    /// Drop the current utterance and anything queued behind it.
    ///
    /// # Errors
    ///
    /// Returns `NarratorError` if the engine cannot cancel.
    fn cancel(&self) -> Result<(), NarratorError>;
}
