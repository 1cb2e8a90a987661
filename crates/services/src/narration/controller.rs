use std::sync::Arc;

use tutor_core::model::{Exercise, Lesson};
use tutor_core::narration::{NarrationState, NarrationStatus, VoiceSettings};

use super::narrator::UtteranceId;
use super::session::NarrationSession;

/// Per-view handle on the shared speech channel.
///
/// Every `speak` goes out with the controller's `VoiceSettings`. Dropping the
/// controller cancels its utterance if it still owns the channel.
pub struct NarrationController {
    session: Arc<NarrationSession>,
    voice: VoiceSettings,
    current: Option<UtteranceId>,
}

impl NarrationController {
    #[must_use]
    pub fn new(session: Arc<NarrationSession>, voice: VoiceSettings) -> Self {
        Self {
            session,
            voice,
            current: None,
        }
    }

    #[must_use]
    pub fn voice(&self) -> &VoiceSettings {
        &self.voice
    }

    /// Cancel whatever is playing and start `text` from the beginning.
    pub fn speak(&mut self, text: impl Into<String>) {
        self.current = self.session.start(text.into(), &self.voice);
    }

    pub fn pause(&self) {
        if let Some(id) = self.current {
            self.session.pause(id);
        }
    }

    pub fn resume(&self) {
        if let Some(id) = self.current {
            self.session.resume(id);
        }
    }

    /// Cancel any in-flight utterance, ours or not.
    pub fn stop(&mut self) {
        self.session.cancel_all();
        self.current = None;
    }

    /// Play/pause button behaviour: pause while speaking, resume while paused,
    /// otherwise start `text`.
    pub fn toggle(&mut self, text: impl Into<String>) {
        match self.status() {
            NarrationStatus::Speaking => self.pause(),
            NarrationStatus::Paused => self.resume(),
            NarrationStatus::Idle => self.speak(text),
        }
    }

    /// Read a lesson section aloud; out-of-range sections are ignored.
    pub fn speak_section(&mut self, lesson: &Lesson, section: usize) {
        if let Some(text) = lesson.narration_text(section) {
            self.speak(text);
        }
    }

    pub fn speak_exercise(&mut self, exercise: &Exercise) {
        self.speak(exercise.narration_text());
    }

    /// State of this controller's utterance; idle once it ended or was superseded.
    #[must_use]
    pub fn state(&self) -> NarrationState {
        self.current
            .map_or_else(NarrationState::idle, |id| self.session.state_of(id))
    }

    #[must_use]
    pub fn status(&self) -> NarrationStatus {
        self.state().status()
    }

    #[must_use]
    pub fn utterance(&self) -> Option<UtteranceId> {
        self.current
    }
}

impl Drop for NarrationController {
    fn drop(&mut self) {
        if let Some(id) = self.current.take() {
            self.session.release(id);
        }
    }
}
