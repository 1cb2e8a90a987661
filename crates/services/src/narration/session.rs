use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tutor_core::narration::{NarrationEvent, NarrationState, NarrationStatus, VoiceSettings};

use super::controller::NarrationController;
use super::narrator::{Narrator, NarratorError, UtteranceId};

struct ActiveUtterance {
    id: UtteranceId,
    state: NarrationState,
}

struct Channel {
    narrator: Option<Arc<dyn Narrator>>,
    active: Option<ActiveUtterance>,
    next_id: u64,
}

/// The process-wide speech channel.
///
/// Holds at most one active utterance. Starting a new one always cancels the
/// previous one first, under the same lock, so two requests cannot overlap.
/// A narrator failure disables the channel for good; every later request is a
/// silent no-op.
pub struct NarrationSession {
    channel: Mutex<Channel>,
}

impl NarrationSession {
    #[must_use]
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self::from_option(Some(narrator))
    }

    /// A channel for environments without speech synthesis.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::from_option(None)
    }

    #[must_use]
    pub fn from_option(narrator: Option<Arc<dyn Narrator>>) -> Self {
        Self {
            channel: Mutex::new(Channel {
                narrator,
                active: None,
                next_id: 1,
            }),
        }
    }

    /// New controller bound to this channel.
    #[must_use]
    pub fn controller(self: &Arc<Self>, voice: VoiceSettings) -> NarrationController {
        NarrationController::new(Arc::clone(self), voice)
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.lock().narrator.is_some()
    }

    /// Text of the utterance currently speaking or paused, whoever started it.
    #[must_use]
    pub fn active_text(&self) -> Option<String> {
        self.lock()
            .active
            .as_ref()
            .and_then(|a| a.state.active_text().map(str::to_owned))
    }

    /// The engine finished `utterance` on its own.
    pub fn on_finished(&self, utterance: UtteranceId) {
        self.settle(utterance, NarrationEvent::Finished);
    }

    /// The engine reported an error while speaking `utterance`.
    pub fn on_failed(&self, utterance: UtteranceId) {
        log::debug!("narration {utterance:?} failed in the speech engine");
        self.settle(utterance, NarrationEvent::Failed);
    }

    pub(crate) fn start(&self, text: String, voice: &VoiceSettings) -> Option<UtteranceId> {
        let mut channel = self.lock();
        let narrator = Arc::clone(channel.narrator.as_ref()?);

        if let Err(err) = narrator.cancel() {
            disable(&mut channel, &err);
            return None;
        }
        channel.active = None;

        let id = UtteranceId::new(channel.next_id);
        channel.next_id += 1;

        if let Err(err) = narrator.speak(id, &text, voice) {
            disable(&mut channel, &err);
            return None;
        }
        channel.active = Some(ActiveUtterance {
            id,
            state: NarrationState::idle().on(NarrationEvent::Speak(text)),
        });
        Some(id)
    }

    pub(crate) fn pause(&self, utterance: UtteranceId) {
        self.transition(utterance, NarrationEvent::Pause, |n| n.pause());
    }

    pub(crate) fn resume(&self, utterance: UtteranceId) {
        self.transition(utterance, NarrationEvent::Resume, |n| n.resume());
    }

    /// Cancel whatever is active, regardless of who started it.
    pub(crate) fn cancel_all(&self) {
        cancel_locked(&mut self.lock());
    }

    /// Cancel `utterance` only if it still owns the channel.
    pub(crate) fn release(&self, utterance: UtteranceId) {
        let mut channel = self.lock();
        if channel.active.as_ref().is_some_and(|a| a.id == utterance) {
            cancel_locked(&mut channel);
        }
    }

    pub(crate) fn state_of(&self, utterance: UtteranceId) -> NarrationState {
        self.lock()
            .active
            .as_ref()
            .filter(|a| a.id == utterance)
            .map_or_else(NarrationState::idle, |a| a.state.clone())
    }

    fn transition(
        &self,
        utterance: UtteranceId,
        event: NarrationEvent,
        effect: impl FnOnce(&dyn Narrator) -> Result<(), NarratorError>,
    ) {
        let mut channel = self.lock();
        let Some(narrator) = channel.narrator.clone() else {
            return;
        };
        let Some(active) = channel.active.as_mut().filter(|a| a.id == utterance) else {
            return;
        };

        let next = active.state.clone().on(event);
        if next == active.state {
            return;
        }
        match effect(narrator.as_ref()) {
            Ok(()) => active.state = next,
            Err(err) => disable(&mut channel, &err),
        }
    }

    fn settle(&self, utterance: UtteranceId, event: NarrationEvent) {
        let mut channel = self.lock();
        if let Some(active) = channel.active.as_mut().filter(|a| a.id == utterance) {
            active.state = active.state.clone().on(event);
            if active.state.status() == NarrationStatus::Idle {
                channel.active = None;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Channel> {
        self.channel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn cancel_locked(channel: &mut Channel) {
    let Some(narrator) = channel.narrator.clone() else {
        return;
    };
    channel.active = None;
    if let Err(err) = narrator.cancel() {
        disable(channel, &err);
    }
}

fn disable(channel: &mut Channel, err: &NarratorError) {
    log::warn!("narration disabled: {err}");
    channel.narrator = None;
    channel.active = None;
}
