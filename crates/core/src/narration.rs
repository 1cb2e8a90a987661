//! Narration state machine and voice configuration.
//!
//! `NarrationState::on` is a pure transition function; the services crate
//! drives it from the speech channel and applies the side effects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── VOICE SETTINGS ────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum VoiceSettingsError {
    #[error("speech rate must be between 0.1 and 10, got {0}")]
    InvalidRate(f32),

    #[error("speech pitch must be between 0 and 2, got {0}")]
    InvalidPitch(f32),

    #[error("speech volume must be between 0 and 1, got {0}")]
    InvalidVolume(f32),

    #[error("language tag cannot be empty")]
    EmptyLanguage,
}

/// Parameters handed unchanged to every utterance of a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVoiceSettings")]
pub struct VoiceSettings {
    rate: f32,
    pitch: f32,
    volume: f32,
    language: String,
}

#[derive(Deserialize)]
struct RawVoiceSettings {
    rate: f32,
    pitch: f32,
    volume: f32,
    language: String,
}

impl TryFrom<RawVoiceSettings> for VoiceSettings {
    type Error = VoiceSettingsError;

    fn try_from(raw: RawVoiceSettings) -> Result<Self, Self::Error> {
        VoiceSettings::new(raw.rate, raw.pitch, raw.volume, raw.language)
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            language: "fr-FR".to_owned(),
        }
    }
}

impl VoiceSettings {
    /// # Errors
    ///
    /// Returns `VoiceSettingsError` when a value falls outside what speech engines accept.
    pub fn new(
        rate: f32,
        pitch: f32,
        volume: f32,
        language: impl Into<String>,
    ) -> Result<Self, VoiceSettingsError> {
        if !(0.1..=10.0).contains(&rate) {
            return Err(VoiceSettingsError::InvalidRate(rate));
        }
        if !(0.0..=2.0).contains(&pitch) {
            return Err(VoiceSettingsError::InvalidPitch(pitch));
        }
        if !(0.0..=1.0).contains(&volume) {
            return Err(VoiceSettingsError::InvalidVolume(volume));
        }
        let language = language.into();
        if language.trim().is_empty() {
            return Err(VoiceSettingsError::EmptyLanguage);
        }
        Ok(Self {
            rate,
            pitch,
            volume,
            language,
        })
    }

    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }
}

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrationStatus {
    #[default]
    Idle,
    Speaking,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationEvent {
    Speak(String),
    Pause,
    Resume,
    Stop,
    /// The utterance reached its natural end.
    Finished,
    /// The speech engine reported an error for the utterance.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NarrationState {
    status: NarrationStatus,
    active_text: Option<String>,
}

impl NarrationState {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> NarrationStatus {
        self.status
    }

    #[must_use]
    pub fn active_text(&self) -> Option<&str> {
        self.active_text.as_deref()
    }

    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.status == NarrationStatus::Speaking
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.status == NarrationStatus::Paused
    }

    /// Next state after `event`. Events that do not apply leave the state unchanged.
    #[must_use]
    pub fn on(self, event: NarrationEvent) -> Self {
        use NarrationStatus::{Idle, Paused, Speaking};

        match (self.status, event) {
            (_, NarrationEvent::Speak(text)) => Self {
                status: Speaking,
                active_text: Some(text),
            },
            (Speaking, NarrationEvent::Pause) => Self {
                status: Paused,
                ..self
            },
            (Paused, NarrationEvent::Resume) => Self {
                status: Speaking,
                ..self
            },
            (_, NarrationEvent::Stop)
            | (Speaking | Paused, NarrationEvent::Finished | NarrationEvent::Failed) => {
                Self::idle()
            }
            (Idle | Paused, NarrationEvent::Pause)
            | (Idle | Speaking, NarrationEvent::Resume)
            | (Idle, NarrationEvent::Finished | NarrationEvent::Failed) => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaking(text: &str) -> NarrationState {
        NarrationState::idle().on(NarrationEvent::Speak(text.into()))
    }

    #[test]
    fn deserializing_voice_settings_validates_ranges() {
        let ok: VoiceSettings = serde_json::from_str(
            r#"{"rate":0.8,"pitch":1.0,"volume":0.5,"language":"en-GB"}"#,
        )
        .unwrap();
        assert_eq!(ok, VoiceSettings::new(0.8, 1.0, 0.5, "en-GB").unwrap());

        let loud = serde_json::from_str::<VoiceSettings>(
            r#"{"rate":1.0,"pitch":1.0,"volume":3.0,"language":"fr-FR"}"#,
        );
        assert!(loud.is_err());
        let silent = serde_json::from_str::<VoiceSettings>(
            r#"{"rate":1.0,"pitch":1.0,"volume":1.0,"language":" "}"#,
        );
        assert!(silent.is_err());
    }

    #[test]
    fn speak_replaces_active_text() {
        let state = speaking("A").on(NarrationEvent::Speak("B".into()));
        assert!(state.is_speaking());
        assert_eq!(state.active_text(), Some("B"));
    }

    #[test]
    fn pause_and_resume_only_apply_in_their_source_state() {
        let idle = NarrationState::idle();
        assert_eq!(idle.clone().on(NarrationEvent::Pause), idle);
        assert_eq!(idle.clone().on(NarrationEvent::Resume), idle);

        let paused = speaking("A").on(NarrationEvent::Pause);
        assert!(paused.is_paused());
        assert_eq!(paused.clone().on(NarrationEvent::Pause), paused);

        let resumed = paused.on(NarrationEvent::Resume);
        assert!(resumed.is_speaking());
        assert_eq!(resumed.clone().on(NarrationEvent::Resume), resumed);
    }

    #[test]
    fn stop_always_lands_idle() {
        for state in [
            NarrationState::idle(),
            speaking("A"),
            speaking("A").on(NarrationEvent::Pause),
        ] {
            let stopped = state.on(NarrationEvent::Stop);
            assert_eq!(stopped.status(), NarrationStatus::Idle);
            assert_eq!(stopped.active_text(), None);
        }
    }

    #[test]
    fn end_and_error_return_to_idle() {
        assert_eq!(
            speaking("A").on(NarrationEvent::Finished),
            NarrationState::idle()
        );
        assert_eq!(
            speaking("A").on(NarrationEvent::Pause).on(NarrationEvent::Failed),
            NarrationState::idle()
        );
    }

    #[test]
    fn speak_from_paused_restarts() {
        let state = speaking("A")
            .on(NarrationEvent::Pause)
            .on(NarrationEvent::Speak("B".into()));
        assert!(state.is_speaking());
        assert_eq!(state.active_text(), Some("B"));
    }

    #[test]
    fn voice_settings_validate_ranges() {
        assert!(VoiceSettings::new(1.0, 1.0, 1.0, "fr-FR").is_ok());
        assert_eq!(
            VoiceSettings::new(0.0, 1.0, 1.0, "fr-FR").unwrap_err(),
            VoiceSettingsError::InvalidRate(0.0)
        );
        assert_eq!(
            VoiceSettings::new(1.0, 1.0, 1.5, "fr-FR").unwrap_err(),
            VoiceSettingsError::InvalidVolume(1.5)
        );
        assert_eq!(
            VoiceSettings::new(1.0, 1.0, 1.0, " ").unwrap_err(),
            VoiceSettingsError::EmptyLanguage
        );
        assert_eq!(VoiceSettings::default().language(), "fr-FR");
    }
}
