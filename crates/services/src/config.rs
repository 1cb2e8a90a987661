use std::env;

use tutor_core::narration::VoiceSettings;

use crate::error::ConfigError;

pub const DEFAULT_DB_URL: &str = "sqlite:dev.sqlite3";

/// Runtime configuration read from `TUTOR_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_url: String,
    pub voice: VoiceSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_owned(),
            voice: VoiceSettings::default(),
        }
    }
}

impl AppConfig {
    /// Read `TUTOR_DB_URL` and the `TUTOR_TTS_*` voice variables.
    ///
    /// Unset variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is set but cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is set but cannot be used.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = VoiceSettings::default();

        let db_url = match lookup("TUTOR_DB_URL") {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Empty {
                    var: "TUTOR_DB_URL",
                });
            }
            Some(raw) => raw,
            None => DEFAULT_DB_URL.to_owned(),
        };

        let rate = number(&lookup, "TUTOR_TTS_RATE")?.unwrap_or(defaults.rate());
        let pitch = number(&lookup, "TUTOR_TTS_PITCH")?.unwrap_or(defaults.pitch());
        let volume = number(&lookup, "TUTOR_TTS_VOLUME")?.unwrap_or(defaults.volume());
        let language = lookup("TUTOR_TTS_LANG").unwrap_or_else(|| defaults.language().to_owned());

        let voice = VoiceSettings::new(rate, pitch, volume, language)?;
        Ok(Self { db_url, voice })
    }
}

fn number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<f32>, ConfigError> {
    lookup(var)
        .map(|raw| {
            raw.trim()
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidNumber { var, raw })
        })
        .transpose()
}
