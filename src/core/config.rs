// Runtime configuration for the widget.
//
// Defaults come from the tuning constants; the page query string may
// override them, e.g. `?voice=natural&ambient=1&lang=en-US`.

use crate::constants::{
    LOCAL_CHAT_ENDPOINT, MODEL_URL, NATURAL_VOICE_ENDPOINT, REMOTE_CHAT_ENDPOINT, VOICE_LANG,
};
use crate::core::animation::PulseSource;
use crate::core::voice::VoiceMode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for `{key}`")]
    InvalidValue { key: String, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoneConfig {
    pub voice_mode: VoiceMode,
    pub ambient: bool,
    pub lang: String,
    /// `None` selects the pulse source from the browser at startup.
    pub pulse: Option<PulseSource>,
    pub local_chat_url: String,
    pub remote_chat_url: String,
    pub natural_voice_url: String,
    pub model_url: String,
}

impl Default for StoneConfig {
    fn default() -> Self {
        Self {
            voice_mode: VoiceMode::Local,
            ambient: false,
            lang: VOICE_LANG.to_owned(),
            pulse: None,
            local_chat_url: LOCAL_CHAT_ENDPOINT.to_owned(),
            remote_chat_url: REMOTE_CHAT_ENDPOINT.to_owned(),
            natural_voice_url: NATURAL_VOICE_ENDPOINT.to_owned(),
            model_url: MODEL_URL.to_owned(),
        }
    }
}

impl StoneConfig {
    /// Defaults overridden by `query` (with or without the leading `?`).
    /// Invalid entries are reported and leave the default in place.
    pub fn from_query(query: &str) -> (Self, Vec<ConfigError>) {
        let mut cfg = Self::default();
        let errors = cfg.apply_query(query);
        (cfg, errors)
    }

    pub fn apply_query(&mut self, query: &str) -> Vec<ConfigError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .filter_map(|(k, v)| self.apply(&k, &v).err())
            .collect()
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        match key {
            "voice" => {
                self.voice_mode = match value {
                    "local" => VoiceMode::Local,
                    "natural" => VoiceMode::Natural,
                    _ => return Err(invalid()),
                }
            }
            "ambient" => {
                self.ambient = match value {
                    "1" | "true" | "on" => true,
                    "0" | "false" | "off" => false,
                    _ => return Err(invalid()),
                }
            }
            "pulse" => {
                self.pulse = match value {
                    "auto" => None,
                    "timer" => Some(PulseSource::Timer),
                    "boundary" => Some(PulseSource::WordBoundary),
                    _ => return Err(invalid()),
                }
            }
            "lang" if !value.is_empty() => self.lang = value.to_owned(),
            "voice_url" if !value.is_empty() => self.natural_voice_url = value.to_owned(),
            "chat_url" if !value.is_empty() => self.remote_chat_url = value.to_owned(),
            "lang" | "voice_url" | "chat_url" => return Err(invalid()),
            _ => {}
        }
        Ok(())
    }

    /// Timer pulses on Chromium, word-boundary pulses elsewhere, unless
    /// pinned by configuration.
    pub fn pulse_source(&self, chromium: bool) -> PulseSource {
        self.pulse.unwrap_or(if chromium {
            PulseSource::Timer
        } else {
            PulseSource::WordBoundary
        })
    }
}
