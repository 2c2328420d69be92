// Host-side tests for query-string configuration and microphone state.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]

mod constants {
    include!("../src/constants.rs");
}
mod core {
    pub mod animation {
        include!("../src/core/animation.rs");
    }
    pub mod voice {
        include!("../src/core/voice.rs");
    }
    pub mod config {
        include!("../src/core/config.rs");
    }
    pub mod listen {
        include!("../src/core/listen.rs");
    }
}

use crate::constants::{NATURAL_VOICE_ENDPOINT, VOICE_LANG};
use crate::core::animation::PulseSource;
use crate::core::config::*;
use crate::core::listen::*;
use crate::core::voice::VoiceMode;

#[test]
fn empty_query_keeps_defaults() {
    let (cfg, errors) = StoneConfig::from_query("");
    assert!(errors.is_empty());
    assert_eq!(cfg, StoneConfig::default());
    assert_eq!(cfg.voice_mode, VoiceMode::Local);
    assert_eq!(cfg.lang, VOICE_LANG);
    assert_eq!(cfg.natural_voice_url, NATURAL_VOICE_ENDPOINT);
    assert!(!cfg.ambient);
}

#[test]
fn query_overrides_defaults() {
    let (cfg, errors) = StoneConfig::from_query(
        "?voice=natural&ambient=1&lang=en-US&pulse=boundary&voice_url=https%3A%2F%2Fvoice.test%2Ftts",
    );
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(cfg.voice_mode, VoiceMode::Natural);
    assert!(cfg.ambient);
    assert_eq!(cfg.lang, "en-US");
    assert_eq!(cfg.pulse, Some(PulseSource::WordBoundary));
    assert_eq!(cfg.natural_voice_url, "https://voice.test/tts");
}

#[test]
fn invalid_values_are_reported_and_ignored() {
    let (cfg, errors) = StoneConfig::from_query("voice=robot&ambient=maybe&lang=&unknown=1");
    assert_eq!(cfg, StoneConfig::default());
    assert_eq!(errors.len(), 3);
    assert_eq!(
        errors[0],
        ConfigError::InvalidValue {
            key: "voice".into(),
            value: "robot".into()
        }
    );
}

#[test]
fn pulse_source_follows_browser_unless_pinned() {
    let mut cfg = StoneConfig::default();
    assert_eq!(cfg.pulse_source(true), PulseSource::Timer);
    assert_eq!(cfg.pulse_source(false), PulseSource::WordBoundary);
    cfg.apply_query("pulse=timer");
    assert_eq!(cfg.pulse_source(false), PulseSource::Timer);
    cfg.apply_query("pulse=auto");
    assert_eq!(cfg.pulse_source(false), PulseSource::WordBoundary);
}

#[test]
fn mic_toggles_between_start_and_stop() {
    let mut mic = MicState::default();
    assert_eq!(mic.toggle(), MicAction::Start);
    assert_eq!(mic.toggle(), MicAction::Stop);
    assert_eq!(mic.toggle(), MicAction::Start);
    // Speech end stops it, so the next press starts again
    assert!(mic.stop());
    assert_eq!(mic.toggle(), MicAction::Start);
}

#[test]
fn mic_stop_reports_change_once() {
    let mut mic = MicState::default();
    assert!(!mic.stop());
    mic.toggle();
    assert!(mic.stop());
    assert!(!mic.stop());
}

#[test]
fn transcripts_are_concatenated_in_order() {
    let results = vec![
        vec!["olá ".to_string()],
        vec!["pedra".to_string(), "?".to_string()],
    ];
    assert_eq!(join_transcripts(results), "olá pedra?");
    assert_eq!(join_transcripts(Vec::<Vec<String>>::new()), "");
}
