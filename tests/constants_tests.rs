// Host-side tests for constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod core_constants {
    include!("../src/core/constants.rs");
}

use constants::*;
use core_constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn timing_constants_are_within_reasonable_bounds() {
    // One rendered frame per 60 Hz tick
    assert!((FRAME_BUDGET_SEC - 1.0 / 60.0).abs() < 1e-9);

    // Toggle window must be a non-empty range
    assert!(PULSE_TOGGLE_MIN_MS <= PULSE_TOGGLE_MAX_MS);
    assert!(PULSE_REARM_MS > 0.0);
    assert!(MIC_VIBRATE_MS > 0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn pulse_steps_fit_the_talk_range() {
    assert!(SCALE_STEP > 0.0 && SCALE_STEP < SPEAK_SIZE_SPAN);
    assert!(IDLE_SCALE == 1.0);
    assert!(ROTATION_SPEED > 0.0 && ROTATION_SPEED < ROTATION_HALF_TURN);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn camera_frames_the_fitted_model() {
    assert!(CAMERA_NEAR > 0.0 && CAMERA_NEAR < CAMERA_FAR);
    assert!(CAMERA_Z - MODEL_FIT_RADIUS > CAMERA_NEAR);
    // The fitted model fits inside the vertical field of view
    let half_height = CAMERA_Z * (CAMERA_FOVY_DEG.to_radians() * 0.5).tan();
    assert!(MODEL_FIT_RADIUS * 1.15 < half_height);
}

#[test]
fn endpoints_and_preferences_are_well_formed() {
    for url in [LOCAL_CHAT_ENDPOINT, REMOTE_CHAT_ENDPOINT, NATURAL_VOICE_ENDPOINT] {
        assert!(url::Url::parse(url).is_ok(), "{url}");
    }
    assert!(REMOTE_CHAT_ENDPOINT.starts_with("https://"));
    assert!(VOICE_PREFERENCES
        .iter()
        .all(|p| !p.is_empty() && p.to_lowercase() == *p));
    assert!(LOOPBACK_HOSTS.contains(&"localhost"));
    assert!(!APOLOGY_TEXT.trim().is_empty());
}

#[test]
fn light_rig_has_three_lights() {
    assert_eq!(DIR_LIGHT_POSITIONS.len(), 3);
    assert!(DIR_LIGHT_INTENSITY > 0.0 && HEMISPHERE_INTENSITY > 0.0);
    assert!(DEFAULT_ALBEDO.iter().all(|c| (0.0..=1.0).contains(c)));
}
