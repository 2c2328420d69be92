// Host-side tests for the avatar animation state machine.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]

mod constants {
    include!("../src/constants.rs");
}
mod core {
    pub mod animation {
        include!("../src/core/animation.rs");
    }
}

use crate::constants::{IDLE_SCALE, ROTATION_SPEED, SPEAK_SIZE_SPAN};
use crate::core::animation::*;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAME_MS: f64 = 1000.0 / 60.0;

#[test]
fn idle_avatar_rotates_about_one_axis() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut anim = AnimationState::new(PulseSource::Timer);
    let mut avatar = Avatar::default();
    let phase = anim.tick(&mut avatar, false, 0.0, &mut rng);
    assert_eq!(phase, Phase::IdleRotating);
    assert!((avatar.rotation.x - ROTATION_SPEED).abs() < 1e-6);
    assert_eq!(avatar.rotation.y, 0.0);
    assert_eq!(avatar.scale, IDLE_SCALE);
}

#[test]
fn idle_rotation_picks_new_axis_after_half_turn() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut anim = AnimationState::new(PulseSource::Timer);
    let mut avatar = Avatar::default();
    let ticks_per_cycle = (std::f32::consts::PI / ROTATION_SPEED).ceil() as usize;
    for i in 0..ticks_per_cycle * 8 {
        anim.tick(&mut avatar, false, i as f64 * FRAME_MS, &mut rng);
        // Only the active axis carries rotation
        assert!(avatar.rotation.x == 0.0 || avatar.rotation.y == 0.0);
        assert!(anim.rotation.cycle <= std::f32::consts::PI + ROTATION_SPEED);
    }
}

#[test]
fn talking_zeroes_rotation() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut anim = AnimationState::new(PulseSource::WordBoundary);
    let mut avatar = Avatar {
        rotation: Vec3::new(1.0, 0.5, 0.0),
        scale: IDLE_SCALE,
    };
    anim.tick(&mut avatar, true, 0.0, &mut rng);
    assert_eq!(avatar.rotation, Vec3::ZERO);
}

#[test]
fn scale_stays_within_talk_bounds() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut anim = AnimationState::new(if seed % 2 == 0 {
            PulseSource::Timer
        } else {
            PulseSource::WordBoundary
        });
        let mut avatar = Avatar::default();
        let mut talking = false;
        for i in 0..3000 {
            if rng.gen_bool(0.01) {
                talking = !talking;
            }
            if rng.gen_bool(0.05) {
                anim.on_word_boundary(&mut rng);
            }
            anim.tick(&mut avatar, talking, i as f64 * FRAME_MS, &mut rng);
            assert!(
                avatar.scale >= IDLE_SCALE && avatar.scale <= IDLE_SCALE + SPEAK_SIZE_SPAN,
                "seed {seed} tick {i}: scale {}",
                avatar.scale
            );
        }
    }
}

#[test]
fn scale_settles_exactly_to_idle_after_talking() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut anim = AnimationState::new(PulseSource::Timer);
    let mut avatar = Avatar {
        rotation: Vec3::ZERO,
        scale: 1.137,
    };
    let mut settled_at = None;
    for i in 0..30 {
        let phase = anim.tick(&mut avatar, false, i as f64 * FRAME_MS, &mut rng);
        if avatar.scale == IDLE_SCALE && settled_at.is_none() {
            settled_at = Some(i);
        }
        if settled_at.is_some() && phase != Phase::Settling {
            assert_eq!(phase, Phase::IdleRotating);
        }
    }
    assert_eq!(avatar.scale, IDLE_SCALE);
    assert_eq!(settled_at, Some(13));
}

#[test]
fn timer_source_schedules_toggle_within_window() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut anim = AnimationState::new(PulseSource::Timer);
        let mut avatar = Avatar::default();
        let now = 10_000.0;
        anim.last_rearm_ms = now;
        anim.tick(&mut avatar, true, now, &mut rng);
        let at = anim.pending_toggle_at.expect("toggle scheduled");
        assert!((now + 500.0..=now + 1500.0).contains(&at), "deadline {at}");
    }
}

#[test]
fn only_one_timer_toggle_is_pending() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut anim = AnimationState::new(PulseSource::Timer);
    let mut avatar = Avatar::default();
    anim.tick(&mut avatar, true, 0.0, &mut rng);
    let first = anim.pending_toggle_at;
    assert!(first.is_some());
    anim.tick(&mut avatar, true, FRAME_MS, &mut rng);
    assert_eq!(anim.pending_toggle_at, first);
}

#[test]
fn due_toggle_flips_pulse_to_grow() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut anim = AnimationState::new(PulseSource::Timer);
    let mut avatar = Avatar::default();
    anim.tick(&mut avatar, true, 0.0, &mut rng);
    let at = anim.pending_toggle_at.expect("toggle scheduled");
    assert_eq!(anim.pulse, PulseDirection::Shrink);
    anim.tick(&mut avatar, true, at, &mut rng);
    assert_eq!(anim.pulse, PulseDirection::Grow);
    assert!(anim.speak_size >= IDLE_SCALE && anim.speak_size <= IDLE_SCALE + SPEAK_SIZE_SPAN);
}

#[test]
fn word_boundary_source_never_schedules_timer() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut anim = AnimationState::new(PulseSource::WordBoundary);
    let mut avatar = Avatar::default();
    for i in 0..200 {
        anim.tick(&mut avatar, true, i as f64 * FRAME_MS, &mut rng);
        assert!(anim.pending_toggle_at.is_none());
    }
    anim.locked = false;
    anim.pulse = PulseDirection::Shrink;
    anim.on_word_boundary(&mut rng);
    assert_eq!(anim.pulse, PulseDirection::Grow);
    assert!(anim.locked);
}

#[test]
fn word_boundary_is_ignored_by_timer_source() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut anim = AnimationState::new(PulseSource::Timer);
    anim.on_word_boundary(&mut rng);
    assert_eq!(anim.pulse, PulseDirection::Shrink);
    assert!(!anim.locked);
}

#[test]
fn rearm_forces_shrink_after_quiet_period() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut anim = AnimationState::new(PulseSource::WordBoundary);
    anim.pulse = PulseDirection::Grow;
    let mut avatar = Avatar::default();
    anim.tick(&mut avatar, false, 600.0, &mut rng);
    assert_eq!(anim.pulse, PulseDirection::Shrink);
    assert!(anim.locked);
    assert_eq!(anim.last_rearm_ms, 600.0);
}
