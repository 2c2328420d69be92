// Procedural avatar animation: idle rotation and talk-reactive pulsing.
//
// The state machine is advanced once per rendered frame by
// [`AnimationState::tick`]. Scale steps are fixed per tick rather than
// normalized by frame delta; the render loop caps the tick rate instead.

use crate::constants::{
    IDLE_SCALE, PULSE_REARM_MS, PULSE_TOGGLE_MAX_MS, PULSE_TOGGLE_MIN_MS, ROTATION_HALF_TURN,
    ROTATION_SPEED, SCALE_STEP, SPEAK_SIZE_SPAN,
};
use glam::Vec3;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spin {
    Forward,
    Reverse,
}

/// Direction the talk pulse is currently heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseDirection {
    Grow,
    Shrink,
}

/// What flips the pulse direction while talking.
///
/// Chromium fires no usable word-boundary events for most voices, so a
/// randomized timer drives the pulse there; elsewhere the synthesis engine's
/// boundary callback does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseSource {
    Timer,
    WordBoundary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    IdleRotating,
    Growing,
    Shrinking,
    Holding,
    Settling,
}

/// The rendered model's mutable transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Avatar {
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: IDLE_SCALE,
        }
    }
}

impl Avatar {
    #[inline]
    fn grow_towards(&mut self, ceiling: f32) {
        self.scale = (self.scale + SCALE_STEP).min(ceiling);
    }

    #[inline]
    fn shrink_towards(&mut self, floor: f32) {
        self.scale = (self.scale - SCALE_STEP).max(floor);
    }

    /// Step back towards idle scale, landing on it exactly.
    fn settle(&mut self) {
        if self.scale > IDLE_SCALE {
            self.shrink_towards(IDLE_SCALE);
        } else {
            self.grow_towards(IDLE_SCALE);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RotationCycle {
    pub axis: Axis,
    pub spin: Spin,
    pub speed: f32,
    pub cycle: f32,
}

impl Default for RotationCycle {
    fn default() -> Self {
        Self {
            axis: Axis::X,
            spin: Spin::Forward,
            speed: ROTATION_SPEED,
            cycle: 0.0,
        }
    }
}

impl RotationCycle {
    fn step<R: Rng + ?Sized>(&mut self, rotation: &mut Vec3, rng: &mut R) {
        if self.cycle >= ROTATION_HALF_TURN {
            self.axis = if rng.gen_bool(0.5) { Axis::Y } else { Axis::X };
            self.spin = if rng.gen_bool(0.5) {
                Spin::Forward
            } else {
                Spin::Reverse
            };
            self.cycle = 0.0;
        }
        let delta = match self.spin {
            Spin::Forward => self.speed,
            Spin::Reverse => -self.speed,
        };
        match self.axis {
            Axis::Y => {
                rotation.x = 0.0;
                rotation.y += delta;
            }
            Axis::X => {
                rotation.x += delta;
                rotation.y = 0.0;
            }
        }
        self.cycle += self.speed;
    }
}

#[derive(Clone, Debug)]
pub struct AnimationState {
    pub pulse: PulseDirection,
    pub locked: bool,
    /// Scale ceiling for the current grow pulse.
    pub speak_size: f32,
    pub last_rearm_ms: f64,
    /// Deadline of the scheduled timer toggle, if one is pending.
    pub pending_toggle_at: Option<f64>,
    pub source: PulseSource,
    pub rotation: RotationCycle,
}

impl AnimationState {
    pub fn new(source: PulseSource) -> Self {
        Self {
            pulse: PulseDirection::Shrink,
            locked: false,
            speak_size: IDLE_SCALE,
            last_rearm_ms: 0.0,
            pending_toggle_at: None,
            source,
            rotation: RotationCycle::default(),
        }
    }

    pub fn phase(&self, avatar: &Avatar, talking: bool) -> Phase {
        if talking {
            match self.pulse {
                PulseDirection::Shrink if avatar.scale > IDLE_SCALE => Phase::Shrinking,
                PulseDirection::Grow if avatar.scale < self.speak_size => Phase::Growing,
                _ => Phase::Holding,
            }
        } else if avatar.scale != IDLE_SCALE {
            Phase::Settling
        } else {
            Phase::IdleRotating
        }
    }

    /// Flip the pulse direction; a switch to growth picks a fresh ceiling.
    pub fn toggle_pulse<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pulse = match self.pulse {
            PulseDirection::Grow => PulseDirection::Shrink,
            PulseDirection::Shrink => PulseDirection::Grow,
        };
        if self.pulse == PulseDirection::Grow {
            self.speak_size = IDLE_SCALE + rng.gen::<f32>() * SPEAK_SIZE_SPAN;
        }
        self.locked = true;
    }

    /// Word-boundary callback from the synthesis engine. Ignored when the
    /// timer drives the pulse.
    pub fn on_word_boundary<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.source == PulseSource::WordBoundary {
            self.toggle_pulse(rng);
        }
    }

    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        avatar: &mut Avatar,
        talking: bool,
        now_ms: f64,
        rng: &mut R,
    ) -> Phase {
        if let Some(at) = self.pending_toggle_at {
            if now_ms >= at {
                self.pending_toggle_at = None;
                self.toggle_pulse(rng);
            }
        }

        if !self.locked && now_ms - self.last_rearm_ms > PULSE_REARM_MS {
            self.last_rearm_ms = now_ms;
            self.pulse = PulseDirection::Shrink;
            self.locked = true;
        }

        let phase = self.phase(avatar, talking);
        match phase {
            Phase::Growing => {
                avatar.rotation = Vec3::ZERO;
                avatar.grow_towards(self.speak_size);
            }
            Phase::Shrinking => {
                avatar.rotation = Vec3::ZERO;
                avatar.shrink_towards(IDLE_SCALE);
            }
            Phase::Holding => avatar.rotation = Vec3::ZERO,
            Phase::Settling => avatar.settle(),
            Phase::IdleRotating => self.rotation.step(&mut avatar.rotation, rng),
        }

        if talking && self.pulse_bound_reached(avatar) {
            self.locked = false;
        }

        if self.source == PulseSource::Timer && !self.locked && self.pending_toggle_at.is_none() {
            let delay = rng.gen_range(PULSE_TOGGLE_MIN_MS..=PULSE_TOGGLE_MAX_MS);
            self.pending_toggle_at = Some(now_ms + delay as f64);
        }
        phase
    }

    fn pulse_bound_reached(&self, avatar: &Avatar) -> bool {
        match self.pulse {
            PulseDirection::Grow => avatar.scale >= self.speak_size,
            PulseDirection::Shrink => avatar.scale <= IDLE_SCALE,
        }
    }
}
