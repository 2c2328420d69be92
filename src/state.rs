use crate::core::chat::ChatGate;
use crate::core::listen::MicState;
use crate::core::{AnimationState, Avatar, PulseSource, ReadinessLatch, StoneConfig, VoiceSession};
use std::cell::RefCell;
use std::rc::Rc;

/// Mutable widget state shared by the frame loop and DOM/audio callbacks.
///
/// Only ever touched from the main thread; callers must not hold a borrow
/// across an `.await`.
pub struct Stage {
    pub config: StoneConfig,
    pub anim: AnimationState,
    // Created once the model has loaded
    pub avatar: Option<Avatar>,
    pub session: VoiceSession,
    pub chat: ChatGate,
    pub mic: MicState,
    pub ready: ReadinessLatch,
}

pub type SharedStage = Rc<RefCell<Stage>>;

impl Stage {
    pub fn new(config: StoneConfig, pulse_source: PulseSource) -> Self {
        let session = VoiceSession::new(config.voice_mode, config.ambient);
        Self {
            config,
            anim: AnimationState::new(pulse_source),
            avatar: None,
            session,
            chat: ChatGate::default(),
            mic: MicState::default(),
            ready: ReadinessLatch::new(),
        }
    }

    pub fn shared(self) -> SharedStage {
        Rc::new(RefCell::new(self))
    }
}
