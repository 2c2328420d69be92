pub mod animation;
pub mod chat;
pub mod clock;
pub mod config;
pub mod constants;
pub mod listen;
pub mod model;
pub mod readiness;
pub mod voice;

pub use animation::{AnimationState, Avatar, PulseSource};
pub use clock::FrameClock;
pub use config::StoneConfig;
pub use constants::*;
pub use readiness::ReadinessLatch;
pub use voice::{VoiceCommand, VoiceEvent, VoiceSession};

// Shaders bundled as string constants
pub static STONE_WGSL: &str = include_str!("../../shaders/stone.wgsl");
