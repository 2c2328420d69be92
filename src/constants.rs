/// Frame pacing, animation and voice tuning constants.
///
/// These express the widget's intended behavior (frame budget, step sizes,
/// timer windows) and keep magic numbers out of the tick code.
// Render at most 60 frames per second
pub const FRAME_BUDGET_SEC: f32 = 1.0 / 60.0;

// Uniform scale change per rendered frame (not delta-time normalized)
pub const SCALE_STEP: f32 = 0.01;
pub const IDLE_SCALE: f32 = 1.0;

// Talk pulse ceiling is picked in [1, 1 + SPEAK_SIZE_SPAN]
pub const SPEAK_SIZE_SPAN: f32 = 0.15;

// Wall-clock re-arm period for the pulse lock (milliseconds)
pub const PULSE_REARM_MS: f64 = 500.0;

// Randomized pulse toggle delay window, inclusive (milliseconds)
pub const PULSE_TOGGLE_MIN_MS: u32 = 500;
pub const PULSE_TOGGLE_MAX_MS: u32 = 1500;

// Idle rotation
pub const ROTATION_SPEED: f32 = 0.05; // radians per rendered frame
pub const ROTATION_HALF_TURN: f32 = std::f32::consts::PI;

// Local synthesis voice preferences, tried in order
pub const VOICE_PREFERENCES: &[&str] = &["antonio", "daniel", "reed", "brasil", "francisca"];
pub const VOICE_LANG: &str = "pt-BR";
pub const DANIEL_RATE: f32 = 1.5;

// Chat endpoints
pub const LOCAL_CHAT_ENDPOINT: &str = "http://127.0.0.1:5001/stop-dbb76/us-central1/api/chatgpt";
pub const REMOTE_CHAT_ENDPOINT: &str = "https://us-central1-stop-dbb76.cloudfunctions.net/api/chatgpt";
pub const NATURAL_VOICE_ENDPOINT: &str = "https://us-central1-stop-dbb76.cloudfunctions.net/api/voice";
pub const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]", "::1"];

pub const APOLOGY_TEXT: &str = "Desculpe, minha licença do chat GPT expirou.";

// Assets
pub const MODEL_URL: &str = "./models/stone.glb";
pub const AMBIENT_URL: &str = "./sounds/stone.mp3";
pub const DRACO_DECODER_URL: &str = "./draco_decoder.js";
pub const SERVICE_WORKER_URL: &str = "service-worker.js";

// Audio levels
pub const MASTER_GAIN: f32 = 1.0;
pub const VOICE_GAIN: f32 = 1.0;
pub const AMBIENT_GAIN: f32 = 0.35;

// Haptic feedback on mic toggle (milliseconds)
pub const MIC_VIBRATE_MS: u32 = 100;
