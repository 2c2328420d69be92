// Voice selection and the talking/audio session state machine.
//
// Browser callbacks (playback start/end, synthesis boundary/end/pause/error,
// page visibility) are turned into [`VoiceEvent`]s. [`VoiceSession::handle`]
// updates the talking flag and answers with the [`VoiceCommand`]s the web
// layer must carry out, so every node it asks to create is paired with a
// release on each exit path.

use crate::constants::{DANIEL_RATE, VOICE_PREFERENCES};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    pub lang: String,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

#[inline]
fn lang_prefix(lang: &str) -> String {
    lang.chars().take(2).collect::<String>().to_lowercase()
}

/// Index of the voice to use for `lang`.
///
/// Preferences are tried in order as case-insensitive name substrings among
/// voices sharing the language prefix (`pt` for `pt-BR`). When none match,
/// the first voice of that language is used.
pub fn select_voice(voices: &[VoiceInfo], preferences: &[&str], lang: &str) -> Option<usize> {
    let wanted = lang_prefix(lang);
    let same_lang = |v: &VoiceInfo| lang_prefix(&v.lang) == wanted;
    preferences
        .iter()
        .find_map(|pref| {
            let pref = pref.to_lowercase();
            voices
                .iter()
                .position(|v| same_lang(v) && v.name.to_lowercase().contains(&pref))
        })
        .or_else(|| voices.iter().position(same_lang))
}

#[inline]
pub fn default_preferences() -> &'static [&'static str] {
    VOICE_PREFERENCES
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
}

impl Default for Prosody {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// Per-voice rate/pitch overrides.
pub fn prosody_for(voice_name: &str) -> Prosody {
    if voice_name.to_lowercase().contains("daniel") {
        Prosody {
            rate: DANIEL_RATE,
            ..Prosody::default()
        }
    } else {
        Prosody::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceMode {
    /// Browser speech synthesis.
    Local,
    /// Remote synthesized audio, falling back to `Local` on failure.
    Natural,
}

/// Playback lifecycle events. Everything after `Requested` carries the
/// generation of the request that produced it; events from an older
/// generation are stale and ignored.
#[derive(Clone, Debug, PartialEq)]
pub enum VoiceEvent {
    Requested(String),
    RemoteStarted(u64),
    RemoteEnded(u64),
    RemoteFailed { text: String, generation: u64 },
    LocalStarted(u64),
    LocalBoundary(u64),
    LocalEnded(u64),
    LocalPaused(u64),
    LocalError(u64),
    /// Current speech abandoned (e.g. the chat request failed).
    Interrupted,
    PageHidden,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VoiceCommand {
    FetchRemote { text: String, generation: u64 },
    SpeakLocal { text: String, generation: u64 },
    CancelSynthesis,
    ReleaseVoice,
    StartAmbient,
    ReleaseAmbient,
    TogglePulse,
}

pub type VoiceCommands = SmallVec<[VoiceCommand; 4]>;

#[derive(Clone, Debug)]
pub struct VoiceSession {
    mode: VoiceMode,
    ambient: bool,
    talking: bool,
    voice_active: bool,
    ambient_active: bool,
    // Bumped by every request and every interruption
    generation: u64,
}

impl VoiceSession {
    pub fn new(mode: VoiceMode, ambient: bool) -> Self {
        Self {
            mode,
            ambient,
            talking: false,
            voice_active: false,
            ambient_active: false,
            generation: 0,
        }
    }

    #[inline]
    pub fn talking(&self) -> bool {
        self.talking
    }

    #[inline]
    pub fn voice_active(&self) -> bool {
        self.voice_active
    }

    #[inline]
    pub fn ambient_active(&self) -> bool {
        self.ambient_active
    }

    /// Whether work started for `generation` may still produce sound.
    #[inline]
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn handle(&mut self, event: VoiceEvent) -> VoiceCommands {
        let mut out = VoiceCommands::new();
        match event {
            VoiceEvent::Requested(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return out;
                }
                self.silence(&mut out);
                let text = text.to_owned();
                let generation = self.generation;
                out.push(match self.mode {
                    VoiceMode::Natural => VoiceCommand::FetchRemote { text, generation },
                    VoiceMode::Local => VoiceCommand::SpeakLocal { text, generation },
                });
            }
            VoiceEvent::RemoteStarted(g) if !self.is_current(g) => {
                // The slot was filled for a superseded request
                self.voice_active = false;
                out.push(VoiceCommand::ReleaseVoice);
            }
            VoiceEvent::RemoteStarted(_) => {
                self.talking = true;
                self.voice_active = true;
                if self.ambient {
                    self.release_ambient(&mut out);
                    out.push(VoiceCommand::StartAmbient);
                    self.ambient_active = true;
                }
            }
            VoiceEvent::RemoteEnded(g) if self.is_current(g) => {
                self.talking = false;
                self.release_voice(&mut out);
                self.release_ambient(&mut out);
            }
            VoiceEvent::RemoteFailed { text, generation } if self.is_current(generation) => {
                self.talking = false;
                self.release_voice(&mut out);
                self.release_ambient(&mut out);
                out.push(VoiceCommand::SpeakLocal { text, generation });
            }
            VoiceEvent::LocalStarted(g) if self.is_current(g) => self.talking = true,
            VoiceEvent::LocalBoundary(g) if self.is_current(g) => {
                out.push(VoiceCommand::TogglePulse)
            }
            VoiceEvent::LocalEnded(g) | VoiceEvent::LocalPaused(g) if self.is_current(g) => {
                self.talking = false
            }
            VoiceEvent::LocalError(g) if self.is_current(g) => {
                self.talking = false;
                out.push(VoiceCommand::CancelSynthesis);
            }
            VoiceEvent::Interrupted | VoiceEvent::PageHidden => self.silence(&mut out),
            VoiceEvent::RemoteEnded(_)
            | VoiceEvent::RemoteFailed { .. }
            | VoiceEvent::LocalStarted(_)
            | VoiceEvent::LocalBoundary(_)
            | VoiceEvent::LocalEnded(_)
            | VoiceEvent::LocalPaused(_)
            | VoiceEvent::LocalError(_) => {}
        }
        out
    }

    /// Stop all speech and audio and start a new generation.
    fn silence(&mut self, out: &mut VoiceCommands) {
        self.generation += 1;
        self.talking = false;
        out.push(VoiceCommand::CancelSynthesis);
        self.release_voice(out);
        self.release_ambient(out);
    }

    fn release_voice(&mut self, out: &mut VoiceCommands) {
        if self.voice_active {
            self.voice_active = false;
            out.push(VoiceCommand::ReleaseVoice);
        }
    }

    fn release_ambient(&mut self, out: &mut VoiceCommands) {
        if self.ambient_active {
            self.ambient_active = false;
            out.push(VoiceCommand::ReleaseAmbient);
        }
    }
}
