//! Runs the voice session: remote natural voice, local synthesis fallback,
//! ambient loop and the talking flag.

use crate::audio::{self, AudioSession};
use crate::constants::AMBIENT_URL;
use crate::core::voice::{default_preferences, VoiceCommand, VoiceEvent};
use crate::http;
use crate::speech::Speech;
use crate::state::SharedStage;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

struct VoiceInner {
    stage: SharedStage,
    speech: Option<Speech>,
    // Created on first remote playback, after a user gesture
    audio: RefCell<Option<AudioSession>>,
    natural_url: String,
}

#[derive(Clone)]
pub struct Voice {
    inner: Rc<VoiceInner>,
}

impl Voice {
    pub fn new(stage: SharedStage) -> Self {
        let (lang, natural_url) = {
            let s = stage.borrow();
            (s.config.lang.clone(), s.config.natural_voice_url.clone())
        };
        let inner = Rc::new_cyclic(|weak: &Weak<VoiceInner>| {
            let weak = weak.clone();
            let sink = Rc::new(move |ev: VoiceEvent| {
                if let Some(inner) = weak.upgrade() {
                    Voice { inner }.dispatch_deferred(ev);
                }
            });
            let speech = match Speech::new(&lang, default_preferences(), sink) {
                Ok(s) => Some(s),
                Err(e) => {
                    log::warn!("[voice] speech synthesis unavailable: {:?}", e);
                    None
                }
            };
            VoiceInner {
                stage,
                speech,
                audio: RefCell::new(None),
                natural_url,
            }
        });
        Self { inner }
    }

    /// Speak `text` through the configured path.
    pub fn say(&self, text: &str) {
        self.dispatch(VoiceEvent::Requested(text.to_owned()));
    }

    pub fn dispatch(&self, event: VoiceEvent) {
        let commands = {
            let mut stage = self.inner.stage.borrow_mut();
            let session = &mut stage.session;
            let commands = session.handle(event.clone());
            log::debug!(
                "[voice] {:?} -> {:?} (talking={} voice_active={})",
                event,
                commands,
                session.talking(),
                session.voice_active()
            );
            commands
        };
        for cmd in commands {
            self.run(cmd);
        }
    }

    /// Dispatch from a browser callback on the next microtask, once the
    /// callback has returned and no borrows are live.
    fn dispatch_deferred(&self, event: VoiceEvent) {
        let voice = self.clone();
        spawn_local(async move { voice.dispatch(event) });
    }

    fn run(&self, cmd: VoiceCommand) {
        match cmd {
            VoiceCommand::FetchRemote { text, generation } => {
                let voice = self.clone();
                spawn_local(async move {
                    if let Err(e) = voice.play_remote(&text, generation).await {
                        log::warn!("[voice] natural voice failed, using local: {:?}", e);
                        voice.dispatch(VoiceEvent::RemoteFailed { text, generation });
                    }
                });
            }
            VoiceCommand::SpeakLocal { text, generation } => {
                let voice = self.clone();
                spawn_local(async move {
                    let Some(speech) = voice.inner.speech.as_ref() else {
                        log::warn!("[voice] cannot speak {:?}: no synthesis engine", text);
                        return;
                    };
                    speech.ready().await;
                    if !voice.is_current(generation) {
                        log::debug!("[voice] dropping superseded utterance {}", generation);
                        return;
                    }
                    if let Err(e) = speech.speak(&text, generation) {
                        log::error!("[voice] speak error: {:?}", e);
                        voice.dispatch(VoiceEvent::LocalError(generation));
                    }
                });
            }
            VoiceCommand::CancelSynthesis => {
                if let Some(speech) = &self.inner.speech {
                    speech.cancel();
                }
            }
            VoiceCommand::ReleaseVoice => {
                if let Some(a) = self.inner.audio.borrow_mut().as_mut() {
                    a.release_voice();
                }
            }
            VoiceCommand::StartAmbient => {
                let voice = self.clone();
                spawn_local(async move {
                    if let Err(e) = voice.start_ambient().await {
                        log::warn!("[voice] ambient loop unavailable: {:?}", e);
                    }
                });
            }
            VoiceCommand::ReleaseAmbient => {
                if let Some(a) = self.inner.audio.borrow_mut().as_mut() {
                    a.release_ambient();
                }
            }
            VoiceCommand::TogglePulse => {
                self.inner
                    .stage
                    .borrow_mut()
                    .anim
                    .on_word_boundary(&mut rand::thread_rng());
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.stage.borrow().session.is_current(generation)
    }

    fn audio_context(&self) -> anyhow::Result<web::AudioContext> {
        let mut slot = self.inner.audio.borrow_mut();
        if slot.is_none() {
            *slot = Some(AudioSession::new()?);
        }
        slot.as_ref()
            .map(AudioSession::context)
            .ok_or_else(|| anyhow::anyhow!("audio session missing"))
    }

    async fn play_remote(&self, text: &str, generation: u64) -> anyhow::Result<()> {
        let resp = http::post(&self.inner.natural_url, "text/plain", text).await?;
        if !resp.ok() {
            anyhow::bail!("natural voice endpoint answered HTTP {}", resp.status());
        }
        let bytes = http::array_buffer(&resp).await?;
        let ctx = self.audio_context()?;
        let buffer = audio::decode(&ctx, &bytes).await?;
        if !self.is_current(generation) {
            log::debug!("[voice] dropping superseded natural voice {}", generation);
            return Ok(());
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner
            .audio
            .borrow_mut()
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("audio session missing"))?
            .play_voice(&buffer, move || {
                if let Some(inner) = weak.upgrade() {
                    Voice { inner }.dispatch_deferred(VoiceEvent::RemoteEnded(generation));
                }
            })?;
        self.dispatch(VoiceEvent::RemoteStarted(generation));
        Ok(())
    }

    async fn start_ambient(&self) -> anyhow::Result<()> {
        let cached = self
            .inner
            .audio
            .borrow()
            .as_ref()
            .and_then(AudioSession::ambient_buffer);
        let buffer = match cached {
            Some(b) => b,
            None => {
                let ctx = self.audio_context()?;
                let resp = http::get(AMBIENT_URL).await?;
                let bytes = http::array_buffer(&resp).await?;
                let b = audio::decode(&ctx, &bytes).await?;
                if let Some(a) = self.inner.audio.borrow_mut().as_mut() {
                    a.set_ambient_buffer(b.clone());
                }
                b
            }
        };
        // The utterance may have ended while the loop was loading
        if !self.inner.stage.borrow().session.ambient_active() {
            return Ok(());
        }
        if let Some(a) = self.inner.audio.borrow_mut().as_mut() {
            a.play_ambient(&buffer)?;
        }
        Ok(())
    }
}
