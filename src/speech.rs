//! Local text-to-speech through the browser's `speechSynthesis`.

use crate::core::voice::{prosody_for, select_voice, VoiceEvent, VoiceInfo};
use crate::http::js_err;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

pub type EventSink = Rc<dyn Fn(VoiceEvent)>;

/// Callbacks attached to the utterance currently being spoken.
struct Utterance {
    utterance: web::SpeechSynthesisUtterance,
    _handlers: [Closure<dyn FnMut()>; 4],
}

impl Utterance {
    fn detach(&self) {
        self.utterance.set_onboundary(None);
        self.utterance.set_onend(None);
        self.utterance.set_onpause(None);
        self.utterance.set_onerror(None);
    }
}

pub struct Speech {
    synth: web::SpeechSynthesis,
    lang: String,
    preferences: Vec<String>,
    // Resolves once the engine has published its voice list
    voices_ready: js_sys::Promise,
    voice: RefCell<Option<web::SpeechSynthesisVoice>>,
    current: RefCell<Option<Utterance>>,
    sink: EventSink,
}

fn list_voices(synth: &web::SpeechSynthesis) -> Vec<web::SpeechSynthesisVoice> {
    synth
        .get_voices()
        .iter()
        .filter_map(|v| v.dyn_into::<web::SpeechSynthesisVoice>().ok())
        .collect()
}

impl Speech {
    pub fn new(lang: &str, preferences: &[&str], sink: EventSink) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let synth = window.speech_synthesis().map_err(js_err)?;
        let voices_ready = if list_voices(&synth).is_empty() {
            let synth_cb = synth.clone();
            js_sys::Promise::new(&mut |resolve, _reject| {
                synth_cb.set_onvoiceschanged(Some(&resolve));
            })
        } else {
            js_sys::Promise::resolve(&JsValue::TRUE)
        };
        Ok(Self {
            synth,
            lang: lang.to_owned(),
            preferences: preferences.iter().map(|p| p.to_string()).collect(),
            voices_ready,
            voice: RefCell::new(None),
            current: RefCell::new(None),
            sink,
        })
    }

    /// Stop whatever is being spoken. Callbacks of the interrupted utterance
    /// are detached first so they cannot report on the next one.
    pub fn cancel(&self) {
        if let Some(old) = self.current.borrow_mut().take() {
            old.detach();
        }
        self.synth.cancel();
    }

    /// Wait for the voice list once and pick the voice to speak with.
    pub async fn ready(&self) {
        if self.voice.borrow().is_some() {
            return;
        }
        _ = JsFuture::from(self.voices_ready.clone()).await;
        self.synth.set_onvoiceschanged(None);
        let voices = list_voices(&self.synth);
        let infos: Vec<VoiceInfo> = voices
            .iter()
            .map(|v| VoiceInfo::new(v.name(), v.lang()))
            .collect();
        let prefs: Vec<&str> = self.preferences.iter().map(String::as_str).collect();
        let chosen = select_voice(&infos, &prefs, &self.lang).map(|i| voices[i].clone());
        match &chosen {
            Some(v) => log::info!("[voice] using {} ({})", v.name(), v.lang()),
            None => log::warn!(
                "[voice] no {} voice among {} available; using engine default",
                self.lang,
                voices.len()
            ),
        }
        *self.voice.borrow_mut() = chosen;
    }

    fn handler(&self, event: VoiceEvent) -> Closure<dyn FnMut()> {
        let sink = self.sink.clone();
        Closure::wrap(Box::new(move || sink(event.clone())) as Box<dyn FnMut()>)
    }

    /// Speak `text`, tagging every callback with `generation`.
    pub fn speak(&self, text: &str, generation: u64) -> anyhow::Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.cancel();

        let utterance = web::SpeechSynthesisUtterance::new_with_text(text).map_err(js_err)?;
        match self.voice.borrow().as_ref() {
            Some(v) => {
                utterance.set_voice(Some(v));
                utterance.set_lang(&v.lang());
                let prosody = prosody_for(&v.name());
                utterance.set_rate(prosody.rate);
                utterance.set_pitch(prosody.pitch);
            }
            None => utterance.set_lang(&self.lang),
        }
        let handlers = [
            self.handler(VoiceEvent::LocalBoundary(generation)),
            self.handler(VoiceEvent::LocalEnded(generation)),
            self.handler(VoiceEvent::LocalPaused(generation)),
            self.handler(VoiceEvent::LocalError(generation)),
        ];
        utterance.set_onboundary(Some(handlers[0].as_ref().unchecked_ref()));
        utterance.set_onend(Some(handlers[1].as_ref().unchecked_ref()));
        utterance.set_onpause(Some(handlers[2].as_ref().unchecked_ref()));
        utterance.set_onerror(Some(handlers[3].as_ref().unchecked_ref()));

        (self.sink)(VoiceEvent::LocalStarted(generation));
        self.synth.speak(&utterance);
        *self.current.borrow_mut() = Some(Utterance {
            utterance,
            _handlers: handlers,
        });
        Ok(())
    }
}
