//! Microphone dictation into the text input via the browser's
//! `SpeechRecognition` (or the prefixed `webkitSpeechRecognition`).

use crate::constants::MIC_VIBRATE_MS;
use crate::core::listen::{join_transcripts, MicAction};
use crate::core::voice::VoiceEvent;
use crate::dom;
use crate::http::js_err;
use crate::state::SharedStage;
use crate::voice::Voice;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Handle to a recognition object that is only reachable through reflection.
#[derive(Clone)]
struct Recognizer {
    inner: JsValue,
}

impl Recognizer {
    fn create(lang: &str) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let ctor = ["SpeechRecognition", "webkitSpeechRecognition"]
            .iter()
            .filter_map(|name| Reflect::get(&window, &JsValue::from_str(name)).ok())
            .find_map(|v| v.dyn_into::<Function>().ok())
            .ok_or_else(|| anyhow::anyhow!("speech recognition not supported"))?;
        let inner = Reflect::construct(&ctor, &Array::new()).map_err(js_err)?;
        Reflect::set(&inner, &"lang".into(), &JsValue::from_str(lang)).map_err(js_err)?;
        Reflect::set(&inner, &"continuous".into(), &JsValue::TRUE).map_err(js_err)?;
        Ok(Self { inner })
    }

    fn call(&self, method: &str) -> anyhow::Result<()> {
        let f = Reflect::get(&self.inner, &JsValue::from_str(method))
            .map_err(js_err)?
            .dyn_into::<Function>()
            .map_err(js_err)?;
        f.call0(&self.inner).map_err(js_err)?;
        Ok(())
    }

    fn set_handler(&self, name: &str, cb: &Closure<dyn FnMut(JsValue)>) {
        _ = Reflect::set(&self.inner, &JsValue::from_str(name), cb.as_ref());
    }
}

fn transcripts(event: &JsValue) -> String {
    let Ok(results) = Reflect::get(event, &"results".into()) else {
        return String::new();
    };
    let results = Array::from(&results);
    join_transcripts(results.iter().map(|result| {
        Array::from(&result)
            .iter()
            .filter_map(|alt| Reflect::get(&alt, &"transcript".into()).ok())
            .filter_map(|t| t.as_string())
            .collect::<Vec<_>>()
    }))
}

fn vibrate() {
    if let Some(w) = web::window() {
        _ = w.navigator().vibrate_with_duration(MIC_VIBRATE_MS);
    }
}

fn set_listening_class(document: &web::Document, on: bool) {
    if let Ok(Some(btn)) = document.query_selector("#mic") {
        let classes = btn.class_list();
        _ = if on {
            classes.add_1("listening")
        } else {
            classes.remove_1("listening")
        };
    }
}

/// Wire the `#mic` button. Without recognition support the button only logs.
pub fn wire(document: &web::Document, stage: SharedStage, voice: Voice) {
    let lang = stage.borrow().config.lang.clone();
    let recognizer = match Recognizer::create(&lang) {
        Ok(r) => Some(r),
        Err(e) => {
            log::warn!("[mic] {:?}", e);
            None
        }
    };

    if let Some(rec) = &recognizer {
        let doc = document.clone();
        let on_result = Closure::wrap(Box::new(move |ev: JsValue| {
            if let Some(input) = dom::text_input(&doc) {
                input.set_value(&transcripts(&ev));
            }
        }) as Box<dyn FnMut(JsValue)>);
        rec.set_handler("onresult", &on_result);
        on_result.forget();

        let doc = document.clone();
        let stage_end = stage.clone();
        let rec_end = rec.clone();
        let on_speech_end = Closure::wrap(Box::new(move |_ev: JsValue| {
            if stage_end.borrow_mut().mic.stop() {
                set_listening_class(&doc, false);
                _ = rec_end.call("stop");
                log::debug!("[mic] speech ended");
            }
        }) as Box<dyn FnMut(JsValue)>);
        rec.set_handler("onspeechend", &on_speech_end);
        on_speech_end.forget();
    }

    let doc = document.clone();
    dom::add_click_listener(document, "#mic", move |ev| {
        ev.stop_propagation();
        let Some(rec) = &recognizer else {
            log::warn!("[mic] dictation unavailable in this browser");
            stage.borrow_mut().mic.stop();
            return;
        };
        let action = stage.borrow_mut().mic.toggle();
        vibrate();
        match action {
            MicAction::Start => {
                _ = rec.call("abort");
                voice.dispatch(VoiceEvent::Interrupted);
                set_listening_class(&doc, true);
                if let Some(input) = dom::text_input(&doc) {
                    input.set_value("");
                }
                if let Err(e) = rec.call("start") {
                    log::error!("[mic] start failed: {:?}", e);
                    stage.borrow_mut().mic.stop();
                    set_listening_class(&doc, false);
                }
            }
            MicAction::Stop => {
                set_listening_class(&doc, false);
                _ = rec.call("abort");
            }
        }
    });
}
