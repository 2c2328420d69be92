use crate::chat;
use crate::core::voice::VoiceEvent;
use crate::dom;
use crate::frame::SharedFrame;
use crate::state::SharedStage;
use crate::voice::Voice;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `#speak` click and Enter in the input both submit the text.
pub fn wire_submit(document: &web::Document, stage: &SharedStage, voice: &Voice) {
    let (stage_click, voice_click) = (stage.clone(), voice.clone());
    dom::add_click_listener(document, "#speak", move |_ev| {
        chat::submit(&stage_click, &voice_click);
    });

    let Some(input) = dom::text_input(document) else {
        log::warn!("[chat] no text input on the page");
        return;
    };
    let (stage, voice) = (stage.clone(), voice.clone());
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if ev.code() == "Enter" {
            ev.prevent_default();
            chat::submit(&stage, &voice);
        }
    }) as Box<dyn FnMut(_)>);
    _ = input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Leaving the page silences the stone and frees the input.
pub fn wire_visibility(document: &web::Document, voice: &Voice) {
    let doc = document.clone();
    let voice = voice.clone();
    let closure = Closure::wrap(Box::new(move || {
        if !doc.hidden() {
            return;
        }
        voice.dispatch(VoiceEvent::PageHidden);
        if let Some(input) = dom::text_input(&doc) {
            input.set_value("");
            input.set_disabled(false);
        }
    }) as Box<dyn FnMut()>);
    _ = document
        .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Keep the canvas backing store and camera aspect in step with the window
/// and the visual viewport (mobile keyboards resize only the latter).
pub fn wire_resize(frame_ctx: &SharedFrame) {
    let Some(window) = web::window() else {
        return;
    };
    let ctx = frame_ctx.clone();
    let closure = Closure::wrap(Box::new(move || {
        ctx.borrow_mut().resize();
    }) as Box<dyn FnMut()>);
    _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    if let Some(vv) = window.visual_viewport() {
        _ = vv.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        _ = vv.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
