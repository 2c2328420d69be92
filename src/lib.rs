#![cfg(target_arch = "wasm32")]
use crate::core::StoneConfig;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

mod audio;
mod chat;
mod constants;
mod core;
mod dom;
mod draco;
mod events;
mod frame;
mod http;
mod loader;
mod mic;
mod render;
mod scene;
mod speech;
mod state;
mod sw;
mod voice;

const CANVAS_ID: &str = "stone-canvas";

async fn document_complete(window: &web::Window, document: &web::Document) -> anyhow::Result<()> {
    if document.ready_state() == "complete" {
        return Ok(());
    }
    let target = window.clone();
    let loaded = js_sys::Promise::new(&mut |resolve, _reject| {
        _ = target.add_event_listener_with_callback("load", &resolve);
    });
    JsFuture::from(loaded).await.map_err(http::js_err)?;
    Ok(())
}

fn read_config(window: &web::Window) -> StoneConfig {
    let query = window.location().search().unwrap_or_default();
    let (config, errors) = StoneConfig::from_query(&query);
    for e in errors {
        log::warn!("[config] {}", e);
    }
    config
}

fn stone_canvas(document: &web::Document) -> anyhow::Result<web::HtmlCanvasElement> {
    let el = match document.get_element_by_id(CANVAS_ID) {
        Some(el) => el,
        None => {
            let el = document.create_element("canvas").map_err(http::js_err)?;
            el.set_id(CANVAS_ID);
            let body = document
                .body()
                .ok_or_else(|| anyhow::anyhow!("no body"))?;
            body.append_child(&el).map_err(http::js_err)?;
            el
        }
    };
    el.dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("stone-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    document_complete(&window, &document).await?;

    let config = read_config(&window);
    let chromium = dom::is_chromium();
    let pulse = config.pulse_source(chromium);
    log::info!(
        "[voice] mode={:?} lang={} pulse={:?} (chromium={})",
        config.voice_mode,
        config.lang,
        pulse,
        chromium
    );
    let model_url = config.model_url.clone();
    let stage = state::Stage::new(config, pulse).shared();

    let canvas = stone_canvas(&document)?;
    dom::sync_canvas_backing_size(&canvas);

    let voice = voice::Voice::new(stage.clone());
    events::wire_submit(&document, &stage, &voice);
    events::wire_visibility(&document, &voice);
    mic::wire(&document, stage.clone(), voice);
    sw::register();

    let gpu = match render::GpuState::new(&canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("GPU init error: {:?}", e);
            None
        }
    };
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext::new(stage, gpu, canvas)));
    events::wire_resize(&frame_ctx);

    if let Err(e) = loader::load_model(&model_url, frame_ctx).await {
        log::error!("[loader] {} failed: {:?}", model_url, e);
    }
    Ok(())
}
