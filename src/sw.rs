use crate::constants::SERVICE_WORKER_URL;
use crate::http::js_err;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// Register the offline worker (https only) and reload when it announces
/// an update.
pub fn register() {
    let Some(window) = web::window() else {
        return;
    };
    if window.location().protocol().ok().as_deref() != Some("https:") {
        log::debug!("[sw] skipped outside https");
        return;
    }
    let container = window.navigator().service_worker();

    let on_message = Closure::wrap(Box::new(move |ev: web::MessageEvent| {
        let data = ev.data().as_string();
        log::info!("[sw] message: {:?}", data);
        if data.as_deref() == Some("update") {
            if let Some(w) = web::window() {
                _ = w.location().reload();
            }
        }
    }) as Box<dyn FnMut(_)>);
    container.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    spawn_local(async move {
        let registered = JsFuture::from(container.register(SERVICE_WORKER_URL))
            .await
            .map_err(js_err);
        match registered {
            Ok(_) => log::info!("[sw] registered {}", SERVICE_WORKER_URL),
            Err(e) => log::warn!("[sw] registration failed: {:?}", e),
        }
    });
}
