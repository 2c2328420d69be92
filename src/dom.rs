use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    selector: &str,
    mut handler: impl FnMut(web::Event) + 'static,
) {
    if let Ok(Some(el)) = document.query_selector(selector) {
        let closure =
            Closure::wrap(Box::new(move |ev: web::Event| handler(ev)) as Box<dyn FnMut(_)>);
        _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[inline]
pub fn text_input(document: &web::Document) -> Option<web::HtmlInputElement> {
    document
        .query_selector("input")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
}

#[inline]
pub fn hostname() -> String {
    web::window()
        .and_then(|w| w.location().hostname().ok())
        .unwrap_or_default()
}

#[inline]
pub fn is_hidden() -> bool {
    window_document().map(|d| d.hidden()).unwrap_or(false)
}

/// Chromium exposes its brand list through `navigator.userAgentData`.
pub fn is_chromium() -> bool {
    let Some(window) = web::window() else {
        return false;
    };
    let brands = js_sys::Reflect::get(&window.navigator(), &"userAgentData".into())
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
        .and_then(|data| js_sys::Reflect::get(&data, &"brands".into()).ok())
        .and_then(|b| b.dyn_into::<js_sys::Array>().ok());
    let Some(brands) = brands else {
        return false;
    };
    let found = brands.iter().any(|entry| {
        js_sys::Reflect::get(&entry, &"brand".into())
            .ok()
            .and_then(|b| b.as_string())
            .map(|b| b.to_lowercase().contains("chrome"))
            .unwrap_or(false)
    });
    found
}

/// Size of the visual viewport in CSS pixels, falling back to the window.
pub fn viewport_size() -> (f64, f64) {
    let Some(window) = web::window() else {
        return (1.0, 1.0);
    };
    if let Some(vv) = window.visual_viewport() {
        return (vv.width(), vv.height());
    }
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    (w, h)
}

/// Set the canvas backing store to viewport size * devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (f64, f64) {
    let (w_css, h_css) = viewport_size();
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        canvas.set_width(((w_css * dpr) as u32).max(1));
        canvas.set_height(((h_css * dpr) as u32).max(1));
        let style = canvas.style();
        _ = style.set_property("width", &format!("{}px", w_css));
        _ = style.set_property("height", &format!("{}px", h_css));
    }
    (w_css, h_css)
}

/// Flip the page from its loading state to the running widget.
pub fn mark_loaded(document: &web::Document) {
    if let Some(body) = document.body() {
        _ = body.class_list().add_1("loaded");
    }
    if let Ok(Some(figure)) = document.query_selector("figure") {
        figure.remove();
    }
    if let Ok(Some(footer)) = document.query_selector("footer") {
        if let Some(footer) = footer.dyn_ref::<web::HtmlElement>() {
            _ = footer.style().remove_property("display");
        }
    }
}

pub fn release_input(document: &web::Document) {
    if let Some(input) = text_input(document) {
        input.set_value("");
        input.set_disabled(false);
        _ = input.focus();
    }
}
