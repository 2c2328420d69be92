use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

#[inline]
pub fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

async fn fetch(request: &web::Request) -> anyhow::Result<web::Response> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp = JsFuture::from(window.fetch_with_request(request))
        .await
        .map_err(js_err)?;
    resp.dyn_into::<web::Response>().map_err(js_err)
}

/// POST `body` with the given content type. HTTP error statuses are not
/// turned into errors here; callers inspect `Response::ok`.
pub async fn post(url: &str, content_type: &str, body: &str) -> anyhow::Result<web::Response> {
    let opts = web::RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(web::RequestMode::Cors);
    opts.set_body(&JsValue::from_str(body));
    let request = web::Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
    request
        .headers()
        .set("content-type", content_type)
        .map_err(js_err)?;
    fetch(&request).await
}

pub async fn get(url: &str) -> anyhow::Result<web::Response> {
    let request = web::Request::new_with_str(url).map_err(js_err)?;
    let resp = fetch(&request).await?;
    if !resp.ok() {
        anyhow::bail!("GET {} -> HTTP {}", url, resp.status());
    }
    Ok(resp)
}

pub async fn text(resp: &web::Response) -> anyhow::Result<String> {
    let value = JsFuture::from(resp.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    value
        .as_string()
        .ok_or_else(|| anyhow::anyhow!("response body is not text"))
}

pub async fn array_buffer(resp: &web::Response) -> anyhow::Result<js_sys::ArrayBuffer> {
    let value = JsFuture::from(resp.array_buffer().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    value.dyn_into::<js_sys::ArrayBuffer>().map_err(js_err)
}

/// GET `url`, streaming the body and reporting `(loaded, total)` after each
/// chunk. `total` comes from `Content-Length` when the server sends one. A
/// final `(len, Some(len))` report marks completion.
pub async fn get_with_progress(
    url: &str,
    mut on_progress: impl FnMut(u64, Option<u64>),
) -> anyhow::Result<Vec<u8>> {
    let resp = get(url).await?;
    let total = resp
        .headers()
        .get("content-length")
        .ok()
        .flatten()
        .and_then(|v| v.trim().parse::<u64>().ok());

    let Some(body) = resp.body() else {
        let buf = array_buffer(&resp).await?;
        let bytes = js_sys::Uint8Array::new(&buf).to_vec();
        on_progress(bytes.len() as u64, Some(bytes.len() as u64));
        return Ok(bytes);
    };

    let reader = body
        .get_reader()
        .unchecked_into::<web::ReadableStreamDefaultReader>();
    let mut bytes: Vec<u8> = Vec::with_capacity(total.unwrap_or(0) as usize);
    loop {
        let chunk = JsFuture::from(reader.read()).await.map_err(js_err)?;
        let done = js_sys::Reflect::get(&chunk, &"done".into())
            .map_err(js_err)?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }
        let value = js_sys::Reflect::get(&chunk, &"value".into()).map_err(js_err)?;
        let arr = js_sys::Uint8Array::new(&value);
        let start = bytes.len();
        bytes.resize(start + arr.length() as usize, 0);
        arr.copy_to(&mut bytes[start..]);
        on_progress(bytes.len() as u64, total);
    }
    on_progress(bytes.len() as u64, Some(bytes.len() as u64));
    Ok(bytes)
}
