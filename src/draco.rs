//! Draco mesh decoding through the Emscripten `draco_decoder.js` module,
//! loaded on demand from the page.

use crate::constants::DRACO_DECODER_URL;
use crate::core::model::{DecodedPrimitive, DecodedPrimitives, DracoPayload};
use crate::http::js_err;
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

const FACTORY: &str = "DracoDecoderModule";

fn get(obj: &JsValue, key: &str) -> anyhow::Result<JsValue> {
    Reflect::get(obj, &JsValue::from_str(key)).map_err(js_err)
}

fn call(obj: &JsValue, method: &str, args: &[&JsValue]) -> anyhow::Result<JsValue> {
    let f: Function = get(obj, method)?
        .dyn_into()
        .map_err(|_| anyhow::anyhow!("draco: {method} is not a function"))?;
    let list: Array = args.iter().copied().collect();
    f.apply(obj, &list).map_err(js_err)
}

fn call_u32(obj: &JsValue, method: &str, args: &[&JsValue]) -> anyhow::Result<u32> {
    call(obj, method, args)?
        .as_f64()
        .map(|n| n as u32)
        .ok_or_else(|| anyhow::anyhow!("draco: {method} returned a non-number"))
}

/// A decoder-side object released with `draco.destroy` when dropped.
struct Owned<'a> {
    draco: &'a JsValue,
    obj: JsValue,
}

impl<'a> Owned<'a> {
    fn construct(draco: &'a JsValue, class: &str) -> anyhow::Result<Self> {
        let ctor: Function = get(draco, class)?
            .dyn_into()
            .map_err(|_| anyhow::anyhow!("draco: no {class} class"))?;
        let obj = Reflect::construct(&ctor, &Array::new()).map_err(js_err)?;
        Ok(Self { draco, obj })
    }
}

impl Drop for Owned<'_> {
    fn drop(&mut self) {
        _ = call(self.draco, "destroy", &[&self.obj]);
    }
}

/// A block on the decoder heap, freed when dropped.
struct HeapBlock<'a> {
    draco: &'a JsValue,
    ptr: u32,
}

impl<'a> HeapBlock<'a> {
    fn alloc(draco: &'a JsValue, bytes: u32) -> anyhow::Result<Self> {
        let ptr = call_u32(draco, "_malloc", &[&JsValue::from(bytes)])?;
        Ok(Self { draco, ptr })
    }

    fn heap(&self, name: &str) -> anyhow::Result<JsValue> {
        let heap = get(self.draco, name)?;
        get(&heap, "buffer")
    }

    fn read_f32(&self, len: u32) -> anyhow::Result<Vec<f32>> {
        let buf = self.heap("HEAPF32")?;
        Ok(js_sys::Float32Array::new_with_byte_offset_and_length(&buf, self.ptr, len).to_vec())
    }

    fn read_u32(&self, len: u32) -> anyhow::Result<Vec<u32>> {
        let buf = self.heap("HEAPU32")?;
        Ok(js_sys::Uint32Array::new_with_byte_offset_and_length(&buf, self.ptr, len).to_vec())
    }
}

impl Drop for HeapBlock<'_> {
    fn drop(&mut self) {
        _ = call(self.draco, "_free", &[&JsValue::from(self.ptr)]);
    }
}

async fn load_script(document: &web::Document) -> anyhow::Result<()> {
    let script = document.create_element("script").map_err(js_err)?;
    script.set_attribute("src", DRACO_DECODER_URL).map_err(js_err)?;
    let target = script.clone();
    let loaded = js_sys::Promise::new(&mut |resolve, reject| {
        _ = target.add_event_listener_with_callback("load", &resolve);
        _ = target.add_event_listener_with_callback("error", &reject);
    });
    let body = document.body().ok_or_else(|| anyhow::anyhow!("no body"))?;
    body.append_child(&script).map_err(js_err)?;
    JsFuture::from(loaded)
        .await
        .map_err(|_| anyhow::anyhow!("could not load {}", DRACO_DECODER_URL))?;
    Ok(())
}

/// Instantiate the decoder module. The module object is itself a thenable,
/// so it is resolved wrapped in a plain object.
async fn instantiate() -> anyhow::Result<JsValue> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    if !get(&window, FACTORY)?.is_function() {
        load_script(&document).await?;
    }
    let factory: Function = get(&window, FACTORY)?
        .dyn_into()
        .map_err(|_| anyhow::anyhow!("{} did not define {}", DRACO_DECODER_URL, FACTORY))?;

    let ready = js_sys::Promise::new(&mut |resolve, reject| {
        let config = Object::new();
        let on_loaded = Closure::once_into_js(move |module: JsValue| {
            let wrapper = Object::new();
            _ = Reflect::set(&wrapper, &JsValue::from_str("draco"), &module);
            _ = resolve.call1(&JsValue::NULL, &wrapper);
        });
        _ = Reflect::set(&config, &JsValue::from_str("onModuleLoaded"), &on_loaded);
        if let Err(e) = factory.call1(&JsValue::NULL, &config) {
            _ = reject.call1(&JsValue::NULL, &e);
        }
    });
    let wrapper = JsFuture::from(ready).await.map_err(js_err)?;
    get(&wrapper, "draco")
}

fn read_attribute(
    draco: &JsValue,
    decoder: &Owned,
    mesh: &Owned,
    unique_id: u32,
) -> anyhow::Result<Vec<f32>> {
    let attribute = call(
        &decoder.obj,
        "GetAttributeByUniqueId",
        &[&mesh.obj, &JsValue::from(unique_id)],
    )?;
    if attribute.is_null() || attribute.is_undefined() {
        anyhow::bail!("draco: no attribute {unique_id}");
    }
    let components = call_u32(&attribute, "num_components", &[])?;
    if components != 3 {
        anyhow::bail!("draco: attribute {unique_id} has {components} components");
    }
    let len = call_u32(&mesh.obj, "num_points", &[])? * components;
    let block = HeapBlock::alloc(draco, len * 4)?;
    call(
        &decoder.obj,
        "GetAttributeDataArrayForAllPoints",
        &[
            &mesh.obj,
            &attribute,
            &get(draco, "DT_FLOAT32")?,
            &JsValue::from(len * 4),
            &JsValue::from(block.ptr),
        ],
    )?;
    block.read_f32(len)
}

fn decode_one(draco: &JsValue, payload: &DracoPayload) -> anyhow::Result<DecodedPrimitive> {
    let decoder = Owned::construct(draco, "Decoder")?;
    let mesh = Owned::construct(draco, "Mesh")?;
    let bytes = js_sys::Uint8Array::from(payload.data.as_slice());
    let array: JsValue = js_sys::Int8Array::new(&bytes.buffer()).into();
    let status = call(
        &decoder.obj,
        "DecodeArrayToMesh",
        &[&array, &JsValue::from(payload.data.len() as u32), &mesh.obj],
    )?;
    if !call(&status, "ok", &[])?.is_truthy() || get(&mesh.obj, "ptr")?.as_f64() == Some(0.0) {
        let msg = call(&status, "error_msg", &[])?.as_string().unwrap_or_default();
        _ = call(draco, "destroy", &[&status]);
        anyhow::bail!("draco: decoding failed: {msg}");
    }
    _ = call(draco, "destroy", &[&status]);

    let index_count = call_u32(&mesh.obj, "num_faces", &[])? * 3;
    let block = HeapBlock::alloc(draco, index_count * 4)?;
    call(
        &decoder.obj,
        "GetTrianglesUInt32Array",
        &[&mesh.obj, &JsValue::from(index_count * 4), &JsValue::from(block.ptr)],
    )?;
    let indices = block.read_u32(index_count)?;
    drop(block);

    let positions = read_attribute(draco, &decoder, &mesh, payload.position)?;
    let normals = match payload.normal {
        Some(id) => match read_attribute(draco, &decoder, &mesh, id) {
            Ok(n) => Some(n),
            Err(e) => {
                log::warn!("[draco] normals dropped: {:?}", e);
                None
            }
        },
        None => None,
    };
    Ok(DecodedPrimitive::from_flat(
        &positions,
        normals.as_deref(),
        indices,
    ))
}

/// Decode every compressed primitive of the model.
pub async fn decode_all(payloads: &[DracoPayload]) -> anyhow::Result<DecodedPrimitives> {
    let draco = instantiate().await?;
    let mut out = DecodedPrimitives::default();
    for payload in payloads {
        let prim = decode_one(&draco, payload)?;
        log::debug!(
            "[draco] mesh {} primitive {}: {} points",
            payload.mesh,
            payload.primitive,
            prim.positions.len()
        );
        out.insert((payload.mesh, payload.primitive), prim);
    }
    Ok(out)
}
