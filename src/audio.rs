use crate::constants::{AMBIENT_GAIN, MASTER_GAIN, VOICE_GAIN};
use crate::http::js_err;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn create_gain(
    audio_ctx: &web::AudioContext,
    value: f32,
    label: &str,
) -> anyhow::Result<web::GainNode> {
    match web::GainNode::new(audio_ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("{} GainNode error: {:?}", label, e);
            Err(js_err(e))
        }
    }
}

/// A playing buffer source and its gain. Dropping the slot stops and
/// disconnects both nodes.
struct Slot {
    source: web::AudioBufferSourceNode,
    gain: web::GainNode,
    on_ended: Option<Closure<dyn FnMut()>>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.source.set_onended(None);
        _ = self.source.stop();
        _ = self.source.disconnect();
        _ = self.gain.disconnect();
    }
}

/// Owns the audio graph: master gain plus at most one voice and one ambient
/// source. Replacing or releasing a slot disconnects the previous nodes.
pub struct AudioSession {
    ctx: web::AudioContext,
    master: web::GainNode,
    voice: Option<Slot>,
    ambient: Option<Slot>,
    ambient_buffer: Option<web::AudioBuffer>,
}

impl AudioSession {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(js_err)?;
        _ = ctx.resume();
        let master = create_gain(&ctx, MASTER_GAIN, "Master")?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(js_err)?;
        Ok(Self {
            ctx,
            master,
            voice: None,
            ambient: None,
            ambient_buffer: None,
        })
    }

    #[inline]
    pub fn context(&self) -> web::AudioContext {
        self.ctx.clone()
    }

    #[inline]
    pub fn ambient_buffer(&self) -> Option<web::AudioBuffer> {
        self.ambient_buffer.clone()
    }

    pub fn set_ambient_buffer(&mut self, buffer: web::AudioBuffer) {
        self.ambient_buffer = Some(buffer);
    }

    fn start_slot(
        &self,
        buffer: &web::AudioBuffer,
        level: f32,
        looping: bool,
        on_ended: Option<Closure<dyn FnMut()>>,
    ) -> anyhow::Result<Slot> {
        let source = self.ctx.create_buffer_source().map_err(js_err)?;
        source.set_buffer(Some(buffer));
        source.set_loop(looping);
        let gain = create_gain(&self.ctx, level, if looping { "Ambient" } else { "Voice" })?;
        // An early return below drops the slot, which disconnects it
        let slot = Slot {
            source,
            gain,
            on_ended,
        };
        slot.source
            .connect_with_audio_node(&slot.gain)
            .map_err(js_err)?;
        slot.gain
            .connect_with_audio_node(&self.master)
            .map_err(js_err)?;
        if let Some(cb) = &slot.on_ended {
            slot.source.set_onended(Some(cb.as_ref().unchecked_ref()));
        }
        slot.source.start().map_err(js_err)?;
        Ok(slot)
    }

    /// Play a decoded utterance, replacing any current voice. `on_ended`
    /// runs when playback finishes on its own.
    pub fn play_voice(
        &mut self,
        buffer: &web::AudioBuffer,
        on_ended: impl FnMut() + 'static,
    ) -> anyhow::Result<()> {
        self.voice = None;
        let cb = Closure::wrap(Box::new(on_ended) as Box<dyn FnMut()>);
        self.voice = Some(self.start_slot(buffer, VOICE_GAIN, false, Some(cb))?);
        Ok(())
    }

    /// (Re)start the looping ambient bed.
    pub fn play_ambient(&mut self, buffer: &web::AudioBuffer) -> anyhow::Result<()> {
        self.ambient = None;
        self.ambient = Some(self.start_slot(buffer, AMBIENT_GAIN, true, None)?);
        Ok(())
    }

    pub fn release_voice(&mut self) {
        if self.voice.take().is_some() {
            log::debug!("[audio] voice released");
        }
    }

    pub fn release_ambient(&mut self) {
        if self.ambient.take().is_some() {
            log::debug!("[audio] ambient released");
        }
    }
}

pub async fn decode(
    ctx: &web::AudioContext,
    data: &js_sys::ArrayBuffer,
) -> anyhow::Result<web::AudioBuffer> {
    let promise = ctx.decode_audio_data(data).map_err(js_err)?;
    let decoded = JsFuture::from(promise).await.map_err(js_err)?;
    decoded.dyn_into::<web::AudioBuffer>().map_err(js_err)
}
