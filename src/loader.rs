use crate::core::model::{draco_payloads, parse_glb, DecodedPrimitives};
use crate::core::Avatar;
use crate::dom;
use crate::draco;
use crate::frame::{self, SharedFrame};
use crate::http;
use glam::Vec3;

/// Stream the model, reveal the page once the download completes and start
/// the render loop, then decode any Draco primitives and hand the parsed
/// mesh to the GPU.
pub async fn load_model(url: &str, frame_ctx: SharedFrame) -> anyhow::Result<()> {
    let stage = frame_ctx.borrow().stage.clone();
    let started = frame_ctx.clone();
    let bytes = http::get_with_progress(url, move |loaded, total| {
        log::debug!("[loader] {} / {:?} bytes", loaded, total);
        if !stage.borrow_mut().ready.on_progress(loaded, total) {
            return;
        }
        if let Some(document) = dom::window_document() {
            dom::mark_loaded(&document);
        }
        started.borrow_mut().resize();
        frame::start_loop(started.clone());
    })
    .await?;

    let payloads = draco_payloads(&bytes)?;
    let decoded = if payloads.is_empty() {
        DecodedPrimitives::default()
    } else {
        log::info!("[loader] decoding {} Draco primitive(s)", payloads.len());
        draco::decode_all(&payloads).await?
    };
    let mesh = parse_glb(&bytes, &decoded)?;
    log::info!(
        "[loader] {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.indices.len() / 3
    );
    let mut ctx = frame_ctx.borrow_mut();
    if let Some(gpu) = &mut ctx.gpu {
        gpu.set_mesh(&mesh);
    }
    // The mesh is recentred, so the lights aim at the origin
    ctx.lights.aim_at(Vec3::ZERO);
    ctx.stage.borrow_mut().avatar = Some(Avatar::default());
    Ok(())
}
