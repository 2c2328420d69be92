use crate::core::FrameClock;
use crate::dom;
use crate::render::{self, surface_recovery, SurfaceRecovery};
use crate::scene::{Camera, Lights};
use crate::state::SharedStage;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub stage: SharedStage,
    pub gpu: Option<render::GpuState>,
    pub canvas: web::HtmlCanvasElement,
    pub camera: Camera,
    pub lights: Lights,
    pub clock: FrameClock,
    pub last_instant: Instant,
}

pub type SharedFrame = Rc<RefCell<FrameContext>>;

impl FrameContext {
    pub fn new(
        stage: SharedStage,
        gpu: Option<render::GpuState>,
        canvas: web::HtmlCanvasElement,
    ) -> Self {
        Self {
            stage,
            gpu,
            canvas,
            camera: Camera::default(),
            lights: Lights::default(),
            clock: FrameClock::default(),
            last_instant: Instant::now(),
        }
    }

    /// Re-measure the canvas and follow the viewport's aspect ratio.
    pub fn resize(&mut self) {
        let (w_css, h_css) = dom::sync_canvas_backing_size(&self.canvas);
        self.camera.set_viewport(w_css as f32, h_css as f32);
    }

    pub fn frame(&mut self) {
        // A hidden page keeps everything frozen, including the time reference
        if dom::is_hidden() {
            return;
        }
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;
        if !self.clock.advance(dt_sec) {
            return;
        }

        let avatar = self.stage.borrow().avatar.clone();
        let Some(mut avatar) = avatar else {
            return;
        };
        let mut gpu_lost = false;
        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(self.canvas.width(), self.canvas.height());
            if let Err(e) = g.render(&self.camera, &self.lights, &avatar) {
                match surface_recovery(&e) {
                    SurfaceRecovery::Reconfigure => {
                        log::warn!("[gpu] surface {:?}, reconfiguring", e);
                        g.reconfigure();
                    }
                    SurfaceRecovery::SkipFrame => log::debug!("[gpu] frame skipped: {:?}", e),
                    SurfaceRecovery::Fatal => {
                        log::error!("render error: {:?}", e);
                        gpu_lost = true;
                    }
                }
            }
        }
        if gpu_lost {
            self.gpu = None;
        }

        let mut stage = self.stage.borrow_mut();
        let talking = stage.session.talking();
        stage
            .anim
            .tick(&mut avatar, talking, instant::now(), &mut rand::thread_rng());
        stage.avatar = Some(avatar);
    }
}

pub fn start_loop(frame_ctx: SharedFrame) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
    log::info!("[loader] render loop started");
}
