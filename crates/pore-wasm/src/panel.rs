use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use pore_core::animation::{AnimationLoop, Panel, PanelStatus};
use pore_core::config::{Mechanism, SimulationConfig};
use pore_core::dashboard::PANEL_INFO;
use pore_core::render::{write_instances, ParticleInstance};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, Window};

use crate::canvas::CanvasSurface;
use crate::frame::RafScheduler;

struct Runtime {
    // Dropped first so a pending frame is cancelled before its callback.
    anim: AnimationLoop<RafScheduler>,
    _on_frame: Closure<dyn FnMut()>,
    canvas: HtmlCanvasElement,
    surface: CanvasSurface,
}

impl Runtime {
    fn tick(&mut self) {
        self.anim.scheduler_mut().frame_fired();
        self.anim.on_frame(&mut self.surface);
    }

    fn repaint_idle(&mut self) {
        self.anim.paint_idle(&mut self.surface);
    }

    /// Match the canvas backing store to its container.
    fn fit_to_parent(&mut self) {
        let (width, height) = match self.canvas.parent_element() {
            Some(parent) => (parent.client_width().max(0) as u32, parent.client_height().max(0) as u32),
            None => (self.canvas.width(), self.canvas.height()),
        };
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.anim.resize(width, height);
        self.repaint_idle();
    }
}

fn upgrade_and<F: FnOnce(&mut Runtime)>(weak: &Weak<RefCell<Runtime>>, f: F) {
    if let Some(runtime) = weak.upgrade() {
        if let Ok(mut runtime) = runtime.try_borrow_mut() {
            f(&mut runtime);
        }
    }
}

/// One mechanism view bound to a canvas element.
#[wasm_bindgen]
pub struct MechanismPanel {
    runtime: Rc<RefCell<Runtime>>,
    window: Window,
    on_resize: Closure<dyn FnMut()>,
    instances: Vec<ParticleInstance>,
}

#[wasm_bindgen]
impl MechanismPanel {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, mechanism: &str) -> Result<MechanismPanel, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {canvas_id:?}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        let surface = CanvasSurface::from_canvas(&canvas)?;

        let mechanism = Mechanism::from_tag(mechanism);
        let panel = match PANEL_INFO.iter().find(|info| info.mechanism == mechanism) {
            Some(info) => Panel::new(mechanism, info.label, info.caption),
            None => Panel::new(mechanism, mechanism.as_str(), ""),
        };

        let frame_window = window.clone();
        let runtime = Rc::new_cyclic(move |weak: &Weak<RefCell<Runtime>>| {
            let weak = weak.clone();
            let on_frame = Closure::<dyn FnMut()>::new(move || upgrade_and(&weak, Runtime::tick));
            let callback: Function = on_frame.as_ref().unchecked_ref::<Function>().clone();
            RefCell::new(Runtime {
                anim: AnimationLoop::new(panel, RafScheduler::new(frame_window, callback)),
                _on_frame: on_frame,
                canvas,
                surface,
            })
        });

        let weak = Rc::downgrade(&runtime);
        let on_resize = Closure::<dyn FnMut()>::new(move || upgrade_and(&weak, Runtime::fit_to_parent));
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

        runtime.borrow_mut().fit_to_parent();
        log::info!("{} panel attached to #{}", mechanism, canvas_id);

        Ok(MechanismPanel {
            runtime,
            window,
            on_resize,
            instances: Vec::new(),
        })
    }

    /// Apply a `SimulationConfig` in JSON form. The panel's own mechanism
    /// replaces whatever the config names.
    pub fn set_config_json(&self, json: &str) -> Result<(), JsValue> {
        let config: SimulationConfig =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.with_runtime(|rt| {
            rt.anim.set_config(Some(&config));
            rt.repaint_idle();
        });
        Ok(())
    }

    pub fn clear_config(&self) {
        self.with_runtime(|rt| {
            rt.anim.set_config(None);
            rt.repaint_idle();
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.with_runtime(|rt| {
            rt.anim.set_loading(loading);
            rt.repaint_idle();
        });
    }

    /// Show a failed request; `None` clears it.
    pub fn set_error(&self, message: Option<String>) {
        self.with_runtime(|rt| {
            rt.anim.set_error(message);
            rt.repaint_idle();
        });
    }

    pub fn error(&self) -> Option<String> {
        self.with_runtime(|rt| rt.anim.panel().error().map(str::to_string))
            .flatten()
    }

    pub fn resize(&self) {
        self.with_runtime(Runtime::fit_to_parent);
    }

    pub fn label(&self) -> String {
        self.with_runtime(|rt| rt.anim.panel().label().to_string())
            .unwrap_or_default()
    }

    pub fn caption(&self) -> String {
        self.with_runtime(|rt| rt.anim.panel().caption().to_string())
            .unwrap_or_default()
    }

    pub fn caption_visible(&self) -> bool {
        self.with_runtime(|rt| rt.anim.panel().caption_visible())
            .unwrap_or(false)
    }

    /// `"waiting"`, `"loading"`, `"failed"` or `"running"`.
    pub fn status(&self) -> String {
        let status = match self.with_runtime(|rt| rt.anim.panel().status()) {
            Some(PanelStatus::Loading) => "loading",
            Some(PanelStatus::Failed) => "failed",
            Some(PanelStatus::Running) => "running",
            Some(PanelStatus::Waiting) | None => "waiting",
        };
        status.to_string()
    }

    pub fn particle_count(&self) -> usize {
        self.with_runtime(|rt| rt.anim.panel().scene().map_or(0, |s| s.particles().len()))
            .unwrap_or(0)
    }

    /// Refresh the packed instance buffer; returns the instance count.
    pub fn update_instances(&mut self) -> usize {
        let Ok(rt) = self.runtime.try_borrow() else {
            return self.instances.len();
        };
        match rt.anim.panel().scene() {
            Some(scene) => write_instances(scene, &mut self.instances),
            None => self.instances.clear(),
        }
        self.instances.len()
    }

    pub fn get_instance_buffer_ptr(&self) -> *const f32 {
        bytemuck::cast_slice::<ParticleInstance, f32>(&self.instances).as_ptr()
    }

    pub fn get_instance_buffer_byte_length(&self) -> usize {
        self.instances.len() * std::mem::size_of::<ParticleInstance>()
    }
}

impl MechanismPanel {
    fn with_runtime<T>(&self, f: impl FnOnce(&mut Runtime) -> T) -> Option<T> {
        self.runtime.try_borrow_mut().ok().map(|mut rt| f(&mut rt))
    }
}

impl Drop for MechanismPanel {
    fn drop(&mut self) {
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())
        {
            log::warn!("removing resize listener failed: {err:?}");
        }
        self.with_runtime(|rt| rt.anim.stop());
    }
}
