use js_sys::Function;
use pore_core::animation::Scheduler;
use web_sys::Window;

/// [`Scheduler`] backed by `requestAnimationFrame`.
pub struct RafScheduler {
    window: Window,
    callback: Function,
    handle: Option<i32>,
}

impl RafScheduler {
    pub fn new(window: Window, callback: Function) -> Self {
        Self {
            window,
            callback,
            handle: None,
        }
    }

    /// The browser ran the pending callback; its handle is spent.
    pub fn frame_fired(&mut self) {
        self.handle = None;
    }
}

impl Scheduler for RafScheduler {
    fn request_frame(&mut self) {
        if self.handle.is_some() {
            return;
        }
        match self.window.request_animation_frame(&self.callback) {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => log::warn!("requestAnimationFrame failed: {err:?}"),
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.window.cancel_animation_frame(handle) {
                log::warn!("cancelAnimationFrame failed: {err:?}");
            }
        }
    }
}
