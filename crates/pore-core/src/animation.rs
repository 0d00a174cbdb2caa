//! Frame driving.
//!
//! A [`Panel`] is one visual instance: it owns at most one [`Scene`] and
//! knows how to paint a frame. An [`AnimationLoop`] pairs a panel with a
//! [`Scheduler`] that decides when the next frame runs, so the same panel
//! can be driven by `requestAnimationFrame`, a fixed-step test harness or a
//! headless batch loop.

use crate::config::{Mechanism, SimulationConfig};
use crate::render::{paint_backdrop, paint_particle, paint_placeholder, Surface};
use crate::scene::Scene;

/// Something that can be asked to run the next frame later.
pub trait Scheduler {
    /// Ask for one more frame. Repeated requests before the frame fires
    /// collapse into one.
    fn request_frame(&mut self);

    /// Withdraw any pending request.
    fn cancel_frame(&mut self);
}

/// Scheduler for tests and batch runs: the caller polls
/// [`take_pending`](Self::take_pending) and runs the frame itself.
#[derive(Default, Debug)]
pub struct ManualScheduler {
    pending: bool,
    pub requests: u64,
    pub cancels: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending request, if any.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) {
        if !self.pending {
            self.pending = true;
            self.requests += 1;
        }
    }

    fn cancel_frame(&mut self) {
        if self.pending {
            self.pending = false;
            self.cancels += 1;
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PanelStatus {
    /// No configuration yet.
    Waiting,
    /// A configuration request is in flight.
    Loading,
    /// The last request failed; see [`Panel::error`].
    Failed,
    Running,
}

/// One labeled mechanism view.
pub struct Panel {
    mechanism: Mechanism,
    label: String,
    caption: String,
    loading: bool,
    error: Option<String>,
    config: Option<SimulationConfig>,
    size: (u32, u32),
    scene: Option<Scene>,
}

impl Panel {
    pub fn new(mechanism: Mechanism, label: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            mechanism,
            label: label.into(),
            caption: caption.into(),
            loading: false,
            error: None,
            config: None,
            size: (0, 0),
            scene: None,
        }
    }

    pub fn mechanism(&self) -> Mechanism {
        self.mechanism
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn config(&self) -> Option<&SimulationConfig> {
        self.config.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> PanelStatus {
        if self.loading {
            PanelStatus::Loading
        } else if self.error.is_some() {
            PanelStatus::Failed
        } else if self.config.is_none() {
            PanelStatus::Waiting
        } else {
            PanelStatus::Running
        }
    }

    /// Whether the caption overlay is shown.
    pub fn caption_visible(&self) -> bool {
        !self.caption.is_empty() && self.status() == PanelStatus::Running
    }

    /// Replace the configuration. The base config's mechanism is overridden
    /// with this panel's; every new config rebuilds the scene.
    pub fn set_config(&mut self, base: Option<&SimulationConfig>) {
        if base.is_some() {
            self.error = None;
        }
        self.config = base.map(|c| c.for_mechanism(self.mechanism));
        self.rebuild();
    }

    /// Record a failed request. A failure drops the configuration and the
    /// scene; clearing the error leaves the panel waiting.
    pub fn set_error(&mut self, error: Option<String>) {
        if error.is_some() {
            self.config = None;
        }
        self.error = error;
        self.rebuild();
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.rebuild();
        }
    }

    /// Canvas resized; the scene layout depends on its dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.size != (width, height) {
            self.size = (width, height);
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let (width, height) = self.size;
        self.scene = match (&self.config, self.loading) {
            (Some(config), false) if width > 0 && height > 0 => {
                log::info!("{} panel: building {}x{} scene", self.mechanism, width, height);
                Some(Scene::new(width, height, config))
            }
            _ => None,
        };
    }

    /// Whether frames should keep being requested.
    pub fn is_animating(&self) -> bool {
        self.scene.is_some()
    }

    /// Paint one frame: background, walls, then step the scene and paint
    /// every particle. Without a scene only the placeholder is painted.
    pub fn frame(&mut self, surface: &mut dyn Surface) {
        let (width, height) = (self.size.0 as f32, self.size.1 as f32);
        let Some(scene) = self.scene.as_mut() else {
            paint_placeholder(surface, width, height);
            return;
        };

        paint_backdrop(surface, &*scene);
        scene.step();

        let config = scene.config();
        for particle in scene.particles() {
            paint_particle(surface, particle, config);
        }
    }
}

/// Drives a [`Panel`] through a [`Scheduler`]: each fired frame paints and
/// requests the next one; stopping cancels the pending request.
pub struct AnimationLoop<S: Scheduler> {
    panel: Panel,
    scheduler: S,
    running: bool,
}

impl<S: Scheduler> AnimationLoop<S> {
    pub fn new(panel: Panel, scheduler: S) -> Self {
        Self {
            panel,
            scheduler,
            running: false,
        }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.scheduler.request_frame();
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.scheduler.cancel_frame();
        }
    }

    /// Run or stop the loop to match whether the panel has a live scene.
    fn sync(&mut self) {
        if self.panel.is_animating() {
            self.start();
        } else {
            self.stop();
        }
    }

    pub fn set_config(&mut self, base: Option<&SimulationConfig>) {
        self.panel.set_config(base);
        self.sync();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.panel.set_loading(loading);
        self.sync();
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.panel.set_error(error);
        self.sync();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.panel.resize(width, height);
        self.sync();
    }

    /// Scheduler callback. Ignored once stopped.
    pub fn on_frame(&mut self, surface: &mut dyn Surface) {
        if !self.running {
            return;
        }
        self.panel.frame(surface);
        self.scheduler.request_frame();
    }

    /// Paint once without scheduling, for loading/waiting placeholders.
    pub fn paint_idle(&mut self, surface: &mut dyn Surface) {
        if !self.running {
            self.panel.frame(surface);
        }
    }
}

impl<S: Scheduler> Drop for AnimationLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;

    fn panel() -> Panel {
        Panel::new(Mechanism::Tension, "Tension", "Blobs squeeze through the throat.")
    }

    #[test]
    fn test_panel_overrides_mechanism() {
        let mut p = panel();
        p.resize(300, 150);
        p.set_config(Some(&SimulationConfig::default()));
        assert_eq!(p.config().map(|c| c.mechanism), Some(Mechanism::Tension));
        assert_eq!(p.scene().map(|s| s.config().mechanism), Some(Mechanism::Tension));
    }

    #[test]
    fn test_loading_suppresses_scene() {
        let mut p = panel();
        p.resize(300, 150);
        p.set_config(Some(&SimulationConfig::default()));
        p.set_loading(true);
        assert_eq!(p.status(), PanelStatus::Loading);
        assert!(p.scene().is_none());
        assert!(!p.caption_visible());

        p.set_loading(false);
        assert!(p.scene().is_some());
        assert!(p.caption_visible());
    }

    #[test]
    fn test_zero_size_has_no_scene() {
        let mut p = panel();
        p.set_config(Some(&SimulationConfig::default()));
        assert_eq!(p.status(), PanelStatus::Running);
        assert!(p.scene().is_none());
    }

    #[test]
    fn test_waiting_panel_paints_placeholder() {
        let mut p = panel();
        p.resize(100, 100);
        let mut list = DrawList::new();
        p.frame(&mut list);
        assert_eq!(p.status(), PanelStatus::Waiting);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_running_frame_paints_backdrop_first() {
        use crate::render::DrawCommand;

        let mut p = panel();
        p.resize(300, 150);
        p.set_config(Some(&SimulationConfig::default()));
        let mut list = DrawList::new();
        p.frame(&mut list);

        assert!(list.len() > 4);
        assert!(matches!(list.commands[0], DrawCommand::Rect { .. }));
        assert!(matches!(list.commands[1], DrawCommand::Rect { .. }));
        assert!(matches!(list.commands[2], DrawCommand::Polygon { .. }));
        assert!(matches!(list.commands[3], DrawCommand::Polygon { .. }));
        assert!(list.commands[4..]
            .iter()
            .all(|c| !matches!(c, DrawCommand::Polygon { .. })));
        assert_eq!(p.scene().map(|s| s.frame()), Some(1));
    }

    #[test]
    fn test_error_drops_scene_until_next_config() {
        let mut p = panel();
        p.resize(300, 150);
        p.set_config(Some(&SimulationConfig::default()));
        p.set_error(Some("request failed".to_string()));
        assert_eq!(p.status(), PanelStatus::Failed);
        assert_eq!(p.error(), Some("request failed"));
        assert!(p.scene().is_none());
        assert!(p.config().is_none());

        p.set_config(Some(&SimulationConfig::default()));
        assert_eq!(p.status(), PanelStatus::Running);
        assert!(p.error().is_none());
    }

    #[test]
    fn test_manual_scheduler_collapses_requests() {
        let mut s = ManualScheduler::new();
        s.request_frame();
        s.request_frame();
        assert_eq!(s.requests, 1);
        assert!(s.take_pending());
        assert!(!s.is_pending());
        s.cancel_frame();
        assert_eq!(s.cancels, 0);
    }
}
