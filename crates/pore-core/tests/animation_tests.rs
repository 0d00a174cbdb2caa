use std::cell::RefCell;
use std::rc::Rc;

use pore_core::animation::{AnimationLoop, ManualScheduler, Panel, PanelStatus, Scheduler};
use pore_core::config::{Mechanism, SimulationConfig};
use pore_core::dashboard::{make_panels, Dashboard};
use pore_core::explanation::ExplanationResponse;
use pore_core::ExplanationError;
use pore_core::render::DrawList;

fn running_loop() -> AnimationLoop<ManualScheduler> {
    let panel = Panel::new(Mechanism::Wettability, "Wettability", "Films lift the oil.");
    let mut anim = AnimationLoop::new(panel, ManualScheduler::new());
    anim.resize(320, 160);
    anim.set_config(Some(&SimulationConfig::default()));
    anim
}

#[test]
fn test_config_starts_loop() {
    let anim = running_loop();
    assert!(anim.is_running());
    assert!(anim.scheduler().is_pending());
    assert_eq!(anim.panel().status(), PanelStatus::Running);
}

#[test]
fn test_each_frame_requests_the_next() {
    let mut anim = running_loop();
    let mut list = DrawList::new();

    for _ in 0..5 {
        assert!(anim.scheduler_mut().take_pending());
        list.clear();
        anim.on_frame(&mut list);
        assert!(!list.is_empty());
    }

    assert_eq!(anim.scheduler().requests, 6);
    assert_eq!(anim.panel().scene().map(|s| s.frame()), Some(5));
}

#[test]
fn test_stop_cancels_pending_frame() {
    let mut anim = running_loop();
    anim.stop();

    assert!(!anim.is_running());
    assert!(!anim.scheduler().is_pending());
    assert_eq!(anim.scheduler().cancels, 1);

    // A stale callback after stopping is ignored.
    let mut list = DrawList::new();
    anim.on_frame(&mut list);
    assert!(list.is_empty());
    assert_eq!(anim.panel().scene().map(|s| s.frame()), Some(0));
    assert!(!anim.scheduler().is_pending());
}

#[test]
fn test_loading_stops_and_resumes() {
    let mut anim = running_loop();
    anim.set_loading(true);
    assert!(!anim.is_running());
    assert_eq!(anim.panel().status(), PanelStatus::Loading);

    let mut list = DrawList::new();
    anim.paint_idle(&mut list);
    assert_eq!(list.len(), 1, "loading shows the placeholder only");

    anim.set_loading(false);
    assert!(anim.is_running());
}

#[test]
fn test_clearing_config_stops_loop() {
    let mut anim = running_loop();
    anim.set_config(None);
    assert!(!anim.is_running());
    assert_eq!(anim.panel().status(), PanelStatus::Waiting);
}

#[test]
fn test_new_config_rebuilds_scene() {
    let mut anim = running_loop();
    let mut list = DrawList::new();
    anim.scheduler_mut().take_pending();
    anim.on_frame(&mut list);
    assert_eq!(anim.panel().scene().map(|s| s.frame()), Some(1));

    let config = SimulationConfig {
        flow_speed: 2.0,
        ..Default::default()
    };
    anim.set_config(Some(&config));
    let scene = anim.panel().scene().unwrap();
    assert_eq!(scene.frame(), 0);
    assert_eq!(scene.config().flow_speed, 2.0);
    assert_eq!(scene.config().mechanism, Mechanism::Wettability);
}

#[derive(Default)]
struct Counters {
    pending: bool,
    cancels: u32,
}

struct SharedScheduler(Rc<RefCell<Counters>>);

impl Scheduler for SharedScheduler {
    fn request_frame(&mut self) {
        self.0.borrow_mut().pending = true;
    }

    fn cancel_frame(&mut self) {
        let mut c = self.0.borrow_mut();
        if c.pending {
            c.pending = false;
            c.cancels += 1;
        }
    }
}

#[test]
fn test_drop_cancels_pending_frame() {
    let counters = Rc::new(RefCell::new(Counters::default()));
    {
        let panel = Panel::new(Mechanism::Tension, "Tension", "");
        let mut anim = AnimationLoop::new(panel, SharedScheduler(counters.clone()));
        anim.resize(200, 100);
        anim.set_config(Some(&SimulationConfig::default()));
        assert!(counters.borrow().pending);
    }
    assert!(!counters.borrow().pending);
    assert_eq!(counters.borrow().cancels, 1);
}

#[test]
fn test_dashboard_panels_in_order() {
    let panels = make_panels();
    let mechanisms: Vec<_> = panels.iter().map(|p| p.mechanism()).collect();
    assert_eq!(mechanisms, Mechanism::PANELS.to_vec());
    assert!(panels.iter().all(|p| !p.label().is_empty() && !p.caption().is_empty()));
}

#[test]
fn test_resize_rebuilds_running_scene() {
    let mut anim = running_loop();
    let mut list = DrawList::new();
    for _ in 0..4 {
        anim.scheduler_mut().take_pending();
        anim.on_frame(&mut list);
    }
    assert_eq!(anim.panel().scene().map(|s| s.frame()), Some(4));

    anim.resize(480, 240);

    let scene = anim.panel().scene().unwrap();
    assert_eq!(scene.size(), (480, 240));
    assert_eq!(scene.frame(), 0);
    assert_eq!(scene.walls().0.width(), 480);
    assert_eq!(scene.walls().1.width(), 480);
    assert!(anim.is_running());
}

#[test]
fn test_resize_to_same_size_keeps_scene() {
    let mut anim = running_loop();
    let mut list = DrawList::new();
    for _ in 0..3 {
        anim.scheduler_mut().take_pending();
        anim.on_frame(&mut list);
    }

    anim.resize(320, 160);

    assert_eq!(anim.panel().scene().map(|s| s.frame()), Some(3));
    assert!(anim.is_running());
}

fn dashboard_loops() -> Vec<AnimationLoop<ManualScheduler>> {
    make_panels()
        .into_iter()
        .map(|panel| {
            let mut anim = AnimationLoop::new(panel, ManualScheduler::new());
            anim.resize(240, 120);
            anim
        })
        .collect()
}

#[test]
fn test_failed_request_reaches_every_panel() {
    let mut dash = Dashboard::new();
    let mut loops = dashboard_loops();

    dash.begin().unwrap();
    dash.complete(Ok(ExplanationResponse {
        explanation: "ok".to_string(),
        simulation_params: SimulationConfig::default(),
    }));
    for anim in &mut loops {
        dash.apply_to(anim);
        assert_eq!(anim.panel().status(), PanelStatus::Running);
        assert!(anim.is_running());
    }

    dash.begin().unwrap();
    for anim in &mut loops {
        dash.apply_to(anim);
        assert_eq!(anim.panel().status(), PanelStatus::Loading);
        assert!(!anim.is_running());
    }

    dash.complete(Err(ExplanationError::MissingCredential));
    let message = dash.text.error.clone();
    assert!(message.is_some());
    for anim in &mut loops {
        dash.apply_to(anim);
        assert_eq!(anim.panel().status(), PanelStatus::Failed);
        assert_eq!(anim.panel().error(), message.as_deref());
        assert!(anim.panel().scene().is_none());
        assert!(!anim.panel().caption_visible());
        assert!(!anim.is_running());

        let mut list = DrawList::new();
        anim.paint_idle(&mut list);
        assert_eq!(list.len(), 1);
    }
}

#[test]
fn test_success_after_failure_clears_error() {
    let mut dash = Dashboard::new();
    let mut loops = dashboard_loops();

    dash.begin().unwrap();
    dash.complete(Err(ExplanationError::EmptyResponse));
    for anim in &mut loops {
        dash.apply_to(anim);
    }

    dash.begin().unwrap();
    dash.complete(Ok(ExplanationResponse {
        explanation: "ok".to_string(),
        simulation_params: SimulationConfig::default(),
    }));
    for anim in &mut loops {
        dash.apply_to(anim);
        assert_eq!(anim.panel().status(), PanelStatus::Running);
        assert!(anim.panel().error().is_none());
        let mechanism = anim.panel().mechanism();
        assert_eq!(anim.panel().scene().map(|s| s.config().mechanism), Some(mechanism));
    }
}
