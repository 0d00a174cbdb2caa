//! Dashboard state: one topic, one explanation request, three panels.
//!
//! The text panel and the visual panels share a single request. Starting a
//! request puts both into loading; its outcome lands on both at once, so a
//! failure never leaves one side showing stale data while the other shows
//! the error.

use crate::animation::{AnimationLoop, Panel, Scheduler};
use crate::config::{Mechanism, SimulationConfig};
use crate::error::ExplanationError;
use crate::explanation::{ExplanationRequest, ExplanationResponse, DEFAULT_TOPIC};

/// Label and caption of one mechanism panel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PanelInfo {
    pub mechanism: Mechanism,
    pub label: &'static str,
    pub caption: &'static str,
}

pub const PANEL_INFO: [PanelInfo; 3] = [
    PanelInfo {
        mechanism: Mechanism::Wettability,
        label: "Mechanism 1: Wettability Alteration (润湿性改变)",
        caption: "Surfactants form a film on the rock surface, causing viscous oil \
                  (initially stuck) to detach and slide off.",
    },
    PanelInfo {
        mechanism: Mechanism::Tension,
        label: "Mechanism 2: Interfacial Tension Reduction (界面张力降低)",
        caption: "Oil droplets deform and squeeze through narrow rock pore throats due \
                  to reduced surface tension.",
    },
    PanelInfo {
        mechanism: Mechanism::Emulsification,
        label: "Mechanism 3: Emulsification & Stripping (乳化与剥离)",
        caption: "Active molecules attack large oil blobs, breaking them into tiny \
                  emulsified droplets that flow easily.",
    },
];

/// Build the three mechanism panels in display order.
pub fn make_panels() -> Vec<Panel> {
    PANEL_INFO
        .iter()
        .map(|info| Panel::new(info.mechanism, info.label, info.caption))
        .collect()
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct TextState {
    pub loading: bool,
    pub content: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct VisualState {
    pub loading: bool,
    pub config: Option<SimulationConfig>,
    pub error: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Dashboard {
    topic: String,
    pub text: TextState,
    pub visual: VisualState,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            text: TextState::default(),
            visual: VisualState::default(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    /// A request is in flight.
    pub fn is_busy(&self) -> bool {
        self.text.loading || self.visual.loading
    }

    /// Start a request for the current topic. Both panels go to loading
    /// and the previous configuration is dropped. Only one request may be
    /// in flight.
    pub fn begin(&mut self) -> Result<ExplanationRequest, ExplanationError> {
        if self.is_busy() {
            return Err(ExplanationError::Busy);
        }
        let request = ExplanationRequest::new(&self.topic)?;
        self.text = TextState {
            loading: true,
            ..TextState::default()
        };
        self.visual = VisualState {
            loading: true,
            ..VisualState::default()
        };
        log::info!("requesting explanation for {:?}", request.topic());
        Ok(request)
    }

    /// Apply the outcome of the request started by [`begin`](Self::begin).
    pub fn complete(&mut self, outcome: Result<ExplanationResponse, ExplanationError>) {
        match outcome {
            Ok(response) => {
                self.text = TextState {
                    loading: false,
                    content: Some(response.explanation),
                    error: None,
                };
                self.visual = VisualState {
                    loading: false,
                    config: Some(response.simulation_params),
                    error: None,
                };
            }
            Err(err) => {
                let message = err.to_string();
                log::warn!("explanation request failed: {message}");
                self.text = TextState {
                    loading: false,
                    content: None,
                    error: Some(message.clone()),
                };
                self.visual = VisualState {
                    loading: false,
                    config: None,
                    error: Some(message),
                };
            }
        }
    }

    /// Push the visual state onto a panel: loading flag, then either the
    /// failure message or the configuration.
    pub fn apply_to<S: Scheduler>(&self, anim: &mut AnimationLoop<S>) {
        anim.set_loading(self.visual.loading);
        match &self.visual.error {
            Some(message) => anim.set_error(Some(message.clone())),
            None => {
                anim.set_error(None);
                anim.set_config(self.visual.config.as_ref());
            }
        }
    }

    /// Base configuration as seen by the panel for `mechanism`.
    pub fn panel_config(&self, mechanism: Mechanism) -> Option<SimulationConfig> {
        self.visual.config.as_ref().map(|c| c.for_mechanism(mechanism))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> ExplanationResponse {
        ExplanationResponse {
            explanation: "## 原理".to_string(),
            simulation_params: SimulationConfig::default(),
        }
    }

    #[test]
    fn test_begin_sets_both_loading() {
        let mut dash = Dashboard::new();
        dash.complete(Ok(response()));
        let request = dash.begin().unwrap();

        assert_eq!(request.topic(), DEFAULT_TOPIC);
        assert!(dash.text.loading && dash.visual.loading);
        assert!(dash.visual.config.is_none());
        assert!(dash.text.content.is_none());
    }

    #[test]
    fn test_begin_rejects_blank_topic() {
        let mut dash = Dashboard::new();
        dash.set_topic("  ");
        assert!(matches!(dash.begin(), Err(ExplanationError::EmptyTopic)));
        assert!(!dash.is_busy());
    }

    #[test]
    fn test_second_begin_while_busy_is_rejected() {
        let mut dash = Dashboard::new();
        dash.set_topic("A");
        dash.begin().unwrap();
        dash.set_topic("B");
        assert!(matches!(dash.begin(), Err(ExplanationError::Busy)));

        let mut first = response();
        first.explanation = "for A".to_string();
        dash.complete(Ok(first));
        assert_eq!(dash.text.content.as_deref(), Some("for A"));
        assert!(!dash.is_busy());

        let request = dash.begin().unwrap();
        assert_eq!(request.topic(), "B");
    }

    #[test]
    fn test_failure_mirrors_message() {
        let mut dash = Dashboard::new();
        dash.begin().unwrap();
        dash.complete(Err(ExplanationError::EmptyResponse));

        assert!(!dash.is_busy());
        assert_eq!(dash.text.error, dash.visual.error);
        assert!(dash.text.error.is_some());
        assert!(dash.visual.config.is_none());
    }

    #[test]
    fn test_panel_config_overrides_mechanism() {
        let mut dash = Dashboard::new();
        dash.complete(Ok(response()));
        for info in PANEL_INFO {
            let config = dash.panel_config(info.mechanism).unwrap();
            assert_eq!(config.mechanism, info.mechanism);
        }
        assert_eq!(make_panels().len(), 3);
    }
}
