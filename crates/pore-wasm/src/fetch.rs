use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use pore_core::dashboard::Dashboard;
use pore_core::explanation::{extract_text, parse_response, require_key, ExplanationRequest, ExplanationResponse};
use pore_core::ExplanationError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Longest error body kept in a status error.
const MAX_ERROR_BODY: usize = 512;

fn transport(value: JsValue) -> ExplanationError {
    ExplanationError::Transport(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

async fn post_json(url: &str, key: &str, body: &str) -> Result<String, ExplanationError> {
    let window = web_sys::window().ok_or_else(|| ExplanationError::Transport("no window".into()))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &init).map_err(transport)?;
    let headers = request.headers();
    headers.set("Content-Type", "application/json").map_err(transport)?;
    headers.set("x-goog-api-key", key).map_err(transport)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?
        .dyn_into()
        .map_err(transport)?;
    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?
        .as_string()
        .unwrap_or_default();

    if !response.ok() {
        let body = text.chars().take(MAX_ERROR_BODY).collect();
        return Err(ExplanationError::Status {
            status: response.status(),
            body,
        });
    }
    Ok(text)
}

/// Run one generation request end to end.
pub async fn fetch_explanation(
    request: &ExplanationRequest,
    key: Option<&str>,
) -> Result<ExplanationResponse, ExplanationError> {
    let key = require_key(key)?;
    let envelope = post_json(&request.endpoint(), key, &request.body().to_string()).await?;
    let text = extract_text(&envelope)?;
    parse_response(&text)
}

/// Topic input, explanation text and the shared visual configuration.
#[wasm_bindgen]
pub struct EorDashboard {
    state: Rc<RefCell<Dashboard>>,
    api_key: Option<String>,
}

#[wasm_bindgen]
impl EorDashboard {
    /// Without an explicit key, falls back to `API_KEY` from the build
    /// environment.
    #[wasm_bindgen(constructor)]
    pub fn new(api_key: Option<String>) -> EorDashboard {
        let api_key = api_key.or_else(|| option_env!("API_KEY").map(str::to_string));
        EorDashboard {
            state: Rc::new(RefCell::new(Dashboard::new())),
            api_key,
        }
    }

    pub fn topic(&self) -> String {
        self.state.borrow().topic().to_string()
    }

    pub fn set_topic(&self, topic: &str) {
        self.state.borrow_mut().set_topic(topic);
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_busy()
    }

    pub fn explanation(&self) -> Option<String> {
        self.state.borrow().text.content.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().text.error.clone()
    }

    /// Failure message for the visual panels; forward to
    /// `MechanismPanel::set_error`.
    pub fn visual_error(&self) -> Option<String> {
        self.state.borrow().visual.error.clone()
    }

    /// Current base configuration as JSON, if one has been generated.
    pub fn config_json(&self) -> Option<String> {
        let state = self.state.borrow();
        let config = state.visual.config.as_ref()?;
        serde_json::to_string(config).ok()
    }

    /// Start a request for the current topic. The promise resolves to
    /// `true` on success and `false` when the error was recorded instead.
    pub fn generate(&self) -> Result<Promise, JsValue> {
        let request = self
            .state
            .borrow_mut()
            .begin()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let state = Rc::clone(&self.state);
        let key = self.api_key.clone();

        Ok(future_to_promise(async move {
            let outcome = fetch_explanation(&request, key.as_deref()).await;
            let ok = outcome.is_ok();
            state.borrow_mut().complete(outcome);
            Ok(JsValue::from_bool(ok))
        }))
    }
}
