//! Boundary with the explanation-generation service.
//!
//! Builds the generation request for a topic and turns the service's
//! response into an [`ExplanationResponse`]. Transport lives in the front
//! end; everything here is plain data in, `Result` out.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::config::SimulationConfig;
use crate::error::ExplanationError;

pub const MODEL: &str = "gemini-3-flash-preview";
pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TOPIC: &str = "计秉玉分子采油原理 (Ji Bingyu Molecular Oil Recovery)";

const SYSTEM_INSTRUCTION: &str = "You are a scientific simulation engineer specializing in \
Enhanced Oil Recovery (EOR). Explain the requested topic and supply aesthetic parameters for \
a particle simulation.";

/// Parsed payload: markdown explanation plus the visual configuration.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationResponse {
    pub explanation: String,
    pub simulation_params: SimulationConfig,
}

/// A validated generation request for one topic.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExplanationRequest {
    topic: String,
}

impl ExplanationRequest {
    pub fn new(topic: &str) -> Result<Self, ExplanationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ExplanationError::EmptyTopic);
        }
        Ok(Self {
            topic: topic.to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// `generateContent` endpoint for [`MODEL`].
    pub fn endpoint(&self) -> String {
        format!("{API_BASE}/{MODEL}:generateContent")
    }

    pub fn prompt(&self) -> String {
        format!(
            "Analyze the topic: \"{}\".\n\
             1. Explain the principle in Chinese (Markdown), focusing on wettability \
             alteration, interfacial tension reduction and emulsification.\n\
             2. Provide simulation parameters for the visual style: hex colors for oil, \
             water, surfactant and rock, flowSpeed (1-10), turbulence (0-1) and viscosity \
             (0.1-0.9). Set mechanism to \"general\"; oilDensity, surfactantDensity and \
             poreWidth are ignored.",
            self.topic
        )
    }

    /// JSON body for the generation call, including the response schema.
    pub fn body(&self) -> JsonValue {
        json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": self.prompt() }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            },
        })
    }
}

fn response_schema() -> JsonValue {
    let number = json!({ "type": "NUMBER" });
    let string = json!({ "type": "STRING" });
    json!({
        "type": "OBJECT",
        "properties": {
            "explanation": string,
            "simulationParams": {
                "type": "OBJECT",
                "properties": {
                    "mechanism": string,
                    "oilColor": string,
                    "waterColor": string,
                    "surfactantColor": string,
                    "rockColor": string,
                    "flowSpeed": number,
                    "turbulence": number,
                    "oilDensity": number,
                    "surfactantDensity": number,
                    "viscosity": number,
                    "poreWidth": number,
                },
                "required": [
                    "oilColor", "waterColor", "surfactantColor", "rockColor",
                    "flowSpeed", "turbulence", "viscosity",
                ],
            },
        },
        "required": ["explanation", "simulationParams"],
    })
}

/// Fail fast when no credential is configured.
pub fn require_key(key: Option<&str>) -> Result<&str, ExplanationError> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(ExplanationError::MissingCredential),
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Generated text of the first candidate in a `generateContent` response.
pub fn extract_text(envelope: &str) -> Result<String, ExplanationError> {
    let envelope: Envelope = serde_json::from_str(envelope)?;
    let text: String = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ExplanationError::EmptyResponse);
    }
    Ok(text)
}

/// Parse the generated JSON text into a complete response.
pub fn parse_response(text: &str) -> Result<ExplanationResponse, ExplanationError> {
    if text.trim().is_empty() {
        return Err(ExplanationError::EmptyResponse);
    }
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_topic_rejected() {
        assert!(matches!(ExplanationRequest::new("   "), Err(ExplanationError::EmptyTopic)));
        assert_eq!(ExplanationRequest::new(" EOR ").unwrap().topic(), "EOR");
    }

    #[test]
    fn test_body_carries_prompt_and_schema() {
        let req = ExplanationRequest::new("polymer flooding").unwrap();
        let body = req.body();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("polymer flooding"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        let required = &body["generationConfig"]["responseSchema"]["properties"]["simulationParams"]["required"];
        assert_eq!(required.as_array().map(|a| a.len()), Some(7));
        assert!(req.endpoint().ends_with(":generateContent"));
    }

    #[test]
    fn test_require_key() {
        assert!(matches!(require_key(None), Err(ExplanationError::MissingCredential)));
        assert!(matches!(require_key(Some("  ")), Err(ExplanationError::MissingCredential)));
        assert_eq!(require_key(Some("abc")).unwrap(), "abc");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let envelope = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        assert_eq!(extract_text(envelope).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_empty() {
        assert!(matches!(extract_text(r#"{"candidates":[]}"#), Err(ExplanationError::EmptyResponse)));
        assert!(matches!(extract_text("{}"), Err(ExplanationError::EmptyResponse)));
        assert!(matches!(extract_text("not json"), Err(ExplanationError::Malformed(_))));
    }
}
