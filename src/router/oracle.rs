//! Optional LLM-backed extraction
//!
//! An oracle may know better than the keyword heuristics ("Tamilnadu" ->
//! "Tamil Nadu"), but it is never required: every caller falls back to the
//! deterministic extractor when it is absent, fails, or returns nothing.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use super::intent::Intent;
use crate::config::LlmConfig;
use crate::error::ToolKind;
use crate::tools::http::{self, HttpClient};
use crate::{Result, TravelAiError};

/// What an oracle believes the prompt is about. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleGuess {
    pub location: Option<String>,
    pub intent: Option<Intent>,
}

#[async_trait]
pub trait LocationOracle: Send + Sync {
    async fn guess(&self, prompt: &str) -> Result<OracleGuess>;
}

const INSTRUCTION: &str = "Extract the travel destination and the user's intent from the query. \
Return ONLY a JSON object: {\"location\": <place name or null>, \"intent\": \"weather\" | \"places\" | \"both\"}. \
The location is the bare place name without words like trip, escape, or durations. \
Use \"both\" when the intent is unclear.";

/// Gemini `generateContent` client
pub struct GeminiOracle {
    client: HttpClient,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiOracle {
    /// Build the oracle, or `None` when no API key is configured
    pub fn from_config(config: &LlmConfig, user_agent: &str) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone().filter(|_| config.is_enabled()) else {
            return Ok(None);
        };
        let client = http::build_client(
            user_agent,
            Duration::from_secs(config.timeout_seconds.into()),
            1,
        )?;
        Ok(Some(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
        }))
    }
}

#[async_trait]
impl LocationOracle for GeminiOracle {
    #[instrument(skip(self))]
    async fn guess(&self, prompt: &str) -> Result<OracleGuess> {
        let start_time = Instant::now();
        let body = json!({
            "contents": [{
                "parts": [{ "text": format!("{INSTRUCTION}\n\nUser query: {prompt}") }]
            }],
            "generationConfig": {
                "temperature": 0.1,
                "topP": 0.8,
                "topK": 40,
                "maxOutputTokens": 200
            }
        });

        let request = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        let payload: GenerateResponse = http::fetch_json(request)
            .await
            .map_err(|e| e.into_tool(ToolKind::Llm))?;

        let text = payload
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| TravelAiError::tool(ToolKind::Llm, "response had no text"))?;

        let guess = parse_guess(&text).ok_or_else(|| {
            TravelAiError::tool(ToolKind::Llm, "response did not contain a JSON object")
        })?;

        info!(
            location = ?guess.location,
            intent = ?guess.intent,
            "LLM extraction finished in {:.3}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(guess)
    }
}

/// Parse the model's reply: tolerate code fences, chatter around the
/// object, single quotes and Python's `None`.
#[must_use]
pub fn parse_guess(text: &str) -> Option<OracleGuess> {
    let unfenced = strip_code_fences(text.trim());
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end <= start {
        return None;
    }
    let object = &unfenced[start..=end];

    let value: Value = serde_json::from_str(object)
        .or_else(|_| serde_json::from_str(&object.replace('\'', "\"").replace("None", "null")))
        .ok()?;

    let intent = value
        .get("intent")
        .and_then(Value::as_str)
        .unwrap_or("both")
        .parse::<Intent>()
        .unwrap_or(Intent::Both);

    let location = value
        .get("location")
        .and_then(Value::as_str)
        .and_then(normalize_location);

    Some(OracleGuess {
        location,
        intent: Some(intent),
    })
}

fn strip_code_fences(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after = &text[open + 3..];
    // skip a language tag such as ```json
    let body = after
        .strip_prefix("json")
        .or_else(|| after.strip_prefix("JSON"))
        .unwrap_or(after);
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

fn normalize_location(raw: &str) -> Option<String> {
    let cleaned = raw
        .split_whitespace()
        .filter(|word| {
            !matches!(
                word.to_lowercase().as_str(),
                "escape" | "trip" | "vacation"
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    let normalized = match cleaned.to_lowercase().as_str() {
        "" | "null" | "none" => return None,
        "tamilnadu" | "tamil nadu" => "Tamil Nadu".to_string(),
        "new york city" | "nyc" => "New York".to_string(),
        _ => cleaned,
    };
    Some(normalized)
}

/// Ask the oracle when there is one; any failure is logged and ignored.
pub async fn consult(oracle: Option<&dyn LocationOracle>, prompt: &str) -> OracleGuess {
    let Some(oracle) = oracle else {
        return OracleGuess::default();
    };
    match oracle.guess(prompt).await {
        Ok(guess) => {
            debug!(?guess, "oracle answered");
            guess
        }
        Err(e) => {
            warn!("LLM extraction failed, using keyword extraction: {}", e);
            OracleGuess::default()
        }
    }
}
