//! Turning a free-text prompt into a `(location, intent)` pair

mod lexicon;

pub mod intent;
pub mod location;
pub mod oracle;

use serde::{Deserialize, Serialize};

pub use intent::{Intent, detect_intent};
pub use location::{extract_location, needs_location_clarification};
pub use oracle::{GeminiOracle, LocationOracle, OracleGuess};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub location: Option<String>,
    pub intent: Intent,
}

/// Run the deterministic extractor only
#[must_use]
pub fn extract(prompt: &str) -> ExtractionResult {
    ExtractionResult {
        location: extract_location(prompt),
        intent: detect_intent(prompt),
    }
}

/// Combine the oracle's guess with the deterministic extractor.
///
/// A full guess wins outright; an intent-only guess keeps the extracted
/// location; anything else falls back to [`extract`].
pub async fn plan_tool_sequence(
    prompt: &str,
    oracle: Option<&dyn LocationOracle>,
) -> ExtractionResult {
    let core = extract(prompt);
    match oracle::consult(oracle, prompt).await {
        OracleGuess {
            location: Some(location),
            intent: Some(intent),
        } => ExtractionResult {
            location: Some(location),
            intent,
        },
        OracleGuess {
            location: None,
            intent: Some(intent),
        } => ExtractionResult {
            location: core.location,
            intent,
        },
        _ => core,
    }
}
