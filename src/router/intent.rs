//! Intent classification by keyword containment

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lexicon::{PLACES_KEYWORDS, WEATHER_KEYWORDS};
use crate::TravelAiError;

/// What the traveller wants to know
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Weather,
    Places,
    Both,
}

impl Intent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Weather => "weather",
            Intent::Places => "places",
            Intent::Both => "both",
        }
    }

    #[must_use]
    pub fn wants_weather(self) -> bool {
        matches!(self, Intent::Weather | Intent::Both)
    }

    #[must_use]
    pub fn wants_places(self) -> bool {
        matches!(self, Intent::Places | Intent::Both)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = TravelAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weather" => Ok(Intent::Weather),
            "places" => Ok(Intent::Places),
            "both" => Ok(Intent::Both),
            other => Err(TravelAiError::validation(format!(
                "Invalid intent value '{other}'. Must be one of: weather, places, both"
            ))),
        }
    }
}

/// Classify a prompt. Matching is plain substring containment on the
/// lower-cased prompt, so "temp" also fires inside "temperature".
/// Ambiguous prompts get [`Intent::Both`].
#[must_use]
pub fn detect_intent(prompt: &str) -> Intent {
    let lowered = prompt.to_lowercase();
    let wants_weather = contains_any(&lowered, WEATHER_KEYWORDS);
    let wants_places = contains_any(&lowered, PLACES_KEYWORDS);

    match (wants_weather, wants_places) {
        (true, false) => Intent::Weather,
        (false, true) => Intent::Places,
        _ => Intent::Both,
    }
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
