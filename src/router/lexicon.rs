//! Fixed word lists driving intent and location extraction

pub const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "temp",
    "rain",
    "forecast",
    "climate",
    "precip",
];

pub const PLACES_KEYWORDS: &[&str] = &[
    "place",
    "places",
    "trip",
    "plan",
    "visit",
    "itinerary",
    "see",
    "attraction",
    "go",
    "tour",
];

/// Words that never belong to a place name: time, courtesy, pronouns,
/// articles, auxiliaries, and the travel cue words themselves.
pub const STOP_WORDS: &[&str] = &[
    // time
    "next", "week", "weeks", "days", "day", "tomorrow", "today", "tonight", "now", "soon",
    "asap",
    // courtesy
    "please",
    // travel cues
    "escape", "getaway", "trip", "vacation", "holiday", "plan", "visit", "going", "for", "to",
    "go",
    // pronouns, articles, determiners
    "my", "me", "i", "you", "your", "our", "their", "his", "her", "its", "the", "a", "an", "this",
    "that", "these", "those",
    // question words
    "what", "which", "who", "where", "when", "how",
    // auxiliaries
    "should", "would", "could", "can", "will", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "do", "does", "did", "need", "want", "know",
];

/// Capitalised sentence openers that are not locations
pub const NON_LOCATION_TITLES: &[&str] = &[
    "Plan", "What", "Need", "Do", "I'm", "My", "Your", "Heading", "Going", "Weather", "Trip",
    "Escape", "Give",
];

pub const COMMON_VERBS: &[&str] = &[
    "plan", "visit", "going", "go", "see", "explore", "travel", "tour",
];

#[must_use]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

#[must_use]
pub fn is_verb(token: &str) -> bool {
    COMMON_VERBS.contains(&token)
}

#[must_use]
pub fn is_non_location_title(chunk: &str) -> bool {
    NON_LOCATION_TITLES.contains(&chunk)
}

/// Neither a stop word nor a travel verb
#[must_use]
pub fn is_significant(token: &str) -> bool {
    !is_stop_word(token) && !is_verb(token)
}
