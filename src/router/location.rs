//! Location extraction from free text
//!
//! Strategies run in order of confidence and the first one that produces a
//! candidate wins:
//!
//! 1. prepositional / verb cue patterns ("to X", "in X", "plan a X escape", ...)
//! 2. the last run of capitalised words
//! 3. the word right after a travel verb
//! 4. the last significant word (prompts of two or more words)
//! 5. a lone word prompt

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::lexicon::{is_non_location_title, is_significant, is_stop_word, is_verb};

type Strategy = fn(&str) -> Option<String>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("cue_pattern", from_cue_patterns),
    ("capitalized_chunk", from_capitalized_chunks),
    ("after_verb", from_word_after_verb),
    ("last_significant_word", from_last_significant_word),
    ("single_token", from_single_token),
];

/// Ordered cue patterns, applied to the original-case prompt
static CUE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bto\s+([A-Za-z][a-zA-Z\s]+)",
        r"(?i)\bin\s+([A-Za-z][a-zA-Z\s]+)",
        r"(?i)\bfor\s+([A-Za-z][a-zA-Z\s]+)",
        r"(?i)\bplan\s+(?:a\s+)?(?:trip\s+to\s+)?([A-Za-z][a-zA-Z\s]+)",
        r"(?i)\bvisit\s+([A-Za-z][a-zA-Z\s]+)",
        r"(?i)\bgoing\s+to\s+([A-Za-z][a-zA-Z\s]+)",
        // location before the cue: "kerala escape", "Goa trip"
        r"(?i)\b([A-Za-z][a-zA-Z\s]+?)\s+(?:escape|trip|vacation|holiday)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("cue pattern is a valid regex"))
    .collect()
});

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("punctuation pattern is a valid regex"));

static CAPITALIZED_CHUNK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*")
        .expect("capitalized chunk pattern is a valid regex")
});

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z][a-zA-Z-]*").expect("word pattern is a valid regex"));

/// Pull a location out of `prompt`, or `None` when nothing looks like one.
#[must_use]
pub fn extract_location(prompt: &str) -> Option<String> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(prompt)?;
        debug!(strategy = *name, location = %found, "location extracted");
        Some(found)
    })
}

/// True when no strategy finds a location and the user has to be asked.
#[must_use]
pub fn needs_location_clarification(prompt: &str) -> bool {
    extract_location(prompt).is_none()
}

fn from_cue_patterns(prompt: &str) -> Option<String> {
    CUE_PATTERNS.iter().find_map(|pattern| {
        let captured = pattern.captures(prompt)?.get(1)?.as_str();
        clean_candidate(captured)
    })
}

/// Drop punctuation, trim stop words from both ends and fix casing.
fn clean_candidate(raw: &str) -> Option<String> {
    let stripped = PUNCTUATION.replace_all(raw.trim(), "");
    let words: Vec<&str> = stripped.split_whitespace().collect();
    let mut tokens = words.as_slice();

    while let Some((first, rest)) = tokens.split_first() {
        if !is_stop_word(&first.to_lowercase()) {
            break;
        }
        tokens = rest;
    }
    while let Some((last, rest)) = tokens.split_last() {
        if !is_stop_word(&last.to_lowercase()) {
            break;
        }
        tokens = rest;
    }

    if tokens.is_empty() {
        return None;
    }

    let candidate = tokens.join(" ");
    if is_all_lowercase(&candidate) {
        Some(title_case(&candidate))
    } else {
        Some(candidate)
    }
}

fn from_capitalized_chunks(prompt: &str) -> Option<String> {
    let chunks: Vec<&str> = CAPITALIZED_CHUNK
        .find_iter(prompt)
        .map(|m| m.as_str())
        .collect();
    chunks
        .into_iter()
        .rev()
        .find(|chunk| !is_non_location_title(chunk))
        .map(str::to_string)
}

fn from_word_after_verb(prompt: &str) -> Option<String> {
    let tokens = tokenize(prompt);
    tokens.windows(2).find_map(|pair| {
        let (verb, next) = (&pair[0], &pair[1]);
        if !is_verb(verb) || !is_significant(next) {
            return None;
        }
        accept_titled(next)
    })
}

fn from_last_significant_word(prompt: &str) -> Option<String> {
    let tokens = tokenize(prompt);
    if tokens.len() < 2 {
        return None;
    }
    tokens
        .iter()
        .rev()
        .filter(|token| is_significant(token))
        .find_map(|token| accept_titled(token))
}

fn from_single_token(prompt: &str) -> Option<String> {
    match tokenize(prompt).as_slice() {
        [only] if is_significant(only) => accept_titled(only),
        _ => None,
    }
}

fn accept_titled(token: &str) -> Option<String> {
    let titled = title_case(token);
    (!is_non_location_title(&titled)).then_some(titled)
}

/// Lower-cased alphabetic runs (hyphens allowed after the first letter)
fn tokenize(prompt: &str) -> Vec<String> {
    let lowered = prompt.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// At least one cased character and no upper-case ones
fn is_all_lowercase(text: &str) -> bool {
    let has_cased = text.chars().any(|c| c.is_lowercase() || c.is_uppercase());
    has_cased && !text.chars().any(char::is_uppercase)
}

/// Upper-case every letter that follows a non-letter, lower-case the rest:
/// "new-delhi" -> "New-Delhi", "kerala" -> "Kerala".
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if prev_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_is_letter = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Plan my trip to Bangalore", Some("Bangalore"))]
    #[case("I'm off to New Delhi next week", Some("New Delhi"))]
    #[case("Weather in San Francisco tomorrow?", Some("San Francisco"))]
    #[case("Need ideas for Goa", Some("Goa"))]
    #[case("Do you know Paris?", Some("Paris"))]
    #[case("plan a kerala escape", Some("Kerala"))]
    #[case("I'm going to Bangalore, plan my trip.", Some("Bangalore"))]
    #[case("Going to Wakanda.", Some("Wakanda"))]
    #[case("Plan my trip", None)]
    fn test_extract_location(#[case] prompt: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_location(prompt).as_deref(), expected);
    }

    #[test]
    fn test_cue_pattern_strips_both_ends() {
        // leading "go" and trailing "tomorrow please" are both dropped
        assert_eq!(
            from_cue_patterns("want to go munnar tomorrow please").as_deref(),
            Some("Munnar")
        );
    }

    #[test]
    fn test_cue_pattern_keeps_user_casing() {
        assert_eq!(
            from_cue_patterns("Heading to New Delhi next week").as_deref(),
            Some("New Delhi")
        );
        assert_eq!(
            from_cue_patterns("trip to new York").as_deref(),
            Some("new York")
        );
    }

    #[test]
    fn test_cue_pattern_falls_through_empty_capture() {
        // "plan my trip" cleans to nothing, nothing else matches
        assert_eq!(from_cue_patterns("plan my trip"), None);
        // "for" captures only stop words, the later "visit" cue wins
        assert_eq!(
            from_cue_patterns("for my trip, visit ooty").as_deref(),
            Some("Ooty")
        );
    }

    #[test]
    fn test_capitalized_chunk_skips_sentence_starters() {
        assert_eq!(
            from_capitalized_chunks("Heading somewhere nice").as_deref(),
            None
        );
        assert_eq!(
            from_capitalized_chunks("Give me Rishikesh ideas").as_deref(),
            Some("Rishikesh")
        );
        assert_eq!(
            from_capitalized_chunks("Hampi or Gokarna").as_deref(),
            Some("Gokarna")
        );
    }

    #[test]
    fn test_word_after_verb() {
        assert_eq!(
            from_word_after_verb("explore coorg with friends").as_deref(),
            Some("Coorg")
        );
        assert_eq!(from_word_after_verb("explore the hills"), None);
    }

    #[test]
    fn test_last_significant_word() {
        assert_eq!(
            from_last_significant_word("beaches of gokarna please").as_deref(),
            Some("Gokarna")
        );
        assert_eq!(from_last_significant_word("mysore"), None);
    }

    #[test]
    fn test_single_token() {
        assert_eq!(from_single_token("mysore").as_deref(), Some("Mysore"));
        assert_eq!(from_single_token("tomorrow"), None);
        assert_eq!(from_single_token("two words"), None);
        assert_eq!(extract_location("mysore").as_deref(), Some("Mysore"));
    }

    #[test]
    fn test_no_signal_needs_clarification() {
        assert!(needs_location_clarification("Plan my trip"));
        assert!(needs_location_clarification(""));
        assert!(needs_location_clarification("what should i do"));
        assert!(!needs_location_clarification("Plan my trip to Goa"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let prompt = "Weather in San Francisco tomorrow?";
        let first = extract_location(prompt);
        for _ in 0..5 {
            assert_eq!(extract_location(prompt), first);
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new delhi"), "New Delhi");
        assert_eq!(title_case("new-delhi"), "New-Delhi");
        assert_eq!(title_case("KERALA"), "Kerala");
    }

    #[test]
    fn test_is_all_lowercase() {
        assert!(is_all_lowercase("goa"));
        assert!(!is_all_lowercase("Goa"));
        assert!(!is_all_lowercase("123"));
    }
}
