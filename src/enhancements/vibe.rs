//! Mood-based packing tip from the places found and the current weather

use std::collections::BTreeSet;

use crate::poi::PointOfInterest;
use crate::tools::WeatherReport;

const OUTDOOR_KEYWORDS: &[&str] = &[
    "park", "zoo", "national", "lake", "garden", "trail", "wildlife", "beach", "camp",
];
const CULTURE_KEYWORDS: &[&str] = &[
    "museum", "palace", "temple", "historic", "art", "gallery", "heritage",
];
const NIGHTLIFE_KEYWORDS: &[&str] = &["bar", "club", "brewery", "pub", "nightlife"];

/// Overall character of a set of places; declaration order breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vibe {
    Outdoors,
    Culture,
    Nightlife,
}

impl Vibe {
    const ALL: [Vibe; 3] = [Vibe::Outdoors, Vibe::Culture, Vibe::Nightlife];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Vibe::Outdoors => OUTDOOR_KEYWORDS,
            Vibe::Culture => CULTURE_KEYWORDS,
            Vibe::Nightlife => NIGHTLIFE_KEYWORDS,
        }
    }

    fn advice(self) -> &'static str {
        match self {
            Vibe::Outdoors => "Expect plenty of outdoor exploring, wear sturdy shoes.",
            Vibe::Culture => "Cultural hotspots ahead, smart casual layers work well.",
            Vibe::Nightlife => "Nightlife-heavy plan, bring something stylish and comfortable.",
        }
    }
}

/// `None` without places, or when there is nothing worth recommending.
#[must_use]
pub fn generate_vibe_tip(
    weather: Option<&WeatherReport>,
    places: &[PointOfInterest],
) -> Option<String> {
    if places.is_empty() {
        return None;
    }

    let mut recommendations = Vec::new();
    if let Some(vibe) = infer_vibe(places) {
        recommendations.push(vibe.advice());
    }

    if let Some(weather) = weather {
        if weather.precip_prob_pct >= 50 {
            recommendations.push("Rain is likely, pack a light raincoat.");
        } else if weather.precip_prob_pct >= 30 {
            recommendations.push("Carry a compact umbrella just in case.");
        }

        if weather.temperature_c <= 18.0 {
            recommendations.push("It may feel cool, add a warm layer.");
        } else if weather.temperature_c >= 30.0 {
            recommendations.push("Heat will be intense, choose breathable fabrics.");
        }
    }

    if recommendations.is_empty() {
        return None;
    }
    Some(format!("Tip: {}", recommendations.join(" ")))
}

/// Most common vibe among `places`
#[must_use]
pub fn infer_vibe(places: &[PointOfInterest]) -> Option<Vibe> {
    let mut counts = [0usize; Vibe::ALL.len()];
    for place in places {
        if let Some(vibe) = place_vibe(place) {
            counts[vibe as usize] += 1;
        }
    }

    let (best, count) = Vibe::ALL
        .iter()
        .zip(counts)
        .fold(None::<(Vibe, usize)>, |best, (&vibe, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((vibe, count)),
        })?;
    (count > 0).then_some(best)
}

fn place_vibe(place: &PointOfInterest) -> Option<Vibe> {
    // whole tag values plus the words of the name
    let mut tokens: BTreeSet<String> = place.tags.values().map(|v| v.to_lowercase()).collect();
    tokens.extend(place.name.to_lowercase().split_whitespace().map(str::to_string));

    Vibe::ALL.into_iter().find(|vibe| {
        vibe.keywords()
            .iter()
            .any(|keyword| tokens.contains(*keyword))
    })
}
