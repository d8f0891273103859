//! Rank, filter and deduplicate raw map features

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use super::{GeoPoint, PointOfInterest, RawElement, parse_element, score_point};

#[derive(Debug, Default, Deserialize)]
struct OverpassPayload {
    #[serde(default)]
    elements: Vec<RawElement>,
}

struct ScoredPoint {
    poi: PointOfInterest,
    score: f64,
}

/// Best `limit` places among `elements`, highest score first.
///
/// Places scoring zero or less are dropped, and of several places sharing a
/// name (ignoring case and surrounding whitespace) only the best survives.
#[must_use]
pub fn rank(elements: &[RawElement], reference: GeoPoint, limit: usize) -> Vec<PointOfInterest> {
    let mut scored: Vec<ScoredPoint> = elements
        .iter()
        .filter_map(parse_element)
        .map(|poi| {
            let score = score_point(&poi, reference);
            ScoredPoint { poi, score }
        })
        .filter(|candidate| candidate.score > 0.0)
        .collect();

    // stable, so equal scores keep input order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    let ranked: Vec<PointOfInterest> = scored
        .into_iter()
        .filter(|candidate| seen.insert(candidate.poi.name.trim().to_lowercase()))
        .take(limit)
        .map(|candidate| candidate.poi)
        .collect();

    debug!(
        input = elements.len(),
        output = ranked.len(),
        "ranked points of interest"
    );
    ranked
}

/// Rank the `elements` of an Overpass JSON document.
pub fn rank_payload(
    payload: &serde_json::Value,
    reference: GeoPoint,
    limit: usize,
) -> serde_json::Result<Vec<PointOfInterest>> {
    let parsed = OverpassPayload::deserialize(payload)?;
    Ok(rank(&parsed.elements, reference, limit))
}
