//! Heuristic quality score for a point of interest
//!
//! The score is additive: tag richness, the kind of place, signs of a
//! well-documented landmark and proximity all push it up, accommodation
//! pushes it down. Anything scoring zero or less is dropped by the ranker.

use super::{GeoPoint, PointOfInterest};

const PER_TAG: f64 = 0.5;
const MISSING_NAME: f64 = -30.0;

const TOURISM_WEIGHTS: &[(&str, f64)] = &[
    ("attraction", 50.0),
    ("museum", 45.0),
    ("zoo", 40.0),
    ("theme_park", 40.0),
    ("gallery", 35.0),
    ("artwork", 35.0),
    ("viewpoint", 30.0),
    ("hotel", -20.0),
    ("hostel", -20.0),
    ("apartment", -20.0),
    ("guest_house", -20.0),
];

const HISTORIC_WEIGHTS: &[(&str, f64)] = &[
    ("monument", 45.0),
    ("castle", 45.0),
    ("palace", 45.0),
    ("tower", 45.0),
    ("ruins", 45.0),
    ("museum", 40.0),
    ("memorial", 40.0),
];
const OTHER_HISTORIC: f64 = 30.0;

const WEBSITE: f64 = 10.0;
const PHONE: f64 = 5.0;
const EMAIL: f64 = 5.0;
const ENCYCLOPEDIA: f64 = 15.0;
const PER_STAR: f64 = 3.0;

const NAMED_PARK: f64 = 20.0;
const MAINTAINED_PARK: f64 = 10.0;

const ACCOMMODATION_WORDS: &[&str] = &["hostel", "hotel", "apartment", "guest house", "resort"];
const ACCOMMODATION_IN_NAME: f64 = -30.0;

/// Score `poi` relative to the search center.
#[must_use]
pub fn score_point(poi: &PointOfInterest, reference: GeoPoint) -> f64 {
    let tourism = poi.tag("tourism").unwrap_or_default();
    let has_name = poi.tag("name").is_some();

    let mut score = PER_TAG * poi.tags.len() as f64;
    if !has_name {
        score += MISSING_NAME;
    }

    score += lookup(TOURISM_WEIGHTS, tourism).unwrap_or(0.0);
    score += historic_weight(poi.tag("historic"));
    score += documentation_weight(poi);

    if matches!(poi.tag("leisure"), Some("park" | "garden")) && has_name {
        score += NAMED_PARK;
        if poi.tag("operator").is_some() || poi.tag("website").is_some() {
            score += MAINTAINED_PARK;
        }
    }

    score += distance_weight(reference.distance_km(&poi.location()));

    let name = poi.name.to_lowercase();
    let looks_like_lodging = ACCOMMODATION_WORDS.iter().any(|word| name.contains(word));
    if looks_like_lodging && !matches!(tourism, "attraction" | "museum") {
        score += ACCOMMODATION_IN_NAME;
    }

    score
}

fn lookup(table: &[(&str, f64)], key: &str) -> Option<f64> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, weight)| *weight)
}

fn historic_weight(historic: Option<&str>) -> f64 {
    match historic {
        Some(value) => lookup(HISTORIC_WEIGHTS, value).unwrap_or(OTHER_HISTORIC),
        None => 0.0,
    }
}

fn documentation_weight(poi: &PointOfInterest) -> f64 {
    let mut score = 0.0;
    if poi.tag("website").is_some() {
        score += WEBSITE;
    }
    if poi.tag("phone").is_some() {
        score += PHONE;
    }
    if poi.tag("email").is_some() {
        score += EMAIL;
    }
    if poi.tag("wikidata").is_some() || poi.tag("wikipedia").is_some() {
        score += ENCYCLOPEDIA;
    }
    // non-integer ratings ("4.5", "3S") are ignored
    if let Some(stars) = poi.tag("stars").and_then(|s| s.trim().parse::<i64>().ok()) {
        score += PER_STAR * stars as f64;
    }
    score
}

fn distance_weight(km: f64) -> f64 {
    if km < 5.0 {
        10.0
    } else if km < 10.0 {
        5.0
    } else {
        -0.5 * km
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const CENTER: GeoPoint = GeoPoint {
        latitude: 12.2958,
        longitude: 76.6394,
    };

    fn poi(name: &str, tags: &[(&str, &str)]) -> PointOfInterest {
        PointOfInterest {
            name: name.to_string(),
            kind: "unknown".to_string(),
            latitude: CENTER.latitude,
            longitude: CENTER.longitude,
            tags: tags
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_attraction_with_documentation() {
        let p = poi(
            "Mysore Palace",
            &[
                ("name", "Mysore Palace"),
                ("tourism", "attraction"),
                ("historic", "palace"),
                ("website", "https://mysorepalace.gov.in"),
                ("wikidata", "Q1146573"),
            ],
        );
        // 2.5 tags + 50 + 45 + 10 + 15 + 10 nearby
        assert_close(score_point(&p, CENTER), 132.5);
    }

    #[test]
    fn test_nameless_and_hotel_penalties() {
        // 0.5 + -30 missing name + -20 hotel + 10 nearby + -30 lodging name
        assert_close(score_point(&poi("hotel", &[("tourism", "hotel")]), CENTER), -69.5);

        // name mentions a hotel: 1.0 + -20 + 10 + -30
        let hotel = poi("Grand Hotel", &[("name", "Grand Hotel"), ("tourism", "hotel")]);
        assert_close(score_point(&hotel, CENTER), -39.0);
    }

    #[test]
    fn test_lodging_name_spared_for_attractions() {
        let p = poi(
            "Old Hotel Museum",
            &[("name", "Old Hotel Museum"), ("tourism", "museum")],
        );
        assert_close(score_point(&p, CENTER), 1.0 + 45.0 + 10.0);
    }

    #[test]
    fn test_other_historic_and_stars() {
        let p = poi(
            "Old Well",
            &[("name", "Old Well"), ("historic", "well"), ("stars", " 4 ")],
        );
        assert_close(score_point(&p, CENTER), 1.5 + 30.0 + 12.0 + 10.0);

        let fractional = poi("Inn", &[("name", "Inn"), ("stars", "4.5")]);
        assert_close(score_point(&fractional, CENTER), 1.0 + 10.0);
    }

    #[test]
    fn test_parks_need_a_name() {
        let named = poi(
            "Cubbon Park",
            &[("name", "Cubbon Park"), ("leisure", "park"), ("operator", "BBMP")],
        );
        assert_close(score_point(&named, CENTER), 1.5 + 20.0 + 10.0 + 10.0);

        let nameless = poi("park", &[("leisure", "park")]);
        assert_close(score_point(&nameless, CENTER), 0.5 - 30.0 + 10.0);
    }

    #[test]
    fn test_empty_tag_values_count_as_missing() {
        let p = poi("Spot", &[("name", "Spot"), ("website", "")]);
        assert_close(score_point(&p, CENTER), 1.0 + 10.0);
    }

    #[test]
    fn test_distance_bands() {
        assert_close(distance_weight(0.0), 10.0);
        assert_close(distance_weight(4.99), 10.0);
        assert_close(distance_weight(5.0), 5.0);
        assert_close(distance_weight(9.99), 5.0);
        assert_close(distance_weight(10.0), -5.0);
        assert_close(distance_weight(40.0), -20.0);
    }
}
