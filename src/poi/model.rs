use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::GeoPoint;

const FALLBACK_NAME: &str = "Point of interest";
const FALLBACK_KIND: &str = "unknown";

/// A ranked place as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub tags: BTreeMap<String, String>,
}

impl PointOfInterest {
    /// Tag value, treating an empty string as absent
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        non_empty(&self.tags, key)
    }

    #[must_use]
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// One element of an Overpass `out center` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawElement {
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<RawCenter>,
}

/// Centroid that Overpass attaches to ways and relations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCenter {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl RawElement {
    /// The center when it carries anything, otherwise the element's own coordinate
    fn coordinate(&self) -> Option<(f64, f64)> {
        match &self.center {
            Some(center) if center.lat.is_some() || center.lon.is_some() => {
                Some((center.lat?, center.lon?))
            }
            _ => Some((self.lat?, self.lon?)),
        }
    }
}

/// Turn a raw element into a place; `None` when it has no usable coordinate.
#[must_use]
pub fn parse_element(element: &RawElement) -> Option<PointOfInterest> {
    let (latitude, longitude) = element.coordinate()?;
    let tags = &element.tags;

    let name = ["name", "tourism", "leisure"]
        .iter()
        .find_map(|key| non_empty(tags, key))
        .unwrap_or(FALLBACK_NAME);
    let kind = ["tourism", "leisure"]
        .iter()
        .find_map(|key| non_empty(tags, key))
        .unwrap_or(FALLBACK_KIND);

    Some(PointOfInterest {
        name: name.to_string(),
        kind: kind.to_string(),
        latitude,
        longitude,
        tags: tags.clone(),
    })
}

fn non_empty<'a>(tags: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// OSM tag values are strings, but some mirrors emit numbers; keep them as text.
fn lenient_tags<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}
