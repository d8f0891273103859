//! OpenStreetMap links for a handful of places

use crate::poi::PointOfInterest;

const STATIC_MAP_BASE: &str = "https://staticmap.openstreetmap.org/staticmap.php";
const EMBED_BASE: &str = "https://www.openstreetmap.org/export/embed.html";
const MAX_MARKERS: usize = 5;

fn map_points(places: &[PointOfInterest]) -> Option<&[PointOfInterest]> {
    let points = &places[..places.len().min(MAX_MARKERS)];
    (points.len() >= 2).then_some(points)
}

/// Static map centred on the first five places, one numbered marker each.
/// Needs at least two places. Only coordinates go into the URL.
#[must_use]
pub fn build_map_link(places: &[PointOfInterest]) -> Option<String> {
    let points = map_points(places)?;

    let count = points.len() as f64;
    let center_lat = points.iter().map(|p| p.latitude).sum::<f64>() / count;
    let center_lon = points.iter().map(|p| p.longitude).sum::<f64>() / count;

    let markers = points
        .iter()
        .enumerate()
        .map(|(idx, p)| format!("{:.4},{:.4},red-{}", p.latitude, p.longitude, idx + 1))
        .collect::<Vec<_>>()
        .join("|");

    Some(format!(
        "{STATIC_MAP_BASE}?center={center_lat:.4},{center_lon:.4}&zoom=12&size=600x400&markers={markers}"
    ))
}

/// Embeddable map framing the first five places, marker on the first.
#[must_use]
pub fn build_map_embed_url(places: &[PointOfInterest]) -> Option<String> {
    let points = map_points(places)?;

    let (mut min_lat, mut min_lon) = (f64::INFINITY, f64::INFINITY);
    let (mut max_lat, mut max_lon) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lon = min_lon.min(p.longitude);
        max_lon = max_lon.max(p.longitude);
    }

    let first = &points[0];
    Some(format!(
        "{EMBED_BASE}?bbox={min_lon},{min_lat},{max_lon},{max_lat}&layer=mapnik&marker={},{}",
        first.latitude, first.longitude
    ))
}
