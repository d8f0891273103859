//! Points of interest: parsing, scoring and ranking raw map features

pub mod model;
pub mod ranker;
pub mod scoring;

use serde::{Deserialize, Serialize};

pub use model::{PointOfInterest, RawElement, parse_element};
pub use ranker::{rank, rank_payload};
pub use scoring::score_point;

/// Number of places returned when the caller does not ask for more
pub const DEFAULT_LIMIT: usize = 5;

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            haversine::Location {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            haversine::Units::Kilometers,
        )
    }
}
