//! External collaborators: geocoding, weather and places providers
//!
//! Each provider sits behind an object-safe trait so the orchestrator can be
//! driven by in-memory fakes in tests.

pub mod geocode;
pub mod http;
pub mod places;
pub mod weather;

use async_trait::async_trait;

use crate::Result;
use crate::poi::{GeoPoint, PointOfInterest};

pub use geocode::{GeocodeResult, NominatimGeocoder};
pub use places::OverpassPlaces;
pub use weather::{OpenMeteoWeather, WeatherReport};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name; `Ok(None)` when the provider does not know it.
    async fn geocode(&self, location: &str) -> Result<Option<GeocodeResult>>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, point: GeoPoint) -> Result<WeatherReport>;
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Ranked points of interest around `point`
    async fn nearby_places(&self, point: GeoPoint) -> Result<Vec<PointOfInterest>>;
}
