//! Place name to coordinates, via Nominatim with Photon and maps.co fallbacks

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::RngExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::Geocoder;
use super::http::{self, FetchError, HttpClient};
use crate::cache::PersistentCache;
use crate::config::{CacheConfig, GeocodingConfig};
use crate::error::ToolKind;
use crate::poi::GeoPoint;
use crate::{Result, TravelAiError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
}

impl GeocodeResult {
    #[must_use]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

pub struct NominatimGeocoder {
    client: HttpClient,
    config: GeocodingConfig,
    cache: Option<Arc<PersistentCache>>,
    cache_ttl: Duration,
    last_nominatim_call: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    pub fn new(config: GeocodingConfig) -> Result<Self> {
        // 403/429 must reach the fallback chain quickly, so retry only once
        let client = http::build_client(
            &config.user_agent,
            Duration::from_secs(config.timeout_seconds.into()),
            1,
        )?;
        Ok(Self {
            client,
            config,
            cache: None,
            cache_ttl: Duration::ZERO,
            last_nominatim_call: Mutex::new(None),
        })
    }

    /// Memoise successful lookups in `cache`
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PersistentCache>, settings: &CacheConfig) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = Duration::from_secs(u64::from(settings.ttl_hours) * 3600);
        self
    }

    async fn lookup(&self, location: &str) -> Result<Option<GeocodeResult>> {
        let blocked = match self.query_nominatim(location).await {
            Ok(found) => return Ok(found),
            Err(e) if e.is_blocked() => e,
            Err(e) => {
                return Err(TravelAiError::tool(
                    ToolKind::Geocode,
                    format!("Geocoding request failed: {e}"),
                ));
            }
        };

        warn!("Nominatim refused the request ({}), trying Photon", blocked);
        let photon_error = match self.query_photon(location).await {
            Ok(found) => return Ok(found),
            Err(e) => e,
        };

        warn!("Photon failed ({}), trying maps.co", photon_error);
        self.query_nominatim_compatible(&self.config.maps_co_url, location, false)
            .await
            .map_err(|e| {
                TravelAiError::tool(
                    ToolKind::Geocode,
                    format!(
                        "all services unavailable, last errors: photon {photon_error}, maps.co {e}"
                    ),
                )
            })
    }

    async fn query_nominatim(
        &self,
        location: &str,
    ) -> std::result::Result<Option<GeocodeResult>, FetchError> {
        self.throttle().await;
        self.query_nominatim_compatible(&self.config.nominatim_url, location, true)
            .await
    }

    /// Nominatim asks for at most one request per second
    async fn throttle(&self) {
        let mut last_call = self.last_nominatim_call.lock().await;
        if let Some(previous) = *last_call {
            let min_interval = Duration::from_millis(self.config.min_interval_ms);
            let elapsed = previous.elapsed();
            if elapsed < min_interval {
                let wait = min_interval - elapsed;
                debug!("Throttling Nominatim for {:.3}s", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    async fn query_nominatim_compatible(
        &self,
        base_url: &str,
        location: &str,
        send_email: bool,
    ) -> std::result::Result<Option<GeocodeResult>, FetchError> {
        let mut url = format!(
            "{base_url}?q={}&format=json&limit=1",
            urlencoding::encode(location)
        );
        if send_email {
            if let Some(email) = self.config.contact_email.as_deref() {
                url.push_str(&format!("&email={}", urlencoding::encode(email)));
            }
        }
        let payload: Value = http::fetch_json(self.client.get(url)).await?;
        parse_nominatim(&payload, location)
    }

    async fn query_photon(
        &self,
        location: &str,
    ) -> std::result::Result<Option<GeocodeResult>, FetchError> {
        let url = format!(
            "{}?q={}&limit=1",
            self.config.photon_url,
            urlencoding::encode(location)
        );
        let payload: Value = http::fetch_json(self.client.get(url)).await?;
        Ok(parse_photon(&payload, location))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, location: &str) -> Result<Option<GeocodeResult>> {
        let key = cache_key(location);
        if let Some(cache) = &self.cache {
            match cache.get::<GeocodeResult>(&key).await {
                Ok(Some(hit)) => {
                    debug!("Geocode cache hit for '{}'", location);
                    return Ok(Some(hit));
                }
                Ok(None) => {}
                Err(e) => warn!("Geocode cache read failed: {}", e),
            }
        }

        info!("Geocoding location: '{}'", location);
        let start_time = Instant::now();
        let result = self.lookup(location).await?;

        match &result {
            Some(found) => {
                info!(
                    "Geocoded '{}' to ({:.4}, {:.4}) in {:.3}s",
                    location,
                    found.latitude,
                    found.longitude,
                    start_time.elapsed().as_secs_f64()
                );
                if let Some(cache) = &self.cache {
                    let jitter: f64 = rand::rng().random_range(0.9..1.1);
                    let ttl = self.cache_ttl.mul_f64(jitter);
                    if let Err(e) = cache.put(&key, found.clone(), ttl).await {
                        warn!("Geocode cache write failed: {}", e);
                    }
                }
            }
            None => warn!("No geocoding results found for '{}'", location),
        }

        Ok(result)
    }
}

fn cache_key(location: &str) -> String {
    format!("geocode:{}", location.trim().to_lowercase())
}

/// Coordinates come back as strings from Nominatim and as numbers elsewhere
fn coordinate(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn property<'a>(properties: Option<&'a Value>, key: &str) -> Option<&'a str> {
    non_empty_str(properties.and_then(|p| p.get(key)))
}

/// First hit of a Nominatim-style JSON array
fn parse_nominatim(
    payload: &Value,
    query: &str,
) -> std::result::Result<Option<GeocodeResult>, FetchError> {
    let Some(first) = payload.as_array().and_then(|hits| hits.first()) else {
        return Ok(None);
    };

    let (Some(latitude), Some(longitude)) = (coordinate(first.get("lat")), coordinate(first.get("lon")))
    else {
        return Err(FetchError::Decode(
            "geocoding hit without coordinates".to_string(),
        ));
    };

    Ok(Some(GeocodeResult {
        name: non_empty_str(first.get("display_name"))
            .unwrap_or(query)
            .to_string(),
        latitude,
        longitude,
        country: non_empty_str(first.get("address").and_then(|a| a.get("country")))
            .map(str::to_string),
    }))
}

/// First feature of a Photon GeoJSON collection (or a bare feature list)
fn parse_photon(payload: &Value, query: &str) -> Option<GeocodeResult> {
    let features = match payload {
        Value::Array(features) => features,
        other => other.get("features")?.as_array()?,
    };
    let first = features.first()?;

    if let Some(geometry) = first.get("geometry") {
        // GeoJSON order is [lon, lat]
        let coordinates = geometry.get("coordinates")?.as_array()?;
        let longitude = coordinate(coordinates.first())?;
        let latitude = coordinate(coordinates.get(1))?;
        let properties = first.get("properties");
        return Some(GeocodeResult {
            name: property(properties, "name")
                .or_else(|| property(properties, "display_name"))
                .unwrap_or(query)
                .to_string(),
            latitude,
            longitude,
            country: property(properties, "country").map(str::to_string),
        });
    }

    Some(GeocodeResult {
        name: non_empty_str(first.get("name"))
            .or_else(|| non_empty_str(first.get("display_name")))
            .unwrap_or(query)
            .to_string(),
        latitude: coordinate(first.get("lat"))?,
        longitude: coordinate(first.get("lon"))?,
        country: non_empty_str(first.get("country")).map(str::to_string),
    })
}
