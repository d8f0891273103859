//! Points of interest from the Overpass API

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::PlacesProvider;
use super::http::{self, FetchError, HttpClient};
use crate::config::PlacesConfig;
use crate::error::ToolKind;
use crate::poi::{self, GeoPoint, PointOfInterest};
use crate::{Result, TravelAiError};

/// Tourism values that describe somewhere to sleep rather than something to see
const ACCOMMODATION: &[&str] = &["hotel", "hostel", "apartment", "guest_house"];

const SELECTORS: &[&str] = &[
    "[tourism=attraction]",
    "[tourism=museum]",
    "[historic=monument]",
    "[historic=castle]",
    "[historic=palace]",
    "[tourism=zoo]",
    "[tourism=theme_park]",
    "[leisure=park][name]",
    "[leisure=garden][name]",
];

pub struct OverpassPlaces {
    client: HttpClient,
    instances: Vec<String>,
    radius_m: u32,
    limit: usize,
    timeout_seconds: u32,
}

impl OverpassPlaces {
    pub fn new(config: &PlacesConfig, user_agent: &str) -> Result<Self> {
        let client = http::build_client(
            user_agent,
            Duration::from_secs(config.timeout_seconds.into()),
            config.max_retries,
        )?;
        Ok(Self {
            client,
            instances: config.overpass_instances.clone(),
            radius_m: config.radius_m,
            limit: config.limit,
            timeout_seconds: config.timeout_seconds,
        })
    }

    async fn query_instance(&self, url: &str, query: &str) -> std::result::Result<Value, FetchError> {
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("data={}", urlencoding::encode(query)));
        http::fetch_json(request).await
    }
}

#[async_trait]
impl PlacesProvider for OverpassPlaces {
    #[instrument(skip(self))]
    async fn nearby_places(&self, point: GeoPoint) -> Result<Vec<PointOfInterest>> {
        let query = build_query(point, self.radius_m, self.timeout_seconds);
        let start_time = Instant::now();
        let mut last_error = None;

        for instance in &self.instances {
            debug!("Querying Overpass instance {}", instance);
            match self.query_instance(instance, &query).await {
                Ok(payload) => {
                    let places = poi::rank_payload(&payload, point, self.limit).map_err(|e| {
                        TravelAiError::tool(
                            ToolKind::Places,
                            format!("unexpected Overpass response: {e}"),
                        )
                    })?;
                    info!(
                        "Found {} places via {} in {:.3}s",
                        places.len(),
                        instance,
                        start_time.elapsed().as_secs_f64()
                    );
                    return Ok(places);
                }
                Err(e @ FetchError::Decode(_)) => {
                    return Err(TravelAiError::tool(
                        ToolKind::Places,
                        format!("Places response was not valid JSON ({e})"),
                    ));
                }
                Err(e) => {
                    warn!("Overpass instance {} failed: {}", instance, e);
                    last_error = Some(format!("{e} from {instance}"));
                }
            }
        }

        Err(TravelAiError::tool(
            ToolKind::Places,
            format!(
                "Unable to fetch places after trying {} instances. Last error: {}",
                self.instances.len(),
                last_error.as_deref().unwrap_or("no instances configured")
            ),
        ))
    }
}

/// Overpass QL for notable sights within `radius_m` of `point`
#[must_use]
pub fn build_query(point: GeoPoint, radius_m: u32, timeout_seconds: u32) -> String {
    let around = format!(
        "(around:{radius_m},{},{})",
        point.latitude, point.longitude
    );
    let not_lodging: String = ACCOMMODATION
        .iter()
        .map(|kind| format!("[tourism!={kind}]"))
        .collect();

    let mut query = format!("[out:json][timeout:{timeout_seconds}];\n(\n");
    let selectors = SELECTORS
        .iter()
        .map(|s| (*s).to_string())
        .chain(std::iter::once(format!("[tourism]{not_lodging}")));
    for selector in selectors {
        for element in ["node", "way", "relation"] {
            query.push_str(&format!("  {element}{around}{selector};\n"));
        }
    }
    query.push_str(");\nout center;\n");
    query
}
