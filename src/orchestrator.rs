//! Request pipeline: extract, geocode, fetch, summarise

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::cache::PersistentCache;
use crate::config::TripSenseConfig;
use crate::enhancements::{build_map_link, generate_vibe_tip};
use crate::poi::PointOfInterest;
use crate::router::{self, GeminiOracle, Intent, LocationOracle};
use crate::tools::{
    Geocoder, NominatimGeocoder, OpenMeteoWeather, OverpassPlaces, PlacesProvider,
    WeatherProvider, WeatherReport,
};

pub const CLARIFICATION_MESSAGE: &str =
    "Could you tell me which city or region you're referring to?";
pub const UNKNOWN_PLACE_MESSAGE: &str = "I don't know this place exists";

const SUMMARY_PLACES: usize = 5;

/// Answer to a travel prompt, serialised as-is by the web API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelResponse {
    pub message: String,
    pub location: Option<String>,
    /// "weather", "places", "both", or "unknown" when no location was found
    pub intent: String,
    pub weather: Option<WeatherReport>,
    pub places: Vec<PointOfInterest>,
    pub errors: BTreeMap<String, String>,
    pub vibe_tip: Option<String>,
    pub map_url: Option<String>,
}

impl TravelResponse {
    fn needs_location() -> Self {
        Self {
            message: CLARIFICATION_MESSAGE.to_string(),
            location: None,
            intent: "unknown".to_string(),
            weather: None,
            places: Vec::new(),
            errors: BTreeMap::from([("location".to_string(), "missing".to_string())]),
            vibe_tip: None,
            map_url: None,
        }
    }

    fn unknown_place(location: String, intent: Intent) -> Self {
        Self {
            message: UNKNOWN_PLACE_MESSAGE.to_string(),
            location: Some(location),
            intent: intent.to_string(),
            weather: None,
            places: Vec::new(),
            errors: BTreeMap::from([("geocode".to_string(), "not_found".to_string())]),
            vibe_tip: None,
            map_url: None,
        }
    }
}

pub struct TravelOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
    places: Arc<dyn PlacesProvider>,
    oracle: Option<Arc<dyn LocationOracle>>,
}

impl TravelOrchestrator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherProvider>,
        places: Arc<dyn PlacesProvider>,
    ) -> Self {
        Self {
            geocoder,
            weather,
            places,
            oracle: None,
        }
    }

    #[must_use]
    pub fn with_oracle(mut self, oracle: Arc<dyn LocationOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Wire up the real providers described by `config`
    pub fn from_config(
        config: &TripSenseConfig,
        cache: Option<Arc<PersistentCache>>,
    ) -> Result<Self> {
        let user_agent = config.geocoding.user_agent.as_str();

        let mut geocoder = NominatimGeocoder::new(config.geocoding.clone())?;
        if let Some(cache) = cache {
            geocoder = geocoder.with_cache(cache, &config.cache);
        }

        let mut orchestrator = Self::new(
            Arc::new(geocoder),
            Arc::new(OpenMeteoWeather::new(&config.weather, user_agent)?),
            Arc::new(OverpassPlaces::new(&config.places, user_agent)?),
        );

        if let Some(oracle) = GeminiOracle::from_config(&config.llm, user_agent)? {
            info!("LLM extraction enabled with model {}", config.llm.model);
            orchestrator = orchestrator.with_oracle(Arc::new(oracle));
        }
        Ok(orchestrator)
    }

    /// Answer `prompt`. `forced_intent` replaces whatever intent was detected.
    ///
    /// Weather and places failures are reported in `errors`; only a failing
    /// geocoder aborts the request.
    #[instrument(skip(self))]
    pub async fn run(&self, prompt: &str, forced_intent: Option<Intent>) -> Result<TravelResponse> {
        let start_time = Instant::now();

        if router::needs_location_clarification(prompt) {
            debug!("No location in prompt, asking for clarification");
            return Ok(TravelResponse::needs_location());
        }

        let planned = router::plan_tool_sequence(prompt, self.oracle.as_deref()).await;
        let intent = forced_intent.unwrap_or(planned.intent);
        let Some(location) = planned.location else {
            return Ok(TravelResponse::needs_location());
        };
        info!(%location, %intent, "planned tool sequence");

        let Some(geocoded) = self.geocoder.geocode(&location).await? else {
            return Ok(TravelResponse::unknown_place(location, intent));
        };
        let point = geocoded.point();

        let weather_call = async {
            if intent.wants_weather() {
                Some(self.weather.current_weather(point).await)
            } else {
                None
            }
        };
        let places_call = async {
            if intent.wants_places() {
                Some(self.places.nearby_places(point).await)
            } else {
                None
            }
        };
        let (weather_outcome, places_outcome) = tokio::join!(weather_call, places_call);

        let mut errors = BTreeMap::new();
        let weather = match weather_outcome {
            Some(Ok(report)) => Some(report),
            Some(Err(e)) => {
                warn!("Weather lookup failed: {}", e);
                errors.insert("weather".to_string(), e.to_string());
                None
            }
            None => None,
        };
        let places = match places_outcome {
            Some(Ok(places)) => places,
            Some(Err(e)) => {
                warn!("Places lookup failed: {}", e);
                errors.insert("places".to_string(), e.to_string());
                Vec::new()
            }
            None => Vec::new(),
        };

        let message = format_summary(&geocoded.name, weather.as_ref(), &places, &errors);
        let vibe_tip = generate_vibe_tip(weather.as_ref(), &places);
        let map_url = build_map_link(&places);

        info!(
            "Answered travel prompt in {:.3}s ({} places, {} errors)",
            start_time.elapsed().as_secs_f64(),
            places.len(),
            errors.len()
        );

        Ok(TravelResponse {
            message,
            location: Some(geocoded.name),
            intent: intent.to_string(),
            weather,
            places,
            errors,
            vibe_tip,
            map_url,
        })
    }
}

fn format_summary(
    location_name: &str,
    weather: Option<&WeatherReport>,
    places: &[PointOfInterest],
    errors: &BTreeMap<String, String>,
) -> String {
    let mut sections = vec![format!("Here's what I found for {location_name}:")];

    if let Some(weather) = weather {
        sections.push(format!(
            "- Weather: {:.0}°C with {}% chance of precipitation.",
            weather.temperature_c, weather.precip_prob_pct
        ));
    } else if errors.contains_key("weather") {
        sections.push("- Weather data unavailable right now.".to_string());
    }

    if !places.is_empty() {
        let names = places
            .iter()
            .take(SUMMARY_PLACES)
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        sections.push(format!("- Places: {names}."));
    } else if errors.contains_key("places") {
        sections.push("- Couldn't fetch attractions at the moment.".to_string());
    }

    sections.join(" ")
}
