//! Integration tests for the TripSense pipeline and HTTP API

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tripsense::api::{self, AppState};
use tripsense::orchestrator::{CLARIFICATION_MESSAGE, UNKNOWN_PLACE_MESSAGE};
use tripsense::router::{LocationOracle, OracleGuess};
use tripsense::tools::{GeocodeResult, Geocoder, PlacesProvider, WeatherProvider, WeatherReport};
use tripsense::{
    GeoPoint, Intent, PointOfInterest, ToolKind, TravelAiError, TravelOrchestrator, TravelResponse,
};

type Result<T> = std::result::Result<T, TravelAiError>;

struct FakeGeocoder {
    known: bool,
    fail: bool,
    queries: std::sync::Mutex<Vec<String>>,
}

impl FakeGeocoder {
    fn known() -> Self {
        Self {
            known: true,
            fail: false,
            queries: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn unknown() -> Self {
        Self {
            known: false,
            ..Self::known()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::known()
        }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, location: &str) -> Result<Option<GeocodeResult>> {
        self.queries.lock().unwrap().push(location.to_string());
        if self.fail {
            return Err(TravelAiError::tool(ToolKind::Geocode, "HTTP 503"));
        }
        Ok(self.known.then(|| GeocodeResult {
            name: "Bengaluru".to_string(),
            latitude: 12.97,
            longitude: 77.59,
            country: Some("India".to_string()),
        }))
    }
}

#[derive(Default)]
struct FakeWeather {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current_weather(&self, _point: GeoPoint) -> Result<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TravelAiError::tool(ToolKind::Weather, "missing current block"));
        }
        Ok(WeatherReport {
            temperature_c: 24.0,
            precip_prob_pct: 20,
            observed_at: Utc::now(),
        })
    }
}

#[derive(Default)]
struct FakePlaces {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl PlacesProvider for FakePlaces {
    async fn nearby_places(&self, _point: GeoPoint) -> Result<Vec<PointOfInterest>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TravelAiError::tool(ToolKind::Places, "all instances failed"));
        }
        let sample = [
            ("Bannerghatta National Park", "park"),
            ("Lalbagh Botanical Garden", "park"),
            ("Cubbon Park", "park"),
            ("Bangalore Palace", "museum"),
            ("National Gallery of Modern Art", "museum"),
        ];
        Ok(sample
            .iter()
            .enumerate()
            .map(|(idx, (name, kind))| PointOfInterest {
                name: (*name).to_string(),
                kind: "tourism".to_string(),
                latitude: 12.9 + idx as f64 * 0.01,
                longitude: 77.5,
                tags: BTreeMap::from([
                    ("name".to_string(), (*name).to_string()),
                    ("tourism".to_string(), (*kind).to_string()),
                ]),
            })
            .collect())
    }
}

struct Harness {
    geocoder: Arc<FakeGeocoder>,
    weather: Arc<FakeWeather>,
    places: Arc<FakePlaces>,
}

impl Harness {
    fn new(geocoder: FakeGeocoder, weather: FakeWeather, places: FakePlaces) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            weather: Arc::new(weather),
            places: Arc::new(places),
        }
    }

    fn healthy() -> Self {
        Self::new(FakeGeocoder::known(), FakeWeather::default(), FakePlaces::default())
    }

    fn orchestrator(&self) -> TravelOrchestrator {
        TravelOrchestrator::new(
            self.geocoder.clone(),
            self.weather.clone(),
            self.places.clone(),
        )
    }

    fn weather_calls(&self) -> usize {
        self.weather.calls.load(Ordering::SeqCst)
    }

    fn places_calls(&self) -> usize {
        self.places.calls.load(Ordering::SeqCst)
    }
}

// --- orchestrator scenarios ---

#[tokio::test]
async fn test_places_only_scenario() {
    let harness = Harness::healthy();
    let response = harness
        .orchestrator()
        .run("I'm going to Bangalore, plan my trip.", None)
        .await
        .unwrap();

    assert_eq!(response.intent, "places");
    assert_eq!(harness.weather_calls(), 0);
    assert!(response.weather.is_none());
    assert_eq!(response.places.len(), 5);
    assert!(response.vibe_tip.is_some());
    assert!(response.map_url.is_some());
    assert_eq!(
        harness.geocoder.queries.lock().unwrap().as_slice(),
        ["Bangalore".to_string()]
    );
}

#[tokio::test]
async fn test_weather_only_scenario() {
    let harness = Harness::healthy();
    let response = harness
        .orchestrator()
        .run("What is the temperature in Bangalore?", None)
        .await
        .unwrap();

    assert_eq!(response.intent, "weather");
    assert!(response.weather.is_some());
    assert!(response.places.is_empty());
    assert_eq!(harness.places_calls(), 0);
    assert!(response.map_url.is_none());
    assert_eq!(
        response.message,
        "Here's what I found for Bengaluru: - Weather: 24°C with 20% chance of precipitation."
    );
}

#[tokio::test]
async fn test_combined_scenario() {
    let harness = Harness::healthy();
    let response = harness
        .orchestrator()
        .run("Weather and places for Bangalore?", None)
        .await
        .unwrap();

    assert_eq!(response.intent, "both");
    assert!(response.weather.is_some());
    assert_eq!(response.places.len(), 5);
    assert!(response.errors.is_empty());
    assert!(response.message.contains("- Places: Bannerghatta National Park, "));
}

#[tokio::test]
async fn test_forced_intent_overrides_detection() {
    let harness = Harness::healthy();
    let response = harness
        .orchestrator()
        .run("What is the temperature in Bangalore?", Some(Intent::Places))
        .await
        .unwrap();

    assert_eq!(response.intent, "places");
    assert_eq!(harness.weather_calls(), 0);
    assert_eq!(harness.places_calls(), 1);
}

#[tokio::test]
async fn test_unknown_place_scenario() {
    let harness = Harness::new(
        FakeGeocoder::unknown(),
        FakeWeather::default(),
        FakePlaces::default(),
    );
    let response = harness
        .orchestrator()
        .run("Going to Wakanda.", None)
        .await
        .unwrap();

    assert_eq!(response.message, UNKNOWN_PLACE_MESSAGE);
    assert_eq!(response.location.as_deref(), Some("Wakanda"));
    assert_eq!(response.errors.get("geocode").map(String::as_str), Some("not_found"));
    assert_eq!(harness.weather_calls() + harness.places_calls(), 0);
}

#[tokio::test]
async fn test_missing_location_asks_for_clarification() {
    let harness = Harness::healthy();
    let response = harness.orchestrator().run("Plan my trip", None).await.unwrap();

    assert_eq!(response.message, CLARIFICATION_MESSAGE);
    assert_eq!(response.intent, "unknown");
    assert_eq!(response.errors.get("location").map(String::as_str), Some("missing"));
    assert!(harness.geocoder.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_one_failing_tool_does_not_block_the_other() {
    let harness = Harness::new(
        FakeGeocoder::known(),
        FakeWeather {
            fail: true,
            ..FakeWeather::default()
        },
        FakePlaces::default(),
    );
    let response = harness
        .orchestrator()
        .run("Weather and places for Bangalore?", None)
        .await
        .unwrap();

    assert!(response.weather.is_none());
    assert_eq!(response.places.len(), 5);
    assert!(response.errors.contains_key("weather"));
    assert!(response.message.contains("- Weather data unavailable right now."));
    assert!(response.message.contains("- Places: "));
}

#[tokio::test]
async fn test_both_tools_failing() {
    let harness = Harness::new(
        FakeGeocoder::known(),
        FakeWeather {
            fail: true,
            ..FakeWeather::default()
        },
        FakePlaces {
            fail: true,
            ..FakePlaces::default()
        },
    );
    let response = harness
        .orchestrator()
        .run("Weather and places for Bangalore?", None)
        .await
        .unwrap();

    assert_eq!(response.errors.len(), 2);
    assert!(response.vibe_tip.is_none());
    assert!(response.map_url.is_none());
    assert!(response.message.ends_with("- Couldn't fetch attractions at the moment."));
}

#[tokio::test]
async fn test_geocoder_failure_propagates() {
    let harness = Harness::new(
        FakeGeocoder::failing(),
        FakeWeather::default(),
        FakePlaces::default(),
    );
    let err = harness
        .orchestrator()
        .run("Plan my trip to Goa", None)
        .await
        .unwrap_err();
    assert_eq!(err.tool_kind(), Some(ToolKind::Geocode));
}

struct TamilNaduOracle;

#[async_trait]
impl LocationOracle for TamilNaduOracle {
    async fn guess(&self, _prompt: &str) -> Result<OracleGuess> {
        Ok(OracleGuess {
            location: Some("Tamil Nadu".to_string()),
            intent: Some(Intent::Weather),
        })
    }
}

#[tokio::test]
async fn test_oracle_guess_drives_the_pipeline() {
    let harness = Harness::healthy();
    let orchestrator = harness.orchestrator().with_oracle(Arc::new(TamilNaduOracle));
    let response = orchestrator.run("plan a tamilnadu escape", None).await.unwrap();

    assert_eq!(response.intent, "weather");
    assert_eq!(
        harness.geocoder.queries.lock().unwrap().as_slice(),
        ["Tamil Nadu".to_string()]
    );
}

// --- HTTP API ---

fn app(harness: &Harness) -> axum::Router {
    api::router(AppState::new(Arc::new(harness.orchestrator())))
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = app(&Harness::healthy())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_root_endpoint_lists_travel_route() {
    let response = app(&Harness::healthy())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["travel_endpoint"], "/travel");
}

#[tokio::test]
async fn test_travel_endpoint_returns_response() {
    let (status, body) = post_json(
        app(&Harness::healthy()),
        "/travel",
        json!({"prompt": "Weather and places for Bangalore?"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response: TravelResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response.location.as_deref(), Some("Bengaluru"));
    assert_eq!(response.places.len(), 5);
}

#[tokio::test]
async fn test_travel_endpoint_accepts_forced_intent() {
    let harness = Harness::healthy();
    let (status, body) = post_json(
        app(&harness),
        "/travel",
        json!({"prompt": "Plan my trip to Bangalore", "intent": "weather"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "weather");
    assert_eq!(harness.places_calls(), 0);
}

#[tokio::test]
async fn test_travel_endpoint_rejects_bad_input() {
    let (status, body) = post_json(
        app(&Harness::healthy()),
        "/travel",
        json!({"prompt": "Plan my trip to Goa", "intent": "shopping"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Invalid intent"));

    let (status, _) = post_json(app(&Harness::healthy()), "/travel", json!({"prompt": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_travel_endpoint_maps_tool_failure_to_bad_gateway() {
    let harness = Harness::new(
        FakeGeocoder::failing(),
        FakeWeather::default(),
        FakePlaces::default(),
    );
    let (status, body) = post_json(
        app(&harness),
        "/travel",
        json!({"prompt": "Plan my trip to Goa"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("geocode"));
}
