//! Configuration management for `TripSense`
//!
//! Handles loading configuration from a TOML file and environment variables,
//! and provides validation for all configuration settings.

use crate::TravelAiError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `TripSense`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripSenseConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Geocoding provider settings
    pub geocoding: GeocodingConfig,
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Points-of-interest (Overpass) settings
    pub places: PlacesConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Optional LLM extraction settings
    pub llm: LlmConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Primary geocoder (Nominatim search endpoint)
    pub nominatim_url: String,
    /// First fallback when Nominatim refuses us (403/429)
    pub photon_url: String,
    /// Last-resort geocoder, Nominatim-compatible
    pub maps_co_url: String,
    /// User-Agent header, required by the Nominatim usage policy
    pub user_agent: String,
    /// Contact email sent along with Nominatim requests
    pub contact_email: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Minimum gap between two Nominatim requests in milliseconds
    pub min_interval_ms: u64,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL for the OpenMeteo API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Points-of-interest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    /// Overpass interpreter endpoints, tried in order
    pub overpass_instances: Vec<String>,
    /// Search radius in meters
    pub radius_m: u32,
    /// Maximum number of places to return
    pub limit: usize,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries per instance for transient failures
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether geocoding results are cached on disk
    pub enabled: bool,
    /// Cache directory location
    pub location: String,
    /// Cache TTL in hours
    pub ttl_hours: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Optional LLM extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini API key; the LLM path is disabled without one
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u32,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_photon_url() -> String {
    "https://photon.komoot.io/api".to_string()
}

fn default_maps_co_url() -> String {
    "https://geocode.maps.co/search".to_string()
}

fn default_user_agent() -> String {
    format!("TripSense/{} (travel assistant)", crate::VERSION)
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_overpass_instances() -> Vec<String> {
    vec![
        "https://overpass-api.de/api/interpreter".to_string(),
        "https://overpass.kumi.systems/api/interpreter".to_string(),
        "https://overpass.openstreetmap.ru/api/interpreter".to_string(),
    ]
}

fn default_radius_m() -> u32 {
    15_000
}

fn default_places_limit() -> usize {
    crate::poi::DEFAULT_LIMIT
}

fn default_places_timeout() -> u32 {
    25
}

fn default_places_max_retries() -> u32 {
    3
}

fn default_cache_location() -> String {
    ".cache/tripsense".to_string()
}

fn default_cache_ttl() -> u32 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_llm_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_llm_timeout() -> u32 {
    15
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            photon_url: default_photon_url(),
            maps_co_url: default_maps_co_url(),
            user_agent: default_user_agent(),
            contact_email: None,
            timeout_seconds: default_geocoding_timeout(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            overpass_instances: default_overpass_instances(),
            radius_m: default_radius_m(),
            limit: default_places_limit(),
            timeout_seconds: default_places_timeout(),
            max_retries: default_places_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            location: default_cache_location(),
            ttl_hours: default_cache_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// The LLM path is only consulted when a non-empty key is configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl TripSenseConfig {
    /// Load configuration from `config.toml` (when present) and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPSENSE_LOGGING__LEVEL=debug style overrides
        builder = builder.add_source(
            Environment::with_prefix("TRIPSENSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripSenseConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_aliases();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Honour the provider variables people already have exported
    fn apply_env_aliases(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if self.llm.api_key.is_none() && !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(agent) = std::env::var("NOMINATIM_USER_AGENT") {
            if !agent.trim().is_empty() {
                self.geocoding.user_agent = agent;
            }
        }
        if let Ok(email) = std::env::var("NOMINATIM_EMAIL") {
            if !email.trim().is_empty() {
                self.geocoding.contact_email = Some(email);
            }
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.geocoding.nominatim_url.is_empty() {
            self.geocoding.nominatim_url = default_nominatim_url();
        }
        if self.geocoding.photon_url.is_empty() {
            self.geocoding.photon_url = default_photon_url();
        }
        if self.geocoding.maps_co_url.is_empty() {
            self.geocoding.maps_co_url = default_maps_co_url();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_user_agent();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.places.overpass_instances.is_empty() {
            self.places.overpass_instances = default_overpass_instances();
        }
        if self.places.radius_m == 0 {
            self.places.radius_m = default_radius_m();
        }
        if self.places.limit == 0 {
            self.places.limit = default_places_limit();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_places_timeout();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_urls()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("Geocoding", self.geocoding.timeout_seconds),
            ("Weather", self.weather.timeout_seconds),
            ("Places", self.places.timeout_seconds),
            ("LLM", self.llm.timeout_seconds),
        ];
        for (name, seconds) in timeouts {
            if seconds > 300 {
                return Err(TravelAiError::config(format!(
                    "{name} timeout cannot exceed 300 seconds"
                ))
                .into());
            }
        }

        if self.places.max_retries > 10 {
            return Err(TravelAiError::config("Places max retries cannot exceed 10").into());
        }

        if !(1..=50).contains(&self.places.limit) {
            return Err(TravelAiError::config("Places limit must be between 1 and 50").into());
        }

        if self.places.radius_m > 100_000 {
            return Err(TravelAiError::config("Search radius cannot exceed 100 km").into());
        }

        if self.cache.ttl_hours > 168 {
            return Err(
                TravelAiError::config("Cache TTL cannot exceed 168 hours (1 week)").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelAiError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelAiError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        let urls = [
            ("Nominatim", &self.geocoding.nominatim_url),
            ("Photon", &self.geocoding.photon_url),
            ("maps.co", &self.geocoding.maps_co_url),
            ("Weather API", &self.weather.base_url),
            ("LLM", &self.llm.base_url),
        ];
        let overpass = self
            .places
            .overpass_instances
            .iter()
            .map(|url| ("Overpass", url));

        for (name, url) in urls.into_iter().chain(overpass) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelAiError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
