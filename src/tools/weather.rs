//! Current conditions from the Open-Meteo forecast API

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::WeatherProvider;
use super::http::{self, HttpClient};
use crate::config::WeatherConfig;
use crate::error::ToolKind;
use crate::poi::GeoPoint;
use crate::{Result, TravelAiError};

const MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub precip_prob_pct: u32,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    time: Option<String>,
    precipitation_probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
}

pub struct OpenMeteoWeather {
    client: HttpClient,
    base_url: String,
}

impl OpenMeteoWeather {
    pub fn new(config: &WeatherConfig, user_agent: &str) -> Result<Self> {
        let client = http::build_client(
            user_agent,
            Duration::from_secs(config.timeout_seconds.into()),
            MAX_RETRIES,
        )?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    #[instrument(skip(self))]
    async fn current_weather(&self, point: GeoPoint) -> Result<WeatherReport> {
        info!(
            "Getting current weather for coordinates: {:.4}, {:.4}",
            point.latitude, point.longitude
        );
        let start_time = Instant::now();

        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,precipitation,precipitation_probability&hourly=precipitation_probability&timezone=UTC",
            self.base_url, point.latitude, point.longitude
        );
        let response: ForecastResponse = http::fetch_json(self.client.get(url))
            .await
            .map_err(|e| e.into_tool(ToolKind::Weather))?;
        let report = parse_forecast(response)?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved current weather in {:.3}s: {:.1}°C, {}% precipitation",
            total_duration.as_secs_f64(),
            report.temperature_c,
            report.precip_prob_pct
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow weather API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }
        Ok(report)
    }
}

fn parse_forecast(response: ForecastResponse) -> Result<WeatherReport> {
    let current = response.current.ok_or_else(|| {
        TravelAiError::tool(ToolKind::Weather, "Weather data unavailable: missing current block")
    })?;

    let (Some(temperature_c), Some(time)) = (current.temperature_2m, current.time) else {
        return Err(TravelAiError::tool(ToolKind::Weather, "Weather data incomplete"));
    };

    let precip = current.precipitation_probability.unwrap_or_else(|| {
        response
            .hourly
            .and_then(|hourly| hourly.precipitation_probability.into_iter().next().flatten())
            .unwrap_or(0.0)
    });

    Ok(WeatherReport {
        temperature_c,
        // truncating like an integer cast; probabilities are 0..=100
        precip_prob_pct: precip.clamp(0.0, 100.0) as u32,
        observed_at: parse_observed_at(&time)?,
    })
}

/// Open-Meteo reports `2024-06-01T12:00` in the requested (UTC) timezone
fn parse_observed_at(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            TravelAiError::tool(
                ToolKind::Weather,
                format!("unrecognised observation time '{raw}': {e}"),
            )
        })
}
