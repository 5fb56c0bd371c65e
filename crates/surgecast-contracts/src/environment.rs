//! Live environmental readings returned by external data providers.
//!
//! Providers return `Option<…>`: `None` means "unavailable", and the
//! perceiving agent substitutes a seasonal fallback instead of failing.

use serde::{Deserialize, Serialize};

/// Current weather at a hospital's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    /// Free-text conditions such as "Clear", "Light rain", "Haze".
    pub conditions: String,
    /// Some weather feeds carry an AQI value alongside the forecast.
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub alert: Option<String>,
}

/// Current air quality at a hospital's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub aqi: f64,
}
