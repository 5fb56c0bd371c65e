//! Environmental data providers that need no network.
//!
//! HTTP clients for live feeds are supplied by the hosting application. This
//! module carries a provider that serves readings given up front, for
//! operator-entered observations and for tests.

use surgecast_contracts::{
    config::Location,
    environment::{AirQualityReading, WeatherReading},
};
use surgecast_core::traits::EnvironmentalDataProvider;

/// Serves the same readings for every location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticEnvironment {
    weather: Option<WeatherReading>,
    air_quality: Option<AirQualityReading>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weather(mut self, weather: WeatherReading) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_aqi(mut self, aqi: f64) -> Self {
        self.air_quality = Some(AirQualityReading { aqi });
        self
    }

    /// `true` if neither reading was supplied.
    pub fn is_empty(&self) -> bool {
        self.weather.is_none() && self.air_quality.is_none()
    }
}

impl EnvironmentalDataProvider for StaticEnvironment {
    fn weather(&self, _location: &Location) -> Option<WeatherReading> {
        self.weather.clone()
    }

    fn air_quality(&self, _location: &Location) -> Option<AirQualityReading> {
        self.air_quality.clone()
    }
}
