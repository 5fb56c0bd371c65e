//! Environmental conditions: the seasonal fallback simulator, AQI estimation
//! from weather text, and the AQI / temperature risk bands.

use serde::{Deserialize, Serialize};

use surgecast_contracts::config::Season;

use super::Severity;

/// Environmental conditions at a hospital, live or simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub location: String,
    pub season: Season,
    pub aqi: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_alert: Option<String>,
    /// `true` when at least one live feed contributed.
    pub live: bool,
}

/// Deterministic conditions typical of `season` in North India.
pub fn simulate(season: Season, city: &str) -> EnvironmentSnapshot {
    let (aqi, temperature_c, humidity_pct, rainfall_mm, alert) = match season {
        Season::Winter => (350.0, 15.0, 70.0, 5.0, "Air Quality: Very Poor. Health advisory in effect."),
        Season::Summer => (120.0, 40.0, 30.0, 0.0, "Heatwave warning. Extreme temperatures expected."),
        Season::Monsoon => (80.0, 28.0, 85.0, 150.0, "Heavy rainfall expected. Flood risk in low-lying areas."),
        Season::PostMonsoon => (
            200.0,
            25.0,
            75.0,
            20.0,
            "Air quality deteriorating. Vector-borne disease risk continues.",
        ),
    };

    EnvironmentSnapshot {
        location: city.to_string(),
        season,
        aqi,
        temperature_c,
        humidity_pct,
        rainfall_mm: Some(rainfall_mm),
        weather_alert: Some(alert.to_string()),
        live: false,
    }
}

/// Rough AQI from free-text weather conditions when no AQI feed answered.
///
/// Starts from a season base (WINTER 250, POST_MONSOON 150, otherwise 80),
/// scales it by the conditions, and clamps to `[50, 500]`.
pub fn estimate_aqi(conditions: &str, season: Season) -> f64 {
    let conditions = conditions.to_lowercase();
    let base: f64 = match season {
        Season::Winter => 250.0,
        Season::PostMonsoon => 150.0,
        Season::Summer | Season::Monsoon => 80.0,
    };

    let factor = if conditions.contains("clear") || conditions.contains("sunny") {
        0.8
    } else if conditions.contains("rain") || conditions.contains("storm") {
        // rain washes particulates out
        0.5
    } else if conditions.contains("fog") || conditions.contains("haze") {
        1.5
    } else {
        1.0
    };

    (base * factor).clamp(50.0, 500.0).round()
}

/// A banded reading of one environmental measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskBand {
    pub level: &'static str,
    pub severity: Severity,
    pub health_impact: &'static str,
}

pub fn aqi_risk(aqi: f64) -> RiskBand {
    let (level, severity, health_impact) = if aqi <= 50.0 {
        ("Good", Severity::Low, "Minimal health impact")
    } else if aqi <= 100.0 {
        ("Moderate", Severity::Low, "Acceptable air quality")
    } else if aqi <= 200.0 {
        ("Poor", Severity::Medium, "Respiratory issues for sensitive groups")
    } else if aqi <= 300.0 {
        ("Very Poor", Severity::High, "Respiratory issues for general population")
    } else {
        ("Severe", Severity::Critical, "Serious health impacts for all")
    };
    RiskBand { level, severity, health_impact }
}

pub fn temperature_risk(temperature_c: f64) -> RiskBand {
    let (level, severity, health_impact) = if temperature_c >= 40.0 {
        ("Extreme Heat", Severity::Critical, "Heatstroke risk, dehydration")
    } else if temperature_c >= 35.0 {
        ("Very Hot", Severity::High, "Heat exhaustion risk")
    } else if temperature_c <= 5.0 {
        ("Extreme Cold", Severity::High, "Hypothermia risk")
    } else if temperature_c <= 10.0 {
        ("Very Cold", Severity::Medium, "Cold-related illnesses")
    } else {
        ("Normal", Severity::Low, "Minimal temperature-related health impact")
    };
    RiskBand { level, severity, health_impact }
}

/// Combined environmental severity. Never lower than MEDIUM.
pub fn overall_severity(air: &RiskBand, temperature: &RiskBand) -> Severity {
    air.severity.max(temperature.severity).max(Severity::Medium)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulator_is_deterministic_per_season() {
        let winter = simulate(Season::Winter, "Delhi");
        assert_eq!(winter.aqi, 350.0);
        assert_eq!(winter.temperature_c, 15.0);
        assert!(!winter.live);
        assert_eq!(winter, simulate(Season::Winter, "Delhi"));

        let monsoon = simulate(Season::Monsoon, "Mumbai");
        assert_eq!(monsoon.rainfall_mm, Some(150.0));
        assert_eq!(monsoon.location, "Mumbai");
    }

    #[test]
    fn aqi_estimate_scales_and_clamps() {
        assert_eq!(estimate_aqi("Clear sky", Season::Winter), 200.0);
        assert_eq!(estimate_aqi("Light Rain", Season::Winter), 125.0);
        assert_eq!(estimate_aqi("Haze", Season::PostMonsoon), 225.0);
        assert_eq!(estimate_aqi("Thunderstorm", Season::Monsoon), 50.0, "80 × 0.5 clamps up to 50");
        assert_eq!(estimate_aqi("Overcast", Season::Summer), 80.0);
    }

    #[test]
    fn aqi_band_edges() {
        assert_eq!(aqi_risk(50.0).level, "Good");
        assert_eq!(aqi_risk(100.0).level, "Moderate");
        assert_eq!(aqi_risk(200.0).severity, Severity::Medium);
        assert_eq!(aqi_risk(300.0).severity, Severity::High);
        assert_eq!(aqi_risk(300.5).severity, Severity::Critical);
    }

    #[test]
    fn temperature_band_edges() {
        assert_eq!(temperature_risk(40.0).severity, Severity::Critical);
        assert_eq!(temperature_risk(35.0).level, "Very Hot");
        assert_eq!(temperature_risk(5.0).level, "Extreme Cold");
        assert_eq!(temperature_risk(10.0).severity, Severity::Medium);
        assert_eq!(temperature_risk(25.0).severity, Severity::Low);
    }

    #[test]
    fn overall_severity_takes_worst_with_medium_floor() {
        assert_eq!(overall_severity(&aqi_risk(350.0), &temperature_risk(25.0)), Severity::Critical);
        assert_eq!(overall_severity(&aqi_risk(80.0), &temperature_risk(36.0)), Severity::High);
        assert_eq!(overall_severity(&aqi_risk(40.0), &temperature_risk(25.0)), Severity::Medium);
    }
}
