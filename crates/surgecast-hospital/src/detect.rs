//! Scenario auto-detection from live readings and the festival calendar.
//!
//! Rules are checked in order and the first match wins:
//!
//!   1. AQI above 200: pollution spike, CRITICAL above 300
//!   2. A festival within 3 days: festival surge, HIGH at a 3x multiplier
//!   3. Monsoon or post-monsoon with humidity above 80%: vector-borne epidemic
//!
//! Without live feeds only the festival rule can fire.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use surgecast_contracts::{
    config::{HazardType, Season},
    execution::Scenario,
};
use surgecast_core::Toolkit;

use crate::forecasting::{
    environment::aqi_risk,
    festival::upcoming_festivals,
    season::season_for,
    Severity,
};

pub const POLLUTION_AQI_THRESHOLD: f64 = 200.0;
pub const CRITICAL_AQI_THRESHOLD: f64 = 300.0;
pub const FESTIVAL_LEAD_DAYS: i64 = 3;
pub const FESTIVAL_HIGH_MULTIPLIER: f64 = 3.0;
pub const EPIDEMIC_HUMIDITY_PCT: f64 = 80.0;

pub const POLLUTION_CONFIDENCE: f64 = 0.95;
pub const FESTIVAL_CONFIDENCE: f64 = 0.9;
pub const EPIDEMIC_CONFIDENCE: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectedKind {
    PollutionSpike,
    Festival,
    Epidemic,
}

/// A scenario inferred from current conditions, ready to hand to the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedScenario {
    #[serde(rename = "type")]
    pub kind: DetectedKind,
    pub name: String,
    pub severity: Severity,
    pub description: String,
    pub affected_departments: Vec<String>,
    pub confidence: f64,
    /// Observations that fired the rule.
    pub triggers: Vec<String>,
    pub data_sources: Vec<String>,
    pub scenario: Scenario,
}

impl DetectedScenario {
    /// One-paragraph summary for operators.
    pub fn summary(&self) -> String {
        format!(
            "Auto-detected: {} ({:.0}% confidence)\nTriggers: {}\nData sources: {}",
            self.name,
            self.confidence * 100.0,
            self.triggers.join(", "),
            self.data_sources.join(", ")
        )
    }
}

fn departments(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Inspect the toolkit's live feeds, clock, and festival calendar.
///
/// Returns `None` when no rule fires. Feed failures are not errors; a
/// missing reading simply cannot trigger its rule.
pub fn detect_scenario(toolkit: &Toolkit) -> Option<DetectedScenario> {
    let config = toolkit.hospital_config();
    let city = config.location.city.as_str();
    let now = toolkit.now();

    let weather = toolkit.environment().weather(&config.location);
    let aqi = toolkit
        .environment()
        .air_quality(&config.location)
        .map(|reading| reading.aqi)
        .or_else(|| weather.as_ref().and_then(|w| w.aqi));

    if let Some(aqi) = aqi.filter(|aqi| *aqi > POLLUTION_AQI_THRESHOLD) {
        let band = aqi_risk(aqi);
        let detected = DetectedScenario {
            kind: DetectedKind::PollutionSpike,
            name: "Air Quality Alert".to_string(),
            severity: if aqi > CRITICAL_AQI_THRESHOLD { Severity::Critical } else { Severity::High },
            description: format!(
                "Live AQI reading of {} detected in {}. {}. Expect surge in respiratory cases.",
                aqi, city, band.health_impact
            ),
            affected_departments: departments(&["Emergency", "Pulmonology", "Pediatrics"]),
            confidence: POLLUTION_CONFIDENCE,
            triggers: vec![format!("Critical AQI: {} ({})", aqi, band.level)],
            data_sources: vec!["Air quality feed".to_string()],
            scenario: Scenario::new("auto-pollution").with_hazard(HazardType::PollutionSpike),
        };
        info!(kind = ?detected.kind, aqi, "scenario detected");
        return Some(detected);
    }

    if let Some(upcoming) = upcoming_festivals(now, FESTIVAL_LEAD_DAYS).into_iter().next() {
        let festival = &upcoming.festival;
        let detected = DetectedScenario {
            kind: DetectedKind::Festival,
            name: format!("{} Preparation", festival.name),
            severity: if festival.surge_multiplier >= FESTIVAL_HIGH_MULTIPLIER {
                Severity::High
            } else {
                Severity::Medium
            },
            description: format!(
                "{} is {} days away. Historical data shows {:.0}% surge in festival-related cases.",
                festival.name,
                upcoming.days_until,
                (festival.surge_multiplier - 1.0) * 100.0
            ),
            affected_departments: departments(&["Emergency", "Trauma", "Burns"]),
            confidence: FESTIVAL_CONFIDENCE,
            triggers: vec![format!("{} in {} days", festival.name, upcoming.days_until)],
            data_sources: vec!["Festival calendar".to_string()],
            scenario: Scenario::new("auto-festival"),
        };
        info!(kind = ?detected.kind, festival = %festival.name, days_until = upcoming.days_until, "scenario detected");
        return Some(detected);
    }

    let season = season_for(now);
    if matches!(season, Season::Monsoon | Season::PostMonsoon) {
        if let Some(humidity) = weather
            .as_ref()
            .map(|w| w.humidity_pct)
            .filter(|h| *h > EPIDEMIC_HUMIDITY_PCT)
        {
            let detected = DetectedScenario {
                kind: DetectedKind::Epidemic,
                name: "Vector-Borne Disease Alert".to_string(),
                severity: Severity::High,
                description: format!(
                    "{} season with high humidity ({}%) creates ideal conditions for mosquito breeding. \
                     Expect increase in dengue and malaria cases.",
                    season, humidity
                ),
                affected_departments: departments(&["Emergency", "Internal Medicine", "Pediatrics"]),
                confidence: EPIDEMIC_CONFIDENCE,
                triggers: vec![format!("{} season with {}% humidity", season, humidity)],
                data_sources: vec!["Weather feed".to_string()],
                scenario: Scenario::new("auto-epidemic")
                    .with_season(season)
                    .with_hazard(HazardType::DengueOutbreak),
            };
            info!(kind = ?detected.kind, humidity, "scenario detected");
            return Some(detected);
        }
    }

    debug!(hospital_id = %config.hospital_id, "no scenario detected");
    None
}

#[cfg(test)]
mod tests {
    use surgecast_contracts::environment::WeatherReading;

    use super::*;
    use crate::agents::test_support::{at, toolkit_at};
    use crate::providers::StaticEnvironment;

    fn weather(humidity_pct: f64) -> WeatherReading {
        WeatherReading {
            temperature_c: 29.0,
            humidity_pct,
            conditions: "Light rain".to_string(),
            aqi: None,
            alert: None,
        }
    }

    fn detect(now: (i32, u32, u32), environment: StaticEnvironment) -> Option<DetectedScenario> {
        let toolkit = toolkit_at(at(now.0, now.1, now.2)).with_environment(std::sync::Arc::new(environment));
        detect_scenario(&toolkit)
    }

    #[test]
    fn each_rule_fires_on_its_own_trigger() {
        // (date, environment, kind, severity, confidence)
        let cases = [
            ((2025, 1, 20), StaticEnvironment::new().with_aqi(250.0), DetectedKind::PollutionSpike, Severity::High, 0.95),
            ((2025, 1, 20), StaticEnvironment::new().with_aqi(420.0), DetectedKind::PollutionSpike, Severity::Critical, 0.95),
            ((2025, 10, 18), StaticEnvironment::new(), DetectedKind::Festival, Severity::High, 0.9),
            ((2025, 3, 12), StaticEnvironment::new(), DetectedKind::Festival, Severity::Medium, 0.9),
            ((2025, 7, 10), StaticEnvironment::new().with_weather(weather(88.0)), DetectedKind::Epidemic, Severity::High, 0.75),
            ((2025, 11, 20), StaticEnvironment::new().with_weather(weather(85.0)), DetectedKind::Epidemic, Severity::High, 0.75),
        ];

        for (date, environment, kind, severity, confidence) in cases {
            let detected = detect(date, environment).unwrap_or_else(|| panic!("nothing detected on {:?}", date));
            assert_eq!(detected.kind, kind, "{:?}", date);
            assert_eq!(detected.severity, severity, "{:?}", date);
            assert_eq!(detected.confidence, confidence, "{:?}", date);
            assert_eq!(detected.triggers.len(), 1);
        }
    }

    #[test]
    fn quiet_conditions_detect_nothing() {
        let cases = [
            // Winter, clean air, no festival within 3 days.
            ((2025, 1, 20), StaticEnvironment::new().with_aqi(200.0)),
            // Monsoon humidity exactly at the threshold.
            ((2025, 7, 10), StaticEnvironment::new().with_weather(weather(80.0))),
            // Humid but in summer.
            ((2025, 5, 10), StaticEnvironment::new().with_weather(weather(95.0))),
            // No feeds at all, no festival.
            ((2025, 7, 10), StaticEnvironment::new()),
        ];
        for (date, environment) in cases {
            assert_eq!(detect(date, environment), None, "{:?}", date);
        }
    }

    #[test]
    fn pollution_outranks_a_festival_and_sets_the_hazard() {
        // Diwali 2025 is two days out, but the air is worse.
        let detected = detect((2025, 10, 18), StaticEnvironment::new().with_aqi(310.0)).unwrap();

        assert_eq!(detected.kind, DetectedKind::PollutionSpike);
        assert_eq!(detected.scenario.hazard, Some(HazardType::PollutionSpike));
        assert!(detected.triggers[0].contains("Severe"));
    }

    #[test]
    fn weather_feed_aqi_is_used_without_an_air_quality_feed() {
        let mut reading = weather(40.0);
        reading.aqi = Some(260.0);

        let detected = detect((2025, 1, 20), StaticEnvironment::new().with_weather(reading)).unwrap();
        assert_eq!(detected.kind, DetectedKind::PollutionSpike);
    }

    #[test]
    fn epidemic_scenario_forces_season_and_dengue_hazard() {
        let detected = detect((2025, 7, 10), StaticEnvironment::new().with_weather(weather(88.0))).unwrap();

        assert_eq!(detected.scenario.season, Some(Season::Monsoon));
        assert_eq!(detected.scenario.hazard, Some(HazardType::DengueOutbreak));
        assert!(detected.summary().starts_with("Auto-detected: Vector-Borne Disease Alert (75% confidence)"));
    }
}
