//! Environment Monitor: air quality, temperature, and weather alerts.

use tracing::{debug, warn};

use surgecast_contracts::{
    agent::{AgentDescriptor, AgentRole},
    config::{HazardType, HospitalConfig, Season},
    cycle::{Action, ActionKind, Perception, Reasoning},
    error::SurgeResult,
    execution::Scenario,
    message::Priority,
};
use surgecast_core::{memory::AgentMemory, traits::Cognition, Toolkit};

use super::{decode_data, out_of_order, to_data, RiskCategory, RiskSignal, RISK_SIGNAL_TOPIC};
use crate::forecasting::{
    environment::{aqi_risk, estimate_aqi, overall_severity, simulate, temperature_risk, EnvironmentSnapshot},
    season::resolve_season,
    Severity,
};

pub const LIVE_CONFIDENCE: f64 = 0.95;
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

// Used when a weather feed answered but left a field out.
const DEFAULT_TEMPERATURE_C: f64 = 25.0;
const DEFAULT_HUMIDITY_PCT: f64 = 60.0;

pub struct EnvironmentMonitor {
    descriptor: AgentDescriptor,
    toolkit: Toolkit,
    assessed: Option<Severity>,
}

impl EnvironmentMonitor {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "environment-monitor",
                "Environment Monitor",
                AgentRole::Perception,
                "Monitors environmental conditions (AQI, temperature, weather)",
                &["getEnvironmentalData", "calculateAQIRisk", "detectWeatherAlerts"],
            ),
            toolkit,
            assessed: None,
        }
    }

    /// Live readings if any feed answers, else the seasonal simulation.
    fn observe(&self, config: &HospitalConfig, season: Season) -> EnvironmentSnapshot {
        let env = self.toolkit.environment();
        let weather = env.weather(&config.location);
        let air = env.air_quality(&config.location);

        if weather.is_none() && air.is_none() {
            warn!(
                agent_id = %self.descriptor.id,
                city = %config.location.city,
                season = %season,
                "live environment feeds unavailable, using seasonal simulation"
            );
            return simulate(season, &config.location.city);
        }

        let aqi = air
            .map(|a| a.aqi)
            .or_else(|| weather.as_ref().and_then(|w| w.aqi))
            .unwrap_or_else(|| {
                let conditions = weather.as_ref().map_or("Unknown", |w| w.conditions.as_str());
                estimate_aqi(conditions, season)
            });

        let snapshot = EnvironmentSnapshot {
            location: config.location.city.clone(),
            season,
            aqi,
            temperature_c: weather.as_ref().map_or(DEFAULT_TEMPERATURE_C, |w| w.temperature_c),
            humidity_pct: weather.as_ref().map_or(DEFAULT_HUMIDITY_PCT, |w| w.humidity_pct),
            rainfall_mm: None,
            weather_alert: weather.and_then(|w| w.alert),
            live: true,
        };
        debug!(
            agent_id = %self.descriptor.id,
            aqi = snapshot.aqi,
            temperature_c = snapshot.temperature_c,
            humidity_pct = snapshot.humidity_pct,
            "live environment reading"
        );
        snapshot
    }
}

impl Cognition for EnvironmentMonitor {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn perceive(&mut self, scenario: &Scenario, _memory: &AgentMemory) -> SurgeResult<Perception> {
        let config = self.toolkit.hospital_config();
        let season = resolve_season(scenario.season, self.toolkit.now());
        let snapshot = self.observe(&config, season);

        let air = aqi_risk(snapshot.aqi);
        let heat = temperature_risk(snapshot.temperature_c);
        let severity = overall_severity(&air, &heat);

        // The worse of the two bands picks which hazard uplift applies.
        let load_multiplier = if air.severity >= Severity::High && air.severity >= heat.severity {
            config.hazard_uplift(HazardType::PollutionSpike)
        } else if heat.severity >= Severity::High && snapshot.temperature_c > DEFAULT_TEMPERATURE_C {
            config.hazard_uplift(HazardType::Heatwave)
        } else {
            1.0
        };
        let signal = RiskSignal {
            source: self.descriptor.id.clone(),
            category: RiskCategory::Environmental,
            severity,
            load_multiplier,
            summary: format!("AQI {:.0} ({}), {:.0}°C ({})", snapshot.aqi, air.level, snapshot.temperature_c, heat.level),
        };
        self.toolkit.broadcast_insight(
            &self.descriptor.id,
            RISK_SIGNAL_TOPIC,
            serde_json::to_value(&signal)?,
            if severity >= Severity::High { Priority::High } else { Priority::Medium },
        );

        Ok(Perception {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            confidence: if snapshot.live { LIVE_CONFIDENCE } else { FALLBACK_CONFIDENCE },
            data: to_data(&snapshot)?,
        })
    }

    fn reason(&mut self, perception: &Perception) -> SurgeResult<Reasoning> {
        let snapshot: EnvironmentSnapshot = decode_data(&perception.data)?;
        let air = aqi_risk(snapshot.aqi);
        let heat = temperature_risk(snapshot.temperature_c);
        let severity = overall_severity(&air, &heat);

        let mut conclusions = vec![
            format!("AQI: {:.0} ({}) - {}", snapshot.aqi, air.level, air.health_impact),
            format!("Temperature: {:.0}°C ({}) - {}", snapshot.temperature_c, heat.level, heat.health_impact),
            format!("Humidity: {:.0}%", snapshot.humidity_pct),
        ];
        if let Some(alert) = &snapshot.weather_alert {
            conclusions.push(format!("Weather Alert: {}", alert));
        }

        self.assessed = Some(severity);
        Ok(Reasoning {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            conclusions,
            confidence: 0.85,
            reasoning: format!(
                "Environmental monitoring shows {} air quality and {} temperature conditions. \
                 Overall environmental health risk: {}.",
                air.level, heat.level, severity
            ),
        })
    }

    fn act(&mut self, reasoning: &Reasoning) -> SurgeResult<Action> {
        let severity = self.assessed.take().ok_or_else(|| out_of_order("environment-monitor"))?;
        Ok(Action {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            kind: ActionKind::EnvironmentalAssessment,
            data: to_data(&serde_json::json!({
                "environmental_risks": reasoning.conclusions,
                "severity": severity,
            }))?,
            explanation: reasoning.reasoning.clone(),
        })
    }

    fn reset(&mut self) {
        self.assessed = None;
    }
}
