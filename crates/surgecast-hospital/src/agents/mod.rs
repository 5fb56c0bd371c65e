//! The hospital surge-planning agents.
//!
//! | Agent                | Role       | Action tag                 |
//! |----------------------|------------|----------------------------|
//! | `EnvironmentMonitor` | PERCEPTION | `ENVIRONMENTAL_ASSESSMENT` |
//! | `FestivalDetector`   | PERCEPTION | `FESTIVAL_FORECAST`        |
//! | `SeasonTracker`      | PERCEPTION | `SEASON_ASSESSMENT`        |
//! | `Forecaster`         | REASONING  | `RISK_FORECAST`            |
//! | `CapacityCalculator` | REASONING  | `CAPACITY_CALCULATION`     |
//! | `ResourcePlanner`    | ACTION     | `RESOURCE_DEPLOYMENT`      |
//!
//! Perception agents broadcast a `RiskSignal` on `RISK_SIGNAL_TOPIC` while
//! perceiving. The forecaster collects those signals and folds them into its
//! next perception.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use surgecast_contracts::{
    agent::AgentId,
    config::{HazardType, HospitalConfig, Season},
    cycle::DataMap,
    error::{SurgeError, SurgeResult},
    execution::Scenario,
};

use crate::{capacity::CapacityInputs, forecasting::season::resolve_season, forecasting::Severity};

pub mod capacity_calculator;
pub mod environment_monitor;
pub mod festival_detector;
pub mod forecaster;
pub mod resource_planner;
pub mod season_tracker;

pub use capacity_calculator::CapacityCalculator;
pub use environment_monitor::EnvironmentMonitor;
pub use festival_detector::FestivalDetector;
pub use forecaster::Forecaster;
pub use resource_planner::ResourcePlanner;
pub use season_tracker::SeasonTracker;

/// Bus topic perception agents publish their risk signals on.
pub const RISK_SIGNAL_TOPIC: &str = "risk-signal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Environmental,
    Festival,
    Seasonal,
}

/// A perception agent's summary of the risk it sees, shared over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSignal {
    pub source: AgentId,
    pub category: RiskCategory,
    pub severity: Severity,
    /// Multiplier this risk applies to baseline patient load.
    pub load_multiplier: f64,
    pub summary: String,
}

// ── Shared helpers ───────────────────────────────────────────────────────────

/// Read `field` out of a perception's data map.
pub(crate) fn decode_field<T: DeserializeOwned>(data: &DataMap, field: &str) -> SurgeResult<T> {
    let value = data.get(field).cloned().ok_or_else(|| SurgeError::MalformedPerception {
        reason: format!("missing field '{}'", field),
    })?;
    serde_json::from_value(value).map_err(|e| SurgeError::MalformedPerception {
        reason: format!("field '{}': {}", field, e),
    })
}

/// Read a whole perception data map as `T`.
pub(crate) fn decode_data<T: DeserializeOwned>(data: &DataMap) -> SurgeResult<T> {
    serde_json::from_value(Value::Object(data.clone())).map_err(|e| SurgeError::MalformedPerception {
        reason: e.to_string(),
    })
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> SurgeResult<DataMap> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Ok(surgecast_contracts::cycle::data_map(other)),
    }
}

/// `act` was called without a preceding successful `reason`.
pub(crate) fn out_of_order(agent: &str) -> SurgeError {
    SurgeError::InvalidOutput {
        reason: format!("{} acted without a reasoning result", agent),
    }
}

/// The load drivers a scenario resolves to at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadDrivers {
    pub season: Season,
    pub seasonal_uplift: f64,
    pub hazard: Option<HazardType>,
    /// Scenario multiplier times the hazard's uplift override, if any.
    pub risk_multiplier: f64,
}

impl LoadDrivers {
    pub fn resolve(config: &HospitalConfig, scenario: &Scenario, now: DateTime<Utc>) -> Self {
        let season = resolve_season(scenario.season, now);
        let hazard_uplift = scenario.hazard.map_or(1.0, |h| config.hazard_uplift(h));
        Self {
            season,
            seasonal_uplift: config.season_uplift(season),
            hazard: scenario.hazard,
            risk_multiplier: scenario.risk_multiplier * hazard_uplift,
        }
    }

    pub fn capacity_inputs(&self, config: &HospitalConfig) -> CapacityInputs {
        CapacityInputs::from_config(config, self.seasonal_uplift, self.risk_multiplier)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use surgecast_core::{traits::FixedClock, Toolkit};

    use crate::config::default_config;

    pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 6, 0, 0).unwrap()
    }

    pub fn toolkit_at(now: DateTime<Utc>) -> Toolkit {
        Toolkit::new(default_config()).with_clock(Arc::new(FixedClock(now)))
    }
}
