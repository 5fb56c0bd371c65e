//! Records produced by one perceive → reason → act cycle.
//!
//! Each agent run yields exactly one `Perception`, one `Reasoning`, and one
//! `Action`, plus one `ReasoningTrace` per completed phase. All of them are
//! immutable once produced; consumers only ever read them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::AgentId;

/// An open key-value map carried by perceptions and actions.
pub type DataMap = Map<String, Value>;

/// Turn any JSON value into a `DataMap`.
///
/// Objects are taken as-is. Any other value is wrapped under a single
/// `"value"` key so callers never lose data.
pub fn data_map(value: Value) -> DataMap {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Raw or sensed input an agent will reason over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    pub agent_id: AgentId,
    pub timestamp: DateTime<Utc>,
    pub data: DataMap,
    /// How much the agent trusts `data`, in `[0, 1]`.
    pub confidence: f64,
}

/// Human-readable conclusions derived from a `Perception`.
///
/// Conclusions are not parsed by anything downstream. Structured results
/// travel in the `Action`'s `data` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub agent_id: AgentId,
    pub timestamp: DateTime<Utc>,
    pub conclusions: Vec<String>,
    pub confidence: f64,
    /// Free-text summary; the source of the action's explanation.
    pub reasoning: String,
}

/// The tag an orchestrator consumer dispatches on.
///
/// Serialized as the SCREAMING_SNAKE_CASE strings UI consumers match on.
/// Renaming a variant is a breaking interface change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    EnvironmentalAssessment,
    FestivalForecast,
    SeasonAssessment,
    RiskForecast,
    CapacityCalculation,
    ResourceDeployment,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::EnvironmentalAssessment => "ENVIRONMENTAL_ASSESSMENT",
            ActionKind::FestivalForecast => "FESTIVAL_FORECAST",
            ActionKind::SeasonAssessment => "SEASON_ASSESSMENT",
            ActionKind::RiskForecast => "RISK_FORECAST",
            ActionKind::CapacityCalculation => "CAPACITY_CALCULATION",
            ActionKind::ResourceDeployment => "RESOURCE_DEPLOYMENT",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured output of an agent; the only artifact consumed outside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub agent_id: AgentId,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub data: DataMap,
    pub explanation: String,
}

/// Which phase of the cycle a trace entry was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceStep {
    Perceive,
    Reason,
    Act,
}

/// One append-only entry in an agent's thought log.
///
/// Used for observability and replay; never for control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningTrace {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    pub thought: String,
    pub step: TraceStep,
}
