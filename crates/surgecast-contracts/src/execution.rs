//! Pipeline inputs and outputs.
//!
//! `Scenario` is what the caller hands to `Orchestrator::execute_agents()`.
//! `CycleOutcome` is what a single agent run returns to the orchestrator.
//! `AgentOutputs` is the aggregate handed back to the consuming UI layer.

use serde::{Deserialize, Serialize};

use crate::{
    agent::AgentId,
    config::{HazardType, Season},
    cycle::{Action, DataMap, Perception, Reasoning, ReasoningTrace},
};

/// Risk multiplier applied when a scenario does not name one.
pub const DEFAULT_RISK_MULTIPLIER: f64 = 1.5;

/// The situation a pipeline run plans for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Label recorded in agent episodes and logs.
    pub name: String,
    /// Multiplier on predicted admissions; `>= 0`.
    pub risk_multiplier: f64,
    /// Forces a season instead of deriving it from the toolkit clock.
    #[serde(default)]
    pub season: Option<Season>,
    /// Hazard driving the scenario, if any.
    #[serde(default)]
    pub hazard: Option<HazardType>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            risk_multiplier: DEFAULT_RISK_MULTIPLIER,
            season: None,
            hazard: None,
        }
    }

    pub fn with_risk_multiplier(mut self, risk_multiplier: f64) -> Self {
        self.risk_multiplier = risk_multiplier;
        self
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_hazard(mut self, hazard: HazardType) -> Self {
        self.hazard = Some(hazard);
        self
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new("baseline")
    }
}

/// Everything one successful `Agent::run()` produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub perception: Perception,
    pub reasoning: Reasoning,
    pub action: Action,
    /// The trace entries appended during this run only, in phase order.
    pub traces: Vec<ReasoningTrace>,
}

/// A UI-facing record synthesized from one `Action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// `<agent_id>-<timestamp in epoch milliseconds>`.
    pub id: String,
    /// The action's type tag.
    pub title: String,
    /// The action's explanation.
    pub description: String,
    pub data: DataMap,
}

impl Recommendation {
    pub fn from_action(action: &Action) -> Self {
        Self {
            id: recommendation_id(&action.agent_id, action.timestamp.timestamp_millis()),
            title: action.kind.as_str().to_string(),
            description: action.explanation.clone(),
            data: action.data.clone(),
        }
    }
}

fn recommendation_id(agent_id: &AgentId, millis: i64) -> String {
    format!("{}-{}", agent_id, millis)
}

/// The full aggregate returned by a pipeline run.
///
/// Either complete or absent: a failing run yields an error, never a
/// partially-filled `AgentOutputs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOutputs {
    pub perceptions: Vec<Perception>,
    pub reasonings: Vec<Reasoning>,
    pub actions: Vec<Action>,
    pub reasoning_traces: Vec<ReasoningTrace>,
    pub recommendations: Vec<Recommendation>,
}

impl AgentOutputs {
    /// Fold one agent's cycle into the aggregate.
    pub fn absorb(&mut self, outcome: CycleOutcome) {
        self.perceptions.push(outcome.perception);
        self.reasonings.push(outcome.reasoning);
        self.actions.push(outcome.action);
        self.reasoning_traces.extend(outcome.traces);
    }

    /// Rebuild `recommendations` from the collected actions, in order.
    pub fn build_recommendations(&mut self) {
        self.recommendations = self.actions.iter().map(Recommendation::from_action).collect();
    }
}
