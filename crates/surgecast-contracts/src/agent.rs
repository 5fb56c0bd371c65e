//! Agent identity, role, and lifecycle status types.
//!
//! These types describe *who* an agent is and *where* it sits in the
//! pipeline. They say nothing about how an agent perceives or reasons;
//! that lives behind the `Cognition` trait in surgecast-core.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, human-readable identifier for an agent.
///
/// Used as the registry key in the orchestrator, the subscription key on the
/// message bus, and the prefix of every recommendation id.
/// Example: AgentId("capacity-calculator")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The pipeline phase an agent belongs to.
///
/// Fixed at registration time. The orchestrator runs every PERCEPTION agent
/// before any REASONING agent, and every REASONING agent before any ACTION
/// agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentRole {
    Perception,
    Reasoning,
    Action,
}

impl AgentRole {
    /// All roles in execution order.
    pub const ORDERED: [AgentRole; 3] = [AgentRole::Perception, AgentRole::Reasoning, AgentRole::Action];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Perception => "PERCEPTION",
            AgentRole::Reasoning => "REASONING",
            AgentRole::Action => "ACTION",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an agent is doing right now.
///
/// `Idle` outside of `Agent::run()`, whether the last run succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    #[default]
    Idle,
    Perceiving,
    Reasoning,
    Acting,
}

/// Static description of an agent, declared by its implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    /// Display name used in reasoning traces.
    pub name: String,
    pub role: AgentRole,
    pub description: String,
    /// Names of the toolkit capabilities this agent draws on. Informational only.
    pub tools: Vec<String>,
}

impl AgentDescriptor {
    pub fn new(id: &str, name: &str, role: AgentRole, description: &str, tools: &[&str]) -> Self {
        Self {
            id: AgentId::new(id),
            name: name.to_string(),
            role,
            description: description.to_string(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }
}
