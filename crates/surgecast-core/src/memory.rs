//! Per-agent memory.
//!
//! Working memory is short-lived: `Agent::reset()` wipes it between
//! scenarios. The knowledge base and episode history survive resets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use surgecast_contracts::{
    cycle::{Action, DataMap, Perception},
    message::{AgentMessage, Priority},
};

/// Maximum episodes kept per agent; older ones are dropped first.
pub const MAX_EPISODES: usize = 64;

/// Something an agent is currently trying to achieve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentGoal {
    pub id: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub constraints: Option<DataMap>,
}

/// Short-term memory for the current scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingMemory {
    pub current_perceptions: Vec<Perception>,
    pub active_goals: Vec<AgentGoal>,
    pub recent_actions: Vec<Action>,
    /// Messages an agent chose to keep from `Cognition::receive_message`.
    pub inbox: Vec<AgentMessage>,
}

/// Long-term memory. Not cleared by `reset()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub historical_patterns: Vec<Value>,
    pub learned_rules: Vec<Value>,
    pub past_decisions: Vec<Value>,
}

/// One completed run, kept for replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub timestamp: DateTime<Utc>,
    /// Name of the scenario the run planned for.
    pub scenario: String,
    pub actions: Vec<Action>,
    pub outcomes: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMemory {
    pub working: WorkingMemory,
    pub knowledge: KnowledgeBase,
    pub episodes: Vec<Episode>,
}

impl AgentMemory {
    /// Append an episode, evicting the oldest beyond `MAX_EPISODES`.
    pub fn record_episode(&mut self, episode: Episode) {
        self.episodes.push(episode);
        if self.episodes.len() > MAX_EPISODES {
            let excess = self.episodes.len() - MAX_EPISODES;
            self.episodes.drain(..excess);
        }
    }

    pub fn clear_working(&mut self) {
        self.working = WorkingMemory::default();
    }
}
