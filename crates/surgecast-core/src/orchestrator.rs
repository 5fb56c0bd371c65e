//! The orchestrator: agent registry, role partitions, and phase runner.
//!
//! `execute_agents()` runs every registered agent once, phase by phase:
//!
//!   PERCEPTION → REASONING → ACTION
//!
//! Inside a phase agents run in registration order, one at a time. The first
//! failure aborts the whole run; nothing is retried.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use surgecast_contracts::{
    agent::{AgentId, AgentRole, AgentStatus},
    error::{SurgeError, SurgeResult},
    execution::{AgentOutputs, Scenario},
    message::BROADCAST_RECIPIENT,
};

use crate::{
    agent::Agent,
    bus::SharedAgent,
    toolkit::Toolkit,
    traits::Cognition,
};

pub struct Orchestrator {
    toolkit: Toolkit,
    agents: BTreeMap<AgentId, SharedAgent>,
    /// Registration order per role.
    partitions: BTreeMap<AgentRole, Vec<AgentId>>,
}

impl Orchestrator {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            toolkit,
            agents: BTreeMap::new(),
            partitions: AgentRole::ORDERED.iter().map(|role| (*role, Vec::new())).collect(),
        }
    }

    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    /// Register an agent under its declared role and subscribe it to the bus.
    ///
    /// # Errors
    ///
    /// `SurgeError::DuplicateAgent` if an agent with the same id exists, and
    /// `SurgeError::ReservedAgentId` for the broadcast address `"ALL"`.
    pub fn register_agent(&mut self, cognition: impl Cognition + 'static) -> SurgeResult<SharedAgent> {
        self.register_boxed(Box::new(cognition))
    }

    pub fn register_boxed(&mut self, cognition: Box<dyn Cognition>) -> SurgeResult<SharedAgent> {
        let agent = Agent::from_boxed(cognition).with_clock(self.toolkit.clock());
        let id = agent.id().clone();
        let role = agent.role();

        if id.as_str() == BROADCAST_RECIPIENT {
            return Err(SurgeError::ReservedAgentId { agent_id: id.to_string() });
        }
        if self.agents.contains_key(&id) {
            return Err(SurgeError::DuplicateAgent { agent_id: id.to_string() });
        }

        let shared: SharedAgent = Arc::new(Mutex::new(agent));
        self.agents.insert(id.clone(), Arc::clone(&shared));
        self.partitions.entry(role).or_default().push(id.clone());
        self.toolkit.bus().subscribe(id.clone(), Arc::clone(&shared));

        info!(agent_id = %id, role = %role, "agent registered");
        Ok(shared)
    }

    /// Remove an agent from the registry, its partition, and the bus.
    ///
    /// # Errors
    ///
    /// `SurgeError::UnknownAgent` if no agent has this id.
    pub fn unregister_agent(&mut self, agent_id: &AgentId) -> SurgeResult<()> {
        if self.agents.remove(agent_id).is_none() {
            return Err(SurgeError::UnknownAgent { agent_id: agent_id.to_string() });
        }
        for ids in self.partitions.values_mut() {
            ids.retain(|id| id != agent_id);
        }
        self.toolkit.bus().unsubscribe(agent_id);
        info!(agent_id = %agent_id, "agent unregistered");
        Ok(())
    }

    /// Run every agent once and collect their outputs.
    ///
    /// Recommendations are built from the collected actions, in collection
    /// order, after the last phase completes.
    ///
    /// # Errors
    ///
    /// The first agent failure, unchanged. Outputs of agents that already ran
    /// are discarded, and every agent drops the per-cycle state it gathered,
    /// so nothing from the aborted run reaches the next one.
    pub fn execute_agents(&self, scenario: &Scenario) -> SurgeResult<AgentOutputs> {
        let mut outputs = AgentOutputs::default();

        info!(
            scenario = %scenario.name,
            risk_multiplier = scenario.risk_multiplier,
            agents = self.agents.len(),
            "pipeline run starting"
        );

        for role in AgentRole::ORDERED {
            let ids = self.agent_ids(role);
            info!(phase = %role, agents = ids.len(), "phase starting");

            for id in ids {
                let Some(shared) = self.agents.get(&id) else {
                    continue;
                };
                let result = lock_agent(shared).run(scenario);
                let outcome = match result {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(phase = %role, agent_id = %id, error = %e, "pipeline run aborted");
                        self.abandon_cycle();
                        return Err(e);
                    }
                };
                debug!(
                    agent_id = %id,
                    action = %outcome.action.kind,
                    traces = outcome.traces.len(),
                    "agent cycle complete"
                );
                outputs.absorb(outcome);
            }
        }

        outputs.build_recommendations();
        info!(
            actions = outputs.actions.len(),
            recommendations = outputs.recommendations.len(),
            messages = self.toolkit.bus().messages().len(),
            "pipeline run complete"
        );
        Ok(outputs)
    }

    fn abandon_cycle(&self) {
        for agent in self.agents.values() {
            lock_agent(agent).abandon_cycle();
        }
    }

    /// Reset every agent and clear the bus queue.
    pub fn reset_all(&self) {
        for agent in self.agents.values() {
            lock_agent(agent).reset();
        }
        self.toolkit.bus().clear_messages();
        debug!(agents = self.agents.len(), "all agents reset");
    }

    pub fn agent(&self, agent_id: &AgentId) -> Option<SharedAgent> {
        self.agents.get(agent_id).cloned()
    }

    pub fn agent_status(&self, agent_id: &AgentId) -> Option<AgentStatus> {
        self.agents.get(agent_id).map(|agent| lock_agent(agent).status())
    }

    /// Ids registered under `role`, in registration order.
    pub fn agent_ids(&self, role: AgentRole) -> Vec<AgentId> {
        self.partitions.get(&role).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn lock_agent(agent: &SharedAgent) -> MutexGuard<'_, Agent> {
    agent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Tests ────────────────────────────────────────────────────────────────────
