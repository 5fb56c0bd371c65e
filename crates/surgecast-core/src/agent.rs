//! The agent runtime: one `Cognition` plus the state the pipeline tracks
//! around it.
//!
//! `Agent::run()` enforces the cycle contract for every implementation:
//!
//!   PERCEIVING → perceive → REASONING → reason → ACTING → act → IDLE
//!
//! Status returns to `Idle` whether the cycle completes, fails, or panics,
//! and one trace entry is appended per completed phase, in phase order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use surgecast_contracts::{
    agent::{AgentDescriptor, AgentId, AgentRole, AgentStatus},
    cycle::{Action, Perception, Reasoning, ReasoningTrace, TraceStep},
    error::{SurgeError, SurgeResult},
    execution::{CycleOutcome, Scenario},
    message::AgentMessage,
};

use crate::{
    memory::{AgentGoal, AgentMemory, Episode},
    traits::{Clock, Cognition, SystemClock},
};

/// A registered unit of the pipeline.
pub struct Agent {
    descriptor: AgentDescriptor,
    cognition: Box<dyn Cognition>,
    status: AgentStatus,
    memory: AgentMemory,
    traces: Vec<ReasoningTrace>,
    clock: Arc<dyn Clock>,
}

impl Agent {
    /// Wrap `cognition` in a fresh, idle runtime that stamps traces with the
    /// system clock.
    pub fn new(cognition: impl Cognition + 'static) -> Self {
        Self::from_boxed(Box::new(cognition))
    }

    pub fn from_boxed(cognition: Box<dyn Cognition>) -> Self {
        let descriptor = cognition.descriptor().clone();
        Self {
            descriptor,
            cognition,
            status: AgentStatus::Idle,
            memory: AgentMemory::default(),
            traces: Vec::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Stamp traces and episodes with `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> &AgentId {
        &self.descriptor.id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn role(&self) -> AgentRole {
        self.descriptor.role
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    /// Every trace entry since the last `reset()`.
    pub fn traces(&self) -> &[ReasoningTrace] {
        &self.traces
    }

    pub fn adopt_goal(&mut self, goal: AgentGoal) {
        self.memory.working.active_goals.push(goal);
    }

    /// Execute one perceive → reason → act cycle.
    ///
    /// # Errors
    ///
    /// Any failure in a phase, or a record that breaks the cycle contract,
    /// is returned as `SurgeError::AgentFailed` naming the phase. The agent
    /// is `Idle` again by the time the error reaches the caller.
    ///
    /// # Panics
    ///
    /// A panic inside the cognition is re-raised after status is reset to
    /// `Idle`.
    pub fn run(&mut self, scenario: &Scenario) -> SurgeResult<CycleOutcome> {
        let first_trace = self.traces.len();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run_phases(scenario)));
        self.status = AgentStatus::Idle;

        let result = match result {
            Ok(result) => result,
            Err(payload) => {
                warn!(agent_id = %self.descriptor.id, "agent cycle panicked");
                panic::resume_unwind(payload);
            }
        };

        match result {
            Ok((perception, reasoning, action)) => {
                self.memory.record_episode(Episode {
                    timestamp: self.clock.now(),
                    scenario: scenario.name.clone(),
                    actions: vec![action.clone()],
                    outcomes: Vec::new(),
                });
                Ok(CycleOutcome {
                    perception,
                    reasoning,
                    action,
                    traces: self.traces[first_trace..].to_vec(),
                })
            }
            Err(e) => {
                warn!(agent_id = %self.descriptor.id, error = %e, "agent cycle failed");
                Err(e)
            }
        }
    }

    fn run_phases(&mut self, scenario: &Scenario) -> SurgeResult<(Perception, Reasoning, Action)> {
        let id = self.descriptor.id.clone();

        // ── Sense ────────────────────────────────────────────────────────────
        self.status = AgentStatus::Perceiving;
        debug!(agent_id = %id, "perceiving");
        let perception = self
            .cognition
            .perceive(scenario, &self.memory)
            .and_then(|p| check_perception(&id, p))
            .map_err(|e| phase_error(&id, "perceiving", e))?;
        self.memory.working.current_perceptions.push(perception.clone());
        self.log_thought(
            format!("Perceived: {}", Value::Object(perception.data.clone())),
            TraceStep::Perceive,
        );

        // ── Think ────────────────────────────────────────────────────────────
        self.status = AgentStatus::Reasoning;
        debug!(agent_id = %id, "reasoning");
        let reasoning = self
            .cognition
            .reason(&perception)
            .and_then(|r| check_reasoning(&id, r))
            .map_err(|e| phase_error(&id, "reasoning", e))?;
        self.log_thought(format!("Reasoning: {}", reasoning.reasoning), TraceStep::Reason);

        // ── Act ──────────────────────────────────────────────────────────────
        self.status = AgentStatus::Acting;
        debug!(agent_id = %id, "acting");
        let action = self
            .cognition
            .act(&reasoning)
            .and_then(|a| check_action(&id, a))
            .map_err(|e| phase_error(&id, "acting", e))?;
        self.memory.working.recent_actions.push(action.clone());
        self.log_thought(format!("Action: {}", action.explanation), TraceStep::Act);

        Ok((perception, reasoning, action))
    }

    /// Drop the scratch state of a cycle the pipeline abandoned: the
    /// cognition's own per-cycle state and any messages queued for it.
    /// Traces, perceptions, and long-term memory are kept.
    pub fn abandon_cycle(&mut self) {
        self.status = AgentStatus::Idle;
        self.memory.working.inbox.clear();
        self.cognition.reset();
    }

    /// Clear working memory and traces; keep the knowledge base and episodes.
    pub fn reset(&mut self) {
        self.status = AgentStatus::Idle;
        self.traces.clear();
        self.memory.clear_working();
        self.cognition.reset();
    }

    /// Hand a bus message to the cognition.
    pub fn receive_message(&mut self, message: &AgentMessage) {
        self.cognition.receive_message(message, &mut self.memory.working);
    }

    fn log_thought(&mut self, thought: String, step: TraceStep) {
        self.traces.push(ReasoningTrace {
            agent_id: self.descriptor.id.clone(),
            agent_name: self.descriptor.name.clone(),
            timestamp: self.clock.now(),
            thought,
            step,
        });
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.descriptor.id)
            .field("role", &self.descriptor.role)
            .field("status", &self.status)
            .field("traces", &self.traces.len())
            .finish()
    }
}

// ── Cycle contract checks ─────────────────────────────────────────────────────

fn phase_error(id: &AgentId, phase: &str, e: SurgeError) -> SurgeError {
    match e {
        already @ SurgeError::AgentFailed { .. } => already,
        other => SurgeError::AgentFailed {
            agent_id: id.to_string(),
            phase: phase.to_string(),
            reason: other.to_string(),
        },
    }
}

fn check_owner(id: &AgentId, owner: &AgentId, record: &str) -> SurgeResult<()> {
    if owner != id {
        return Err(SurgeError::InvalidOutput {
            reason: format!("{record} attributed to '{owner}' instead of '{id}'"),
        });
    }
    Ok(())
}

fn check_confidence(confidence: f64, record: &str) -> SurgeResult<()> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(SurgeError::InvalidOutput {
            reason: format!("{record} confidence {confidence} is outside [0, 1]"),
        });
    }
    Ok(())
}

fn check_perception(id: &AgentId, perception: Perception) -> SurgeResult<Perception> {
    check_owner(id, &perception.agent_id, "perception")?;
    check_confidence(perception.confidence, "perception")?;
    Ok(perception)
}

fn check_reasoning(id: &AgentId, reasoning: Reasoning) -> SurgeResult<Reasoning> {
    check_owner(id, &reasoning.agent_id, "reasoning")?;
    check_confidence(reasoning.confidence, "reasoning")?;
    if reasoning.conclusions.is_empty() {
        return Err(SurgeError::InvalidOutput {
            reason: "reasoning produced no conclusions".to_string(),
        });
    }
    Ok(reasoning)
}

fn check_action(id: &AgentId, action: Action) -> SurgeResult<Action> {
    check_owner(id, &action.agent_id, "action")?;
    if action.explanation.trim().is_empty() {
        return Err(SurgeError::InvalidOutput {
            reason: "action has an empty explanation".to_string(),
        });
    }
    Ok(action)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use surgecast_contracts::{
        agent::{AgentDescriptor, AgentRole, AgentStatus},
        cycle::{data_map, Action, ActionKind, Perception, Reasoning, TraceStep},
        error::{SurgeError, SurgeResult},
        execution::Scenario,
        message::{AgentMessage, Priority},
    };

    use crate::{
        memory::{AgentMemory, WorkingMemory},
        traits::{Cognition, FixedClock},
    };

    use super::*;

    /// Which phase, if any, the mock should fail in.
    #[derive(Clone, Copy, PartialEq)]
    enum FailAt {
        Nowhere,
        Perceive,
        Reason,
        Act,
        Panic,
    }

    /// A cognition that records the status it observed in each phase.
    struct MockCognition {
        descriptor: AgentDescriptor,
        fail_at: FailAt,
        conclusions: Vec<String>,
        explanation: String,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl MockCognition {
        fn new(fail_at: FailAt) -> Self {
            Self {
                descriptor: AgentDescriptor::new("mock", "Mock Agent", AgentRole::Reasoning, "test double", &[]),
                fail_at,
                conclusions: vec!["all quiet".to_string()],
                explanation: String::new(),
                calls: Arc::new(Mutex::new(vec![])),
            }
        }

        fn fail(&self, phase: FailAt) -> SurgeResult<()> {
            if self.fail_at == phase {
                return Err(SurgeError::MalformedPerception { reason: "boom".to_string() });
            }
            Ok(())
        }
    }

    impl Cognition for MockCognition {
        fn descriptor(&self) -> &AgentDescriptor {
            &self.descriptor
        }

        fn perceive(&mut self, _scenario: &Scenario, _memory: &AgentMemory) -> SurgeResult<Perception> {
            self.calls.lock().unwrap().push("perceive");
            self.fail(FailAt::Perceive)?;
            if self.fail_at == FailAt::Panic {
                let readings: Vec<f64> = Vec::new();
                std::hint::black_box(readings[3]);
            }
            Ok(Perception {
                agent_id: self.descriptor.id.clone(),
                timestamp: Utc::now(),
                data: data_map(json!({ "beds": 10 })),
                confidence: 0.9,
            })
        }

        fn reason(&mut self, _perception: &Perception) -> SurgeResult<Reasoning> {
            self.calls.lock().unwrap().push("reason");
            self.fail(FailAt::Reason)?;
            Ok(Reasoning {
                agent_id: self.descriptor.id.clone(),
                timestamp: Utc::now(),
                conclusions: self.conclusions.clone(),
                confidence: 0.8,
                reasoning: "nothing to report".to_string(),
            })
        }

        fn act(&mut self, reasoning: &Reasoning) -> SurgeResult<Action> {
            self.calls.lock().unwrap().push("act");
            self.fail(FailAt::Act)?;
            Ok(Action {
                agent_id: self.descriptor.id.clone(),
                timestamp: Utc::now(),
                kind: ActionKind::RiskForecast,
                data: data_map(json!({})),
                explanation: if self.explanation.is_empty() {
                    reasoning.reasoning.clone()
                } else {
                    self.explanation.clone()
                },
            })
        }

        fn receive_message(&mut self, message: &AgentMessage, working: &mut WorkingMemory) {
            working.inbox.push(message.clone());
        }
    }

    #[test]
    fn run_executes_phases_in_order_and_returns_to_idle() {
        let cognition = MockCognition::new(FailAt::Nowhere);
        let calls = cognition.calls.clone();
        let mut agent = Agent::new(cognition);

        let outcome = agent.run(&Scenario::default()).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["perceive", "reason", "act"]);
        assert_eq!(agent.status(), AgentStatus::Idle);
        assert_eq!(outcome.action.explanation, "nothing to report");

        let steps: Vec<TraceStep> = outcome.traces.iter().map(|t| t.step).collect();
        assert_eq!(steps, vec![TraceStep::Perceive, TraceStep::Reason, TraceStep::Act]);
        assert!(outcome.traces.iter().all(|t| t.agent_name == "Mock Agent"));
    }

    #[test]
    fn perceive_failure_leaves_agent_idle_and_skips_later_phases() {
        let cognition = MockCognition::new(FailAt::Perceive);
        let calls = cognition.calls.clone();
        let mut agent = Agent::new(cognition);

        let err = agent.run(&Scenario::default()).unwrap_err();

        match err {
            SurgeError::AgentFailed { agent_id, phase, reason } => {
                assert_eq!(agent_id, "mock");
                assert_eq!(phase, "perceiving");
                assert!(reason.contains("boom"));
            }
            other => panic!("expected AgentFailed, got {:?}", other),
        }
        assert_eq!(agent.status(), AgentStatus::Idle);
        assert_eq!(*calls.lock().unwrap(), vec!["perceive"]);
        assert!(agent.traces().is_empty(), "no phase completed, so no traces");
    }

    #[test]
    fn panic_in_perceive_is_reraised_with_agent_idle() {
        let mut agent = Agent::new(MockCognition::new(FailAt::Panic));

        let result = panic::catch_unwind(AssertUnwindSafe(|| agent.run(&Scenario::default())));

        assert!(result.is_err(), "the panic reaches the caller");
        assert_eq!(agent.status(), AgentStatus::Idle);
        assert!(agent.traces().is_empty());
        assert!(agent.memory().episodes.is_empty());
    }

    #[test]
    fn abandon_cycle_drops_inbox_but_keeps_traces() {
        let mut agent = Agent::new(MockCognition::new(FailAt::Nowhere));
        agent.run(&Scenario::default()).unwrap();
        agent.receive_message(&AgentMessage::broadcast(
            AgentId::new("season-tracker"),
            "risk-signal",
            json!({}),
            Priority::Low,
            Utc::now(),
        ));

        agent.abandon_cycle();

        assert!(agent.memory().working.inbox.is_empty());
        assert_eq!(agent.traces().len(), 3);
        assert_eq!(agent.memory().episodes.len(), 1);
    }

    #[test]
    fn act_failure_keeps_traces_of_completed_phases() {
        let mut agent = Agent::new(MockCognition::new(FailAt::Act));

        let err = agent.run(&Scenario::default()).unwrap_err();

        assert!(matches!(err, SurgeError::AgentFailed { ref phase, .. } if phase == "acting"));
        assert_eq!(agent.status(), AgentStatus::Idle);
        let steps: Vec<TraceStep> = agent.traces().iter().map(|t| t.step).collect();
        assert_eq!(steps, vec![TraceStep::Perceive, TraceStep::Reason]);
    }

    #[test]
    fn empty_conclusions_are_rejected() {
        let mut cognition = MockCognition::new(FailAt::Nowhere);
        cognition.conclusions.clear();
        let mut agent = Agent::new(cognition);

        let err = agent.run(&Scenario::default()).unwrap_err();
        assert!(err.to_string().contains("no conclusions"), "got: {err}");
        assert_eq!(agent.status(), AgentStatus::Idle);
    }

    #[test]
    fn blank_explanation_is_rejected() {
        let mut cognition = MockCognition::new(FailAt::Nowhere);
        cognition.explanation = "   ".to_string();
        let mut agent = Agent::new(cognition);

        let err = agent.run(&Scenario::default()).unwrap_err();
        assert!(err.to_string().contains("empty explanation"), "got: {err}");
    }

    #[test]
    fn traces_accumulate_until_reset() {
        let mut agent = Agent::new(MockCognition::new(FailAt::Nowhere));

        let first = agent.run(&Scenario::default()).unwrap();
        let second = agent.run(&Scenario::default()).unwrap();

        // Each outcome only carries its own run's traces.
        assert_eq!(first.traces.len(), 3);
        assert_eq!(second.traces.len(), 3);
        assert_eq!(agent.traces().len(), 6);
        assert_eq!(agent.memory().episodes.len(), 2);

        agent.reset();

        assert!(agent.traces().is_empty());
        assert!(agent.memory().working.current_perceptions.is_empty());
        assert!(agent.memory().working.recent_actions.is_empty());
        assert_eq!(agent.memory().episodes.len(), 2, "episodes survive reset");
    }

    #[test]
    fn receive_message_reaches_working_memory() {
        let mut agent = Agent::new(MockCognition::new(FailAt::Nowhere));
        let msg = AgentMessage::broadcast(
            AgentId::new("season-tracker"),
            "risk-signal",
            json!({}),
            Priority::Low,
            Utc::now(),
        );

        agent.receive_message(&msg);
        assert_eq!(agent.memory().working.inbox.len(), 1);

        agent.reset();
        assert!(agent.memory().working.inbox.is_empty());
    }

    #[test]
    fn traces_use_injected_clock() {
        let instant = Utc.with_ymd_and_hms(2025, 11, 1, 6, 0, 0).unwrap();
        let mut agent = Agent::new(MockCognition::new(FailAt::Nowhere))
            .with_clock(Arc::new(FixedClock(instant)));

        let outcome = agent.run(&Scenario::default()).unwrap();
        assert!(outcome.traces.iter().all(|t| t.timestamp == instant));
    }
}
