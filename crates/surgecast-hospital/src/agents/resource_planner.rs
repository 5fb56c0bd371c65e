//! Resource Planner: turns capacity needs into a deployment plan.
//!
//! Action-phase agents cannot see reasoning-phase outputs, so the planner
//! re-derives the capacity plan from the same config and scenario the
//! capacity calculator used.
//!
//! Goals adopted by the planner are carried into the plan, highest priority
//! first, so operators can see which objectives the deployment serves.

use serde::{Deserialize, Serialize};

use surgecast_contracts::{
    agent::{AgentDescriptor, AgentRole},
    cycle::{Action, ActionKind, Perception, Reasoning},
    error::SurgeResult,
    execution::Scenario,
};
use surgecast_core::{
    memory::{AgentGoal, AgentMemory},
    traits::Cognition,
    Toolkit,
};

use super::{decode_field, out_of_order, to_data, LoadDrivers};
use crate::{
    capacity::{self, CapacityRecommendation},
    forecasting::Severity,
};

/// One concrete thing to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStep {
    pub action: String,
    pub resource: String,
    pub quantity: u64,
    pub unit: String,
    pub priority: Severity,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub overall_severity: Severity,
    pub steps: Vec<DeploymentStep>,
    /// Active goals of the planner, highest priority first.
    #[serde(default)]
    pub goals: Vec<AgentGoal>,
}

/// Steps in priority order: beds, then staff, then supplies. Zero
/// quantities produce no step.
pub fn deployment_plan(needs: &CapacityRecommendation) -> DeploymentPlan {
    let mut steps = Vec::new();

    if needs.extra_beds > 0 {
        steps.push(DeploymentStep {
            action: "Open surge beds".to_string(),
            resource: "Beds".to_string(),
            quantity: needs.extra_beds,
            unit: "beds".to_string(),
            priority: needs.overall_severity,
            timeline: "0-24 hours".to_string(),
        });
    }
    for (resource, quantity) in [("Doctors", needs.extra_doctors), ("Nurses", needs.extra_nurses)] {
        if quantity > 0 {
            steps.push(DeploymentStep {
                action: format!("Call in additional {}", resource.to_lowercase()),
                resource: resource.to_string(),
                quantity,
                unit: "per shift".to_string(),
                priority: Severity::High,
                timeline: "0-12 hours".to_string(),
            });
        }
    }
    for supply in needs.supplies.iter().filter(|s| s.quantity > 0) {
        steps.push(DeploymentStep {
            action: format!("Stock {}", supply.item.to_lowercase()),
            resource: supply.item.clone(),
            quantity: supply.quantity,
            unit: supply.unit.clone(),
            priority: supply.urgency,
            timeline: "0-48 hours".to_string(),
        });
    }

    DeploymentPlan {
        overall_severity: needs.overall_severity,
        steps,
        goals: Vec::new(),
    }
}

pub struct ResourcePlanner {
    descriptor: AgentDescriptor,
    toolkit: Toolkit,
    plan: Option<DeploymentPlan>,
}

impl ResourcePlanner {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "resource-planner",
                "Resource Planner",
                AgentRole::Action,
                "Generates actionable resource deployment plans",
                &["createDeploymentPlan", "optimizeResourceAllocation", "generateTimeline"],
            ),
            toolkit,
            plan: None,
        }
    }
}

impl Cognition for ResourcePlanner {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn perceive(&mut self, scenario: &Scenario, memory: &AgentMemory) -> SurgeResult<Perception> {
        let config = self.toolkit.hospital_config();
        let drivers = LoadDrivers::resolve(&config, scenario, self.toolkit.now());
        let needs = capacity::plan(&drivers.capacity_inputs(&config), format!("Capacity needs for '{}'", scenario.name));

        let mut goals = memory.working.active_goals.clone();
        goals.sort_by(|a, b| b.priority.cmp(&a.priority));

        Ok(Perception {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            data: to_data(&serde_json::json!({ "capacity_needs": needs, "goals": goals }))?,
            confidence: 0.9,
        })
    }

    fn reason(&mut self, perception: &Perception) -> SurgeResult<Reasoning> {
        let needs: CapacityRecommendation = decode_field(&perception.data, "capacity_needs")?;
        let goals: Vec<AgentGoal> = decode_field(&perception.data, "goals")?;
        let mut plan = deployment_plan(&needs);

        let mut conclusions = if plan.steps.is_empty() {
            vec!["Current capacity covers the projected load; no deployment needed".to_string()]
        } else {
            plan.steps
                .iter()
                .map(|s| format!("{}: {} {} within {} [{}]", s.action, s.quantity, s.unit, s.timeline, s.priority))
                .collect()
        };
        conclusions.extend(
            goals
                .iter()
                .map(|g| format!("Serves goal '{}' [{:?}]: {}", g.id, g.priority, g.description)),
        );
        plan.goals = goals;

        let reasoning = format!(
            "Optimized resource deployment strategy based on capacity calculations: {} step(s), overall severity {}.",
            plan.steps.len(),
            plan.overall_severity
        );

        self.plan = Some(plan);
        Ok(Reasoning {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            conclusions,
            confidence: 0.85,
            reasoning,
        })
    }

    fn act(&mut self, reasoning: &Reasoning) -> SurgeResult<Action> {
        let plan = self.plan.take().ok_or_else(|| out_of_order("resource-planner"))?;
        Ok(Action {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            kind: ActionKind::ResourceDeployment,
            data: to_data(&plan)?,
            explanation: reasoning.reasoning.clone(),
        })
    }

    fn reset(&mut self) {
        self.plan = None;
    }
}

#[cfg(test)]
mod tests {
    use surgecast_contracts::{config::Season, message::Priority};
    use surgecast_core::Agent;

    use super::*;
    use crate::agents::test_support::{at, toolkit_at};
    use crate::capacity::CapacityInputs;
    use crate::config::default_config;

    #[test]
    fn reference_plan_opens_beds_and_stocks_supplies() {
        let needs = capacity::plan(&CapacityInputs::from_config(&default_config(), 1.3, 1.5), "s");
        let plan = deployment_plan(&needs);

        let resources: Vec<&str> = plan.steps.iter().map(|s| s.resource.as_str()).collect();
        assert_eq!(resources, vec!["Beds", "Oxygen", "Nebulizers"], "staff already sufficient");
        assert_eq!(plan.steps[0].quantity, 245);
        assert_eq!(plan.steps[1].priority, Severity::High);
    }

    #[test]
    fn understaffed_hospital_calls_in_staff() {
        let mut config = default_config();
        config.current_doctors_per_shift = 4;
        config.current_nurses_per_shift = 10;
        let needs = capacity::plan(&CapacityInputs::from_config(&config, 1.3, 1.5), "s");

        let plan = deployment_plan(&needs);

        let doctors = plan.steps.iter().find(|s| s.resource == "Doctors").unwrap();
        assert_eq!(doctors.quantity, 6);
        let nurses = plan.steps.iter().find(|s| s.resource == "Nurses").unwrap();
        assert_eq!(nurses.quantity, 20);
    }

    #[test]
    fn idle_scenario_produces_no_steps_but_still_concludes() {
        let mut agent = Agent::new(ResourcePlanner::new(toolkit_at(at(2025, 1, 10))));

        let outcome = agent
            .run(&Scenario::new("quiet").with_risk_multiplier(0.0))
            .unwrap();

        assert_eq!(outcome.action.kind, ActionKind::ResourceDeployment);
        assert_eq!(outcome.action.data["steps"].as_array().unwrap().len(), 0);
        assert_eq!(outcome.reasoning.conclusions.len(), 1);
    }

    #[test]
    fn adopted_goals_are_carried_into_the_plan_by_priority() {
        let mut agent = Agent::new(ResourcePlanner::new(toolkit_at(at(2025, 1, 10))));
        agent.adopt_goal(AgentGoal {
            id: "stock".to_string(),
            description: "keep a week of oxygen on hand".to_string(),
            priority: Priority::Medium,
            constraints: None,
        });
        agent.adopt_goal(AgentGoal {
            id: "icu".to_string(),
            description: "keep ICU occupancy below 90%".to_string(),
            priority: Priority::Critical,
            constraints: None,
        });

        let outcome = agent.run(&Scenario::default()).unwrap();

        let ids: Vec<&str> = outcome.action.data["goals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["icu", "stock"]);
        assert!(outcome
            .reasoning
            .conclusions
            .iter()
            .any(|c| c.starts_with("Serves goal 'icu' [Critical]")));
    }

    #[test]
    fn plan_matches_capacity_calculator_inputs() {
        let mut agent = Agent::new(ResourcePlanner::new(toolkit_at(at(2025, 1, 10))));

        let outcome = agent
            .run(&Scenario::default().with_season(Season::PostMonsoon))
            .unwrap();

        assert_eq!(outcome.action.data["steps"][0]["quantity"], 245);
        assert_eq!(outcome.action.explanation, outcome.reasoning.reasoning);
    }
}
