//! Capacity Calculator: runs the bed, staff, and supply formulas.

use serde::{Deserialize, Serialize};
use tracing::info;

use surgecast_contracts::{
    agent::{AgentDescriptor, AgentRole},
    cycle::{Action, ActionKind, Perception, Reasoning},
    error::SurgeResult,
    execution::Scenario,
};
use surgecast_core::{memory::AgentMemory, traits::Cognition, Toolkit};

use super::{decode_data, out_of_order, to_data, LoadDrivers};
use crate::capacity::{self, CapacityInputs};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CapacityPerception {
    hospital_id: String,
    drivers: LoadDrivers,
    inputs: CapacityInputs,
}

pub struct CapacityCalculator {
    descriptor: AgentDescriptor,
    toolkit: Toolkit,
    inputs: Option<CapacityInputs>,
}

impl CapacityCalculator {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "capacity-calculator",
                "Capacity Calculator",
                AgentRole::Reasoning,
                "Computes resource requirements using explicit mathematical formulas",
                &["calculateBedNeeds", "calculateStaffNeeds", "calculateSupplyNeeds"],
            ),
            toolkit,
            inputs: None,
        }
    }
}

impl Cognition for CapacityCalculator {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn perceive(&mut self, scenario: &Scenario, _memory: &AgentMemory) -> SurgeResult<Perception> {
        let config = self.toolkit.hospital_config();
        let drivers = LoadDrivers::resolve(&config, scenario, self.toolkit.now());
        let perception = CapacityPerception {
            hospital_id: config.hospital_id.clone(),
            inputs: drivers.capacity_inputs(&config),
            drivers,
        };
        Ok(Perception {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            data: to_data(&perception)?,
            confidence: 1.0,
        })
    }

    fn reason(&mut self, perception: &Perception) -> SurgeResult<Reasoning> {
        let CapacityPerception { inputs, drivers, .. } = decode_data(&perception.data)?;

        let beds = capacity::calculate_beds(&inputs);
        let staff = capacity::calculate_staff(&inputs);
        let supplies = capacity::calculate_supplies(&inputs);

        info!(
            agent_id = %self.descriptor.id,
            season = %drivers.season,
            risk_multiplier = drivers.risk_multiplier,
            extra_beds = beds.extra_beds,
            extra_doctors = staff.extra_doctors,
            extra_nurses = staff.extra_nurses,
            "capacity calculated"
        );

        self.inputs = Some(inputs);
        Ok(Reasoning {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            conclusions: vec![
                format!("Bed calculation: {}", beds.explanation.reasoning),
                format!("Staff calculation: {}", staff.explanation.reasoning),
                format!("Supply calculation: {}", supplies.explanation.reasoning),
            ],
            confidence: 0.95,
            reasoning: format!(
                "Applied mathematical formulas to calculate resource requirements based on predicted \
                 patient load ({} season, {}x uplift, {}x risk).",
                drivers.season, drivers.seasonal_uplift, drivers.risk_multiplier
            ),
        })
    }

    fn act(&mut self, reasoning: &Reasoning) -> SurgeResult<Action> {
        let inputs = self.inputs.take().ok_or_else(|| out_of_order("capacity-calculator"))?;
        let recommendation = capacity::plan(&inputs, reasoning.reasoning.clone());
        Ok(Action {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            kind: ActionKind::CapacityCalculation,
            explanation: format!(
                "Calculated resource needs: {} beds, {} doctors, {} nurses. {}",
                recommendation.extra_beds, recommendation.extra_doctors, recommendation.extra_nurses, reasoning.reasoning
            ),
            data: to_data(&recommendation)?,
        })
    }

    fn reset(&mut self) {
        self.inputs = None;
    }
}
