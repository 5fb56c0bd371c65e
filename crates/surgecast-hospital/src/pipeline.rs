//! The standard six-agent surge-planning pipeline.
//!
//! Registration order fixes execution order inside each phase:
//!
//!   PERCEPTION: environment-monitor, festival-detector, season-tracker
//!   REASONING:  forecaster, capacity-calculator
//!   ACTION:     resource-planner

use tracing::info;

use surgecast_contracts::{
    error::SurgeResult,
    execution::{AgentOutputs, Scenario},
};
use surgecast_core::{Orchestrator, Toolkit};

use crate::agents::{
    CapacityCalculator, EnvironmentMonitor, FestivalDetector, Forecaster, ResourcePlanner, SeasonTracker,
};

/// Build an orchestrator with every hospital agent registered.
pub fn standard_orchestrator(toolkit: Toolkit) -> SurgeResult<Orchestrator> {
    let mut orch = Orchestrator::new(toolkit.clone());

    orch.register_agent(EnvironmentMonitor::new(toolkit.clone()))?;
    orch.register_agent(FestivalDetector::new(toolkit.clone()))?;
    orch.register_agent(SeasonTracker::new(toolkit.clone()))?;
    orch.register_agent(Forecaster::new(toolkit.clone()))?;
    orch.register_agent(CapacityCalculator::new(toolkit.clone()))?;
    orch.register_agent(ResourcePlanner::new(toolkit))?;

    Ok(orch)
}

/// Run `scenario` once through a freshly built standard pipeline.
pub fn run_scenario(toolkit: Toolkit, scenario: &Scenario) -> SurgeResult<AgentOutputs> {
    let hospital_id = toolkit.hospital_config().hospital_id.clone();
    let orch = standard_orchestrator(toolkit)?;
    let outputs = orch.execute_agents(scenario)?;
    info!(
        hospital_id = %hospital_id,
        scenario = %scenario.name,
        recommendations = outputs.recommendations.len(),
        "scenario planned"
    );
    Ok(outputs)
}
