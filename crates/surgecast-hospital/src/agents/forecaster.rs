//! Forecaster: folds the perception layer's risk signals into one forecast.
//!
//! Signals arrive over the bus while the perception agents run. They are
//! queued here and drained by the next `perceive`, so each run forecasts
//! from the signals of that run only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use surgecast_contracts::{
    agent::{AgentDescriptor, AgentRole},
    cycle::{Action, ActionKind, Perception, Reasoning},
    error::SurgeResult,
    execution::Scenario,
    message::AgentMessage,
};
use surgecast_core::{
    memory::{AgentMemory, WorkingMemory},
    traits::Cognition,
    Toolkit,
};

use super::{decode_data, out_of_order, to_data, LoadDrivers, RiskSignal, RISK_SIGNAL_TOPIC};
use crate::forecasting::Severity;

/// Confidence when at least one signal arrived, and when none did.
pub const SIGNAL_CONFIDENCE: f64 = 0.8;
pub const BLIND_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ForecastInputs {
    signals: Vec<RiskSignal>,
    baseline_patients_per_day: f64,
    drivers: LoadDrivers,
}

/// The forecaster's synthesized outlook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskForecast {
    pub overall_severity: Severity,
    /// Highest load multiplier among the signals, at least 1.0.
    pub combined_load_multiplier: f64,
    pub projected_patients_per_day: f64,
    pub signals: Vec<RiskSignal>,
}

/// Worst severity and highest multiplier across `signals`, then scaled by
/// the scenario's risk multiplier.
pub fn synthesize(signals: Vec<RiskSignal>, baseline: f64, risk_multiplier: f64) -> RiskForecast {
    let overall_severity = signals.iter().map(|s| s.severity).max().unwrap_or(Severity::Low);
    let combined_load_multiplier = signals.iter().map(|s| s.load_multiplier).fold(1.0, f64::max);
    RiskForecast {
        overall_severity,
        combined_load_multiplier,
        projected_patients_per_day: baseline * combined_load_multiplier * risk_multiplier,
        signals,
    }
}

pub struct Forecaster {
    descriptor: AgentDescriptor,
    toolkit: Toolkit,
    pending: Vec<RiskSignal>,
    forecast: Option<RiskForecast>,
}

impl Forecaster {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "forecaster",
                "Forecaster",
                AgentRole::Reasoning,
                "Synthesizes environmental, festival, and seasonal data into risk forecasts",
                &["aggregateRisks", "predictPatientLoad", "estimateDuration"],
            ),
            toolkit,
            pending: Vec::new(),
            forecast: None,
        }
    }
}

impl Cognition for Forecaster {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn perceive(&mut self, scenario: &Scenario, _memory: &AgentMemory) -> SurgeResult<Perception> {
        let config = self.toolkit.hospital_config();
        let signals = std::mem::take(&mut self.pending);
        let confidence = if signals.is_empty() { BLIND_CONFIDENCE } else { SIGNAL_CONFIDENCE };

        let inputs = ForecastInputs {
            signals,
            baseline_patients_per_day: config.baseline_patients_per_day,
            drivers: LoadDrivers::resolve(&config, scenario, self.toolkit.now()),
        };
        Ok(Perception {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            data: to_data(&inputs)?,
            confidence,
        })
    }

    fn reason(&mut self, perception: &Perception) -> SurgeResult<Reasoning> {
        let inputs: ForecastInputs = decode_data(&perception.data)?;
        let signal_count = inputs.signals.len();
        let forecast = synthesize(
            inputs.signals,
            inputs.baseline_patients_per_day,
            inputs.drivers.risk_multiplier,
        );

        let mut conclusions = vec![
            format!("Synthesized {} risk signal(s) from perception layer", signal_count),
            format!("Baseline patient load: {} patients/day", inputs.baseline_patients_per_day),
            format!(
                "Projected load: {:.1} patients/day ({}x combined uplift, {}x scenario risk)",
                forecast.projected_patients_per_day, forecast.combined_load_multiplier, inputs.drivers.risk_multiplier
            ),
        ];
        conclusions.extend(
            forecast
                .signals
                .iter()
                .map(|s| format!("{} [{}]: {}", s.source, s.severity, s.summary)),
        );

        let reasoning = format!(
            "Combined environmental, festival, and seasonal data into a {} risk forecast.",
            forecast.overall_severity
        );
        self.forecast = Some(forecast);
        Ok(Reasoning {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            conclusions,
            confidence: perception.confidence,
            reasoning,
        })
    }

    fn act(&mut self, reasoning: &Reasoning) -> SurgeResult<Action> {
        let forecast = self.forecast.take().ok_or_else(|| out_of_order("forecaster"))?;
        let mut data = to_data(&forecast)?;
        data.insert("summary".to_string(), reasoning.reasoning.clone().into());
        Ok(Action {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            kind: ActionKind::RiskForecast,
            data,
            explanation: reasoning.reasoning.clone(),
        })
    }

    fn receive_message(&mut self, message: &AgentMessage, working: &mut WorkingMemory) {
        if message.content.topic != RISK_SIGNAL_TOPIC {
            return;
        }
        match serde_json::from_value::<RiskSignal>(message.content.data.clone()) {
            Ok(signal) => {
                debug!(agent_id = %self.descriptor.id, from = %message.from, "risk signal queued");
                self.pending.push(signal);
                working.inbox.push(message.clone());
            }
            Err(e) => {
                debug!(agent_id = %self.descriptor.id, from = %message.from, error = %e, "unreadable risk signal ignored");
            }
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.forecast = None;
    }
}
