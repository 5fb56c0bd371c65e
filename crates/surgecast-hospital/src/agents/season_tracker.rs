//! Season Tracker: seasonal disease patterns and the configured uplift.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use surgecast_contracts::{
    agent::{AgentDescriptor, AgentRole},
    config::Season,
    cycle::{Action, ActionKind, Perception, Reasoning},
    error::SurgeResult,
    execution::Scenario,
    message::Priority,
};
use surgecast_core::{memory::AgentMemory, traits::Cognition, Toolkit};

use super::{decode_data, out_of_order, to_data, RiskCategory, RiskSignal, RISK_SIGNAL_TOPIC};
use crate::forecasting::{
    season::{resolve_season, season_description, seasonal_risk_factors},
    Severity,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SeasonReading {
    season: Season,
    description: String,
    month: u32,
    /// `true` when the scenario forced the season.
    forced: bool,
    risk_factors: Vec<String>,
}

pub struct SeasonTracker {
    descriptor: AgentDescriptor,
    toolkit: Toolkit,
    assessed: Option<(Season, f64)>,
}

impl SeasonTracker {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "season-tracker",
                "Season Tracker",
                AgentRole::Perception,
                "Monitors seasonal health patterns and applies uplift factors",
                &["getCurrentSeason", "getSeasonalDiseases", "getSeasonalUplift"],
            ),
            toolkit,
            assessed: None,
        }
    }
}

fn uplift_severity(uplift: f64) -> Severity {
    if uplift >= 1.4 {
        Severity::High
    } else if uplift >= 1.2 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

impl Cognition for SeasonTracker {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn perceive(&mut self, scenario: &Scenario, _memory: &AgentMemory) -> SurgeResult<Perception> {
        let now = self.toolkit.now();
        let season = resolve_season(scenario.season, now);
        let uplift = self.toolkit.hospital_config().season_uplift(season);

        let signal = RiskSignal {
            source: self.descriptor.id.clone(),
            category: RiskCategory::Seasonal,
            severity: uplift_severity(uplift),
            load_multiplier: uplift,
            summary: format!("{} season, {}x uplift", season, uplift),
        };
        self.toolkit.broadcast_insight(
            &self.descriptor.id,
            RISK_SIGNAL_TOPIC,
            serde_json::to_value(&signal)?,
            Priority::Low,
        );

        let reading = SeasonReading {
            season,
            description: season_description(season).to_string(),
            month: now.month(),
            forced: scenario.season.is_some(),
            risk_factors: seasonal_risk_factors(season).iter().map(|r| r.to_string()).collect(),
        };
        Ok(Perception {
            agent_id: self.descriptor.id.clone(),
            timestamp: now,
            data: to_data(&reading)?,
            confidence: 1.0,
        })
    }

    fn reason(&mut self, perception: &Perception) -> SurgeResult<Reasoning> {
        let reading: SeasonReading = decode_data(&perception.data)?;
        let uplift = self.toolkit.hospital_config().season_uplift(reading.season);

        let conclusions = vec![
            format!("Current season: {}", reading.season),
            format!("Seasonal uplift factor: {}x", uplift),
            format!("Expected {:.0}% increase in baseline patient load", (uplift - 1.0) * 100.0),
            format!("Seasonal risks: {}", reading.risk_factors.join(", ")),
        ];

        self.assessed = Some((reading.season, uplift));
        Ok(Reasoning {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            conclusions,
            confidence: 0.9,
            reasoning: format!(
                "{}. Applying seasonal uplift factor of {}x to baseline predictions.",
                reading.description, uplift
            ),
        })
    }

    fn act(&mut self, reasoning: &Reasoning) -> SurgeResult<Action> {
        let (season, uplift) = self.assessed.take().ok_or_else(|| out_of_order("season-tracker"))?;
        Ok(Action {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            kind: ActionKind::SeasonAssessment,
            data: to_data(&serde_json::json!({
                "season": season,
                "uplift_factor": uplift,
                "seasonal_risks": reasoning.conclusions,
            }))?,
            explanation: reasoning.reasoning.clone(),
        })
    }

    fn reset(&mut self) {
        self.assessed = None;
    }
}

#[cfg(test)]
mod tests {
    use surgecast_core::Agent;

    use super::*;
    use crate::agents::test_support::{at, toolkit_at};

    #[test]
    fn winter_uses_configured_uplift() {
        let mut agent = Agent::new(SeasonTracker::new(toolkit_at(at(2025, 1, 10))));

        let outcome = agent.run(&Scenario::default()).unwrap();

        assert_eq!(outcome.perception.data["season"], "WINTER");
        assert_eq!(outcome.perception.data["month"], 1);
        assert_eq!(outcome.action.kind, ActionKind::SeasonAssessment);
        assert_eq!(outcome.action.data["uplift_factor"], 1.4);
        assert_eq!(outcome.reasoning.conclusions[2], "Expected 40% increase in baseline patient load");
        assert!(outcome.reasoning.reasoning.starts_with("Winter season (Dec-Feb)"));
    }

    #[test]
    fn scenario_season_overrides_clock() {
        let toolkit = toolkit_at(at(2025, 1, 10));
        let mut agent = Agent::new(SeasonTracker::new(toolkit.clone()));

        let outcome = agent
            .run(&Scenario::new("monsoon-drill").with_season(Season::Monsoon))
            .unwrap();

        assert_eq!(outcome.action.data["season"], "MONSOON");
        assert_eq!(outcome.perception.data["forced"], true);

        let signal: RiskSignal = serde_json::from_value(toolkit.bus().messages()[0].content.data.clone()).unwrap();
        assert_eq!(signal.load_multiplier, 1.3);
        assert_eq!(signal.severity, Severity::Medium);
    }
}
