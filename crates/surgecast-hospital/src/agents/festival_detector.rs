//! Festival Detector: anticipates festival-driven patient surges.

use serde::{Deserialize, Serialize};
use tracing::debug;

use surgecast_contracts::{
    agent::{AgentDescriptor, AgentRole},
    cycle::{Action, ActionKind, Perception, Reasoning},
    error::SurgeResult,
    execution::Scenario,
    message::Priority,
};
use surgecast_core::{memory::AgentMemory, traits::Cognition, Toolkit};

use super::{decode_data, out_of_order, to_data, RiskCategory, RiskSignal, RISK_SIGNAL_TOPIC};
use crate::forecasting::{
    festival::{upcoming_festivals, UpcomingFestival, FESTIVAL_WINDOW_DAYS},
    Severity,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FestivalWindow {
    festivals: Vec<UpcomingFestival>,
    count: usize,
}

/// What `reason` hands to `act`.
#[derive(Debug, Clone, Copy)]
struct Outlook {
    has_festivals: bool,
    peak_surge_multiplier: f64,
}

pub struct FestivalDetector {
    descriptor: AgentDescriptor,
    toolkit: Toolkit,
    outlook: Option<Outlook>,
}

impl FestivalDetector {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            descriptor: AgentDescriptor::new(
                "festival-detector",
                "Festival Detector",
                AgentRole::Perception,
                "Detects upcoming festivals and predicts health impacts",
                &["getUpcomingFestivals", "getFestivalHealthImpact", "analyzeHistoricalData"],
            ),
            toolkit,
            outlook: None,
        }
    }
}

fn peak_multiplier(festivals: &[UpcomingFestival]) -> f64 {
    festivals
        .iter()
        .map(|f| f.festival.surge_multiplier)
        .fold(1.0, f64::max)
}

fn surge_severity(peak: f64) -> Severity {
    if peak >= 2.5 {
        Severity::Critical
    } else if peak >= 2.0 {
        Severity::High
    } else if peak > 1.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

impl Cognition for FestivalDetector {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn perceive(&mut self, _scenario: &Scenario, _memory: &AgentMemory) -> SurgeResult<Perception> {
        let festivals = upcoming_festivals(self.toolkit.now(), FESTIVAL_WINDOW_DAYS);
        debug!(agent_id = %self.descriptor.id, count = festivals.len(), "festival window scanned");

        if !festivals.is_empty() {
            let peak = peak_multiplier(&festivals);
            let names: Vec<&str> = festivals.iter().map(|f| f.festival.name.as_str()).collect();
            let signal = RiskSignal {
                source: self.descriptor.id.clone(),
                category: RiskCategory::Festival,
                severity: surge_severity(peak),
                load_multiplier: peak,
                summary: format!("Upcoming: {}", names.join(", ")),
            };
            self.toolkit.broadcast_insight(
                &self.descriptor.id,
                RISK_SIGNAL_TOPIC,
                serde_json::to_value(&signal)?,
                Priority::Medium,
            );
        }

        let count = festivals.len();
        Ok(Perception {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            data: to_data(&FestivalWindow { festivals, count })?,
            // the calendar is static
            confidence: 1.0,
        })
    }

    fn reason(&mut self, perception: &Perception) -> SurgeResult<Reasoning> {
        let window: FestivalWindow = decode_data(&perception.data)?;

        if window.festivals.is_empty() {
            self.outlook = Some(Outlook { has_festivals: false, peak_surge_multiplier: 1.0 });
            return Ok(Reasoning {
                agent_id: self.descriptor.id.clone(),
                timestamp: self.toolkit.now(),
                conclusions: vec![format!("No major festivals detected in next {} days", FESTIVAL_WINDOW_DAYS)],
                confidence: 1.0,
                reasoning: "Calendar analysis shows no significant cultural events approaching.".to_string(),
            });
        }

        let festival_uplift = self.toolkit.hospital_config().uplift_factors.festival;
        let mut conclusions: Vec<String> = window
            .festivals
            .iter()
            .map(|f| {
                format!(
                    "{} in {} days: {}x surge expected",
                    f.festival.name, f.days_until, f.festival.surge_multiplier
                )
            })
            .collect();
        conclusions.push(format!("Festival uplift factor: {}x", festival_uplift));

        self.outlook = Some(Outlook {
            has_festivals: true,
            peak_surge_multiplier: peak_multiplier(&window.festivals),
        });
        Ok(Reasoning {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            conclusions,
            confidence: 0.85,
            reasoning: format!(
                "Detected {} upcoming festival(s). Historical data indicates significant patient load \
                 increases during these periods.",
                window.count
            ),
        })
    }

    fn act(&mut self, reasoning: &Reasoning) -> SurgeResult<Action> {
        let outlook = self.outlook.take().ok_or_else(|| out_of_order("festival-detector"))?;
        Ok(Action {
            agent_id: self.descriptor.id.clone(),
            timestamp: self.toolkit.now(),
            kind: ActionKind::FestivalForecast,
            data: to_data(&serde_json::json!({
                "has_upcoming_festivals": outlook.has_festivals,
                "peak_surge_multiplier": outlook.peak_surge_multiplier,
                "festival_details": reasoning.conclusions,
            }))?,
            explanation: reasoning.reasoning.clone(),
        })
    }

    fn reset(&mut self) {
        self.outlook = None;
    }
}

#[cfg(test)]
mod tests {
    use surgecast_core::Agent;

    use super::*;
    use crate::agents::test_support::{at, toolkit_at};

    #[test]
    fn diwali_season_is_forecast() {
        let toolkit = toolkit_at(at(2025, 9, 25));
        let mut agent = Agent::new(FestivalDetector::new(toolkit.clone()));

        let outcome = agent.run(&Scenario::default()).unwrap();

        assert_eq!(outcome.perception.data["count"], 2);
        assert_eq!(outcome.action.kind, ActionKind::FestivalForecast);
        assert_eq!(outcome.action.data["has_upcoming_festivals"], true);
        assert_eq!(outcome.action.data["peak_surge_multiplier"], 3.0);
        assert_eq!(outcome.reasoning.conclusions[0], "Dussehra in 7 days: 2.2x surge expected");

        let signal: RiskSignal = serde_json::from_value(toolkit.bus().messages()[0].content.data.clone()).unwrap();
        assert_eq!(signal.severity, Severity::Critical);
    }

    #[test]
    fn quiet_month_reports_no_festivals_and_stays_silent() {
        let toolkit = toolkit_at(at(2025, 6, 1));
        let mut agent = Agent::new(FestivalDetector::new(toolkit.clone()));

        let outcome = agent.run(&Scenario::default()).unwrap();

        assert_eq!(outcome.reasoning.conclusions.len(), 1);
        assert_eq!(outcome.reasoning.confidence, 1.0);
        assert_eq!(outcome.action.data["has_upcoming_festivals"], false);
        assert!(toolkit.bus().messages().is_empty());
    }

    #[test]
    fn surge_severity_bands() {
        assert_eq!(surge_severity(1.0), Severity::Low);
        assert_eq!(surge_severity(1.3), Severity::Medium);
        assert_eq!(surge_severity(2.0), Severity::High);
        assert_eq!(surge_severity(3.0), Severity::Critical);
    }
}
