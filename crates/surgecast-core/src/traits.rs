//! Core trait definitions for the SURGECAST agent pipeline.
//!
//! These traits define the seams between the runtime and its plug-ins:
//!
//! - `Cognition`: an agent's perceive / reason / act logic
//! - `EnvironmentalDataProvider`: live weather and air-quality feeds
//! - `Clock`: the source of "now" for timestamps and season detection
//!
//! The `Agent` runtime wraps a `Cognition` with status, memory, and traces.
//! Implementations of `Cognition` never touch those directly.

use chrono::{DateTime, Utc};

use surgecast_contracts::{
    agent::AgentDescriptor,
    config::Location,
    cycle::{Action, Perception, Reasoning},
    environment::{AirQualityReading, WeatherReading},
    error::SurgeResult,
    execution::Scenario,
    message::AgentMessage,
};

use crate::memory::{AgentMemory, WorkingMemory};

/// The sense → think → act capability every agent implements.
///
/// The runtime calls `perceive`, then `reason` with its result, then `act`
/// with that result, strictly in sequence. `perceive` is the only method
/// allowed to reach external data sources; `reason` and `act` must be
/// CPU-only.
pub trait Cognition: Send {
    /// Identity and pipeline role. Must not change over the agent's lifetime.
    fn descriptor(&self) -> &AgentDescriptor;

    /// Gather input for this cycle.
    ///
    /// Agents with live data dependencies must recover from provider failure
    /// locally (fallback data, lowered confidence) rather than returning `Err`.
    fn perceive(&mut self, scenario: &Scenario, memory: &AgentMemory) -> SurgeResult<Perception>;

    /// Derive conclusions from `perception`. No I/O.
    ///
    /// Must produce at least one conclusion and a confidence in `[0, 1]`.
    fn reason(&mut self, perception: &Perception) -> SurgeResult<Reasoning>;

    /// Turn `reasoning` into a tagged action. No I/O.
    ///
    /// The action's explanation must be derived from `reasoning.reasoning`.
    fn act(&mut self, reasoning: &Reasoning) -> SurgeResult<Action>;

    /// Handle a message delivered by the bus. Default: ignore it.
    ///
    /// Implementations that want to use messages on their next `perceive`
    /// should stash them in `working` (e.g. `working.inbox`).
    fn receive_message(&mut self, _message: &AgentMessage, _working: &mut WorkingMemory) {}

    /// Drop any per-cycle scratch state. Called by `Agent::reset()`.
    fn reset(&mut self) {}
}

/// A source of live environmental data.
///
/// Both methods return `None` on any failure (network error, missing key,
/// unknown city). They never return an error.
pub trait EnvironmentalDataProvider: Send + Sync {
    fn weather(&self, location: &Location) -> Option<WeatherReading>;

    fn air_quality(&self, location: &Location) -> Option<AirQualityReading>;
}

/// A provider with no live feeds. Every perceiving agent falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEnvironment;

impl EnvironmentalDataProvider for OfflineEnvironment {
    fn weather(&self, _location: &Location) -> Option<WeatherReading> {
        None
    }

    fn air_quality(&self, _location: &Location) -> Option<AirQualityReading> {
        None
    }
}

/// The source of wall-clock time for the pipeline.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Used by tests and replayed scenarios.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
