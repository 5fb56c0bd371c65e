//! # surgecast-hospital
//!
//! Hospital surge planning on the SURGECAST agent runtime.
//!
//! Six agents run in three phases against one `HospitalConfig`:
//!
//! 1. **Perception**: environment monitor, festival detector, season tracker.
//!    Each broadcasts a risk signal while perceiving.
//! 2. **Reasoning**: the forecaster folds those signals into a risk forecast;
//!    the capacity calculator applies the bed, staff, and supply formulas.
//! 3. **Action**: the resource planner turns capacity needs into a
//!    deployment plan.
//!
//! Live environmental feeds are optional. Without them the environment
//! monitor falls back to a deterministic seasonal simulation.
//!
//! `detect::detect_scenario` picks a scenario from current conditions for
//! callers that do not name one.

pub mod agents;
pub mod capacity;
pub mod config;
pub mod detect;
pub mod forecasting;
pub mod pipeline;
pub mod providers;

pub use detect::{detect_scenario, DetectedScenario};
pub use pipeline::{run_scenario, standard_orchestrator};
