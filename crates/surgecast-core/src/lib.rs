//! # surgecast-core
//!
//! The Perception-Reasoning-Action runtime for SURGECAST agents.
//!
//! This crate provides:
//! - The plug-in traits (`Cognition`, `EnvironmentalDataProvider`, `Clock`)
//! - The `Agent` runtime that enforces the perceive → reason → act cycle
//! - The `MessageBus` for synchronous inter-agent messages
//! - The `Toolkit` handed to agents, and the `Orchestrator` that runs them
//!
//! ## Usage
//!
//! ```rust,ignore
//! use surgecast_core::{Orchestrator, Toolkit};
//!
//! let mut orch = Orchestrator::new(Toolkit::new(config));
//! orch.register_agent(my_agent)?;
//! let outputs = orch.execute_agents(&Scenario::default())?;
//! ```

pub mod agent;
pub mod bus;
pub mod memory;
pub mod orchestrator;
pub mod toolkit;
pub mod traits;

pub use agent::Agent;
pub use bus::{MessageBus, SharedAgent};
pub use orchestrator::Orchestrator;
pub use toolkit::Toolkit;
