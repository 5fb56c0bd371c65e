//! Everything an agent may reach outside itself.
//!
//! One `Toolkit` is built per pipeline and cloned into every agent that
//! needs it. Cloning is cheap: all fields are `Arc`s.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use surgecast_contracts::{
    agent::AgentId,
    config::HospitalConfig,
    message::{AgentMessage, MessageKind, Priority},
};

use crate::{
    bus::MessageBus,
    traits::{Clock, EnvironmentalDataProvider, OfflineEnvironment, SystemClock},
};

#[derive(Clone)]
pub struct Toolkit {
    config: Arc<HospitalConfig>,
    bus: Arc<MessageBus>,
    environment: Arc<dyn EnvironmentalDataProvider>,
    clock: Arc<dyn Clock>,
}

impl Toolkit {
    /// A toolkit with a fresh bus, no live data feeds, and the system clock.
    pub fn new(config: HospitalConfig) -> Self {
        Self {
            config: Arc::new(config),
            bus: Arc::new(MessageBus::new()),
            environment: Arc::new(OfflineEnvironment),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentalDataProvider>) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn hospital_config(&self) -> Arc<HospitalConfig> {
        Arc::clone(&self.config)
    }

    pub fn environment(&self) -> &dyn EnvironmentalDataProvider {
        self.environment.as_ref()
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Send a direct message stamped with the toolkit clock.
    pub fn send_message(
        &self,
        from: &AgentId,
        to: &AgentId,
        kind: MessageKind,
        topic: &str,
        data: Value,
        priority: Priority,
    ) {
        self.bus.send(AgentMessage::direct(
            from.clone(),
            to.clone(),
            kind,
            topic,
            data,
            priority,
            self.now(),
        ));
    }

    /// Broadcast to every other subscriber, stamped with the toolkit clock.
    pub fn broadcast_insight(&self, from: &AgentId, topic: &str, data: Value, priority: Priority) {
        self.bus
            .send(AgentMessage::broadcast(from.clone(), topic, data, priority, self.now()));
    }
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("hospital_id", &self.config.hospital_id)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}
