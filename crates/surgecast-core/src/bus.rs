//! The in-process message bus.
//!
//! Delivery is synchronous: `send()` hands the message to each recipient's
//! `Agent::receive_message` before returning. The subscriber list is
//! snapshotted under the bus lock and the lock is released before delivery,
//! so a recipient may send from inside its handler.
//!
//! The agent that is currently running holds its own lock. Messages that
//! would need that lock (a direct message addressed to the sender itself, or
//! any recipient that is busy) are dropped with a log entry instead of
//! blocking.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use tracing::debug;

use surgecast_contracts::{
    agent::AgentId,
    message::{AgentMessage, Recipient},
};

use crate::agent::Agent;

/// How the orchestrator and the bus share an agent.
pub type SharedAgent = Arc<Mutex<Agent>>;

#[derive(Default)]
struct BusState {
    /// Registration order is delivery order.
    subscribers: Vec<(AgentId, SharedAgent)>,
    queue: Vec<AgentMessage>,
}

#[derive(Default)]
pub struct MessageBus {
    state: Mutex<BusState>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `agent` under `agent_id`. Re-subscribing an id keeps its
    /// original position.
    pub fn subscribe(&self, agent_id: AgentId, agent: SharedAgent) {
        let mut state = self.lock();
        if state.subscribers.iter().any(|(id, _)| *id == agent_id) {
            return;
        }
        debug!(agent_id = %agent_id, "bus subscribe");
        state.subscribers.push((agent_id, agent));
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, agent_id: &AgentId) {
        let mut state = self.lock();
        state.subscribers.retain(|(id, _)| id != agent_id);
    }

    pub fn is_subscribed(&self, agent_id: &AgentId) -> bool {
        self.lock().subscribers.iter().any(|(id, _)| id == agent_id)
    }

    /// Queue `message` for audit and deliver it.
    ///
    /// Broadcasts reach every subscriber except the sender, in subscription
    /// order. Direct messages reach their recipient only if it is subscribed.
    pub fn send(&self, message: AgentMessage) {
        let recipients: Vec<(AgentId, SharedAgent)> = {
            let mut state = self.lock();
            state.queue.push(message.clone());
            match &message.to {
                Recipient::All => state
                    .subscribers
                    .iter()
                    .filter(|(id, _)| *id != message.from)
                    .cloned()
                    .collect(),
                Recipient::Agent(to) => state
                    .subscribers
                    .iter()
                    .filter(|(id, _)| id == to)
                    .cloned()
                    .collect(),
            }
        };

        if recipients.is_empty() && !message.is_broadcast() {
            debug!(from = %message.from, to = %String::from(message.to.clone()), "no such recipient, message dropped");
            return;
        }

        for (id, agent) in recipients {
            if id == message.from {
                debug!(agent_id = %id, topic = %message.content.topic, "self-addressed message dropped");
                continue;
            }
            match agent.try_lock() {
                Ok(mut agent) => agent.receive_message(&message),
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().receive_message(&message),
                Err(TryLockError::WouldBlock) => {
                    debug!(agent_id = %id, topic = %message.content.topic, "recipient busy, message dropped");
                }
            }
        }
    }

    /// Snapshot of every message sent since the last `clear_messages()`.
    pub fn messages(&self) -> Vec<AgentMessage> {
        self.lock().queue.clone()
    }

    /// Empty the audit queue. Subscribers are kept.
    pub fn clear_messages(&self) {
        self.lock().queue.clear();
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MessageBus")
            .field("subscribers", &state.subscribers.iter().map(|(id, _)| id).collect::<Vec<_>>())
            .field("queued", &state.queue.len())
            .finish()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use surgecast_contracts::{
        agent::{AgentDescriptor, AgentRole},
        cycle::{Action, Perception, Reasoning},
        error::{SurgeError, SurgeResult},
        execution::Scenario,
        message::{MessageKind, Priority},
    };

    use crate::{
        memory::{AgentMemory, WorkingMemory},
        traits::Cognition,
    };

    use super::*;

    /// Records the topics it receives; never runs.
    struct Listener {
        descriptor: AgentDescriptor,
        received: Arc<Mutex<Vec<String>>>,
    }

    impl Cognition for Listener {
        fn descriptor(&self) -> &AgentDescriptor {
            &self.descriptor
        }

        fn perceive(&mut self, _: &Scenario, _: &AgentMemory) -> SurgeResult<Perception> {
            Err(SurgeError::MalformedPerception { reason: "listener only".to_string() })
        }

        fn reason(&mut self, _: &Perception) -> SurgeResult<Reasoning> {
            Err(SurgeError::MalformedPerception { reason: "listener only".to_string() })
        }

        fn act(&mut self, _: &Reasoning) -> SurgeResult<Action> {
            Err(SurgeError::MalformedPerception { reason: "listener only".to_string() })
        }

        fn receive_message(&mut self, message: &AgentMessage, _working: &mut WorkingMemory) {
            self.received.lock().unwrap().push(message.content.topic.clone());
        }
    }

    fn listener(id: &str) -> (SharedAgent, Arc<Mutex<Vec<String>>>) {
        let received = Arc::new(Mutex::new(vec![]));
        let cognition = Listener {
            descriptor: AgentDescriptor::new(id, id, AgentRole::Perception, "listens", &[]),
            received: received.clone(),
        };
        (Arc::new(Mutex::new(Agent::new(cognition))), received)
    }

    fn broadcast_from(from: &str, topic: &str) -> AgentMessage {
        AgentMessage::broadcast(AgentId::new(from), topic, json!({}), Priority::Medium, Utc::now())
    }

    fn direct(from: &str, to: &str, topic: &str) -> AgentMessage {
        AgentMessage::direct(
            AgentId::new(from),
            AgentId::new(to),
            MessageKind::Request,
            topic,
            json!({}),
            Priority::High,
            Utc::now(),
        )
    }

    #[test]
    fn broadcast_reaches_every_other_subscriber_once() {
        let bus = MessageBus::new();
        let (a, a_rx) = listener("a");
        let (b, b_rx) = listener("b");
        let (c, c_rx) = listener("c");
        bus.subscribe(AgentId::new("a"), a);
        bus.subscribe(AgentId::new("b"), b);
        bus.subscribe(AgentId::new("c"), c);

        bus.send(broadcast_from("a", "risk-signal"));

        assert!(a_rx.lock().unwrap().is_empty(), "sender must not receive its own broadcast");
        assert_eq!(*b_rx.lock().unwrap(), vec!["risk-signal"]);
        assert_eq!(*c_rx.lock().unwrap(), vec!["risk-signal"]);
    }

    #[test]
    fn direct_message_reaches_only_its_recipient() {
        let bus = MessageBus::new();
        let (a, a_rx) = listener("a");
        let (b, b_rx) = listener("b");
        bus.subscribe(AgentId::new("a"), a);
        bus.subscribe(AgentId::new("b"), b);

        bus.send(direct("a", "b", "beds?"));

        assert!(a_rx.lock().unwrap().is_empty());
        assert_eq!(*b_rx.lock().unwrap(), vec!["beds?"]);
    }

    #[test]
    fn unknown_recipient_is_dropped_but_audited() {
        let bus = MessageBus::new();
        let (a, a_rx) = listener("a");
        bus.subscribe(AgentId::new("a"), a);

        bus.send(direct("a", "ghost", "hello"));

        assert!(a_rx.lock().unwrap().is_empty());
        assert_eq!(bus.messages().len(), 1);
    }

    #[test]
    fn busy_recipient_does_not_block_send() {
        let bus = MessageBus::new();
        let (a, a_rx) = listener("a");
        bus.subscribe(AgentId::new("a"), a.clone());

        let _running = a.lock().unwrap();
        bus.send(broadcast_from("b", "risk-signal"));
        drop(_running);

        assert!(a_rx.lock().unwrap().is_empty());
    }

    #[test]
    fn subscribe_is_idempotent_and_unsubscribe_stops_delivery() {
        let bus = MessageBus::new();
        let (a, a_rx) = listener("a");
        bus.subscribe(AgentId::new("a"), a.clone());
        bus.subscribe(AgentId::new("a"), a);

        bus.send(broadcast_from("x", "one"));
        assert_eq!(a_rx.lock().unwrap().len(), 1, "double subscribe must not double deliver");

        bus.unsubscribe(&AgentId::new("a"));
        bus.unsubscribe(&AgentId::new("a"));
        bus.send(broadcast_from("x", "two"));
        assert_eq!(a_rx.lock().unwrap().len(), 1);
        assert!(!bus.is_subscribed(&AgentId::new("a")));
    }

    #[test]
    fn clear_messages_keeps_subscribers() {
        let bus = MessageBus::new();
        let (a, a_rx) = listener("a");
        bus.subscribe(AgentId::new("a"), a);

        bus.send(broadcast_from("x", "one"));
        let snapshot = bus.messages();
        bus.clear_messages();

        assert_eq!(snapshot.len(), 1, "snapshot is a copy");
        assert!(bus.messages().is_empty());

        bus.send(broadcast_from("x", "two"));
        assert_eq!(*a_rx.lock().unwrap(), vec!["one", "two"]);
    }
}
