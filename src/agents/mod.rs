pub mod solo;

pub use solo::SoloAgent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::types::{Message, Task, TaskContext, TaskResult};

/// Execution contract shared by the single executor and every composite
/// architecture. Only `execute` can fail, and its failure is captured in the
/// returned [`TaskResult`] rather than propagated.
#[async_trait]
pub trait Agent: Send {
    fn id(&self) -> &str;

    async fn execute(&mut self, task: Task, context: TaskContext) -> TaskResult;

    /// Record an outgoing message in this agent's log.
    fn send(&mut self, message: Message);

    /// Record an incoming message in this agent's log.
    fn receive(&mut self, message: Message);

    /// Zero all counters and clear the message log.
    fn reset(&mut self);

    /// Snapshot of this agent's lifetime counters.
    fn stats(&self) -> AgentStats;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStats {
    pub agent_id: String,
    pub tokens_used: u64,
    pub tasks_completed: u64,
    pub errors_count: u64,
    pub messages_sent: usize,
    pub messages_received: usize,
}

/// State every agent carries: identity, cost model, lifetime counters, and
/// the message log. Composites embed one for their own accounting alongside
/// the workers they own.
#[derive(Debug, Clone)]
pub struct AgentCore {
    pub(crate) id: String,
    pub(crate) config: SimConfig,
    pub(crate) tokens_used: u64,
    pub(crate) tasks_completed: u64,
    pub(crate) errors_count: u64,
    pub(crate) message_log: Vec<Message>,
}

impl AgentCore {
    pub fn new(id: impl Into<String>, config: SimConfig) -> Self {
        Self {
            id: id.into(),
            config,
            tokens_used: 0,
            tasks_completed: 0,
            errors_count: 0,
            message_log: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn log_message(&mut self, message: Message) {
        self.message_log.push(message);
    }

    pub fn reset(&mut self) {
        self.tokens_used = 0;
        self.tasks_completed = 0;
        self.errors_count = 0;
        self.message_log.clear();
    }

    pub fn stats(&self) -> AgentStats {
        let sent = self
            .message_log
            .iter()
            .filter(|m| m.sender_id == self.id)
            .count();
        AgentStats {
            agent_id: self.id.clone(),
            tokens_used: self.tokens_used,
            tasks_completed: self.tasks_completed,
            errors_count: self.errors_count,
            messages_sent: sent,
            messages_received: self.message_log.len() - sent,
        }
    }
}
