use async_trait::async_trait;
use serde_json::Value;

use crate::agents::{Agent, AgentCore, AgentStats, SoloAgent};
use crate::config::SimConfig;
use crate::error::Error;
use crate::types::{
    Architecture, Message, MessageKind, Task, TaskContext, TaskResult,
};

/// Peer agents executing the same task over a fixed number of rounds,
/// broadcasting every successful output to the other peers between
/// executions. There is no coordinator; consensus is the simplified
/// last-successful-result-wins rule, not a vote.
pub struct DecentralizedGroup {
    core: AgentCore,
    peers: Vec<Box<dyn Agent>>,
    communication_tokens: u64,
    shared_messages: Vec<Message>,
}

impl DecentralizedGroup {
    pub fn new(
        id: impl Into<String>,
        num_agents: usize,
        config: SimConfig,
    ) -> Result<Self, Error> {
        let id = id.into();
        if num_agents == 0 {
            return Err(Error::InvalidTopology(
                "a decentralized group needs at least one peer".to_string(),
            ));
        }
        config.validate()?;

        let peers = (0..num_agents)
            .map(|i| {
                Box::new(SoloAgent::new(format!("{id}_peer_{i}"), config.clone()))
                    as Box<dyn Agent>
            })
            .collect();

        Ok(Self {
            core: AgentCore::new(id, config),
            peers,
            communication_tokens: 0,
            shared_messages: Vec::new(),
        })
    }

    pub fn num_agents(&self) -> usize {
        self.peers.len()
    }

    /// Lifetime broadcast spend, excluding peer task-execution tokens.
    pub fn communication_overhead(&self) -> u64 {
        self.communication_tokens
    }

    pub fn worker_stats(&self) -> Vec<AgentStats> {
        self.peers.iter().map(|p| p.stats()).collect()
    }

    pub fn total_worker_tokens(&self) -> u64 {
        self.peers.iter().map(|p| p.stats().tokens_used).sum()
    }
}

#[async_trait]
impl Agent for DecentralizedGroup {
    fn id(&self) -> &str {
        self.core.id()
    }

    async fn execute(&mut self, task: Task, context: TaskContext) -> TaskResult {
        self.shared_messages.clear();

        let num_peers = self.peers.len();
        let rounds = self.core.config.coordination_rounds;
        let mut pooled: Vec<TaskResult> = Vec::new();
        let mut communication = 0u64;

        for round in 0..rounds {
            for peer_idx in 0..num_peers {
                let peer_id = self.peers[peer_idx].id().to_string();

                let mut peer_context = context.clone();
                peer_context.round = Some(round);
                peer_context.peer_messages = self
                    .shared_messages
                    .iter()
                    .filter(|m| m.sender_id != peer_id)
                    .cloned()
                    .collect();

                let result = self.peers[peer_idx]
                    .execute(task.clone(), peer_context)
                    .await;

                if result.success {
                    // Stored once, delivered to every other peer; the
                    // broadcast fee scales with the recipient count.
                    let message = Message::new(
                        peer_id,
                        result.output.clone().unwrap_or(Value::Null),
                        MessageKind::TaskResult,
                    )
                    .with_meta("round", round);
                    self.shared_messages.push(message.clone());
                    communication += self.core.config.communication_tokens_per_message
                        * (num_peers as u64 - 1);
                    for other_idx in 0..num_peers {
                        if other_idx != peer_idx {
                            self.peers[other_idx].receive(message.clone());
                        }
                    }
                }
                pooled.push(result);
            }
        }

        let peer_tokens: u64 = pooled.iter().map(|r| r.tokens_used).sum();
        let total_tokens = peer_tokens + communication;
        self.communication_tokens += communication;
        self.core.tokens_used += total_tokens;

        let succeeded = pooled.iter().filter(|r| r.success).count();
        let failed = pooled.len() - succeeded;
        let consensus = pooled.iter().rev().find(|r| r.success);

        match consensus {
            Some(winner) => {
                self.core.tasks_completed += succeeded as u64;
                TaskResult {
                    success: true,
                    output: winner.output.clone(),
                    tokens_used: total_tokens,
                    error: None,
                    metadata: Default::default(),
                }
                .with_meta("architecture", Architecture::Decentralized.as_str())
                .with_meta("num_agents", num_peers)
                .with_meta("successful_results", succeeded)
                .with_meta("failed_results", failed)
                .with_meta("messages_exchanged", self.shared_messages.len())
                .with_meta("communication_overhead", communication)
            }
            None => {
                self.core.errors_count += pooled.len() as u64;
                log::warn!(
                    "{}: no peer produced a result in {rounds} rounds",
                    self.core.id
                );
                TaskResult::failure("No agents reached consensus")
                    .with_tokens(total_tokens)
                    .with_meta("architecture", Architecture::Decentralized.as_str())
                    .with_meta("num_agents", num_peers)
            }
        }
    }

    fn send(&mut self, message: Message) {
        self.core.log_message(message);
    }

    fn receive(&mut self, message: Message) {
        self.core.log_message(message);
    }

    fn reset(&mut self) {
        self.core.reset();
        self.communication_tokens = 0;
        self.shared_messages.clear();
        for peer in &mut self.peers {
            peer.reset();
        }
    }

    fn stats(&self) -> AgentStats {
        self.core.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_peers_rejected() {
        assert!(DecentralizedGroup::new("mesh", 0, SimConfig::default()).is_err());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let config = SimConfig {
            coordination_rounds: 0,
            ..SimConfig::default()
        };
        assert!(DecentralizedGroup::new("mesh", 3, config).is_err());
    }
}
