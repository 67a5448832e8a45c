use async_trait::async_trait;
use serde_json::Value;

use super::collapse_outputs;
use crate::agents::{Agent, AgentCore, AgentStats, SoloAgent};
use crate::config::SimConfig;
use crate::error::Error;
use crate::types::{
    Architecture, Message, MessageKind, Metadata, Task, TaskContext, TaskResult,
};

/// Centralized strategy on top, decentralized execution underneath: a
/// coordinator splits the task into team-level assignments, each fixed-size
/// team works its assignment in a single peer-communication pass, and the
/// coordinator aggregates the team outputs.
///
/// Within a team the decentralized last-success-wins rule applies; across
/// teams the coordinator aggregates in team order.
pub struct HybridGroup {
    core: AgentCore,
    teams: Vec<Vec<Box<dyn Agent>>>,
    team_size: usize,
    coordination_tokens: u64,
    global_state: Metadata,
    team_buffers: Vec<Vec<Message>>,
}

impl HybridGroup {
    pub fn new(
        id: impl Into<String>,
        num_agents: usize,
        team_size: usize,
        config: SimConfig,
    ) -> Result<Self, Error> {
        let id = id.into();
        if num_agents == 0 {
            return Err(Error::InvalidTopology(
                "a hybrid group needs at least one agent".to_string(),
            ));
        }
        if team_size == 0 {
            return Err(Error::InvalidTopology(
                "team_size must be at least 1".to_string(),
            ));
        }
        config.validate()?;

        let num_teams = (num_agents / team_size).max(1);
        let teams = (0..num_teams)
            .map(|team_idx| {
                (0..team_size)
                    .map(|member_idx| {
                        Box::new(SoloAgent::new(
                            format!("{id}_team{team_idx}_agent{member_idx}"),
                            config.clone(),
                        )) as Box<dyn Agent>
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            core: AgentCore::new(id, config),
            teams,
            team_size,
            coordination_tokens: 0,
            global_state: Metadata::new(),
            team_buffers: (0..num_teams).map(|_| Vec::new()).collect(),
        })
    }

    pub fn num_teams(&self) -> usize {
        self.teams.len()
    }

    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// Lifetime strategy + team-communication + aggregation spend.
    pub fn coordination_overhead(&self) -> u64 {
        self.coordination_tokens
    }

    pub fn worker_stats(&self) -> Vec<AgentStats> {
        self.teams
            .iter()
            .flat_map(|team| team.iter().map(|member| member.stats()))
            .collect()
    }

    pub fn total_worker_tokens(&self) -> u64 {
        self.worker_stats().iter().map(|s| s.tokens_used).sum()
    }

    /// Split the task into one assignment per team. Batches are chunked
    /// contiguously with the last team absorbing the remainder; anything
    /// else goes to the first team alone.
    fn strategic_decomposition(&self, task: Task) -> Vec<Option<Task>> {
        let num_teams = self.teams.len();
        match task {
            Task::Batch(items) => {
                let len = items.len();
                let chunk = (len / num_teams).max(1);
                (0..num_teams)
                    .map(|i| {
                        let start = (i * chunk).min(len);
                        let end = if i + 1 < num_teams {
                            ((i + 1) * chunk).min(len)
                        } else {
                            len
                        };
                        Some(Task::Batch(items[start..end.max(start)].to_vec()))
                    })
                    .collect()
            }
            other => {
                let mut assignments = vec![None; num_teams];
                assignments[0] = Some(other);
                assignments
            }
        }
    }

    async fn run_team(
        &mut self,
        team_idx: usize,
        assignment: Option<Task>,
        context: &TaskContext,
        coordination: &mut u64,
    ) -> TaskResult {
        let Some(team_task) = assignment else {
            // Teams without an assignment report a free no-op success.
            return TaskResult {
                success: true,
                output: None,
                tokens_used: 0,
                error: None,
                metadata: Metadata::new(),
            }
            .with_meta("team_idx", team_idx)
            .with_meta("status", "no_task");
        };

        let team_len = self.teams[team_idx].len();
        let mut member_results = Vec::with_capacity(team_len);
        for member_idx in 0..team_len {
            let mut member_context = context.clone();
            member_context.team = Some(team_idx);
            member_context.peer_messages = self.team_buffers[team_idx].clone();
            member_context.global_state = self.global_state.clone();

            let result = self.teams[team_idx][member_idx]
                .execute(team_task.clone(), member_context)
                .await;

            if result.success {
                let message = Message::new(
                    self.teams[team_idx][member_idx].id(),
                    result.output.clone().unwrap_or(Value::Null),
                    MessageKind::TeamResult,
                )
                .with_meta("team_idx", team_idx);
                self.team_buffers[team_idx].push(message);
                *coordination += self.core.config.team_comm_tokens;
            }
            member_results.push(result);
        }

        let member_tokens: u64 = member_results.iter().map(|r| r.tokens_used).sum();
        let succeeded = member_results.iter().filter(|r| r.success).count();
        let winner = member_results.iter().rev().find(|r| r.success);

        match winner {
            Some(last_success) => TaskResult {
                success: true,
                output: last_success.output.clone(),
                tokens_used: member_tokens,
                error: None,
                metadata: Metadata::new(),
            }
            .with_meta("team_idx", team_idx)
            .with_meta("team_size", team_len)
            .with_meta("successful_members", succeeded),
            None => TaskResult::failure("Team failed to complete task")
                .with_tokens(member_tokens)
                .with_meta("team_idx", team_idx),
        }
    }
}

#[async_trait]
impl Agent for HybridGroup {
    fn id(&self) -> &str {
        self.core.id()
    }

    async fn execute(&mut self, task: Task, context: TaskContext) -> TaskResult {
        self.global_state.clear();
        for buffer in &mut self.team_buffers {
            buffer.clear();
        }

        // Strategic decomposition is charged up front, before any team runs.
        let mut coordination = self.core.config.strategy_tokens;
        let assignments = self.strategic_decomposition(task);
        log::debug!(
            "{}: {} teams, {} with assignments",
            self.core.id,
            self.teams.len(),
            assignments.iter().filter(|a| a.is_some()).count()
        );

        let mut team_results = Vec::with_capacity(self.teams.len());
        for (team_idx, assignment) in assignments.into_iter().enumerate() {
            let result = self
                .run_team(team_idx, assignment, &context, &mut coordination)
                .await;
            if result.success {
                self.global_state.insert(
                    format!("team_{team_idx}_result"),
                    result.output.clone().unwrap_or(Value::Null),
                );
            }
            team_results.push(result);
        }

        coordination += self.core.config.aggregation_tokens;

        let member_tokens: u64 = team_results.iter().map(|r| r.tokens_used).sum();
        let total_tokens = member_tokens + coordination;
        self.coordination_tokens += coordination;
        self.core.tokens_used += total_tokens;

        let outputs: Vec<Value> = team_results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.output.clone())
            .collect();
        let successful_teams = outputs.len();
        let failed_teams = team_results.len() - successful_teams;

        if successful_teams > 0 {
            self.core.tasks_completed += successful_teams as u64;
            TaskResult::success(collapse_outputs(outputs), total_tokens)
                .with_meta("architecture", Architecture::Hybrid.as_str())
                .with_meta("num_teams", self.teams.len())
                .with_meta("team_size", self.team_size)
                .with_meta("successful_teams", successful_teams)
                .with_meta("failed_teams", failed_teams)
                .with_meta("coordination_overhead", coordination)
        } else {
            self.core.errors_count += team_results.len() as u64;
            log::warn!("{}: all {} teams failed", self.core.id, team_results.len());
            TaskResult::failure("All teams failed")
                .with_tokens(total_tokens)
                .with_meta("architecture", Architecture::Hybrid.as_str())
                .with_meta("num_teams", self.teams.len())
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
        self.coordination_tokens = 0;
        self.global_state.clear();
        for buffer in &mut self.team_buffers {
            buffer.clear();
        }
        for team in &mut self.teams {
            for member in team {
                member.reset();
            }
        }
    }

    fn stats(&self) -> AgentStats {
        self.core.stats()
    }
}
