use async_trait::async_trait;

use super::{collapse_outputs, successful_outputs};
use crate::agents::{Agent, AgentCore, AgentStats, SoloAgent};
use crate::config::SimConfig;
use crate::error::Error;
use crate::types::{Architecture, Message, Metadata, Task, TaskContext, TaskResult};

/// A coordinator that decomposes a task top-down, routes each subtask through
/// one of its workers, and aggregates the outputs in assignment order.
///
/// Batch items are assigned round-robin (item `i` to worker `i mod N`); any
/// other task goes to worker 0 and the rest sit idle for that invocation.
/// Each subtask costs the coordinator a flat coordination fee regardless of
/// its outcome, and successful outputs are folded into the coordinator's
/// per-invocation `global_state` so later subtasks can see them.
pub struct CentralizedGroup {
    core: AgentCore,
    workers: Vec<Box<dyn Agent>>,
    coordination_tokens: u64,
    global_state: Metadata,
}

impl CentralizedGroup {
    pub fn new(
        id: impl Into<String>,
        num_agents: usize,
        config: SimConfig,
    ) -> Result<Self, Error> {
        let id = id.into();
        if num_agents == 0 {
            return Err(Error::InvalidTopology(
                "a centralized group needs at least one worker".to_string(),
            ));
        }
        config.validate()?;

        let workers = (0..num_agents)
            .map(|i| {
                Box::new(SoloAgent::new(format!("{id}_worker_{i}"), config.clone()))
                    as Box<dyn Agent>
            })
            .collect();

        Ok(Self {
            core: AgentCore::new(id, config),
            workers,
            coordination_tokens: 0,
            global_state: Metadata::new(),
        })
    }

    pub fn num_agents(&self) -> usize {
        self.workers.len()
    }

    /// Lifetime coordination spend, excluding worker task-execution tokens.
    pub fn coordination_overhead(&self) -> u64 {
        self.coordination_tokens
    }

    pub fn worker_stats(&self) -> Vec<AgentStats> {
        self.workers.iter().map(|w| w.stats()).collect()
    }

    pub fn total_worker_tokens(&self) -> u64 {
        self.workers.iter().map(|w| w.stats().tokens_used).sum()
    }

    fn decompose(&self, task: Task) -> Vec<(usize, Task)> {
        match task {
            Task::Batch(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i % self.workers.len(), Task::Value(item)))
                .collect(),
            other => vec![(0, other)],
        }
    }
}

#[async_trait]
impl Agent for CentralizedGroup {
    fn id(&self) -> &str {
        self.core.id()
    }

    async fn execute(&mut self, task: Task, context: TaskContext) -> TaskResult {
        self.global_state.clear();

        let assignments = self.decompose(task);
        log::debug!(
            "{}: dispatching {} subtasks across {} workers",
            self.core.id,
            assignments.len(),
            self.workers.len()
        );

        let mut results = Vec::with_capacity(assignments.len());
        let mut coordination = 0u64;
        for (worker_idx, subtask) in assignments {
            let mut subtask_context = context.clone();
            subtask_context.global_state = self.global_state.clone();

            let result = self.workers[worker_idx].execute(subtask, subtask_context).await;
            if result.success {
                if let Some(output) = &result.output {
                    let key = format!("result_{}", self.workers[worker_idx].id());
                    self.global_state.insert(key, output.clone());
                }
            }
            coordination += self.core.config.coordination_tokens_per_task;
            results.push(result);
        }

        let child_tokens: u64 = results.iter().map(|r| r.tokens_used).sum();
        let total_tokens = child_tokens + coordination;
        self.coordination_tokens += coordination;
        self.core.tokens_used += total_tokens;

        let outputs = successful_outputs(&results);
        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;

        if succeeded > 0 {
            self.core.tasks_completed += succeeded as u64;
            TaskResult::success(collapse_outputs(outputs), total_tokens)
                .with_meta("architecture", Architecture::Centralized.as_str())
                .with_meta("num_agents", self.workers.len())
                .with_meta("successful_subtasks", succeeded)
                .with_meta("failed_subtasks", failed)
                .with_meta("coordination_overhead", coordination)
        } else {
            self.core.errors_count += results.len() as u64;
            log::warn!("{}: all {} subtasks failed", self.core.id, results.len());
            TaskResult::failure("All subtasks failed")
                .with_tokens(total_tokens)
                .with_meta("architecture", Architecture::Centralized.as_str())
                .with_meta("num_agents", self.workers.len())
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
        for worker in &mut self.workers {
            worker.reset();
        }
    }

    fn stats(&self) -> AgentStats {
        self.core.stats()
    }
}
