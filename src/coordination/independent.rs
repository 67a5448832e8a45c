use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::agents::{Agent, AgentCore, AgentStats, SoloAgent};
use crate::config::SimConfig;
use crate::error::Error;
use crate::types::{Architecture, Message, Task, TaskContext, TaskResult};

/// N independent executors working the same task in parallel with no
/// information flow between them.
///
/// Aggregation takes the first result *to complete* successfully, which is
/// nondeterministic under concurrent execution. That is a documented property
/// of the protocol, not an accident: independent agents have no shared state
/// with which to break ties any other way.
pub struct IndependentGroup {
    core: AgentCore,
    workers: Vec<Box<dyn Agent>>,
}

impl IndependentGroup {
    pub fn new(
        id: impl Into<String>,
        num_agents: usize,
        config: SimConfig,
    ) -> Result<Self, Error> {
        let id = id.into();
        if num_agents == 0 {
            return Err(Error::InvalidTopology(
                "an independent group needs at least one agent".to_string(),
            ));
        }
        config.validate()?;

        let workers = (0..num_agents)
            .map(|i| {
                Box::new(SoloAgent::new(format!("{id}_agent_{i}"), config.clone()))
                    as Box<dyn Agent>
            })
            .collect();

        Ok(Self {
            core: AgentCore::new(id, config),
            workers,
        })
    }

    pub fn num_agents(&self) -> usize {
        self.workers.len()
    }

    pub fn worker_stats(&self) -> Vec<AgentStats> {
        self.workers.iter().map(|w| w.stats()).collect()
    }

    pub fn total_worker_tokens(&self) -> u64 {
        self.workers.iter().map(|w| w.stats().tokens_used).sum()
    }
}

#[async_trait]
impl Agent for IndependentGroup {
    fn id(&self) -> &str {
        self.core.id()
    }

    async fn execute(&mut self, task: Task, context: TaskContext) -> TaskResult {
        let num_agents = self.workers.len();

        let mut pool = JoinSet::new();
        for (idx, mut worker) in self.workers.drain(..).enumerate() {
            let task = task.clone();
            let context = context.clone();
            pool.spawn(async move {
                let result = worker.execute(task, context).await;
                (idx, worker, result)
            });
        }

        let mut returned: Vec<(usize, Box<dyn Agent>)> = Vec::with_capacity(num_agents);
        let mut first_success: Option<TaskResult> = None;
        let mut child_tokens = 0u64;
        let mut successes = 0u64;
        let mut failures = 0u64;
        let mut errors: Vec<String> = Vec::new();

        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok((idx, worker, result)) => {
                    returned.push((idx, worker));
                    child_tokens += result.tokens_used;
                    if result.success {
                        successes += 1;
                        if first_success.is_none() {
                            first_success = Some(result);
                        }
                    } else {
                        failures += 1;
                        errors.push(
                            result.error.unwrap_or_else(|| "unknown error".to_string()),
                        );
                    }
                }
                Err(join_err) => {
                    failures += 1;
                    errors.push(format!("worker never completed: {join_err}"));
                }
            }
        }
        returned.sort_by_key(|(idx, _)| *idx);
        self.workers = returned.into_iter().map(|(_, worker)| worker).collect();

        self.core.tokens_used += child_tokens;
        self.core.tasks_completed += successes;
        self.core.errors_count += failures;

        match first_success {
            Some(winner) => TaskResult {
                success: true,
                output: winner.output,
                tokens_used: child_tokens,
                error: None,
                metadata: Default::default(),
            }
            .with_meta("architecture", Architecture::Independent.as_str())
            .with_meta("num_agents", num_agents)
            .with_meta("successful_agents", successes)
            .with_meta("failed_agents", failures),
            None => {
                log::warn!("all {num_agents} independent agents failed");
                TaskResult::failure(format!(
                    "All agents failed. Errors: [{}]",
                    errors.join("; ")
                ))
                .with_tokens(child_tokens)
                .with_meta("architecture", Architecture::Independent.as_str())
                .with_meta("num_agents", num_agents)
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
        for worker in &mut self.workers {
            worker.reset();
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
    fn test_zero_agents_rejected() {
        assert!(IndependentGroup::new("independent", 0, SimConfig::default()).is_err());
    }

    #[test]
    fn test_workers_get_distinct_ids() {
        let group = IndependentGroup::new("independent", 3, SimConfig::default()).unwrap();
        let ids: Vec<String> = group
            .worker_stats()
            .into_iter()
            .map(|s| s.agent_id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "independent_agent_0",
                "independent_agent_1",
                "independent_agent_2"
            ]
        );
    }
}
