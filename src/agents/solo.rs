use async_trait::async_trait;
use serde_json::Value;

use super::{Agent, AgentCore, AgentStats};
use crate::config::SimConfig;
use crate::types::{Architecture, Message, Task, TaskContext, TaskResult};

/// A single executor: runs one task directly, with no coordination. Every
/// composite architecture builds its workers out of these.
#[derive(Debug, Clone)]
pub struct SoloAgent {
    core: AgentCore,
}

impl SoloAgent {
    pub fn new(id: impl Into<String>, config: SimConfig) -> Self {
        Self {
            core: AgentCore::new(id, config),
        }
    }
}

#[async_trait]
impl Agent for SoloAgent {
    fn id(&self) -> &str {
        self.core.id()
    }

    async fn execute(&mut self, task: Task, context: TaskContext) -> TaskResult {
        let outcome = match task {
            Task::Compute(f) => f(&context),
            Task::Value(value) => Ok(value),
            Task::Batch(items) => Ok(Value::Array(items)),
        };

        match outcome {
            Ok(output) => {
                let tokens = self.core.config.tokens_per_task;
                self.core.tokens_used += tokens;
                self.core.tasks_completed += 1;
                TaskResult::success(output, tokens)
                    .with_meta("architecture", Architecture::Single.as_str())
                    .with_meta("agent_id", self.core.id.clone())
            }
            Err(err) => {
                // Failed attempts consume no simulated tokens.
                self.core.errors_count += 1;
                TaskResult::failure(err.to_string())
                    .with_meta("architecture", Architecture::Single.as_str())
                    .with_meta("agent_id", self.core.id.clone())
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
    }

    fn stats(&self) -> AgentStats {
        self.core.stats()
    }
}
