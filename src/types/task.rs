use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use super::{Message, Metadata};

pub type TaskFn = Arc<dyn Fn(&TaskContext) -> Result<Value> + Send + Sync>;

/// A unit of simulated work. `Compute` stands in for a real model call;
/// `Value` is a precomputed result passed through unchanged; `Batch` is the
/// decomposable form whose items coordinators distribute across workers or
/// teams. A plain executor handed a `Batch` passes the whole sequence
/// through as an array.
#[derive(Clone)]
pub enum Task {
    Compute(TaskFn),
    Value(Value),
    Batch(Vec<Value>),
}

impl Task {
    pub fn compute<F>(f: F) -> Self
    where
        F: Fn(&TaskContext) -> Result<Value> + Send + Sync + 'static,
    {
        Task::Compute(Arc::new(f))
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Compute(_) => f.write_str("Task::Compute(..)"),
            Task::Value(v) => f.debug_tuple("Task::Value").field(v).finish(),
            Task::Batch(items) => f.debug_tuple("Task::Batch").field(items).finish(),
        }
    }
}

impl From<Value> for Task {
    fn from(value: Value) -> Self {
        Task::Value(value)
    }
}

/// Context handed to an executing agent. Coordinators enrich a caller's base
/// context with round/team indices, peer traffic, and a read-only snapshot
/// of their own state before dispatching each subtask.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    pub data: Metadata,
    pub round: Option<u32>,
    pub team: Option<usize>,
    pub peer_messages: Vec<Message>,
    pub global_state: Metadata,
}

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}
