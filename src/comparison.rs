use chrono::{DateTime, Utc};
use futures::future::{join_all, BoxFuture};
use serde::Serialize;
use uuid::Uuid;

use crate::agents::{Agent, AgentStats, SoloAgent};
use crate::config::SimConfig;
use crate::coordination::{
    CentralizedGroup, DecentralizedGroup, HybridGroup, IndependentGroup,
};
use crate::error::Error;
use crate::metrics;
use crate::types::{Architecture, Task, TaskContext, TaskResult};

/// One architecture's showing in a side-by-side run.
#[derive(Debug, Clone, Serialize)]
pub struct ArchitectureRun {
    pub architecture: Architecture,
    pub result: TaskResult,
    pub stats: AgentStats,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub num_agents: usize,
    pub team_size: usize,
    pub runs: Vec<ArchitectureRun>,
    /// The successful architecture with the best efficiency ratio, if any
    /// architecture succeeded at all.
    pub recommended: Option<Architecture>,
}

/// Run all five architectures against the same task and cost model.
///
/// The architectures execute concurrently with respect to one another; each
/// still honors its own internal concurrency contract (only the independent
/// group parallelizes its workers).
pub async fn compare(
    task: Task,
    context: TaskContext,
    config: SimConfig,
    num_agents: usize,
    team_size: usize,
) -> Result<ComparisonReport, Error> {
    let solo = SoloAgent::new("solo", config.clone());
    let independent = IndependentGroup::new("independent", num_agents, config.clone())?;
    let centralized = CentralizedGroup::new("centralized", num_agents, config.clone())?;
    let decentralized = DecentralizedGroup::new("decentralized", num_agents, config.clone())?;
    let hybrid = HybridGroup::new("hybrid", num_agents, team_size, config.clone())?;

    let baseline_tokens = config.tokens_per_task;
    let started_at = Utc::now();

    let runs: Vec<BoxFuture<'static, ArchitectureRun>> = vec![
        run_one(Architecture::Single, solo, &task, &context, baseline_tokens),
        run_one(
            Architecture::Independent,
            independent,
            &task,
            &context,
            baseline_tokens,
        ),
        run_one(
            Architecture::Centralized,
            centralized,
            &task,
            &context,
            baseline_tokens,
        ),
        run_one(
            Architecture::Decentralized,
            decentralized,
            &task,
            &context,
            baseline_tokens,
        ),
        run_one(Architecture::Hybrid, hybrid, &task, &context, baseline_tokens),
    ];
    let runs = join_all(runs).await;
    let completed_at = Utc::now();

    let mut recommended = None;
    let mut best_efficiency = f64::NEG_INFINITY;
    for run in &runs {
        if run.result.success && run.efficiency > best_efficiency {
            recommended = Some(run.architecture);
            best_efficiency = run.efficiency;
        }
    }

    Ok(ComparisonReport {
        run_id: Uuid::new_v4(),
        started_at,
        completed_at,
        num_agents,
        team_size,
        runs,
        recommended,
    })
}

fn run_one<A: Agent + 'static>(
    architecture: Architecture,
    mut agent: A,
    task: &Task,
    context: &TaskContext,
    baseline_tokens: u64,
) -> BoxFuture<'static, ArchitectureRun> {
    let task = task.clone();
    let context = context.clone();
    Box::pin(async move {
        let result = agent.execute(task, context).await;
        let progress = if result.success { 1.0 } else { 0.0 };
        let efficiency = metrics::efficiency(progress, result.tokens_used, baseline_tokens);
        ArchitectureRun {
            architecture,
            result,
            stats: agent.stats(),
            efficiency,
        }
    })
}
