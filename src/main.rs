use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use cohort::comparison;
use cohort::selector::{AgentCapabilities, ArchitectureSelector, TaskCharacteristics};
use cohort::types::{Task, TaskContext};
use cohort::SimConfig;

#[derive(Parser)]
#[command(name = "cohort")]
#[command(about = "Coordination strategy simulation for agent groups", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a task profile and recommend a coordination architecture
    Select {
        #[arg(long, default_value_t = 0.5)]
        parallelizable: f64,
        #[arg(long, default_value_t = 0.5)]
        dynamic: f64,
        #[arg(long, default_value_t = 0.5)]
        sequential: f64,
        #[arg(long, default_value_t = 0.5)]
        tool_intensive: f64,
        #[arg(long, default_value_t = 0.5)]
        complexity: f64,
        #[arg(long, default_value_t = 0.5)]
        baseline_accuracy: f64,
        #[arg(long, default_value_t = 10_000)]
        token_budget: u64,
        #[arg(long, default_value_t = 0.8)]
        model_capability: f64,
    },
    /// Run every architecture on the same workload and report the outcomes
    Compare {
        #[arg(long, default_value_t = 4)]
        agents: usize,
        #[arg(long, default_value_t = 2)]
        team_size: usize,
        #[arg(long, help = "Cost model as a YAML file")]
        config: Option<PathBuf>,
        #[arg(help = "Workload items, distributed across workers and teams")]
        items: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Select {
            parallelizable,
            dynamic,
            sequential,
            tool_intensive,
            complexity,
            baseline_accuracy,
            token_budget,
            model_capability,
        } => {
            let task = TaskCharacteristics {
                parallelizable,
                dynamic,
                sequential,
                tool_intensive,
                complexity,
            };
            let capabilities = AgentCapabilities {
                baseline_accuracy,
                token_budget,
                model_capability,
            };
            let report = ArchitectureSelector::new().explain(&task, &capabilities);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Compare {
            agents,
            team_size,
            config,
            items,
        } => {
            let config = match config {
                Some(path) => SimConfig::from_yaml_file(path)?,
                None => SimConfig::default(),
            };
            let task = if items.is_empty() {
                Task::Value(json!("demo task"))
            } else {
                Task::Batch(items.into_iter().map(Value::from).collect())
            };
            let report =
                comparison::compare(task, TaskContext::new(), config, agents, team_size)
                    .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
