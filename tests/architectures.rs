use anyhow::anyhow;
use serde_json::json;

use cohort::agents::{Agent, SoloAgent};
use cohort::coordination::{
    CentralizedGroup, DecentralizedGroup, HybridGroup, IndependentGroup,
};
use cohort::types::{Task, TaskContext};
use cohort::SimConfig;

fn config(tokens_per_task: u64) -> SimConfig {
    SimConfig {
        tokens_per_task,
        ..SimConfig::default()
    }
}

fn failing_task() -> Task {
    Task::compute(|_| Err(anyhow!("simulated model failure")))
}

#[tokio::test]
async fn test_independent_token_sum_is_n_times_t() {
    let mut group = IndependentGroup::new("independent", 3, config(10)).unwrap();
    let result = group.execute(Task::Value(json!("work")), TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(result.tokens_used, 30);
    assert_eq!(group.total_worker_tokens(), 30);
    assert_eq!(result.metadata["successful_agents"], json!(3));
    assert_eq!(result.metadata["failed_agents"], json!(0));
    assert_eq!(result.metadata["architecture"], json!("independent"));
}

#[tokio::test]
async fn test_independent_first_completed_success_wins() {
    // All workers compute the same output, so whichever completes first the
    // aggregate output is stable even though completion order is not.
    let mut group = IndependentGroup::new("independent", 4, SimConfig::default()).unwrap();
    let task = Task::compute(|_| Ok(json!("answer")));
    let result = group.execute(task, TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(result.output, Some(json!("answer")));
}

#[tokio::test]
async fn test_independent_all_failures_listed() {
    let mut group = IndependentGroup::new("independent", 3, SimConfig::default()).unwrap();
    let result = group.execute(failing_task(), TaskContext::new()).await;

    assert!(!result.success);
    assert_eq!(result.tokens_used, 0);
    let error = result.error.unwrap();
    assert!(error.starts_with("All agents failed"));
    assert!(error.contains("simulated model failure"));
    assert_eq!(group.stats().errors_count, 3);
}

#[tokio::test]
async fn test_centralized_round_robin_scenario() {
    let config = SimConfig {
        tokens_per_task: 10,
        coordination_tokens_per_task: 5,
        ..SimConfig::default()
    };
    let mut group = CentralizedGroup::new("centralized", 3, config).unwrap();
    let result = group
        .execute(
            Task::Batch(vec![json!("task1"), json!("task2"), json!("task3")]),
            TaskContext::new(),
        )
        .await;

    assert!(result.success);
    assert_eq!(
        result.output,
        Some(json!(["task1", "task2", "task3"]))
    );
    assert_eq!(group.total_worker_tokens(), 30);
    assert_eq!(group.coordination_overhead(), 15);
    assert_eq!(result.tokens_used, 45);
    assert_eq!(result.metadata["successful_subtasks"], json!(3));
    assert_eq!(result.metadata["coordination_overhead"], json!(15));
}

#[tokio::test]
async fn test_centralized_single_task_uses_one_worker() {
    let mut group = CentralizedGroup::new("centralized", 3, config(10)).unwrap();
    let result = group.execute(Task::Value(json!("only")), TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(result.output, Some(json!("only")));

    let worker_stats = group.worker_stats();
    assert_eq!(worker_stats[0].tasks_completed, 1);
    assert_eq!(worker_stats[1].tasks_completed, 0);
    assert_eq!(worker_stats[2].tasks_completed, 0);
}

#[tokio::test]
async fn test_centralized_coordination_charged_even_on_failure() {
    let mut group = CentralizedGroup::new("centralized", 2, SimConfig::default()).unwrap();
    let result = group.execute(failing_task(), TaskContext::new()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("All subtasks failed"));
    // One failed subtask still costs one coordination fee.
    assert_eq!(group.coordination_overhead(), 10);
    assert_eq!(result.tokens_used, 10);
}

#[tokio::test]
async fn test_decentralized_single_round_scenario() {
    let config = SimConfig {
        tokens_per_task: 10,
        communication_tokens_per_message: 2,
        coordination_rounds: 1,
        ..SimConfig::default()
    };
    let mut group = DecentralizedGroup::new("decentralized", 3, config).unwrap();
    let result = group.execute(Task::Value(json!("work")), TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(group.total_worker_tokens(), 30);
    assert_eq!(group.communication_overhead(), 12);
    assert_eq!(result.tokens_used, 42);
    assert_eq!(result.metadata["messages_exchanged"], json!(3));
    assert_eq!(result.metadata["communication_overhead"], json!(12));
}

#[tokio::test]
async fn test_decentralized_multi_round_token_accounting() {
    let config = SimConfig {
        tokens_per_task: 10,
        communication_tokens_per_message: 5,
        coordination_rounds: 2,
        ..SimConfig::default()
    };
    let mut group = DecentralizedGroup::new("decentralized", 3, config).unwrap();
    let result = group.execute(Task::Value(json!("work")), TaskContext::new()).await;

    // N * R executions and a broadcast to N-1 peers after each success.
    assert_eq!(group.total_worker_tokens(), 3 * 2 * 10);
    assert_eq!(group.communication_overhead(), 3 * 2 * 5 * 2);
    assert_eq!(result.metadata["successful_results"], json!(6));
    assert_eq!(result.metadata["failed_results"], json!(0));
}

#[tokio::test]
async fn test_decentralized_peers_see_prior_broadcasts_and_last_wins() {
    let config = SimConfig {
        coordination_rounds: 1,
        ..SimConfig::default()
    };
    let mut group = DecentralizedGroup::new("decentralized", 3, config).unwrap();
    // Each peer reports how many peer messages it could see; peers run in
    // order within the round, so the pool ends 0, 1, 2 and the last wins.
    let task = Task::compute(|ctx| Ok(json!(ctx.peer_messages.len())));
    let result = group.execute(task, TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(result.output, Some(json!(2)));

    // Every peer received the broadcasts of the other two.
    for stats in group.worker_stats() {
        assert_eq!(stats.messages_received, 2);
    }
}

#[tokio::test]
async fn test_decentralized_no_consensus() {
    let mut group = DecentralizedGroup::new("decentralized", 2, SimConfig::default()).unwrap();
    let result = group.execute(failing_task(), TaskContext::new()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("No agents reached consensus"));
    assert_eq!(result.tokens_used, 0);
}

#[tokio::test]
async fn test_hybrid_overhead_breakdown() {
    let config = SimConfig {
        tokens_per_task: 10,
        strategy_tokens: 5,
        team_comm_tokens: 2,
        aggregation_tokens: 5,
        ..SimConfig::default()
    };
    let mut group = HybridGroup::new("hybrid", 4, 2, config).unwrap();
    let result = group
        .execute(
            Task::Batch(vec![json!("task1"), json!("task2")]),
            TaskContext::new(),
        )
        .await;

    assert!(result.success);
    // strategy + one comm fee per successful member + aggregation.
    assert_eq!(group.coordination_overhead(), 5 + 2 * 2 * 2 + 5);
    assert_eq!(group.total_worker_tokens(), 40);
    assert_eq!(result.tokens_used, 40 + 18);
    assert_eq!(result.metadata["successful_teams"], json!(2));
    assert_eq!(result.metadata["failed_teams"], json!(0));
    assert_eq!(result.metadata["coordination_overhead"], json!(18));
}

#[tokio::test]
async fn test_hybrid_chunks_batch_across_teams() {
    let mut group = HybridGroup::new("hybrid", 4, 2, config(10)).unwrap();
    let result = group
        .execute(
            Task::Batch(vec![json!("a"), json!("b"), json!("c"), json!("d")]),
            TaskContext::new(),
        )
        .await;

    assert!(result.success);
    // Each team's members pass their chunk through; two team outputs remain.
    assert_eq!(result.output, Some(json!([["a", "b"], ["c", "d"]])));
}

#[tokio::test]
async fn test_hybrid_single_task_runs_first_team_only() {
    let mut group = HybridGroup::new("hybrid", 6, 2, config(10)).unwrap();
    let result = group.execute(Task::Value(json!("solo work")), TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(result.output, Some(json!("solo work")));
    // Only the first team's two members executed.
    assert_eq!(group.total_worker_tokens(), 20);
}

#[tokio::test]
async fn test_hybrid_all_teams_failed() {
    let mut group = HybridGroup::new("hybrid", 4, 2, SimConfig::default()).unwrap();
    let result = group.execute(failing_task(), TaskContext::new()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("All teams failed"));
}

#[tokio::test]
async fn test_hybrid_team_members_share_buffer() {
    let config = SimConfig {
        coordination_rounds: 1,
        ..SimConfig::default()
    };
    let mut group = HybridGroup::new("hybrid", 2, 2, config).unwrap();
    // Second member of the team sees the first member's broadcast.
    let task = Task::compute(|ctx| Ok(json!(ctx.peer_messages.len())));
    let result = group.execute(task, TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(result.output, Some(json!(1)));
}

#[tokio::test]
async fn test_tokens_accumulate_until_reset() {
    let mut group = CentralizedGroup::new("centralized", 2, config(10)).unwrap();
    group.execute(Task::Value(json!(1)), TaskContext::new()).await;
    group.execute(Task::Value(json!(2)), TaskContext::new()).await;

    // Two invocations: each costs one worker execution plus one
    // coordination fee; instance counters keep accumulating.
    assert_eq!(group.stats().tokens_used, 2 * (10 + 10));
    assert_eq!(group.coordination_overhead(), 20);

    group.reset();
    assert_eq!(group.stats().tokens_used, 0);
    assert_eq!(group.coordination_overhead(), 0);
    assert!(group.worker_stats().iter().all(|s| s.tokens_used == 0));
}

#[tokio::test]
async fn test_invocations_do_not_contaminate_each_other() {
    let config = SimConfig {
        coordination_rounds: 1,
        ..SimConfig::default()
    };
    let mut group = DecentralizedGroup::new("decentralized", 2, config).unwrap();
    let task = Task::compute(|ctx| Ok(json!(ctx.peer_messages.len())));

    let first = group.execute(task.clone(), TaskContext::new()).await;
    let second = group.execute(task, TaskContext::new()).await;

    // The shared buffer is cleared between invocations, so the second run
    // starts from zero visible messages again.
    assert_eq!(first.output, second.output);
    assert_eq!(first.metadata["messages_exchanged"], json!(2));
    assert_eq!(second.metadata["messages_exchanged"], json!(2));
}

#[tokio::test]
async fn test_decentralized_partial_failure_keeps_successes() {
    let config = SimConfig {
        tokens_per_task: 10,
        coordination_rounds: 2,
        ..SimConfig::default()
    };
    let mut group = DecentralizedGroup::new("decentralized", 3, config).unwrap();
    // Every peer fails in round 0 and recovers in round 1; aggregation
    // proceeds with the successes, no retries anywhere.
    let task = Task::compute(|ctx| {
        if ctx.round == Some(0) {
            Err(anyhow!("cold start"))
        } else {
            Ok(json!("warmed up"))
        }
    });
    let result = group.execute(task, TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(result.output, Some(json!("warmed up")));
    assert_eq!(result.metadata["successful_results"], json!(3));
    assert_eq!(result.metadata["failed_results"], json!(3));
    // Only the three round-1 successes executed for tokens and broadcast.
    assert_eq!(group.total_worker_tokens(), 30);
    assert_eq!(result.metadata["messages_exchanged"], json!(3));
}

#[tokio::test]
async fn test_independent_partial_failure_takes_a_success() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let calls = Arc::new(AtomicUsize::new(0));
    let mut group = IndependentGroup::new("independent", 4, config(10)).unwrap();
    // Two of the four executions fail, whichever workers get there first.
    let task = Task::compute(move |_| {
        if calls.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(anyhow!("transient failure"))
        } else {
            Ok(json!("recovered"))
        }
    });
    let result = group.execute(task, TaskContext::new()).await;

    assert!(result.success);
    assert_eq!(result.output, Some(json!("recovered")));
    assert_eq!(result.metadata["successful_agents"], json!(2));
    assert_eq!(result.metadata["failed_agents"], json!(2));
    assert_eq!(result.tokens_used, 20);
}

#[tokio::test]
async fn test_solo_trait_object_contract() {
    use cohort::types::{Message, MessageKind};

    // Composites hold workers behind the Agent interface; make sure the
    // contract works through a trait object.
    let mut agent: Box<dyn Agent> = Box::new(SoloAgent::new("solo", config(7)));
    let result = agent.execute(Task::Value(json!(1)), TaskContext::new()).await;
    assert!(result.success);
    assert_eq!(result.tokens_used, 7);
    assert_eq!(agent.stats().agent_id, "solo");

    agent.send(Message::new("solo", json!("outbound"), MessageKind::Default));
    agent.receive(Message::new("peer", json!("inbound"), MessageKind::Default));
    let stats = agent.stats();
    assert_eq!(stats.messages_sent, 1);
    assert_eq!(stats.messages_received, 1);

    agent.reset();
    assert_eq!(agent.stats().tokens_used, 0);
}

#[test]
fn test_config_yaml_roundtrip() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "tokens_per_task: 42\ncoordination_rounds: 3").unwrap();

    let config = SimConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.tokens_per_task, 42);
    assert_eq!(config.coordination_rounds, 3);
    assert_eq!(config.aggregation_tokens, 15);
}

#[test]
fn test_config_yaml_rejects_zero_rounds() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "coordination_rounds: 0").unwrap();
    assert!(SimConfig::from_yaml_file(file.path()).is_err());
}
