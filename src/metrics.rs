use serde::{Deserialize, Serialize};

use crate::types::TaskResult;

/// The four coordination ratios bundled together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinationMetrics {
    pub efficiency: f64,
    pub overhead: f64,
    pub error_amplification: f64,
    pub redundancy: f64,
}

/// Useful task progress per unit of computation, normalized to the
/// single-agent baseline.
pub fn efficiency(task_progress: f64, tokens_used: u64, baseline_tokens: u64) -> f64 {
    if tokens_used == 0 {
        return 0.0;
    }
    let normalized = tokens_used as f64 / baseline_tokens as f64;
    task_progress / normalized.max(0.01)
}

/// Share of total spend that went to coordination rather than task work.
pub fn overhead(coordination_tokens: u64, total_tokens: u64) -> f64 {
    if total_tokens == 0 {
        return 0.0;
    }
    coordination_tokens as f64 / total_tokens as f64
}

/// Multiplicative increase in error rate over the single-agent baseline.
/// A zero baseline with any multi-agent errors is capped at 20.0.
pub fn error_amplification(single_agent_error_rate: f64, multi_agent_error_rate: f64) -> f64 {
    if single_agent_error_rate == 0.0 {
        return if multi_agent_error_rate > 0.0 { 20.0 } else { 1.0 };
    }
    multi_agent_error_rate / single_agent_error_rate
}

/// Fraction of agent actions that duplicated another agent's work.
pub fn redundancy(unique_actions: usize, total_actions: usize) -> f64 {
    if total_actions == 0 {
        return 0.0;
    }
    1.0 - unique_actions as f64 / total_actions as f64
}

impl CoordinationMetrics {
    /// Derive all four ratios from a pool of step results plus the baseline
    /// error rate observed for a single agent.
    pub fn from_results(
        results: &[TaskResult],
        single_agent_error_rate: f64,
        baseline_tokens: u64,
    ) -> Self {
        let total_tokens: u64 = results.iter().map(|r| r.tokens_used).sum();
        let coordination_tokens: u64 = results
            .iter()
            .filter_map(|r| r.metadata.get("coordination_overhead"))
            .filter_map(|v| v.as_u64())
            .sum();

        let total = results.len().max(1);
        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        let task_progress = succeeded as f64 / total as f64;
        let multi_agent_error_rate = failed as f64 / total as f64;

        let unique_outputs = {
            let mut seen: Vec<String> = results
                .iter()
                .filter(|r| r.success)
                .map(|r| {
                    r.output
                        .as_ref()
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect();
            seen.sort();
            seen.dedup();
            seen.len()
        };

        Self {
            efficiency: efficiency(task_progress, total_tokens, baseline_tokens),
            overhead: overhead(coordination_tokens, total_tokens),
            error_amplification: error_amplification(
                single_agent_error_rate,
                multi_agent_error_rate,
            ),
            redundancy: redundancy(unique_outputs, results.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_efficiency_zero_tokens() {
        assert_eq!(efficiency(1.0, 0, 100), 0.0);
    }

    #[test]
    fn test_efficiency_at_baseline() {
        assert!((efficiency(1.0, 100, 100) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency_degrades_with_spend() {
        assert!(efficiency(1.0, 400, 100) < efficiency(1.0, 200, 100));
    }

    #[test]
    fn test_overhead_ratio() {
        assert!((overhead(50, 550) - 50.0 / 550.0).abs() < 1e-9);
        assert_eq!(overhead(0, 0), 0.0);
    }

    #[test]
    fn test_amplification_caps_zero_baseline() {
        assert_eq!(error_amplification(0.0, 0.1), 20.0);
        assert_eq!(error_amplification(0.0, 0.0), 1.0);
        assert!((error_amplification(0.1, 0.44) - 4.4).abs() < 1e-9);
    }

    #[test]
    fn test_redundancy() {
        assert!((redundancy(18, 20) - 0.1).abs() < 1e-9);
        assert_eq!(redundancy(0, 0), 0.0);
    }

    #[test]
    fn test_from_results() {
        let results = vec![
            TaskResult::success(json!("a"), 100).with_meta("coordination_overhead", 10u64),
            TaskResult::success(json!("a"), 100),
            TaskResult::failure("boom"),
        ];
        let metrics = CoordinationMetrics::from_results(&results, 0.1, 100);
        assert!(metrics.efficiency > 0.0);
        assert!(metrics.overhead > 0.0);
        // One failure out of three vs a 10% baseline.
        assert!((metrics.error_amplification - (1.0 / 3.0) / 0.1).abs() < 1e-9);
        // Two successes share one distinct output.
        assert!((metrics.redundancy - (1.0 - 1.0 / 3.0)).abs() < 1e-9);
    }
}
