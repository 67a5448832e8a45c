use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Architecture;

/// Descriptors of a task that drive architecture selection, each in [0, 1].
/// The scalars are independent; they are not required to sum to anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskCharacteristics {
    pub parallelizable: f64,
    pub dynamic: f64,
    pub sequential: f64,
    pub tool_intensive: f64,
    pub complexity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    /// Accuracy a single agent achieves on the task, in [0, 1].
    pub baseline_accuracy: f64,
    /// Total token budget available to the whole system.
    pub token_budget: u64,
    /// Relative capability of the underlying model, in [0, 1].
    pub model_capability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionReport {
    pub selected: Architecture,
    pub scores: BTreeMap<Architecture, f64>,
    pub reasoning: Vec<String>,
    pub task: TaskCharacteristics,
    pub capabilities: AgentCapabilities,
}

/// Heuristic scorer that predicts which coordination architecture performs
/// best for a task/capability profile. Stateless: identical inputs always
/// produce identical outputs.
///
/// The coefficients encode the empirical regularities the simulators play
/// out: centralized coordination pays off on parallelizable work,
/// decentralized on dynamic work, single agents on sequential reasoning, and
/// every coordination scheme loses value once the solo baseline is already
/// strong (capability saturation) or the token budget is tight.
#[derive(Debug, Clone)]
pub struct ArchitectureSelector {
    pub saturation_threshold: f64,
    pub saturation_beta: f64,
}

impl Default for ArchitectureSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchitectureSelector {
    pub fn new() -> Self {
        Self {
            saturation_threshold: 0.45,
            saturation_beta: -0.408,
        }
    }

    pub fn score(
        &self,
        architecture: Architecture,
        task: &TaskCharacteristics,
        capabilities: &AgentCapabilities,
    ) -> f64 {
        let mut score = match architecture {
            Architecture::Single => 1.0,
            Architecture::Independent => 0.7,
            Architecture::Centralized => 0.9,
            Architecture::Decentralized => 0.85,
            Architecture::Hybrid => 0.88,
        };

        // Diminishing returns from coordination once the solo baseline is
        // already strong.
        if capabilities.baseline_accuracy > self.saturation_threshold
            && architecture != Architecture::Single
        {
            score += self.saturation_beta
                * (capabilities.baseline_accuracy - self.saturation_threshold);
        }

        match architecture {
            Architecture::Single => {
                score += 0.3 * task.sequential;
                if task.complexity < 0.5 {
                    score += 0.2;
                }
            }
            Architecture::Independent => {
                score += 0.4 * task.parallelizable;
                score += -0.172 * (1.0 - capabilities.baseline_accuracy);
            }
            Architecture::Centralized => {
                score += 0.809 * task.parallelizable;
                score += -0.2 * task.tool_intensive;
                score += -0.044;
            }
            Architecture::Decentralized => {
                score += 0.092 * task.dynamic;
                score += -0.15 * (1.0 - task.parallelizable);
                if task.sequential > 0.6 {
                    score -= 0.4;
                }
            }
            Architecture::Hybrid => {
                score += 0.3 * task.complexity;
                let balance =
                    1.0 - stddev(&[task.parallelizable, task.dynamic, task.sequential]);
                score += 0.15 * balance;
            }
        }

        if capabilities.token_budget < 1000 && architecture != Architecture::Single {
            score -= 0.2;
        }

        score * (0.8 + 0.4 * capabilities.model_capability)
    }

    /// Arg-max over the canonical enumeration order; ties keep the earliest
    /// architecture.
    pub fn select(
        &self,
        task: &TaskCharacteristics,
        capabilities: &AgentCapabilities,
    ) -> Architecture {
        let mut best = Architecture::Single;
        let mut best_score = f64::NEG_INFINITY;
        for architecture in Architecture::ALL {
            let score = self.score(architecture, task, capabilities);
            if score > best_score {
                best = architecture;
                best_score = score;
            }
        }
        best
    }

    pub fn scores(
        &self,
        task: &TaskCharacteristics,
        capabilities: &AgentCapabilities,
    ) -> BTreeMap<Architecture, f64> {
        Architecture::ALL
            .into_iter()
            .map(|architecture| (architecture, self.score(architecture, task, capabilities)))
            .collect()
    }

    pub fn explain(
        &self,
        task: &TaskCharacteristics,
        capabilities: &AgentCapabilities,
    ) -> SelectionReport {
        let mut reasoning = Vec::new();

        if capabilities.baseline_accuracy > self.saturation_threshold {
            reasoning.push(format!(
                "Single agent baseline accuracy ({:.1}%) exceeds saturation threshold \
                 ({:.1}%). Multi-agent coordination may have diminishing returns.",
                capabilities.baseline_accuracy * 100.0,
                self.saturation_threshold * 100.0
            ));
        }
        if task.parallelizable > 0.7 {
            reasoning.push(
                "Task is highly parallelizable. Centralized coordination may provide \
                 significant improvement (up to 80.9%)."
                    .to_string(),
            );
        }
        if task.dynamic > 0.7 {
            reasoning.push(
                "Task requires dynamic adaptation. Decentralized coordination provides \
                 robustness (9.2% improvement)."
                    .to_string(),
            );
        }
        if task.sequential > 0.6 {
            reasoning.push(
                "Task requires sequential reasoning. Multi-agent architectures may \
                 degrade performance by 39-70%."
                    .to_string(),
            );
        }
        if task.tool_intensive > 0.7 && capabilities.token_budget < 5000 {
            reasoning.push(
                "Task is tool-intensive with limited token budget. Multi-agent overhead \
                 may hurt performance."
                    .to_string(),
            );
        }

        SelectionReport {
            selected: self.select(task, capabilities),
            scores: self.scores(task, capabilities),
            reasoning,
            task: *task,
            capabilities: *capabilities,
        }
    }
}

fn stddev(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
