use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Cost model for simulated execution. Every knob has a default; unknown
/// keys in a config file are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Tokens charged to a worker for each successfully executed task.
    pub tokens_per_task: u64,
    /// Tokens the centralized coordinator spends per subtask, regardless of
    /// subtask outcome.
    pub coordination_tokens_per_task: u64,
    /// Tokens charged per recipient when a peer broadcasts a result.
    pub communication_tokens_per_message: u64,
    /// Number of peer-communication rounds in the decentralized protocol.
    pub coordination_rounds: u32,
    /// Flat cost of the hybrid coordinator's strategic decomposition.
    pub strategy_tokens: u64,
    /// Tokens charged for each successful intra-team broadcast.
    pub team_comm_tokens: u64,
    /// Flat cost of the hybrid coordinator's final aggregation.
    pub aggregation_tokens: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tokens_per_task: 100,
            coordination_tokens_per_task: 10,
            communication_tokens_per_message: 5,
            coordination_rounds: 2,
            strategy_tokens: 20,
            team_comm_tokens: 3,
            aggregation_tokens: 15,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.coordination_rounds == 0 {
            return Err(Error::InvalidConfig(
                "coordination_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}
