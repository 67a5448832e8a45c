pub mod message;
pub mod result;
pub mod task;

pub use message::{Message, MessageKind};
pub use result::TaskResult;
pub use task::{Task, TaskContext, TaskFn};

use std::fmt;

use serde::{Deserialize, Serialize};

pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// The five coordination strategies the simulator can play out. The variant
/// order is the canonical enumeration order used for scoring and tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Single,
    Independent,
    Centralized,
    Decentralized,
    Hybrid,
}

impl Architecture {
    pub const ALL: [Architecture; 5] = [
        Architecture::Single,
        Architecture::Independent,
        Architecture::Centralized,
        Architecture::Decentralized,
        Architecture::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Single => "single",
            Architecture::Independent => "independent",
            Architecture::Centralized => "centralized",
            Architecture::Decentralized => "decentralized",
            Architecture::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
