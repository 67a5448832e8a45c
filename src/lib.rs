pub mod agents;
pub mod comparison;
pub mod config;
pub mod coordination;
pub mod error;
pub mod metrics;
pub mod selector;
pub mod types;

pub use config::SimConfig;
pub use error::Error;
pub use types::*;
