pub mod centralized;
pub mod decentralized;
pub mod hybrid;
pub mod independent;

pub use centralized::CentralizedGroup;
pub use decentralized::DecentralizedGroup;
pub use hybrid::HybridGroup;
pub use independent::IndependentGroup;

use serde_json::Value;

use crate::types::TaskResult;

/// Collapse successful outputs the way every coordinator reports them: a
/// lone output is returned directly, several become an ordered array.
pub(crate) fn collapse_outputs(mut outputs: Vec<Value>) -> Value {
    if outputs.len() == 1 {
        outputs.remove(0)
    } else {
        Value::Array(outputs)
    }
}

pub(crate) fn successful_outputs(results: &[TaskResult]) -> Vec<Value> {
    results
        .iter()
        .filter(|r| r.success)
        .filter_map(|r| r.output.clone())
        .collect()
}
