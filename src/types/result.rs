use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Metadata;

/// Outcome of one execution step. `error` is set exactly when `success` is
/// false; failures are captured here instead of being propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub output: Option<Value>,
    pub tokens_used: u64,
    pub error: Option<String>,
    pub metadata: Metadata,
}

impl TaskResult {
    pub fn success(output: Value, tokens_used: u64) -> Self {
        Self {
            success: true,
            output: Some(output),
            tokens_used,
            error: None,
            metadata: Metadata::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            tokens_used: 0,
            error: Some(error.into()),
            metadata: Metadata::new(),
        }
    }

    pub fn with_tokens(mut self, tokens_used: u64) -> Self {
        self.tokens_used = tokens_used;
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_has_no_error() {
        let result = TaskResult::success(json!("done"), 100);
        assert!(result.success);
        assert_eq!(result.output, Some(json!("done")));
        assert_eq!(result.tokens_used, 100);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failure_has_no_output_or_tokens() {
        let result = TaskResult::failure("boom");
        assert!(!result.success);
        assert!(result.output.is_none());
        assert_eq!(result.tokens_used, 0);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }
}
