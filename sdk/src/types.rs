//! Tool invocation/outcome envelopes

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single tool request emitted by the external planner.
///
/// Field names on the wire follow the planner's JSON (`tool_name`,
/// `arguments`, `reasoning`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    #[serde(rename = "tool_name", alias = "operation")]
    pub operation: String,

    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,

    #[serde(rename = "reasoning", alias = "rationale", default)]
    pub rationale: String,
}

impl ToolInvocation {
    /// Create a new invocation with no arguments
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            arguments: serde_json::Map::new(),
            rationale: String::new(),
        }
    }

    /// Add an argument
    pub fn with_arg(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    /// Decode the argument mapping into an operation's typed argument struct
    pub fn decode_args<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(serde_json::Value::Object(self.arguments.clone()))
            .map_err(|e| ToolError::InvalidParameter(e.to_string()))
    }
}

/// Result of one tool invocation.
///
/// Exactly one outcome is produced per invocation. A failed outcome carries a
/// human-readable error and a null payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub operation: String,
    pub success: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
    pub elapsed_ms: f64,
}

impl ToolOutcome {
    /// Create a successful outcome
    pub fn success(
        operation: impl Into<String>,
        payload: serde_json::Value,
        elapsed: Duration,
    ) -> Self {
        Self {
            operation: operation.into(),
            success: true,
            payload,
            error: None,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }

    /// Create a failed outcome
    pub fn failure(
        operation: impl Into<String>,
        error: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            operation: operation.into(),
            success: false,
            payload: serde_json::Value::Null,
            error: Some(error.into()),
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Argument-level errors
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct RouteArgs {
        shop_ids: Vec<u32>,
    }

    #[test]
    fn test_invocation_from_planner_json() {
        let raw = r#"{"tool_name": "search_shops", "arguments": {"category": "Food"}, "reasoning": "lunch"}"#;
        let invocation: ToolInvocation = serde_json::from_str(raw).unwrap();

        assert_eq!(invocation.operation, "search_shops");
        assert_eq!(invocation.rationale, "lunch");
        assert_eq!(invocation.arguments["category"], json!("Food"));
    }

    #[test]
    fn test_invocation_defaults() {
        let invocation: ToolInvocation =
            serde_json::from_str(r#"{"tool_name": "get_current_events"}"#).unwrap();
        assert!(invocation.arguments.is_empty());
        assert!(invocation.rationale.is_empty());
    }

    #[test]
    fn test_decode_args() {
        let invocation =
            ToolInvocation::new("calculate_route").with_arg("shop_ids", json!([1, 3]));
        let args: RouteArgs = invocation.decode_args().unwrap();
        assert_eq!(args.shop_ids, vec![1, 3]);

        let bad = ToolInvocation::new("calculate_route").with_arg("shop_ids", json!("1,3"));
        assert!(matches!(
            bad.decode_args::<RouteArgs>(),
            Err(ToolError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = ToolOutcome::success("search_shops", json!([]), Duration::from_millis(12));
        assert!(ok.success);
        assert!(ok.error.is_none());
        assert!((ok.elapsed_ms - 12.0).abs() < 0.001);

        let failed = ToolOutcome::failure("verify_route", "No valid stops", Duration::ZERO);
        assert!(!failed.success);
        assert_eq!(failed.payload, serde_json::Value::Null);
        assert_eq!(failed.error.as_deref(), Some("No valid stops"));
    }
}
