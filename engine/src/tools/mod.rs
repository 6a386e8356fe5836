pub mod venue;

pub use venue::VenueTools;

use async_trait::async_trait;
use sdk::errors::EngineError;
use sdk::schema::{Operation, SCHEMA_VERSION};
use sdk::types::ToolInvocation;
use serde::Serialize;
use serde_json::Value;

/// Backend the invoker dispatches operations to.
///
/// Implementations return the operation's JSON payload. Errors become failed
/// outcomes in the invoker; they never abort a pass.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    async fn call(
        &self,
        operation: Operation,
        invocation: &ToolInvocation,
    ) -> Result<Value, EngineError>;
}

/// Listing entry for one operation
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static str,
    pub schema_version: u32,
}

/// Every operation the backend understands, in listing order
pub fn tool_manifest() -> Vec<ToolSpec> {
    Operation::ALL
        .iter()
        .map(|op| ToolSpec {
            name: op.name(),
            description: op.description(),
            arguments: op.argument_shape(),
            schema_version: SCHEMA_VERSION,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_lists_every_operation() {
        let manifest = tool_manifest();
        assert_eq!(manifest.len(), Operation::ALL.len());
        assert!(manifest.iter().any(|t| t.name == "calculate_accessible_route"));
        assert!(manifest.iter().all(|t| !t.description.is_empty()));
    }
}
