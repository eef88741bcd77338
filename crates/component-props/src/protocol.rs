//! Caller-facing operation protocol.
//!
//! Every operation takes a JSON argument object and answers with an
//! [`OperationResponse`]. Failures never escape as `Err`: they are folded into
//! `{success: false, error, instruction?, data?}` so a caller always gets a
//! structured reply.
//!
//! | operation | arguments |
//! |---|---|
//! | `get_components` | `nodeUuid` |
//! | `get_component_info` | `nodeUuid, componentType` |
//! | `get_component_property` | `nodeUuid, componentType, property` |
//! | `set_component_property` | `nodeUuid, componentType, property, propertyType?, value` |
//! | `get_available_components` | `category?` |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::PropertyEngine;
use crate::error::{EngineError, Result};
use crate::suggest;

/// Operation names accepted by [`PropertyEngine::execute`]
pub mod operations {
    pub const GET_COMPONENTS: &str = "get_components";
    pub const GET_COMPONENT_INFO: &str = "get_component_info";
    pub const GET_COMPONENT_PROPERTY: &str = "get_component_property";
    pub const SET_COMPONENT_PROPERTY: &str = "set_component_property";
    pub const GET_AVAILABLE_COMPONENTS: &str = "get_available_components";

    pub const ALL: [&str; 5] = [
        GET_COMPONENTS,
        GET_COMPONENT_INFO,
        GET_COMPONENT_PROPERTY,
        SET_COMPONENT_PROPERTY,
        GET_AVAILABLE_COMPONENTS,
    ];
}

// ============================================================================
// Request Types
// ============================================================================

/// Arguments naming a node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRequest {
    pub node_uuid: String,
}

/// Arguments naming a component on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRequest {
    pub node_uuid: String,
    pub component_type: String,
}

/// Arguments naming a component property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRequest {
    pub node_uuid: String,
    pub component_type: String,
    pub property: String,
}

/// Set component property request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPropertyRequest {
    pub node_uuid: String,
    pub component_type: String,
    pub property: String,
    /// Semantic type wire name; inferred from the current value when absent
    #[serde(default)]
    pub property_type: Option<String>,
    pub value: Value,
}

/// Catalog request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRequest {
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "all".to_string()
}

// ============================================================================
// Response Types
// ============================================================================

/// Reply to every operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Remediation hint, kept apart from `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl OperationResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            instruction: None,
        }
    }

    pub fn failure(err: &EngineError) -> Self {
        Self {
            success: false,
            data: err.diagnostics(),
            error: Some(err.to_string()),
            instruction: err.instruction(),
        }
    }
}

impl From<Result<Value>> for OperationResponse {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(&err),
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

impl PropertyEngine {
    /// Run a named operation with JSON arguments
    pub async fn execute(&self, operation: &str, args: Value) -> OperationResponse {
        let result = self.dispatch(operation, args).await;

        if let Err(err) = &result {
            tracing::warn!(operation = %operation, error = %err, "Operation failed");
        }
        result.into()
    }

    async fn dispatch(&self, operation: &str, args: Value) -> Result<Value> {
        match operation {
            operations::GET_COMPONENTS => {
                let req: NodeRequest = parse_args(operation, args)?;
                let components = self.get_components(&req.node_uuid).await?;
                Ok(json!({
                    "nodeUuid": req.node_uuid,
                    "components": components,
                }))
            }
            operations::GET_COMPONENT_INFO => {
                let req: ComponentRequest = parse_args(operation, args)?;
                let component = self
                    .get_component_info(&req.node_uuid, &req.component_type)
                    .await?;
                Ok(serde_json::to_value(component)?)
            }
            operations::GET_COMPONENT_PROPERTY => {
                let req: PropertyRequest = parse_args(operation, args)?;
                let analysis = self
                    .get_property(&req.node_uuid, &req.component_type, &req.property)
                    .await?;
                Ok(json!({
                    "value": analysis.original_value,
                    "inferredType": analysis.inferred_type,
                    "availableProperties": analysis.available_properties,
                }))
            }
            operations::SET_COMPONENT_PROPERTY => {
                let req: SetPropertyRequest = parse_args(operation, args)?;
                let outcome = self.set_property(&req).await?;
                Ok(serde_json::to_value(outcome)?)
            }
            operations::GET_AVAILABLE_COMPONENTS => {
                let req: CatalogRequest = if args.is_null() {
                    CatalogRequest {
                        category: default_category(),
                    }
                } else {
                    parse_args(operation, args)?
                };
                let components = suggest::catalog(&req.category)?;
                Ok(json!({
                    "category": req.category,
                    "components": components,
                }))
            }
            other => Err(EngineError::invalid_request(format!(
                "Unknown operation '{}'. Expected one of: {}",
                other,
                operations::ALL.join(", ")
            ))),
        }
    }
}

fn parse_args<T: DeserializeOwned>(operation: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| {
        EngineError::invalid_request(format!("Invalid arguments for {}: {}", operation, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::testing::demo_scene;
    use std::sync::Arc;

    fn engine() -> PropertyEngine {
        PropertyEngine::new(Arc::new(demo_scene()), EngineConfig::immediate())
    }

    #[tokio::test]
    async fn test_get_components() {
        let response = engine()
            .execute("get_components", json!({"nodeUuid": "node-b"}))
            .await;

        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data["nodeUuid"], "node-b");
        assert_eq!(data["components"][1]["type"], "cc.Label");
        assert_eq!(data["components"][1]["uuid"], "L1");
    }

    #[tokio::test]
    async fn test_get_component_info() {
        let response = engine()
            .execute(
                "get_component_info",
                json!({"nodeUuid": "node-a", "componentType": "cc.Sprite"}),
            )
            .await;

        let data = response.data.unwrap();
        assert_eq!(data["type"], "cc.Sprite");
        assert_eq!(data["uuid"], "S1");
        assert_eq!(data["enabled"], true);
        assert_eq!(data["properties"]["sizeMode"]["value"], 1);
    }

    #[tokio::test]
    async fn test_get_component_property() {
        let response = engine()
            .execute(
                "get_component_property",
                json!({"nodeUuid": "node-a", "componentType": "cc.Label", "property": "string"}),
            )
            .await;

        let data = response.data.unwrap();
        assert_eq!(data["value"], "Hello");
        assert_eq!(data["inferredType"], "string");
        assert_eq!(data["availableProperties"], json!(["fontSize", "string"]));
    }

    #[tokio::test]
    async fn test_set_component_property() {
        let response = engine()
            .execute(
                "set_component_property",
                json!({
                    "nodeUuid": "node-a",
                    "componentType": "cc.Sprite",
                    "property": "color",
                    "propertyType": "color",
                    "value": "#00FF00"
                }),
            )
            .await;

        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data["verified"], true);
        assert_eq!(data["comparison"], "exact");
        assert_eq!(data["expectedValue"], json!({"r": 0, "g": 255, "b": 0, "a": 255}));
        assert_eq!(data["originalValue"]["g"], 255);
    }

    #[tokio::test]
    async fn test_redirect_keeps_instruction_separate() {
        let response = engine()
            .execute(
                "set_component_property",
                json!({
                    "nodeUuid": "node-a",
                    "componentType": "cc.Node",
                    "property": "position",
                    "value": {"x": 1, "y": 2}
                }),
            )
            .await;

        assert!(!response.success);
        let error = response.error.unwrap();
        let instruction = response.instruction.unwrap();
        assert!(!error.contains("set_node_transform"));
        assert!(instruction.contains("set_node_transform"));
        assert_eq!(response.data.unwrap()["redirectTo"], "set_node_transform");
    }

    #[tokio::test]
    async fn test_unknown_type_name() {
        let response = engine()
            .execute(
                "set_component_property",
                json!({
                    "nodeUuid": "node-a",
                    "componentType": "cc.Label",
                    "property": "string",
                    "propertyType": "text",
                    "value": "x"
                }),
            )
            .await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("unsupported property type 'text'"));
        assert!(response.instruction.unwrap().contains("spriteFrame"));
    }

    #[tokio::test]
    async fn test_malformed_args() {
        let response = engine()
            .execute("get_component_info", json!({"nodeUuid": "node-a"}))
            .await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("Invalid arguments for get_component_info"));
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let response = engine().execute("delete_component", json!({})).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("Unknown operation 'delete_component'"));
    }

    #[tokio::test]
    async fn test_catalog_defaults_to_all() {
        let response = engine().execute("get_available_components", json!({})).await;
        let data = response.data.unwrap();
        assert_eq!(data["category"], "all");
        assert!(data["components"].as_array().unwrap().len() > 10);

        let response = engine()
            .execute("get_available_components", json!({"category": "audio"}))
            .await;
        assert_eq!(response.data.unwrap()["components"], json!(["cc.AudioSource"]));
    }

    #[tokio::test]
    async fn test_failure_response_serialization() {
        let response = engine()
            .execute("get_components", json!({"nodeUuid": "ghost"}))
            .await;

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({"success": false, "error": "Node not found: ghost"}));
    }
}
