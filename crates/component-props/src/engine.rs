//! Property engine: component reads and the write + verify protocol.
//!
//! ## Table of Contents
//! 1. PropertyEngine - construction and accessors
//! 2. Reads - components, component info, single property
//! 3. Writes - guard, convert, write, resolve, verify

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::analyzer::{self, PropertyAnalysis};
use crate::config::EngineConfig;
use crate::convert;
use crate::error::{EngineError, Result};
use crate::guard;
use crate::host::{HostBridge, HostClient};
use crate::poll::PollSchedule;
use crate::protocol::SetPropertyRequest;
use crate::query;
use crate::resolver;
use crate::types::{CanonicalValue, ComponentSnapshot, SemanticType};
use crate::verify::{Comparison, VerificationResult};

// ============================================================================
// Property Engine
// ============================================================================

/// Reads and writes component properties on a live scene host.
///
/// Holds no scene state of its own; every operation queries the host afresh.
#[derive(Clone)]
pub struct PropertyEngine {
    host: HostClient,
    config: EngineConfig,
}

/// Result of a successful write
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPropertyOutcome {
    pub node_uuid: String,
    pub component_type: String,
    pub property: String,
    pub semantic_type: SemanticType,
    /// Value before the write
    pub original_value: Value,
    /// Value read back after the write
    pub actual_value: Value,
    /// Canonical value that was written last
    pub expected_value: Value,
    pub verified: bool,
    pub comparison: Comparison,
    pub attempts: u32,
}

impl PropertyEngine {
    /// Create an engine over a host bridge
    pub fn new(bridge: Arc<dyn HostBridge>, config: EngineConfig) -> Self {
        Self {
            host: HostClient::new(bridge, &config.host),
            config,
        }
    }

    pub fn host(&self) -> &HostClient {
        &self.host
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Every component on a node
    pub async fn get_components(&self, node_id: &str) -> Result<Vec<ComponentSnapshot>> {
        query::fetch_components(&self.host, node_id).await
    }

    /// One component by exact type
    pub async fn get_component_info(
        &self,
        node_id: &str,
        component_type: &str,
    ) -> Result<ComponentSnapshot> {
        query::fetch_component(&self.host, node_id, component_type, None).await
    }

    /// Current value and inferred type of one property
    pub async fn get_property(
        &self,
        node_id: &str,
        component_type: &str,
        property: &str,
    ) -> Result<PropertyAnalysis> {
        let component =
            query::fetch_component(&self.host, node_id, component_type, Some(property)).await?;
        let analysis = analyzer::analyze(&component, property);

        if !analysis.exists {
            return Err(property_not_found(component_type, property, analysis));
        }
        Ok(analysis)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Convert, write and verify a component property.
    ///
    /// Returns `Ok` once the host accepted the write; `verified` on the
    /// outcome says whether the read-back agreed.
    pub async fn set_property(&self, request: &SetPropertyRequest) -> Result<SetPropertyOutcome> {
        let SetPropertyRequest {
            node_uuid: node_id,
            component_type,
            property,
            ..
        } = request;

        guard::check(component_type, property).map_err(EngineError::Redirect)?;

        let component =
            query::fetch_component(&self.host, node_id, component_type, Some(property)).await?;
        let analysis = analyzer::analyze(&component, property);

        guard::check_declared(component_type, property, analysis.exists)
            .map_err(EngineError::Redirect)?;

        if !analysis.exists {
            return Err(property_not_found(component_type, property, analysis));
        }

        let semantic_type = match &request.property_type {
            Some(name) => name.parse::<SemanticType>()?,
            None => analysis
                .inferred_type
                .ok_or_else(|| EngineError::TypeNotInferred {
                    component_type: component_type.clone(),
                    property: property.clone(),
                })?,
        };

        let converted = convert::convert(semantic_type, &request.value)?;

        tracing::info!(
            node_id = %node_id,
            component_type = %component_type,
            property = %property,
            semantic_type = %semantic_type,
            "Setting component property"
        );

        self.host
            .set_component_property(node_id, component_type, property, converted.to_json(), semantic_type)
            .await?;

        let expected = match &converted {
            CanonicalValue::PendingComponent(target_node) => {
                let matched =
                    resolver::resolve(&self.host, node_id, component_type, property, target_node)
                        .await?;
                let payload = matched.payload();

                tracing::info!(
                    node_id = %node_id,
                    property = %property,
                    target_node = %target_node,
                    scene_id = %matched.scene_id,
                    "Rewriting component reference with scene id"
                );

                self.host
                    .set_component_property(node_id, component_type, property, payload.clone(), semantic_type)
                    .await?;
                payload
            }
            other => other.to_json(),
        };

        let verification = self
            .verify(node_id, component_type, property, semantic_type, &expected)
            .await;

        Ok(SetPropertyOutcome {
            node_uuid: node_id.clone(),
            component_type: component_type.clone(),
            property: property.clone(),
            semantic_type,
            original_value: analysis.original_value.unwrap_or(Value::Null),
            actual_value: verification.actual_value,
            expected_value: expected,
            verified: verification.verified,
            comparison: verification.comparison,
            attempts: verification.attempts,
        })
    }

    /// Wait for the host to settle, then read back until the value matches
    /// or the poll schedule runs out
    async fn verify(
        &self,
        node_id: &str,
        component_type: &str,
        property: &str,
        semantic_type: SemanticType,
        expected: &Value,
    ) -> VerificationResult {
        let mut schedule = PollSchedule::from_config(&self.config.verify);
        tokio::time::sleep(self.config.verify.settle_delay()).await;

        loop {
            let attempts = schedule.attempt() + 1;
            let result = match self.read_back(node_id, component_type, property).await {
                Ok(actual) => VerificationResult::check(semantic_type, expected, actual, attempts),
                Err(e) => {
                    tracing::warn!(
                        node_id = %node_id,
                        property = %property,
                        error = %e,
                        "Read-back failed"
                    );
                    VerificationResult::unreadable(expected, attempts)
                }
            };

            if result.verified {
                tracing::debug!(
                    node_id = %node_id,
                    property = %property,
                    attempts,
                    comparison = ?result.comparison,
                    "Write verified"
                );
                return result;
            }

            match schedule.next_delay() {
                Some(delay) => tokio::time::sleep(delay).await,
                None => {
                    tracing::warn!(
                        node_id = %node_id,
                        component_type = %component_type,
                        property = %property,
                        expected = %expected,
                        actual = %result.actual_value,
                        attempts,
                        "Write not verified"
                    );
                    return result;
                }
            }
        }
    }

    async fn read_back(&self, node_id: &str, component_type: &str, property: &str) -> Result<Value> {
        let component =
            query::fetch_component(&self.host, node_id, component_type, Some(property)).await?;
        let analysis = analyzer::analyze(&component, property);

        match analysis.original_value {
            Some(value) => Ok(value),
            None => Err(property_not_found(component_type, property, analysis)),
        }
    }
}

fn property_not_found(component_type: &str, property: &str, analysis: PropertyAnalysis) -> EngineError {
    EngineError::PropertyNotFound {
        component_type: component_type.to_string(),
        property: property.to_string(),
        available: analysis.available_properties,
    }
}
