//! Host bridge - the RPC seam between the engine and the live scene host.
//!
//! ## Table of Contents
//! 1. HostCall - module/method/positional-args request
//! 2. HostBridge - async trait implemented by transports
//! 3. HostClient - timeout-enforcing typed facade used by the engine
//! 4. CallbackHost - adapter for callback-style transports

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::config::HostConfig;
use crate::error::{HostError, HostResult};
use crate::types::SemanticType;

/// Host module that owns the scene graph
pub const SCENE_MODULE: &str = "scene";
/// Returns the node dump (with `__comps__`) or `null`
pub const QUERY_NODE: &str = "query-node";
/// `(nodeId, componentType, property, value, semanticType)`
pub const SET_COMPONENT_PROPERTY: &str = "set-component-property";

// ============================================================================
// Host Call
// ============================================================================

/// A single RPC to the host.
///
/// Arguments are positional; the transport decides how to append its own
/// completion callback.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCall {
    pub module: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl HostCall {
    /// Create a call with no arguments
    pub fn new(module: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    fn timeout_error(&self, timeout: Duration) -> HostError {
        HostError::Timeout {
            module: self.module.clone(),
            method: self.method.clone(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }
}

// ============================================================================
// Host Bridge Trait
// ============================================================================

/// Transport to the scene host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Perform one request/response call
    async fn call(&self, call: HostCall) -> HostResult<Value>;
}

// ============================================================================
// Host Client
// ============================================================================

/// Typed, timeout-enforcing wrapper around a [`HostBridge`]
#[derive(Clone)]
pub struct HostClient {
    bridge: Arc<dyn HostBridge>,
    timeout: Duration,
}

impl HostClient {
    /// Create a client over a bridge
    pub fn new(bridge: Arc<dyn HostBridge>, config: &HostConfig) -> Self {
        Self {
            bridge,
            timeout: config.call_timeout(),
        }
    }

    /// Issue a raw call, bounded by the configured timeout.
    ///
    /// A reply shaped `{success: false, error}` is reported as a failed call.
    pub async fn call(&self, call: HostCall) -> HostResult<Value> {
        tracing::debug!(
            module = %call.module,
            method = %call.method,
            args = call.args.len(),
            "Calling host"
        );

        let timeout_error = call.timeout_error(self.timeout);
        let (module, method) = (call.module.clone(), call.method.clone());

        let reply = tokio::time::timeout(self.timeout, self.bridge.call(call))
            .await
            .map_err(|_| timeout_error)??;

        reject_failed_reply(module, method, reply)
    }

    /// Fetch the node dump for `node_id`
    pub async fn query_node(&self, node_id: &str) -> HostResult<Value> {
        self.call(HostCall::new(SCENE_MODULE, QUERY_NODE).arg(node_id))
            .await
    }

    /// Write a converted value to a component property
    pub async fn set_component_property(
        &self,
        node_id: &str,
        component_type: &str,
        property: &str,
        value: Value,
        semantic_type: SemanticType,
    ) -> HostResult<Value> {
        self.call(
            HostCall::new(SCENE_MODULE, SET_COMPONENT_PROPERTY)
                .arg(node_id)
                .arg(component_type)
                .arg(property)
                .arg(value)
                .arg(semantic_type.as_str()),
        )
        .await
    }
}

fn reject_failed_reply(module: String, method: String, reply: Value) -> HostResult<Value> {
    if reply.get("success").and_then(Value::as_bool) == Some(false) {
        let message = reply
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("host rejected the call")
            .to_string();
        return Err(HostError::Call {
            module,
            method,
            message,
        });
    }
    Ok(reply)
}

// ============================================================================
// Callback Transport Adapter
// ============================================================================

/// Completion callback handed to a callback-style transport
pub type Reply = Box<dyn FnOnce(HostResult<Value>) + Send>;

/// Adapts a transport that completes through a callback into [`HostBridge`].
///
/// The transport receives the call and a one-shot reply callback. Dropping the
/// callback without invoking it surfaces as [`HostError::Disconnected`].
pub struct CallbackHost<F> {
    transport: F,
}

impl<F> CallbackHost<F>
where
    F: Fn(HostCall, Reply) + Send + Sync,
{
    pub fn new(transport: F) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<F> HostBridge for CallbackHost<F>
where
    F: Fn(HostCall, Reply) + Send + Sync,
{
    async fn call(&self, call: HostCall) -> HostResult<Value> {
        let (tx, rx) = oneshot::channel();
        let disconnected = HostError::Disconnected {
            module: call.module.clone(),
            method: call.method.clone(),
        };

        (self.transport)(
            call,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );

        rx.await.map_err(|_| disconnected)?
    }
}
