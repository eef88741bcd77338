//! # Component Property Engine
//!
//! Typed reads and verified writes of component properties on a live scene
//! graph owned by an external host process.
//!
//! ## Architecture
//!
//! ```text
//! Caller (tool layer, script, test)
//!         ↓ execute(operation, args)
//! Operation Dispatcher (protocol)
//!         ↓
//! PropertyEngine
//!   guard → query → analyzer → convert → write → resolver → verify
//!         ↓ HostCall { module, method, args[] }
//! HostClient (timeouts, rejected replies)
//!         ↓
//! HostBridge (transport supplied by the embedder)
//!         ↓
//! Scene host: query-node / set-component-property
//! ```
//!
//! The engine keeps no scene state. Every read goes back to the host, and
//! every write is read back after a settle delay to report whether the host
//! actually committed it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use component_props::prelude::*;
//! use std::sync::Arc;
//!
//! let host = CallbackHost::new(|call: HostCall, reply: Reply| {
//!     // forward `call` to the scene host, then invoke `reply`
//! });
//! let engine = PropertyEngine::new(Arc::new(host), EngineConfig::from_env()?);
//!
//! let response = engine
//!     .execute(
//!         "set_component_property",
//!         serde_json::json!({
//!             "nodeUuid": "node-uuid",
//!             "componentType": "cc.Sprite",
//!             "property": "color",
//!             "propertyType": "color",
//!             "value": "#00FF00"
//!         }),
//!     )
//!     .await;
//! ```

pub mod analyzer;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod guard;
pub mod host;
pub mod poll;
pub mod protocol;
pub mod query;
pub mod resolver;
pub mod suggest;
pub mod types;
pub mod verify;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use engine::{PropertyEngine, SetPropertyOutcome};
pub use error::{EngineError, Result};
pub use host::{CallbackHost, HostBridge, HostCall, HostClient};
pub use protocol::{OperationResponse, SetPropertyRequest};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient re-exports for embedding the engine.
pub mod prelude {
    pub use super::config::{EngineConfig, HostConfig, VerifyConfig};
    pub use super::engine::{PropertyEngine, SetPropertyOutcome};
    pub use super::error::{ConversionError, EngineError, HostError, ReferenceError};
    pub use super::host::{CallbackHost, HostBridge, HostCall, Reply};
    pub use super::protocol::{OperationResponse, SetPropertyRequest};
    pub use super::types::{CanonicalValue, Color, ComponentSnapshot, SemanticType};
    pub use super::verify::{Comparison, VerificationResult};
}
