//! Error types for the component property engine.
//!
//! ## Table of Contents
//! - **EngineError**: every failure an operation can report
//! - **ConversionError**: raw value could not take its canonical shape
//! - **ReferenceError**: component cross-reference could not be resolved
//! - **HostError**: the RPC to the scene host itself failed

use serde_json::{json, Value};
use thiserror::Error;

use crate::guard::GuardRedirect;
use crate::suggest::ComponentSuggestion;
use crate::types::{ComponentIdentity, SemanticType};

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for host calls
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The host could not resolve the node
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// No component of the requested type on the node
    #[error("Component '{component_type}' not found on node {node_id}")]
    ComponentNotFound {
        node_id: String,
        component_type: String,
        suggestion: ComponentSuggestion,
    },

    /// The component does not expose the property
    #[error("Property '{property}' not found on component '{component_type}'")]
    PropertyNotFound {
        component_type: String,
        property: String,
        available: Vec<String>,
    },

    /// No explicit type was given and none could be inferred
    #[error("Cannot infer a type for property '{property}' on component '{component_type}'")]
    TypeNotInferred {
        component_type: String,
        property: String,
    },

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Reference resolution failed: {0}")]
    Reference(#[from] ReferenceError),

    /// The property belongs to the node, not the component
    #[error("{0}")]
    Redirect(GuardRedirect),

    #[error("Host call failed: {0}")]
    Host(#[from] HostError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Caller-facing remediation hint, kept separate from the error text
    pub fn instruction(&self) -> Option<String> {
        match self {
            EngineError::Redirect(redirect) => Some(redirect.instruction()),
            EngineError::ComponentNotFound { suggestion, .. } => suggestion.instruction(),
            EngineError::PropertyNotFound {
                component_type,
                available,
                ..
            } => Some(if available.is_empty() {
                format!("{} exposes no settable properties", component_type)
            } else {
                format!(
                    "Available properties on {}: {}",
                    component_type,
                    available.join(", ")
                )
            }),
            EngineError::TypeNotInferred { .. } => Some(format!(
                "Pass propertyType explicitly. Supported types: {}",
                SemanticType::wire_names()
            )),
            EngineError::Conversion(ConversionError::InvalidColor(_)) => Some(
                "Colors must be hex strings like #RRGGBB or #RRGGBBAA, or {r, g, b, a} objects"
                    .to_string(),
            ),
            EngineError::Conversion(ConversionError::UnsupportedType(_)) => Some(format!(
                "Supported types: {}",
                SemanticType::wire_names()
            )),
            EngineError::Reference(ReferenceError::TargetTypeAbsent { required_type, .. }) => {
                Some(format!(
                    "Pass the uuid of a node that has a {} component",
                    required_type
                ))
            }
            _ => None,
        }
    }

    /// Structured diagnostics attached to the failure response
    pub fn diagnostics(&self) -> Option<Value> {
        match self {
            EngineError::Redirect(redirect) => Some(json!({
                "property": redirect.property,
                "redirectTo": redirect.operation(),
            })),
            EngineError::ComponentNotFound { suggestion, .. } => {
                serde_json::to_value(suggestion).ok()
            }
            EngineError::PropertyNotFound { available, .. } => Some(json!({
                "availableProperties": available,
            })),
            EngineError::Reference(err) => Some(err.diagnostics()),
            _ => None,
        }
    }
}

/// Failure to bring a raw value into canonical shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("unsupported property type '{0}'")]
    UnsupportedType(String),

    #[error("invalid color '{0}': expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    #[error("color object must provide r, g and b channels")]
    MissingColorChannels,

    #[error("cannot convert {found} to a number")]
    NotANumber { found: String },

    #[error("{semantic_type} expects {expected}, got {found}")]
    UnexpectedShape {
        semantic_type: SemanticType,
        expected: &'static str,
        found: String,
    },

    #[error("{semantic_type} element {index} is invalid: expected {expected}, got {found}")]
    InvalidElement {
        semantic_type: SemanticType,
        index: usize,
        expected: &'static str,
        found: String,
    },

    #[error("{0} reference requires a non-empty uuid")]
    EmptyUuid(SemanticType),
}

/// Failure to turn a node uuid into a component's scene-local id
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("cannot determine the component type required by '{property}' on '{component_type}'")]
    TypeUndeterminable {
        component_type: String,
        property: String,
        structural_dump: Value,
    },

    #[error("node {node_id} has no component of type '{required_type}'")]
    TargetTypeAbsent {
        node_id: String,
        required_type: String,
        available: Vec<ComponentIdentity>,
    },

    #[error("component '{required_type}' on node {node_id} has no scene id at value.uuid.value")]
    MalformedSceneId {
        node_id: String,
        required_type: String,
        structural_dump: Value,
    },
}

impl ReferenceError {
    /// Structural diagnostics describing what the host actually returned
    pub fn diagnostics(&self) -> Value {
        match self {
            ReferenceError::TypeUndeterminable { structural_dump, .. } => json!({
                "reason": "typeUndeterminable",
                "structuralDump": structural_dump,
            }),
            ReferenceError::TargetTypeAbsent {
                required_type,
                available,
                ..
            } => json!({
                "reason": "targetTypeAbsent",
                "requiredType": required_type,
                "availableComponents": available,
            }),
            ReferenceError::MalformedSceneId { structural_dump, .. } => json!({
                "reason": "malformedSceneId",
                "structuralDump": structural_dump,
            }),
        }
    }
}

/// Failure of an RPC to the scene host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("{module}.{method} failed: {message}")]
    Call {
        module: String,
        method: String,
        message: String,
    },

    #[error("{module}.{method} timed out after {timeout_ms}ms")]
    Timeout {
        module: String,
        method: String,
        timeout_ms: u64,
    },

    #[error("{module}.{method} was dropped before the host replied")]
    Disconnected { module: String, method: String },
}
