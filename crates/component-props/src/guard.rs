//! Node-property guard.
//!
//! The host's serialized model does not separate node-intrinsic fields from
//! component fields, so a write to `position` through a component can land on
//! the node by the wrong channel. The guard refuses such writes and names the
//! operation that should be used instead.

use serde::Serialize;
use std::fmt;

/// Fields owned by the node itself
pub const NODE_BASIC_PROPERTIES: &[&str] = &[
    "name",
    "active",
    "layer",
    "mobility",
    "parent",
    "children",
    "hideFlags",
    "width",
    "height",
    "anchorX",
    "anchorY",
    "contentSize",
    "anchorPoint",
    "color",
    "x",
    "y",
    "scaleX",
    "scaleY",
    "opacity",
];

/// Fields owned by the node transform
pub const NODE_TRANSFORM_PROPERTIES: &[&str] =
    &["position", "rotation", "scale", "eulerAngles", "angle"];

/// Component type names that denote the node itself
pub const NODE_PSEUDO_TYPES: &[&str] = &["cc.Node", "Node"];

/// Which node-level channel a property belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeField {
    Basic,
    Transform,
}

impl NodeField {
    /// Operation that writes this kind of field
    pub fn operation(self) -> &'static str {
        match self {
            NodeField::Basic => "set_node_property",
            NodeField::Transform => "set_node_transform",
        }
    }
}

/// Refusal to write a node-level field through the component channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardRedirect {
    pub component_type: String,
    pub property: String,
    pub field: NodeField,
}

impl GuardRedirect {
    /// Name of the operation the caller should use
    pub fn operation(&self) -> &'static str {
        self.field.operation()
    }

    /// Caller-facing hint
    pub fn instruction(&self) -> String {
        match self.field {
            NodeField::Transform => format!(
                "Use {} to change '{}' (e.g. {{\"{}\": {{...}}}}) instead of a component property",
                self.operation(),
                self.property,
                self.property
            ),
            NodeField::Basic => format!(
                "Use {} with property '{}' instead of a component property",
                self.operation(),
                self.property
            ),
        }
    }
}

impl fmt::Display for GuardRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is a node {} field and cannot be set through component '{}'",
            self.property,
            match self.field {
                NodeField::Basic => "property",
                NodeField::Transform => "transform",
            },
            self.component_type
        )
    }
}

/// Classify a property name as a node-level field
pub fn node_field(property: &str) -> Option<NodeField> {
    if NODE_TRANSFORM_PROPERTIES.contains(&property) {
        Some(NodeField::Transform)
    } else if NODE_BASIC_PROPERTIES.contains(&property) {
        Some(NodeField::Basic)
    } else {
        None
    }
}

/// Whether `component_type` names the node itself
pub fn is_node_pseudo_type(component_type: &str) -> bool {
    NODE_PSEUDO_TYPES.contains(&component_type)
}

/// Check that runs before any host call.
///
/// Redirects every write addressed to the node pseudo-type and every
/// transform field regardless of component type. Basic node fields on a real
/// component are left to [`check_declared`], since components such as
/// `cc.Sprite` legitimately declare `color`.
pub fn check(component_type: &str, property: &str) -> Result<(), GuardRedirect> {
    let redirect = |field| GuardRedirect {
        component_type: component_type.to_string(),
        property: property.to_string(),
        field,
    };

    if is_node_pseudo_type(component_type) {
        return Err(redirect(node_field(property).unwrap_or(NodeField::Basic)));
    }

    match node_field(property) {
        Some(NodeField::Transform) => Err(redirect(NodeField::Transform)),
        _ => Ok(()),
    }
}

/// Check that runs once the component has been fetched: a basic node field
/// is only writable through a component that actually declares it.
pub fn check_declared(
    component_type: &str,
    property: &str,
    declared: bool,
) -> Result<(), GuardRedirect> {
    match node_field(property) {
        Some(field) if !declared => Err(GuardRedirect {
            component_type: component_type.to_string(),
            property: property.to_string(),
            field,
        }),
        _ => Ok(()),
    }
}
