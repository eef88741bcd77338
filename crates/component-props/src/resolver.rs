//! Component reference resolver.
//!
//! A caller addresses a component reference by the uuid of the node that
//! hosts the target component, but the host stores the target component's
//! own scene-local id. Resolution happens in two typed steps:
//!
//! 1. [`RequiredType`]: which component type the source property expects
//! 2. [`ComponentMatch`]: the scene-local id of that type on the target node

use serde_json::{json, Value};

use crate::analyzer;
use crate::descriptor::{self, structural_dump};
use crate::error::{ReferenceError, Result};
use crate::host::HostClient;
use crate::query::{self, scene_id_of};
use crate::types::{uuid_ref, ComponentIdentity, ComponentSnapshot};

/// Component type a reference property expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredType(pub String);

impl RequiredType {
    /// Read the required type from the source component's descriptor
    pub fn from_component(
        component: &ComponentSnapshot,
        property: &str,
    ) -> std::result::Result<Self, ReferenceError> {
        analyzer::find_descriptor(component, property)
            .and_then(|d| d.required_type())
            .map(RequiredType)
            .ok_or_else(|| ReferenceError::TypeUndeterminable {
                component_type: component.component_type.clone(),
                property: property.to_string(),
                structural_dump: descriptor::envelope_entries(&component.properties)
                    .and_then(|entries| entries.get(property))
                    .map(structural_dump)
                    .unwrap_or(Value::Null),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A component of the required type found on the target node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMatch {
    pub node_id: String,
    pub component_type: String,
    pub scene_id: String,
}

impl ComponentMatch {
    /// Find `required` among the target node's components
    pub fn find(
        node_id: &str,
        components: &[ComponentSnapshot],
        required: &RequiredType,
    ) -> std::result::Result<Self, ReferenceError> {
        let Some(component) = components
            .iter()
            .find(|c| c.component_type == required.as_str())
        else {
            return Err(ReferenceError::TargetTypeAbsent {
                node_id: node_id.to_string(),
                required_type: required.0.clone(),
                available: components
                    .iter()
                    .map(|c| ComponentIdentity {
                        component_type: c.component_type.clone(),
                        scene_id: scene_id_of(&c.raw).map(str::to_string),
                    })
                    .collect(),
            });
        };

        let scene_id = scene_id_of(&component.raw).ok_or_else(|| ReferenceError::MalformedSceneId {
            node_id: node_id.to_string(),
            required_type: required.0.clone(),
            structural_dump: json!({
                "component": structural_dump(&component.raw),
                "value": component.raw.get("value").map(structural_dump),
                "uuid": component.raw.pointer("/value/uuid").map(structural_dump),
            }),
        })?;

        Ok(Self {
            node_id: node_id.to_string(),
            component_type: component.component_type.clone(),
            scene_id: scene_id.to_string(),
        })
    }

    /// Final `{uuid}` payload written to the host
    pub fn payload(&self) -> Value {
        uuid_ref(&self.scene_id)
    }
}

/// Resolve a component reference set on `source_type.property` of
/// `source_node` to a component hosted by `target_node`.
pub async fn resolve(
    host: &HostClient,
    source_node: &str,
    source_type: &str,
    property: &str,
    target_node: &str,
) -> Result<ComponentMatch> {
    let source = query::fetch_component(host, source_node, source_type, Some(property)).await?;
    let required = RequiredType::from_component(&source, property)?;

    let targets = query::fetch_components(host, target_node).await?;
    let matched = ComponentMatch::find(target_node, &targets, &required)?;

    tracing::debug!(
        target_node = %target_node,
        required_type = %required.as_str(),
        scene_id = %matched.scene_id,
        "Resolved component reference"
    );
    Ok(matched)
}
