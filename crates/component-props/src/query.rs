//! Component query layer.
//!
//! Turns the host's `query-node` dump into [`ComponentSnapshot`]s. Nothing is
//! cached: every call goes back to the host.

use serde_json::{Map, Value};

use crate::error::{EngineError, Result};
use crate::host::HostClient;
use crate::suggest;
use crate::types::ComponentSnapshot;

/// Keys of a raw component that are decoded into dedicated snapshot fields
const CONSUMED_KEYS: [&str; 7] = ["__type__", "type", "cid", "uuid", "enabled", "value", "properties"];

/// Fetch every component on a node
pub async fn fetch_components(host: &HostClient, node_id: &str) -> Result<Vec<ComponentSnapshot>> {
    let dump = host.query_node(node_id).await?;
    let components = decode_components(node_id, &dump)?;

    tracing::debug!(
        node_id = %node_id,
        count = components.len(),
        "Fetched components"
    );
    Ok(components)
}

/// Fetch one component by exact type, with suggestions when it is missing
pub async fn fetch_component(
    host: &HostClient,
    node_id: &str,
    component_type: &str,
    property: Option<&str>,
) -> Result<ComponentSnapshot> {
    let components = fetch_components(host, node_id).await?;
    find_component(node_id, components, component_type, property)
}

/// Pick the component whose type equals `component_type`
pub fn find_component(
    node_id: &str,
    components: Vec<ComponentSnapshot>,
    component_type: &str,
    property: Option<&str>,
) -> Result<ComponentSnapshot> {
    let available: Vec<String> = components
        .iter()
        .map(|c| c.component_type.clone())
        .collect();

    components
        .into_iter()
        .find(|c| c.component_type == component_type)
        .ok_or_else(|| EngineError::ComponentNotFound {
            node_id: node_id.to_string(),
            component_type: component_type.to_string(),
            suggestion: suggest::suggest_components(component_type, &available, property),
        })
}

/// Decode a node dump into component snapshots
pub fn decode_components(node_id: &str, dump: &Value) -> Result<Vec<ComponentSnapshot>> {
    let node = dump
        .as_object()
        .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))?;

    let raw_components: &[Value] = node
        .get("__comps__")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    Ok(raw_components
        .iter()
        .filter_map(|raw| {
            let snapshot = decode_component(raw);
            if snapshot.is_none() {
                tracing::debug!(node_id = %node_id, "Skipping component without a type");
            }
            snapshot
        })
        .collect())
}

/// Decode one raw component object
pub fn decode_component(raw: &Value) -> Option<ComponentSnapshot> {
    let object = raw.as_object()?;
    let component_type = component_type_of(raw)?.to_string();

    let properties = ["value", "properties"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|v| v.is_object())
        .cloned()
        .unwrap_or(Value::Null);

    let uuid = scene_id_of(raw)
        .or_else(|| object.get("uuid").and_then(Value::as_str))
        .map(str::to_string);

    let enabled = raw
        .pointer("/value/enabled/value")
        .and_then(Value::as_bool)
        .or_else(|| object.get("enabled").and_then(Value::as_bool))
        .unwrap_or(true);

    let fields: Map<String, Value> = object
        .iter()
        .filter(|(k, _)| !CONSUMED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Some(ComponentSnapshot {
        component_type,
        uuid,
        enabled,
        properties,
        fields,
        raw: raw.clone(),
    })
}

/// Declared type of a raw component
pub fn component_type_of(raw: &Value) -> Option<&str> {
    ["__type__", "type", "cid"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
}

/// Scene-local id of a raw component, read from `value.uuid.value`
pub fn scene_id_of(raw: &Value) -> Option<&str> {
    raw.pointer("/value/uuid/value")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sprite_dump() -> Value {
        json!({
            "uuid": {"value": "node-a"},
            "__comps__": [
                {
                    "__type__": "cc.Sprite",
                    "value": {
                        "uuid": {"value": "sprite-1"},
                        "enabled": {"value": false},
                        "color": {"value": {"r": 255, "g": 255, "b": 255, "a": 255}, "type": "cc.Color"}
                    }
                },
                {
                    "cid": "cc.Widget",
                    "uuid": "widget-1",
                    "enabled": true,
                    "properties": {"isAlignTop": {"value": true, "type": "Boolean"}},
                    "editorOnly": false
                },
                {"value": {}}
            ]
        })
    }

    #[test]
    fn test_decode_cocos_style_component() {
        let components = decode_components("node-a", &sprite_dump()).unwrap();
        assert_eq!(components.len(), 2);

        let sprite = &components[0];
        assert_eq!(sprite.component_type, "cc.Sprite");
        assert_eq!(sprite.uuid.as_deref(), Some("sprite-1"));
        assert!(!sprite.enabled);
        assert_eq!(sprite.properties["color"]["type"], "cc.Color");
        assert!(sprite.fields.is_empty());
    }

    #[test]
    fn test_decode_flat_component() {
        let components = decode_components("node-a", &sprite_dump()).unwrap();
        let widget = &components[1];

        assert_eq!(widget.component_type, "cc.Widget");
        assert_eq!(widget.uuid.as_deref(), Some("widget-1"));
        assert!(widget.enabled);
        assert_eq!(widget.fields.get("editorOnly"), Some(&json!(false)));
        assert_eq!(scene_id_of(&widget.raw), None);
    }

    #[test]
    fn test_null_dump_is_node_not_found() {
        let err = decode_components("ghost", &Value::Null).unwrap_err();
        assert!(matches!(err, EngineError::NodeNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_node_without_components() {
        let components = decode_components("bare", &json!({"name": "Bare"})).unwrap();
        assert!(components.is_empty());
    }

    #[test]
    fn test_find_component_suggests_similar() {
        let components = decode_components("node-a", &sprite_dump()).unwrap();
        let err = find_component("node-a", components, "Sprite", Some("spriteFrame")).unwrap_err();

        match err {
            EngineError::ComponentNotFound { suggestion, .. } => {
                assert_eq!(suggestion.similar_components, vec!["cc.Sprite".to_string()]);
                assert_eq!(suggestion.suggested_components, vec!["cc.Sprite".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
