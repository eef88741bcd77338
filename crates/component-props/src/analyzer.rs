//! Property analyzer.
//!
//! Locates a property on a [`ComponentSnapshot`] and infers a semantic type
//! from the shape of its current value. Inference is best-effort and only
//! used when the caller does not name a type.

use serde::Serialize;
use serde_json::Value;

use crate::descriptor::{self, Descriptor};
use crate::types::{ComponentSnapshot, SemanticType};

/// Property names that mark an asset reference (compared lowercase)
const ASSET_KEYWORDS: [&str; 6] = ["spriteframe", "texture", "material", "font", "clip", "prefab"];

/// Result of looking a property up on a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAnalysis {
    /// Whether the property was found
    pub exists: bool,
    /// Semantic type inferred from the current value, when one fits
    pub inferred_type: Option<SemanticType>,
    /// Every property the component exposes
    pub available_properties: Vec<String>,
    /// Current value, before any write
    pub original_value: Option<Value>,
}

/// Analyze `property` on `component`
pub fn analyze(component: &ComponentSnapshot, property: &str) -> PropertyAnalysis {
    let descriptors = descriptor::property_descriptors(&component.properties);

    let available_properties = match &descriptors {
        Some(entries) => entries.iter().map(|(name, _)| name.to_string()).collect(),
        None => direct_keys(component),
    };

    let found = direct_field(component, property).or_else(|| {
        descriptors.as_ref().and_then(|entries| {
            entries
                .iter()
                .find(|(name, _)| *name == property)
                .map(|(_, d)| d.effective_value().clone())
        })
    });

    match found {
        Some(value) => PropertyAnalysis {
            exists: true,
            inferred_type: infer_semantic_type(property, &value),
            available_properties,
            original_value: Some(value),
        },
        None => PropertyAnalysis {
            exists: false,
            inferred_type: None,
            available_properties,
            original_value: None,
        },
    }
}

/// Descriptor for `property`, when the component declares one
pub fn find_descriptor<'a>(component: &'a ComponentSnapshot, property: &str) -> Option<Descriptor<'a>> {
    descriptor::property_descriptors(&component.properties)?
        .into_iter()
        .find(|(name, _)| *name == property)
        .map(|(_, d)| d)
}

fn direct_field(component: &ComponentSnapshot, property: &str) -> Option<Value> {
    if property == "enabled" {
        return Some(Value::Bool(component.enabled));
    }
    component.fields.get(property).cloned()
}

fn direct_keys(component: &ComponentSnapshot) -> Vec<String> {
    std::iter::once("enabled")
        .chain(component.fields.keys().map(String::as_str))
        .filter(|k| !k.starts_with('_'))
        .map(str::to_string)
        .collect()
}

/// Infer a semantic type from a property name and its current value.
///
/// Returns `None` for generic arrays, generic objects and values whose name
/// gives no hint.
pub fn infer_semantic_type(property: &str, value: &Value) -> Option<SemanticType> {
    let name = property.to_lowercase();
    let names_asset = ASSET_KEYWORDS.iter().any(|k| name == *k);
    let names_node = name.contains("node") || name.contains("target");

    match value {
        Value::Array(_) if name.contains("node") => Some(SemanticType::NodeArray),
        Value::Array(_) if name.contains("color") => Some(SemanticType::ColorArray),
        Value::Array(_) => None,
        Value::String(_) if names_asset => Some(SemanticType::Asset),
        Value::String(_) => Some(SemanticType::String),
        Value::Number(_) => Some(SemanticType::Number),
        Value::Bool(_) => Some(SemanticType::Boolean),
        Value::Object(object) => {
            let has = |keys: &[&str]| keys.iter().all(|k| object.contains_key(*k));

            if has(&["r", "g", "b"]) {
                Some(SemanticType::Color)
            } else if has(&["x", "y", "z"]) {
                Some(SemanticType::Vec3)
            } else if has(&["x", "y"]) {
                Some(SemanticType::Vec2)
            } else if has(&["width", "height"]) {
                Some(SemanticType::Size)
            } else if has(&["uuid"]) || has(&["__uuid__"]) {
                if names_node || has(&["__id__"]) {
                    Some(SemanticType::Node)
                } else {
                    Some(SemanticType::Asset)
                }
            } else {
                None
            }
        }
        Value::Null if names_asset => Some(SemanticType::Asset),
        Value::Null if names_node => Some(SemanticType::Node),
        Value::Null if name.contains("component") => Some(SemanticType::Component),
        Value::Null => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::decode_component;
    use serde_json::json;

    fn label() -> ComponentSnapshot {
        decode_component(&json!({
            "__type__": "cc.Label",
            "value": {
                "uuid": {"value": "label-1"},
                "enabled": {"value": true},
                "string": {"value": "Hello", "type": "String", "readonly": false},
                "fontSize": {"value": 40, "type": "Number", "readonly": false},
                "color": {"value": {"r": 255, "g": 0, "b": 0, "a": 255}, "type": "cc.Color"},
                "contentSize": {"width": 200, "height": 150}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_descriptor_lookup() {
        let analysis = analyze(&label(), "string");
        assert!(analysis.exists);
        assert_eq!(analysis.inferred_type, Some(SemanticType::String));
        assert_eq!(analysis.original_value, Some(json!("Hello")));
        assert_eq!(analysis.available_properties, vec!["color", "fontSize", "string"]);
    }

    #[test]
    fn test_value_bag_is_not_a_property() {
        let analysis = analyze(&label(), "contentSize");
        assert!(!analysis.exists);
        assert!(!analysis.available_properties.contains(&"contentSize".to_string()));
    }

    #[test]
    fn test_color_inferred_from_shape() {
        let analysis = analyze(&label(), "color");
        assert_eq!(analysis.inferred_type, Some(SemanticType::Color));
    }

    #[test]
    fn test_direct_field_lookup() {
        let analysis = analyze(&label(), "enabled");
        assert!(analysis.exists);
        assert_eq!(analysis.inferred_type, Some(SemanticType::Boolean));
        assert_eq!(analysis.original_value, Some(json!(true)));
    }

    #[test]
    fn test_fallback_lists_direct_keys() {
        let component = decode_component(&json!({
            "type": "custom.Thing",
            "speed": 3,
            "_private": 1,
            "properties": {"size": {"width": 1, "height": 1}}
        }))
        .unwrap();

        let analysis = analyze(&component, "missing");
        assert!(!analysis.exists);
        assert_eq!(analysis.available_properties, vec!["enabled", "speed"]);

        let speed = analyze(&component, "speed");
        assert!(speed.exists);
        assert_eq!(speed.original_value, Some(json!(3)));
    }

    #[test]
    fn test_find_descriptor() {
        let component = label();
        let descriptor = find_descriptor(&component, "color").unwrap();
        assert_eq!(descriptor.required_type().as_deref(), Some("cc.Color"));
        assert!(find_descriptor(&component, "contentSize").is_none());
    }

    #[test]
    fn test_inference_rules() {
        let cases = [
            ("targetNodes", json!([]), Some(SemanticType::NodeArray)),
            ("colors", json!([]), Some(SemanticType::ColorArray)),
            ("items", json!([1, 2]), None),
            ("spriteFrame", json!("abc"), Some(SemanticType::Asset)),
            ("fontFamily", json!("Arial"), Some(SemanticType::String)),
            ("font", json!("arial-ttf"), Some(SemanticType::Asset)),
            ("Texture", json!("tex-1"), Some(SemanticType::Asset)),
            ("clipName", Value::Null, None),
            ("string", json!("abc"), Some(SemanticType::String)),
            ("fontSize", json!(12), Some(SemanticType::Number)),
            ("interactable", json!(false), Some(SemanticType::Boolean)),
            ("tint", json!({"r": 1, "g": 2, "b": 3}), Some(SemanticType::Color)),
            ("offset", json!({"x": 1, "y": 2, "z": 3}), Some(SemanticType::Vec3)),
            ("offset", json!({"x": 1, "y": 2}), Some(SemanticType::Vec2)),
            ("area", json!({"width": 1, "height": 2}), Some(SemanticType::Size)),
            ("target", json!({"uuid": "n1"}), Some(SemanticType::Node)),
            ("owner", json!({"uuid": "n1", "__id__": 3}), Some(SemanticType::Node)),
            ("spriteFrame", json!({"uuid": ""}), Some(SemanticType::Asset)),
            ("misc", json!({"foo": 1}), None),
            ("normalSprite", Value::Null, None),
            ("texture", Value::Null, Some(SemanticType::Asset)),
            ("parentNode", Value::Null, Some(SemanticType::Node)),
            ("labelComponent", Value::Null, Some(SemanticType::Component)),
        ];

        for (name, value, expected) in cases {
            assert_eq!(infer_semantic_type(name, &value), expected, "{name}: {value}");
        }
    }
}
