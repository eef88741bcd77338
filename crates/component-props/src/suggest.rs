//! Suggestions for missing components, and the catalog of well-known types.

use serde::Serialize;

use crate::error::{EngineError, Result};

/// Property name → component types that usually own it
const PROPERTY_OWNERS: &[(&str, &[&str])] = &[
    ("string", &["cc.Label", "cc.RichText", "cc.EditBox"]),
    ("fontSize", &["cc.Label", "cc.RichText"]),
    ("fontFamily", &["cc.Label"]),
    ("lineHeight", &["cc.Label", "cc.RichText"]),
    ("horizontalAlign", &["cc.Label", "cc.RichText"]),
    ("verticalAlign", &["cc.Label"]),
    ("overflow", &["cc.Label"]),
    ("spriteFrame", &["cc.Sprite"]),
    ("sizeMode", &["cc.Sprite"]),
    ("fillRange", &["cc.Sprite"]),
    ("color", &["cc.Sprite", "cc.Label", "cc.Graphics"]),
    ("normalSprite", &["cc.Button"]),
    ("pressedSprite", &["cc.Button"]),
    ("hoverSprite", &["cc.Button"]),
    ("disabledSprite", &["cc.Button"]),
    ("interactable", &["cc.Button", "cc.Toggle", "cc.Slider"]),
    ("isChecked", &["cc.Toggle"]),
    ("progress", &["cc.ProgressBar", "cc.Slider"]),
    ("totalLength", &["cc.ProgressBar"]),
    ("placeholder", &["cc.EditBox"]),
    ("maxLength", &["cc.EditBox"]),
    ("content", &["cc.ScrollView"]),
    ("clip", &["cc.AudioSource", "cc.Animation"]),
    ("volume", &["cc.AudioSource"]),
    ("loop", &["cc.AudioSource"]),
    ("playOnLoad", &["cc.AudioSource", "cc.Animation"]),
    ("clips", &["cc.Animation"]),
    ("defaultClip", &["cc.Animation"]),
    ("mass", &["cc.RigidBody2D", "cc.RigidBody"]),
    ("gravityScale", &["cc.RigidBody2D"]),
    ("friction", &["cc.BoxCollider2D", "cc.CircleCollider2D", "cc.PolygonCollider2D"]),
    ("radius", &["cc.CircleCollider2D"]),
    ("spacingX", &["cc.Layout"]),
    ("spacingY", &["cc.Layout"]),
    ("isAlignTop", &["cc.Widget"]),
    ("isAlignLeft", &["cc.Widget"]),
];

/// Diagnostics attached to a component-not-found failure
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSuggestion {
    /// The type the caller asked for
    pub requested: String,
    /// Every component type present on the node
    pub available_components: Vec<String>,
    /// Present types that match the request case-insensitively by substring
    pub similar_components: Vec<String>,
    /// Types that usually own the property being addressed
    pub suggested_components: Vec<String>,
}

impl ComponentSuggestion {
    /// Caller-facing hint, or `None` when nothing useful can be said
    pub fn instruction(&self) -> Option<String> {
        let mut parts = Vec::new();

        if !self.similar_components.is_empty() {
            parts.push(format!(
                "Did you mean: {}?",
                self.similar_components.join(", ")
            ));
        }
        if !self.suggested_components.is_empty() {
            parts.push(format!(
                "This property is usually found on: {}.",
                self.suggested_components.join(", ")
            ));
        }
        if !self.available_components.is_empty() {
            parts.push(format!(
                "Components on this node: {}.",
                self.available_components.join(", ")
            ));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Build suggestions for a component type that was not found
pub fn suggest_components(
    requested: &str,
    available: &[String],
    property: Option<&str>,
) -> ComponentSuggestion {
    let needle = requested.to_lowercase();
    let similar_components = available
        .iter()
        .filter(|candidate| {
            let candidate = candidate.to_lowercase();
            !needle.is_empty() && (candidate.contains(&needle) || needle.contains(&candidate))
        })
        .cloned()
        .collect();

    ComponentSuggestion {
        requested: requested.to_string(),
        available_components: available.to_vec(),
        similar_components,
        suggested_components: property.map(likely_owners).unwrap_or_default(),
    }
}

/// Component types that usually declare `property`
pub fn likely_owners(property: &str) -> Vec<String> {
    PROPERTY_OWNERS
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, owners)| owners.iter().map(|o| o.to_string()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Component Catalog
// ============================================================================

const CATALOG: &[(&str, &[&str])] = &[
    (
        "renderer",
        &["cc.Sprite", "cc.Label", "cc.RichText", "cc.Mask", "cc.Graphics", "cc.UIOpacity"],
    ),
    (
        "ui",
        &[
            "cc.Button",
            "cc.Toggle",
            "cc.ToggleContainer",
            "cc.Slider",
            "cc.ScrollView",
            "cc.PageView",
            "cc.EditBox",
            "cc.ProgressBar",
        ],
    ),
    ("layout", &["cc.Layout", "cc.Widget", "cc.UITransform", "cc.SafeArea"]),
    (
        "physics",
        &[
            "cc.RigidBody2D",
            "cc.BoxCollider2D",
            "cc.CircleCollider2D",
            "cc.PolygonCollider2D",
        ],
    ),
    ("animation", &["cc.Animation", "cc.SkeletalAnimation", "sp.Skeleton"]),
    ("audio", &["cc.AudioSource"]),
    ("effects", &["cc.ParticleSystem2D", "cc.MotionStreak"]),
];

/// Category names accepted by [`catalog`], besides `all`
pub fn catalog_categories() -> Vec<&'static str> {
    CATALOG.iter().map(|(name, _)| *name).collect()
}

/// Well-known component types for a category (`all` for every category)
pub fn catalog(category: &str) -> Result<Vec<&'static str>> {
    if category == "all" {
        return Ok(CATALOG
            .iter()
            .flat_map(|(_, types)| types.iter().copied())
            .collect());
    }

    CATALOG
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, types)| types.to_vec())
        .ok_or_else(|| {
            EngineError::invalid_request(format!(
                "Unknown component category '{}'. Expected one of: all, {}",
                category,
                catalog_categories().join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> Vec<String> {
        vec!["cc.UITransform".into(), "cc.Sprite".into(), "cc.Button".into()]
    }

    #[test]
    fn test_similar_components_case_insensitive() {
        let suggestion = suggest_components("sprite", &available(), None);
        assert_eq!(suggestion.similar_components, vec!["cc.Sprite".to_string()]);
        assert!(suggestion.suggested_components.is_empty());
    }

    #[test]
    fn test_property_table() {
        let suggestion = suggest_components("cc.Label", &available(), Some("string"));
        assert!(suggestion.similar_components.is_empty());
        assert_eq!(
            suggestion.suggested_components,
            vec!["cc.Label", "cc.RichText", "cc.EditBox"]
        );

        let instruction = suggestion.instruction().unwrap();
        assert!(instruction.contains("cc.Label, cc.RichText, cc.EditBox"));
        assert!(instruction.contains("cc.UITransform, cc.Sprite, cc.Button"));
    }

    #[test]
    fn test_sprite_frame_owner() {
        assert_eq!(likely_owners("spriteFrame"), vec!["cc.Sprite"]);
        assert!(likely_owners("noSuchProperty").is_empty());
    }

    #[test]
    fn test_no_instruction_without_context() {
        let suggestion = suggest_components("cc.Label", &[], None);
        assert_eq!(suggestion.instruction(), None);
    }

    #[test]
    fn test_catalog() {
        assert!(catalog("renderer").unwrap().contains(&"cc.Sprite"));

        let all = catalog("all").unwrap();
        assert!(all.contains(&"cc.AudioSource"));
        assert!(all.contains(&"cc.Button"));

        let err = catalog("shaders").unwrap_err();
        assert!(err.to_string().contains("Unknown component category"));
    }
}
