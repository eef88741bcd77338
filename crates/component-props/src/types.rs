//! Core value types shared by the analyzer, converter, resolver and verifier.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

// ============================================================================
// Semantic Types
// ============================================================================

/// The closed set of value shapes the engine knows how to convert.
///
/// This is independent of whatever type name the host itself reports for a
/// property; the host's name is only used as a hint during reference
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticType {
    String,
    Number,
    Integer,
    Float,
    Boolean,
    Color,
    Vec2,
    Vec3,
    Size,
    Node,
    Component,
    SpriteFrame,
    Prefab,
    Asset,
    NodeArray,
    ColorArray,
    NumberArray,
    StringArray,
}

impl SemanticType {
    /// Every semantic type, in wire-name order
    pub const ALL: [SemanticType; 18] = [
        SemanticType::String,
        SemanticType::Number,
        SemanticType::Integer,
        SemanticType::Float,
        SemanticType::Boolean,
        SemanticType::Color,
        SemanticType::Vec2,
        SemanticType::Vec3,
        SemanticType::Size,
        SemanticType::Node,
        SemanticType::Component,
        SemanticType::SpriteFrame,
        SemanticType::Prefab,
        SemanticType::Asset,
        SemanticType::NodeArray,
        SemanticType::ColorArray,
        SemanticType::NumberArray,
        SemanticType::StringArray,
    ];

    /// Wire name of the type (`"spriteFrame"`, `"vec3"`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::String => "string",
            SemanticType::Number => "number",
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Boolean => "boolean",
            SemanticType::Color => "color",
            SemanticType::Vec2 => "vec2",
            SemanticType::Vec3 => "vec3",
            SemanticType::Size => "size",
            SemanticType::Node => "node",
            SemanticType::Component => "component",
            SemanticType::SpriteFrame => "spriteFrame",
            SemanticType::Prefab => "prefab",
            SemanticType::Asset => "asset",
            SemanticType::NodeArray => "nodeArray",
            SemanticType::ColorArray => "colorArray",
            SemanticType::NumberArray => "numberArray",
            SemanticType::StringArray => "stringArray",
        }
    }

    /// Whether the canonical value is a single `{uuid}` reference
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            SemanticType::Node
                | SemanticType::Component
                | SemanticType::SpriteFrame
                | SemanticType::Prefab
                | SemanticType::Asset
        )
    }

    /// Comma-separated list of every wire name, for caller-facing hints
    pub fn wire_names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConversionError::UnsupportedType(s.to_string()))
    }
}

// ============================================================================
// Canonical Values
// ============================================================================

/// RGBA color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Two-component vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// Three-component vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A value converted into the exact shape the host expects.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Color(Color),
    Vec2(Vec2),
    Vec3(Vec3),
    Size(Size),
    /// `{uuid}` reference to a node or asset
    Reference(String),
    /// Component reference that still carries the *hosting node* uuid.
    /// Must go through the reference resolver before it is final.
    PendingComponent(String),
    References(Vec<String>),
    Colors(Vec<Color>),
    Numbers(Vec<f64>),
    Texts(Vec<String>),
}

impl CanonicalValue {
    /// JSON payload sent to the host
    pub fn to_json(&self) -> Value {
        match self {
            CanonicalValue::Text(s) => Value::String(s.clone()),
            CanonicalValue::Number(n) => number_value(*n),
            CanonicalValue::Boolean(b) => Value::Bool(*b),
            CanonicalValue::Color(c) => color_json(c),
            CanonicalValue::Vec2(v) => serde_json::json!({
                "x": number_value(v.x),
                "y": number_value(v.y),
            }),
            CanonicalValue::Vec3(v) => serde_json::json!({
                "x": number_value(v.x),
                "y": number_value(v.y),
                "z": number_value(v.z),
            }),
            CanonicalValue::Size(s) => serde_json::json!({
                "width": number_value(s.width),
                "height": number_value(s.height),
            }),
            CanonicalValue::Reference(uuid) | CanonicalValue::PendingComponent(uuid) => {
                uuid_ref(uuid)
            }
            CanonicalValue::References(uuids) => {
                Value::Array(uuids.iter().map(|u| uuid_ref(u)).collect())
            }
            CanonicalValue::Colors(colors) => Value::Array(colors.iter().map(color_json).collect()),
            CanonicalValue::Numbers(ns) => Value::Array(ns.iter().map(|n| number_value(*n)).collect()),
            CanonicalValue::Texts(ss) => {
                Value::Array(ss.iter().map(|s| Value::String(s.clone())).collect())
            }
        }
    }

    /// Whether this value still needs component-reference resolution
    pub fn is_pending(&self) -> bool {
        matches!(self, CanonicalValue::PendingComponent(_))
    }
}

/// Build a `{uuid}` reference payload
pub fn uuid_ref(uuid: &str) -> Value {
    serde_json::json!({ "uuid": uuid })
}

fn color_json(c: &Color) -> Value {
    serde_json::json!({ "r": c.r, "g": c.g, "b": c.b, "a": c.a })
}

/// Render an `f64` as JSON, using an integer when the value is integral so
/// read-backs like `3` compare equal to a written `3.0`.
pub fn number_value(n: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

// ============================================================================
// Component Snapshots
// ============================================================================

/// Read-only view of one component instance as the host currently holds it.
///
/// Built fresh from every `query-node` reply; never cached.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentSnapshot {
    /// Declared component type, e.g. `cc.Sprite`
    #[serde(rename = "type")]
    pub component_type: String,
    /// Scene-local identifier of the component instance
    pub uuid: Option<String>,
    /// Whether the component is enabled
    pub enabled: bool,
    /// Property envelope exactly as the host sent it
    pub properties: Value,
    /// Top-level fields outside the envelope
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    /// Raw component object
    #[serde(skip)]
    pub raw: Value,
}

/// A component type paired with its scene-local id, used in diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentIdentity {
    #[serde(rename = "type")]
    pub component_type: String,
    pub scene_id: Option<String>,
}
