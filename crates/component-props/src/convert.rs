//! Type converter.
//!
//! Pure functions turning caller-supplied JSON into the canonical shape the
//! host expects for a [`SemanticType`]. Coercion follows loose scripting
//! rules (numeric strings are numbers, non-empty strings are truthy) but
//! never produces NaN: anything that cannot become a number is an error.

use serde_json::{Map, Value};

use crate::descriptor::kind_of;
use crate::error::ConversionError;
use crate::types::{CanonicalValue, Color, SemanticType, Size, Vec2, Vec3};

type ConvertResult<T> = std::result::Result<T, ConversionError>;

/// Convert by wire type name; unknown names are [`ConversionError::UnsupportedType`]
pub fn convert_named(type_name: &str, raw: &Value) -> ConvertResult<CanonicalValue> {
    convert(type_name.parse()?, raw)
}

/// Convert `raw` into the canonical value for `semantic_type`.
///
/// `component` yields [`CanonicalValue::PendingComponent`], which still holds
/// the uuid of the node hosting the target and must be resolved before it is
/// a valid reference.
pub fn convert(semantic_type: SemanticType, raw: &Value) -> ConvertResult<CanonicalValue> {
    use SemanticType as T;

    Ok(match semantic_type {
        T::String => CanonicalValue::Text(to_text(raw)),
        T::Number | T::Integer | T::Float => CanonicalValue::Number(to_number(raw)?),
        T::Boolean => CanonicalValue::Boolean(truthy(raw)),
        T::Color => CanonicalValue::Color(to_color(raw)?),
        T::Vec2 => {
            let o = expect_object(semantic_type, raw)?;
            CanonicalValue::Vec2(Vec2 {
                x: field_number(o, "x"),
                y: field_number(o, "y"),
            })
        }
        T::Vec3 => {
            let o = expect_object(semantic_type, raw)?;
            CanonicalValue::Vec3(Vec3 {
                x: field_number(o, "x"),
                y: field_number(o, "y"),
                z: field_number(o, "z"),
            })
        }
        T::Size => {
            let o = expect_object(semantic_type, raw)?;
            CanonicalValue::Size(Size {
                width: field_number(o, "width"),
                height: field_number(o, "height"),
            })
        }
        T::Node | T::SpriteFrame | T::Prefab | T::Asset => {
            CanonicalValue::Reference(to_uuid(semantic_type, raw)?)
        }
        T::Component => CanonicalValue::PendingComponent(to_uuid(semantic_type, raw)?),
        T::NodeArray => {
            let items = expect_array(semantic_type, raw)?;
            let uuids = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    uuid_of(item).ok_or_else(|| ConversionError::InvalidElement {
                        semantic_type,
                        index,
                        expected: "a non-empty uuid string",
                        found: describe(item),
                    })
                })
                .collect::<ConvertResult<Vec<_>>>()?;
            CanonicalValue::References(uuids)
        }
        T::ColorArray => {
            let items = expect_array(semantic_type, raw)?;
            CanonicalValue::Colors(
                items
                    .iter()
                    .map(|item| match item.as_object() {
                        Some(o) if has_channels(o) => color_from_channels(o),
                        _ => Color::WHITE,
                    })
                    .collect(),
            )
        }
        T::NumberArray => {
            let items = expect_array(semantic_type, raw)?;
            let numbers = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    to_number(item).map_err(|_| ConversionError::InvalidElement {
                        semantic_type,
                        index,
                        expected: "a number",
                        found: describe(item),
                    })
                })
                .collect::<ConvertResult<Vec<_>>>()?;
            CanonicalValue::Numbers(numbers)
        }
        T::StringArray => {
            let items = expect_array(semantic_type, raw)?;
            CanonicalValue::Texts(items.iter().map(to_text).collect())
        }
    })
}

// ============================================================================
// Colors
// ============================================================================

/// Parse `#RRGGBB` or `#RRGGBBAA`. Alpha defaults to 255.
pub fn parse_color(input: &str) -> ConvertResult<Color> {
    let invalid = || ConversionError::InvalidColor(input.to_string());

    let hex = input.strip_prefix('#').ok_or_else(invalid)?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let a = if hex.len() == 8 { channel(6)? } else { 255 };

    Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
}

fn to_color(raw: &Value) -> ConvertResult<Color> {
    match raw {
        Value::String(s) => parse_color(s),
        Value::Object(o) if has_channels(o) => Ok(color_from_channels(o)),
        Value::Object(_) => Err(ConversionError::MissingColorChannels),
        other => Err(ConversionError::UnexpectedShape {
            semantic_type: SemanticType::Color,
            expected: "a #RRGGBB[AA] string or an {r, g, b, a} object",
            found: describe(other),
        }),
    }
}

fn has_channels(o: &Map<String, Value>) -> bool {
    ["r", "g", "b"].iter().all(|k| o.contains_key(*k))
}

fn color_from_channels(o: &Map<String, Value>) -> Color {
    let alpha = if o.contains_key("a") { channel(o.get("a")) } else { 255 };
    Color::rgba(channel(o.get("r")), channel(o.get("g")), channel(o.get("b")), alpha)
}

fn channel(value: Option<&Value>) -> u8 {
    let n = value.and_then(|v| to_number(v).ok()).unwrap_or(0.0);
    n.round().clamp(0.0, 255.0) as u8
}

// ============================================================================
// Scalars
// ============================================================================

/// Loose numeric coercion. Blank strings and `null` are 0, booleans are 1/0.
pub fn to_number(raw: &Value) -> ConvertResult<f64> {
    let not_a_number = || ConversionError::NotANumber {
        found: describe(raw),
    };

    match raw {
        Value::Number(n) => n.as_f64().ok_or_else(not_a_number),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Ok(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(not_a_number)
        }
        Value::Array(_) | Value::Object(_) => Err(not_a_number()),
    }
}

/// Loose string coercion
pub fn to_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            Some(f) => format!("{}", f),
            None => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Loose truthiness: `false`, `0`, `""` and `null` are false
pub fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric field of an object, 0 when missing or not numeric
fn field_number(o: &Map<String, Value>, key: &str) -> f64 {
    o.get(key).and_then(|v| to_number(v).ok()).unwrap_or(0.0)
}

// ============================================================================
// References
// ============================================================================

fn to_uuid(semantic_type: SemanticType, raw: &Value) -> ConvertResult<String> {
    match raw {
        Value::String(s) if s.is_empty() => Err(ConversionError::EmptyUuid(semantic_type)),
        Value::Object(o) if o.get("uuid").and_then(Value::as_str) == Some("") => {
            Err(ConversionError::EmptyUuid(semantic_type))
        }
        other => uuid_of(other).ok_or_else(|| ConversionError::UnexpectedShape {
            semantic_type,
            expected: "a uuid string",
            found: describe(other),
        }),
    }
}

/// A uuid string, or an existing `{uuid}` reference
fn uuid_of(raw: &Value) -> Option<String> {
    let uuid = match raw {
        Value::String(s) => s.as_str(),
        Value::Object(o) => o.get("uuid")?.as_str()?,
        _ => return None,
    };
    (!uuid.is_empty()).then(|| uuid.to_string())
}

// ============================================================================
// Shape helpers
// ============================================================================

fn expect_object(semantic_type: SemanticType, raw: &Value) -> ConvertResult<&Map<String, Value>> {
    raw.as_object().ok_or_else(|| ConversionError::UnexpectedShape {
        semantic_type,
        expected: "an object",
        found: describe(raw),
    })
}

fn expect_array(semantic_type: SemanticType, raw: &Value) -> ConvertResult<&Vec<Value>> {
    raw.as_array().ok_or_else(|| ConversionError::UnexpectedShape {
        semantic_type,
        expected: "an array",
        found: describe(raw),
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => kind_of(value).to_string(),
        other => format!("{} {}", kind_of(other), other),
    }
}
