//! Property descriptor decoder.
//!
//! A property inside a component envelope is either a bare value or a
//! `{value, type?, displayName?, readonly?, extends?, ctor?}` wrapper, and the
//! envelope may itself be nested one level under `.value`. Rather than probing
//! keys at every call site, entries are classified once into a closed set of
//! shapes and only [`DescriptorShape::Wrapped`] entries count as properties.

use serde_json::{Map, Value};

/// Keys that mark an object as property metadata
const METADATA_KEYS: [&str; 3] = ["type", "displayName", "readonly"];

/// Base classes that say nothing about the concrete component required
const GENERIC_BASES: [&str; 4] = ["cc.Component", "cc.Object", "Component", "Object"];

/// Shape of one envelope entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorShape {
    /// Metadata wrapper around a value
    Wrapped,
    /// Plain data made only of scalars, e.g. `{width: 200, height: 150}`
    ValueBag,
    /// Object that is neither metadata nor a scalar bag
    Opaque,
    /// Non-object value
    Bare,
}

/// A classified envelope entry
#[derive(Debug, Clone, Copy)]
pub struct Descriptor<'a> {
    raw: &'a Value,
    shape: DescriptorShape,
}

impl<'a> Descriptor<'a> {
    /// Classify a raw envelope entry
    pub fn classify(raw: &'a Value) -> Self {
        let shape = match raw.as_object() {
            None => DescriptorShape::Bare,
            Some(object) => classify_object(object),
        };
        Self { raw, shape }
    }

    pub fn shape(&self) -> DescriptorShape {
        self.shape
    }

    /// Whether this entry is genuine property metadata
    pub fn is_property(&self) -> bool {
        self.shape == DescriptorShape::Wrapped
    }

    /// The `.value` sub-field when present, else the entry itself
    pub fn effective_value(&self) -> &'a Value {
        match self.shape {
            DescriptorShape::Wrapped => self.raw.get("value").unwrap_or(self.raw),
            _ => self.raw,
        }
    }

    /// Component type this property expects to reference.
    ///
    /// Prefers `type`, then `ctor`, then the most specific non-generic entry
    /// of `extends`.
    pub fn required_type(&self) -> Option<String> {
        let non_empty = |key: &str| {
            self.raw
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        non_empty("type").or_else(|| non_empty("ctor")).or_else(|| {
            self.raw
                .get("extends")
                .and_then(Value::as_array)?
                .iter()
                .filter_map(Value::as_str)
                .find(|name| !name.is_empty() && !GENERIC_BASES.contains(name))
                .map(str::to_string)
        })
    }
}

fn classify_object(object: &Map<String, Value>) -> DescriptorShape {
    let all_scalar = object
        .values()
        .all(|v| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_)));
    let has_value = object.contains_key("value");
    let has_anchor = has_value || object.contains_key("name");
    let has_metadata = METADATA_KEYS.iter().any(|k| object.contains_key(*k));

    if all_scalar && !has_value {
        DescriptorShape::ValueBag
    } else if has_anchor && has_metadata {
        DescriptorShape::Wrapped
    } else {
        DescriptorShape::Opaque
    }
}

/// Entries of a property envelope.
///
/// Descends into `.value` when the envelope nests its properties there, unless
/// that `.value` is itself a property wrapper. Returns `None` when there is no
/// envelope object at all.
pub fn envelope_entries(properties: &Value) -> Option<&Map<String, Value>> {
    let envelope = properties.as_object()?;

    match envelope.get("value") {
        Some(inner) if inner.is_object() && !Descriptor::classify(inner).is_property() => {
            inner.as_object()
        }
        _ => Some(envelope),
    }
}

/// Accepted property descriptors of an envelope, in envelope order.
///
/// `None` means no descriptor envelope was found: either there is no envelope
/// or none of its entries is genuine property metadata.
pub fn property_descriptors(properties: &Value) -> Option<Vec<(&str, Descriptor<'_>)>> {
    let entries: Vec<_> = envelope_entries(properties)?
        .iter()
        .map(|(key, raw)| (key.as_str(), Descriptor::classify(raw)))
        .filter(|(_, d)| d.is_property())
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

/// Shallow structural dump: keys present and the JSON kind of each value
pub fn structural_dump(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), Value::String(kind_of(v).to_string())))
                .collect(),
        ),
        other => Value::String(kind_of(other).to_string()),
    }
}

/// JSON kind name of a value
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
