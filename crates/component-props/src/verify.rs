//! Read-back verification.
//!
//! Compares what the host reports after a write with what was written. The
//! host may normalise values on the way back (integers as floats, numbers as
//! strings), so a loose match is still a match, but the [`Comparison`] says
//! which rule accepted it.

use serde::Serialize;
use serde_json::Value;

use crate::convert::{to_number, to_text};
use crate::types::SemanticType;

/// Equality rule that decided a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    /// Identical JSON
    Exact,
    /// Same structure, numbers equal by value
    Structural,
    /// Both sides reference the same non-empty uuid
    Reference,
    /// Scalars equal once rendered as strings
    StringForm,
    /// Scalars equal once read as numbers
    NumericForm,
    Mismatch,
}

impl Comparison {
    pub fn is_match(self) -> bool {
        self != Comparison::Mismatch
    }

    /// Whether the match needed a type coercion
    pub fn is_coerced(self) -> bool {
        matches!(self, Comparison::StringForm | Comparison::NumericForm)
    }
}

/// Outcome of verifying one write
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    /// Last value read back, `null` when nothing could be read
    pub actual_value: Value,
    pub expected: Value,
    pub comparison: Comparison,
    /// Read-backs performed
    pub attempts: u32,
}

impl VerificationResult {
    /// Compare a read-back against the expected value
    pub fn check(semantic_type: SemanticType, expected: &Value, actual: Value, attempts: u32) -> Self {
        let comparison = compare(semantic_type, expected, &actual);

        if comparison.is_coerced() {
            tracing::debug!(
                expected = %expected,
                actual = %actual,
                comparison = ?comparison,
                "Read-back matched after coercion"
            );
        }

        Self {
            verified: comparison.is_match(),
            actual_value: actual,
            expected: expected.clone(),
            comparison,
            attempts,
        }
    }

    /// Result for a read-back that failed outright
    pub fn unreadable(expected: &Value, attempts: u32) -> Self {
        Self {
            verified: false,
            actual_value: Value::Null,
            expected: expected.clone(),
            comparison: Comparison::Mismatch,
            attempts,
        }
    }
}

/// Compare an expected canonical value with a read-back.
///
/// Reference types compare only their `uuid`. A `null` read-back never
/// matches a scalar by numeric form.
pub fn compare(semantic_type: SemanticType, expected: &Value, actual: &Value) -> Comparison {
    if semantic_type.is_reference() {
        let want = expected.get("uuid").and_then(Value::as_str);
        let got = actual.get("uuid").and_then(Value::as_str);
        return match (want, got) {
            (Some(want), Some(got)) if !want.is_empty() && want == got => Comparison::Reference,
            _ => Comparison::Mismatch,
        };
    }

    if expected == actual {
        return Comparison::Exact;
    }

    match expected {
        Value::Object(_) | Value::Array(_) => {
            if structurally_equal(expected, actual) {
                Comparison::Structural
            } else {
                Comparison::Mismatch
            }
        }
        _ if actual.is_object() || actual.is_array() => Comparison::Mismatch,
        _ if to_text(expected) == to_text(actual) => Comparison::StringForm,
        _ if actual.is_null() => Comparison::Mismatch,
        _ => match (to_number(expected), to_number(actual)) {
            (Ok(a), Ok(b)) if a == b => Comparison::NumericForm,
            _ => Comparison::Mismatch,
        },
    }
}

/// Deep equality that compares numbers by value
fn structurally_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| structurally_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| structurally_equal(x, y)))
        }
        _ => a == b,
    }
}
