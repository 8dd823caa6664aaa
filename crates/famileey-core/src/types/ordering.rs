//! Child ordering used by ordered reads.
//!
//! Mirrors the hosted database's `orderByChild` rules: children missing the
//! field come first, then `false`, `true`, numbers ascending, strings
//! lexicographically, and objects last. Keys break ties.

use std::cmp::Ordering;

use serde_json::Value;

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(false)) => 1,
        Some(Value::Bool(true)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 5,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Sort `(key, value)` children ascending by `value[child]`.
pub fn sort_by_child(children: &mut [(String, Value)], child: &str) {
    children.sort_by(|(ka, va), (kb, vb)| {
        compare(va.get(child), vb.get(child)).then_with(|| ka.cmp(kb))
    });
}
