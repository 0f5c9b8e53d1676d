//! Flat records as loaded from a data source.
//!
//! A record is an insertion-ordered map of field name to scalar JSON value
//! (`serde_json` is built with `preserve_order`, so column order survives).

use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// Build a record from `(field, value)` pairs, keeping their order.
pub fn record_from<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Stringified field value as written into a table cell.
/// Missing fields and nulls become the empty string.
pub fn field_text(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => if *b { "Sí".to_string() } else { "No".to_string() },
        Some(other) => other.to_string(),
    }
}

pub fn get_str<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(|v| v.as_str())
}

/// Numeric field, accepting numbers and numeric strings ("1.5", " 3 ").
pub fn get_f64(record: &Record, field: &str) -> Option<f64> {
    match record.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer field; floats are accepted only when integral.
pub fn get_i64(record: &Record, field: &str) -> Option<i64> {
    match record.get(field)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First field present among `aliases`.
pub fn first_present<'a>(record: &Record, aliases: &[&'a str]) -> Option<&'a str> {
    aliases.iter().copied().find(|alias| record.contains_key(*alias))
}
