//! JSON loading: a file holding an array of flat objects.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ReportError, ReportResult};
use crate::record::Record;

pub fn read_json_records(path: &Path) -> ReportResult<Vec<Record>> {
    let raw = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    let parsed: Value = serde_json::from_str(&raw)?;

    let Value::Array(items) = parsed else {
        return Err(ReportError::InvalidField {
            field: path.display().to_string(),
            value: "expected a JSON array of objects".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(ReportError::InvalidField {
                field: format!("{}[{}]", path.display(), idx),
                value: other.to_string(),
            }),
        })
        .collect()
}
