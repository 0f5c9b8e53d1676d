//! CSV loading with Polars.

use std::path::Path;

use polars::prelude::*;
use serde_json::{Number, Value};

use crate::error::ReportResult;
use crate::record::Record;

/// Read a headed CSV file into records, one per row, columns in file order.
pub fn read_csv_records(path: &Path) -> ReportResult<Vec<Record>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()?;
    dataframe_to_records(&df)
}

pub fn dataframe_to_records(df: &DataFrame) -> ReportResult<Vec<Record>> {
    let columns = df.get_columns();
    let mut records = Vec::with_capacity(df.height());

    for idx in 0..df.height() {
        let mut record = Record::with_capacity(columns.len());
        for column in columns {
            let value = column.get(idx)?;
            record.insert(column.name().to_string(), any_value_to_json(&value));
        }
        records.push(record);
    }

    Ok(records)
}

fn float_to_json(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn any_value_to_json(value: &AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::String(s) => Value::String((*s).to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::Float32(v) => float_to_json(*v as f64),
        AnyValue::Float64(v) => float_to_json(*v),
        other => Value::String(other.to_string()),
    }
}
