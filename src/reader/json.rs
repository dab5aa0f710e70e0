//! JSON array reference-table reader

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::model::{CellValue, Column, Table};

use super::Reader;

/// Reader for JSON array-of-objects files
pub struct JsonReader;

impl Reader for JsonReader {
    fn read(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let value: Value = serde_json::from_reader(reader).context("Failed to parse JSON file")?;

        // Handle both arrays and single objects
        let array = match value {
            Value::Array(arr) => arr,
            Value::Object(_) => vec![value],
            _ => bail!("JSON must be an array or object"),
        };

        if array.is_empty() {
            bail!("JSON array is empty");
        }

        // Collect all unique keys across all objects to build column list
        let mut column_names: IndexSet<String> = IndexSet::new();
        for item in &array {
            if let Value::Object(obj) = item {
                for key in obj.keys() {
                    column_names.insert(key.clone());
                }
            }
        }
        if column_names.is_empty() {
            bail!("JSON array holds no objects");
        }

        let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); column_names.len()];
        for item in &array {
            match item {
                Value::Object(obj) => {
                    for (i, key) in column_names.iter().enumerate() {
                        columns[i].push(json_value_to_cell(obj.get(key)));
                    }
                }
                _ => bail!("JSON array items must be objects"),
            }
        }

        let built: Vec<Column> = column_names
            .iter()
            .zip(columns)
            .map(|(name, values)| Column::from_values(name.clone(), values))
            .collect();

        Table::from_columns(built)
            .with_context(|| format!("Invalid table in {}", path.display()))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json")
    }
}

fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        Some(Value::String(s)) => {
            // Try parsing as date/datetime
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return CellValue::Date(date);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return CellValue::DateTime(dt);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return CellValue::DateTime(dt);
            }
            CellValue::String(s.clone())
        }
        // Nested containers are kept as their JSON text
        Some(other) => CellValue::String(serde_json::to_string(other).unwrap_or_default()),
    }
}
