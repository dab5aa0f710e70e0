//! JSON table writer

use std::io::Write;

use anyhow::{Context, Result};
use serde_json::{Map, Number, Value};

use crate::model::{CellValue, Table};

use super::OutputFormatter;

/// JSON array-of-objects output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<()> {
        let rows: Vec<Value> = (0..table.height())
            .map(|row| {
                let mut object = Map::new();
                for column in table.columns() {
                    object.insert(
                        column.name.clone(),
                        cell_to_json(column.get(row).unwrap_or(&CellValue::Null)),
                    );
                }
                Value::Object(object)
            })
            .collect();

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &rows)
        } else {
            serde_json::to_writer(&mut *writer, &rows)
        }
        .context("Failed to write JSON output")?;
        writeln!(writer)?;
        Ok(())
    }
}

fn cell_to_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Null => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Int(i) => Value::Number((*i).into()),
        CellValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        CellValue::String(s) => Value::String(s.clone()),
        CellValue::Date(d) => Value::String(d.to_string()),
        CellValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellType, Column};

    #[test]
    fn test_round_trippable_objects() {
        let table = Table::from_columns(vec![
            Column::new(
                "id",
                CellType::Int,
                vec![CellValue::Int(1), CellValue::Int(2)],
            ),
            Column::new(
                "name",
                CellType::String,
                vec![CellValue::String("a".into()), CellValue::Null],
            ),
        ])
        .unwrap();

        let mut buffer = Vec::new();
        JsonOutput::compact().render(&table, &mut buffer).unwrap();
        let parsed: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed[0]["id"], Value::Number(1.into()));
        assert_eq!(parsed[1]["name"], Value::Null);
    }
}
