//! CSV table writer

use std::io::Write;

use anyhow::{Context, Result};

use crate::model::Table;

use super::OutputFormatter;

/// CSV output formatter
pub struct CsvOutput;

impl OutputFormatter for CsvOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let headers: Vec<&str> = table.column_names().collect();
        csv_writer
            .write_record(&headers)
            .context("Failed to write CSV header")?;

        for row in 0..table.height() {
            let record: Vec<String> = table
                .row(row)
                .iter()
                .map(|cell| cell.display().into_owned())
                .collect();
            csv_writer
                .write_record(&record)
                .with_context(|| format!("Failed to write CSV row {}", row + 1))?;
        }

        csv_writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}
