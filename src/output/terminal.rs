//! Aligned terminal preview

use std::io::Write;

use anyhow::Result;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::model::Table;

use super::OutputFormatter;

/// How many rows the preview shows before eliding
const PREVIEW_ROWS: usize = 20;

/// Terminal preview output
pub struct TerminalOutput {
    preview_rows: usize,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            preview_rows: PREVIEW_ROWS,
        }
    }

    pub fn with_preview_rows(preview_rows: usize) -> Self {
        Self { preview_rows }
    }

    fn write_summary(&self, table: &Table, writer: &mut dyn Write) -> Result<()> {
        writeln!(
            writer,
            "{} rows x {} columns ({})",
            table.height(),
            table.width(),
            table
                .columns()
                .iter()
                .map(|c| format!("{}: {}", c.name, c.cell_type))
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<()> {
        self.write_summary(table, writer)?;

        if table.is_empty() {
            writeln!(writer, "(empty table)")?;
            return Ok(());
        }

        let shown = table.height().min(self.preview_rows);
        let mut data: Vec<Vec<String>> = Vec::with_capacity(shown + 1);
        data.push(table.column_names().map(str::to_string).collect());
        for row in 0..shown {
            data.push(
                table
                    .row(row)
                    .iter()
                    .map(|cell| cell.display().into_owned())
                    .collect(),
            );
        }

        write!(writer, "{}", build_table(&data))?;
        if table.height() > shown {
            writeln!(writer, "... {} more rows", table.height() - shown)?;
        }
        Ok(())
    }
}

/// Render a preview to stdout with a colored title line
pub fn render_preview(table: &Table, title: &str) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    writeln!(stdout, "{}", title)?;
    stdout.reset()?;
    TerminalOutput::new().render(table, &mut stdout)
}

/// Build a box-drawn, column-aligned table from string data
fn build_table(data: &[Vec<String>]) -> String {
    if data.is_empty() || data[0].is_empty() {
        return String::new();
    }

    let col_count = data[0].len();

    let mut col_widths: Vec<usize> = vec![0; col_count];
    for row in data {
        for (i, cell) in row.iter().enumerate() {
            if i < col_widths.len() {
                col_widths[i] = col_widths[i].max(cell.len());
            }
        }
    }

    let mut output = String::new();

    let border = |left: char, mid: char, right: char| {
        let mut line = String::new();
        line.push(left);
        for (i, width) in col_widths.iter().enumerate() {
            line.push_str(&"─".repeat(*width + 2));
            if i < col_widths.len() - 1 {
                line.push(mid);
            }
        }
        line.push(right);
        line.push('\n');
        line
    };

    output.push_str(&border('┌', '┬', '┐'));

    // Header row
    if let Some(header) = data.first() {
        output.push('│');
        for (i, cell) in header.iter().enumerate() {
            let width = col_widths.get(i).copied().unwrap_or(0);
            output.push_str(&format!(" {:width$} │", cell, width = width));
        }
        output.push('\n');
    }

    output.push_str(&border('├', '┼', '┤'));

    // Data rows
    for row in data.iter().skip(1) {
        output.push('│');
        for (i, cell) in row.iter().enumerate() {
            let width = col_widths.get(i).copied().unwrap_or(0);
            output.push_str(&format!(" {:width$} │", cell, width = width));
        }
        output.push('\n');
    }

    output.push_str(&border('└', '┴', '┘'));

    output
}
