//! Aligned text table writer.

use super::TableWriter;
use crate::table::Table;

pub struct TextWriter;

impl TextWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableWriter for TextWriter {
    fn print_table(&self, table: &Table) {
        print!("{}", render(table));
    }
}

/// Render a table with a left-aligned metric column, right-aligned value
/// columns, and a trailing units column.
fn render(table: &Table) -> String {
    let metric_width = table
        .rows
        .iter()
        .map(|r| r.metric.name.len())
        .chain(std::iter::once("Metric".len()))
        .max()
        .unwrap_or(0);

    let value_widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            table
                .rows
                .iter()
                .map(|r| r.values.get(i).map_or(0, String::len))
                .chain(std::iter::once(column.name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();

    out.push_str(&format!("{:<metric_width$}", "Metric"));
    for (column, &width) in table.columns.iter().zip(&value_widths) {
        out.push_str(&format!("  {:>width$}", column.name));
    }
    out.push_str("  Units\n");

    for row in &table.rows {
        out.push_str(&format!("{:<metric_width$}", row.metric.name));
        for (i, &width) in value_widths.iter().enumerate() {
            let value = row.values.get(i).map_or("", String::as_str);
            out.push_str(&format!("  {:>width$}", value));
        }
        out.push_str(&format!("  {}\n", row.units));
    }

    out
}
