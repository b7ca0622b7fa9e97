//! NDJSON table writer for machine-readable output.

use super::TableWriter;
use crate::table::{ColumnHeader, Row, Table};
use serde::Serialize;

/// Writer emitting one JSON object per line: a columns line followed by one
/// line per row.
pub struct JsonWriter;

impl JsonWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct ColumnsLine<'a> {
    #[serde(rename = "type")]
    msg_type: &'static str,
    columns: &'a [ColumnHeader],
}

#[derive(Serialize)]
struct RowLine<'a> {
    #[serde(rename = "type")]
    msg_type: &'static str,
    #[serde(flatten)]
    row: &'a Row,
}

impl TableWriter for JsonWriter {
    fn print_table(&self, table: &Table) {
        let columns = ColumnsLine {
            msg_type: "columns",
            columns: &table.columns,
        };
        if let Ok(json) = serde_json::to_string(&columns) {
            println!("{}", json);
        }

        for row in &table.rows {
            let line = RowLine {
                msg_type: "row",
                row,
            };
            if let Ok(json) = serde_json::to_string(&line) {
                println!("{}", json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RowMetric;

    #[test]
    fn test_row_line_shape() {
        let row = Row {
            metric: RowMetric {
                name: "redraw_time".to_string(),
                description: "Time to redraw the frame".to_string(),
            },
            units: "ms".to_string(),
            values: vec!["12.5".to_string(), String::new()],
        };
        let json = serde_json::to_value(RowLine {
            msg_type: "row",
            row: &row,
        })
        .unwrap();

        assert_eq!(json["type"], "row");
        assert_eq!(json["metric"]["name"], "redraw_time");
        assert_eq!(json["units"], "ms");
        assert_eq!(json["values"][1], "");
    }
}
