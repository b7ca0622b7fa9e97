//! Output formats for tables rendered on the command line.
//!
//! Provides two formats:
//! - Text: aligned human-readable table
//! - Json: NDJSON for machine parsing

mod json;
mod text;

pub use json::JsonWriter;
pub use text::TextWriter;

use crate::table::Table;

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table (default).
    #[default]
    Text,
    /// NDJSON for machine parsing.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("invalid format '{}', expected: text, json", s)),
        }
    }
}

/// Trait for table writers.
pub trait TableWriter {
    fn print_table(&self, table: &Table);
}

/// Create a writer for the given output format.
pub fn create_writer(format: OutputFormat) -> Box<dyn TableWriter> {
    match format {
        OutputFormat::Text => Box::new(TextWriter::new()),
        OutputFormat::Json => Box::new(JsonWriter::new()),
    }
}
