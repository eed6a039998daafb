#![warn(missing_docs)]
//! hookbench Report - Benchmark Summary Output
//!
//! Renders the results of a benchmark session:
//! - Fixed-column terminal table (microseconds, `----` for absent values)
//! - JSON (machine-readable)
//!
//! Output goes through a [`Sink`], which owns width and styling; the table
//! code only asks for semantic [`Emphasis`].

mod json;
mod sink;
mod table;
mod terminal;

pub use json::{JsonMeta, JsonReport, JsonResult, generate_json_report};
pub use sink::{BufferSink, Emphasis, Sink, TerminalSink, separator_line};
pub use table::{
    HEADER_LABEL, PLACEHOLDER, TIME_COLUMN_WIDTHS, TableLayout, format_grouped, render_summary,
    truncate_name,
};
pub use terminal::{ColorMode, FALLBACK_COLUMNS, terminal_width};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal table
    #[default]
    Human,
    /// JSON with full schema
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" | "table" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Human".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
