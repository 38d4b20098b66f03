use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use crate::theme::{ARROW, Tone};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be shown as a table or a single line
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                println!("{}", data.to_table(self));
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    /// Display a success message with color and icon
    pub fn success(&self, message: &str) {
        self.message(Tone::Success, message);
    }

    /// Display an error message with color and icon. Shown even when quiet.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.decorate(Tone::Failure.icon(), message, Tone::Failure));
    }

    pub fn warning(&self, message: &str) {
        self.message(Tone::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.message(Tone::Note, message);
    }

    /// Display verbose information (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && self.prose_enabled() {
            eprintln!("{}", self.decorate(ARROW, message, Tone::Subtle));
        }
    }

    /// Display a heading
    pub fn heading(&self, text: &str) {
        if !self.prose_enabled() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", Tone::Title.apply(text).bold());
        }
    }

    /// Display a key-value pair
    pub fn key_value(&self, key: &str, value: &str) {
        if !self.prose_enabled() {
            return;
        }
        if self.options.no_color {
            println!("{key}: {value}");
        } else {
            println!("{}: {}", Tone::Label.apply(key).bold(), Tone::Value.apply(value));
        }
    }

    /// Display indented text with a prefix icon
    pub fn indented(&self, icon: &str, text: &str) {
        if !self.prose_enabled() {
            return;
        }
        if self.options.no_color {
            println!("  {icon} {text}");
        } else {
            println!("  {} {text}", Tone::Subtle.apply(icon));
        }
    }

    /// Create a themed table
    pub fn create_table(&self) -> Table {
        let mut table = Table::new();
        if self.options.no_color {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        } else {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        }
        table
    }

    /// Add themed header to table
    pub fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        let cells: Vec<Cell> = headers
            .iter()
            .map(|header| {
                let cell = Cell::new(header).add_attribute(Attribute::Bold);
                if self.options.no_color {
                    cell
                } else {
                    cell.fg(TableColor::Cyan)
                }
            })
            .collect();
        table.set_header(cells);
    }

    /// Human-readable messages are suppressed in quiet and JSON modes so
    /// stdout stays machine-readable.
    fn prose_enabled(&self) -> bool {
        !self.options.quiet && !self.is_json()
    }

    fn message(&self, tone: Tone, message: &str) {
        if self.prose_enabled() {
            println!("{}", self.decorate(tone.icon(), message, tone));
        }
    }

    fn decorate(&self, icon: &str, message: &str, tone: Tone) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", tone.apply(icon), tone.apply(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    impl TableDisplay for TestData {
        fn to_table(&self, output: &OutputManager) -> Table {
            let mut table = output.create_table();
            table.add_row(vec![Cell::new("Name"), Cell::new(&self.name)]);
            table.add_row(vec![Cell::new("Value"), Cell::new(self.value.to_string())]);
            table
        }

        fn to_compact(&self) -> String {
            format!("{}={}", self.name, self.value)
        }
    }

    fn sample() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_output_manager_json() {
        let manager = OutputManager::new(GlobalOptions {
            output_format: OutputFormat::Json,
            ..Default::default()
        });
        assert!(manager.is_json());
        assert!(!manager.prose_enabled());
        assert!(manager.display(&sample()).is_ok());
    }

    #[test]
    fn test_output_manager_quiet() {
        let manager = OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(!manager.prose_enabled());
        assert!(manager.display(&sample()).is_ok());
    }

    #[test]
    fn test_decorate_without_color() {
        let manager = OutputManager::new(GlobalOptions {
            no_color: true,
            ..Default::default()
        });
        assert_eq!(manager.decorate(Tone::Success.icon(), "done", Tone::Success), "✓ done");
        assert_eq!(sample().to_compact(), "test=42");
    }
}
