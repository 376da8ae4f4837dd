use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table, presets};
use serde::Serialize;

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands.
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

/// Global options affecting how results are rendered.
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub no_color: bool,
}

/// Data that can render itself as a table or a compact line.
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// Formats and prints command results and status lines.
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Render `data` in the configured output format.
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }
        match self.options.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Table => println!("{}", data.to_table(&self.options)),
            OutputFormat::Compact => println!("{}", data.to_compact()),
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        self.status_line(ICONS.success, THEME.success, message);
    }

    pub fn warning(&self, message: &str) {
        self.status_line(ICONS.warning, THEME.warning, message);
    }

    pub fn info(&self, message: &str) {
        self.status_line(ICONS.info, THEME.info, message);
    }

    /// Errors always print, even in quiet mode, and go to stderr.
    pub fn error(&self, message: &str) {
        let line = if self.options.no_color {
            format!("{} {message}", ICONS.error)
        } else {
            format!("{} {}", ICONS.error.color(THEME.error), message.color(THEME.error))
        };
        eprintln!("{line}");
    }

    pub fn heading(&self, text: &str) {
        if self.options.quiet {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.len()));
        } else {
            println!("\n{}", text.color(THEME.primary).bold());
        }
    }

    pub fn bullet(&self, text: &str) {
        if self.options.quiet {
            return;
        }
        if self.options.no_color {
            println!("  {} {text}", ICONS.bullet);
        } else {
            println!("  {} {text}", ICONS.bullet.color(THEME.muted));
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if self.options.quiet {
            return;
        }
        if self.options.no_color {
            println!("{key}: {value}");
        } else {
            println!("{}: {}", key.color(THEME.key).bold(), value.color(THEME.value));
        }
    }

    /// Transient in-place progress indicator; pair with [`Self::clear_line`].
    pub fn progress(&self, message: &str) {
        if self.options.quiet || self.options.output_format == OutputFormat::Json {
            return;
        }
        if self.options.no_color {
            print!("\r{} {message}...", ICONS.loading);
        } else {
            print!(
                "\r{} {}...",
                ICONS.loading.color(THEME.highlight).bold(),
                message.color(THEME.highlight)
            );
        }
        std::io::stdout().flush().ok();
    }

    pub fn clear_line(&self) {
        if self.options.quiet || self.options.output_format == OutputFormat::Json {
            return;
        }
        print!("\r{}\r", " ".repeat(80));
        std::io::stdout().flush().ok();
    }

    /// A themed table with a bold header row.
    pub fn table_with_header(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        if self.options.no_color {
            table.load_preset(presets::ASCII_FULL);
            table.set_header(
                headers
                    .iter()
                    .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
            );
        } else {
            table.load_preset(presets::UTF8_FULL_CONDENSED);
            table.set_header(headers.iter().map(|h| {
                Cell::new(h)
                    .add_attribute(Attribute::Bold)
                    .fg(TableColor::Cyan)
            }));
        }
        table
    }

    fn status_line(&self, icon: &str, color: colored::Color, message: &str) {
        if self.options.quiet {
            return;
        }
        if self.options.no_color {
            println!("{icon} {message}");
        } else {
            println!("{} {}", icon.color(color), message.color(color));
        }
    }
}
