//! Output formatting and writing utilities
//!
//! Formats compatibility reports, changelogs and snapshots in
//! human-readable or structured (JSON/YAML) form.
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use conforma_core::{ErrorCollector, Level};
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

/// Trait for formatting output with specialized support for reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a compatibility report
    fn format_report(&self, report: &ErrorCollector, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_report(&self, report: &ErrorCollector, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(report)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
            OutputFormat::Human => Ok(format_report_human(report, use_color)),
        }
    }
}

/// Render a report as one line per finding plus a summary line
fn format_report_human(report: &ErrorCollector, use_color: bool) -> String {
    let mut lines = Vec::with_capacity(report.error_count() + 1);

    for finding in report {
        let tag = match finding.level {
            Level::Error => {
                if use_color {
                    "[ERROR]".red().bold().to_string()
                } else {
                    "[ERROR]".to_string()
                }
            }
            Level::Warning => {
                if use_color {
                    "[WARNING]".yellow().bold().to_string()
                } else {
                    "[WARNING]".to_string()
                }
            }
        };

        let mut line = tag;
        if let Some(endpoint) = &finding.endpoint {
            if use_color {
                line.push_str(&format!(" {}", endpoint.bold()));
            } else {
                line.push_str(&format!(" {}", endpoint));
            }
        }
        if let Some(location) = &finding.location {
            line.push_str(&format!(" at {}", location));
        }
        line.push_str(&format!(": {}", finding.message));
        lines.push(line);
    }

    lines.push(format!(
        "{} error(s), {} warning(s)",
        report.error_level_count(),
        report.warning_count()
    ));
    lines.join("\n")
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer targeting stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[allow(dead_code)]
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet {
            return Ok(());
        }

        if self.format == OutputFormat::Human {
            if self.use_color {
                self.writeln(&format!("{} {}", "ℹ".blue(), message))
            } else {
                self.writeln(&format!("INFO: {}", message))
            }
        } else {
            Ok(())
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.format == OutputFormat::Human {
            if self.use_color {
                self.writeln(&message.green().to_string())
            } else {
                self.writeln(message)
            }
        } else {
            Ok(())
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format == OutputFormat::Human {
            if self.use_color {
                self.writeln(&message.yellow().to_string())
            } else {
                self.writeln(&format!("WARNING: {}", message))
            }
        } else {
            Ok(())
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.format == OutputFormat::Human {
            self.writeln("")?;
            if self.use_color {
                self.writeln(&title.bold().underline().to_string())
            } else {
                self.writeln(&format!("=== {} ===", title))
            }
        } else {
            Ok(())
        }
    }

    /// Write a serializable value in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let content = self.format.format(value)?;
        self.writeln(&content)
    }

    /// Write a compatibility report in the configured format
    pub fn report(&mut self, report: &ErrorCollector) -> Result<()> {
        let content = self.format.format_report(report, self.use_color)?;
        self.writeln(&content)
    }
}
