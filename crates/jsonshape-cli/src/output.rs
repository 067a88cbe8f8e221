//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with dedicated
//! renderings for validation issues and diff trees.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use jsonshape_core::{Action, Diff, DiffChildren, Issue};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tracing::{debug, trace};

/// One line of a flattened diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatChange {
    pub path: String,
    pub action: Action,
}

/// Flatten a diff tree into `(path, action)` records, parents first
pub fn flatten(diff: &Diff<'_>) -> Vec<FlatChange> {
    diff.paths()
        .into_iter()
        .map(|(path, action)| FlatChange { path, action })
        .collect()
}

/// Formatting of the values the commands produce
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format the issues of one validation run
    fn format_issues(&self, issues: &[Issue]) -> Result<String>;

    /// Format a diff tree; `None` means nothing changed
    fn format_diff(&self, diff: Option<&Diff<'_>>) -> Result<String>;

    /// Format a flattened diff
    fn format_flat_diff(&self, changes: &[FlatChange]) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Human-readable documents are pretty JSON
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_issues(&self, issues: &[Issue]) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_issues_human(issues)),
            _ => self.format(&issues),
        }
    }

    fn format_diff(&self, diff: Option<&Diff<'_>>) -> Result<String> {
        match self {
            OutputFormat::Human => format_diff_human(diff),
            _ => self.format(&diff),
        }
    }

    fn format_flat_diff(&self, changes: &[FlatChange]) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_flat_diff_human(changes)),
            _ => self.format(&changes),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
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

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write formatted content, ending with exactly one newline
    fn emit(&mut self, formatted: &str) -> Result<()> {
        self.writeln(formatted.trim_end_matches('\n'))
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if tracing::enabled!(tracing::Level::TRACE) {
            let redacted = redaction::redacted(&serde_json::to_value(value)?);
            trace!(data = %redacted, "Outputting data");
        }

        let formatted = self.format.format(value)?;
        self.emit(&formatted)
    }

    /// Write validation issues
    pub fn issues(&mut self, issues: &[Issue]) -> Result<()> {
        if issues.is_empty() && self.is_human() {
            return self.success("✅ Document is valid");
        }
        let formatted = self.format.format_issues(issues)?;
        if self.is_human() && self.use_color {
            return self.emit(&formatted.red().to_string());
        }
        self.emit(&formatted)
    }

    /// Write a diff tree, or its flattened form
    pub fn diff(&mut self, diff: Option<&Diff<'_>>, flat: bool) -> Result<()> {
        if diff.is_none() && self.is_human() {
            return self.success("✅ No changes");
        }
        let formatted = if flat {
            let changes = diff.map(flatten).unwrap_or_default();
            self.format.format_flat_diff(&changes)?
        } else {
            self.format.format_diff(diff)?
        };
        self.emit(&formatted)
    }
}

/// Format validation issues for human reading
fn format_issues_human(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "✅ Document is valid\n".to_string();
    }

    let mut output = format!("❌ Validation Failed - {} Issue(s)\n\n", issues.len());
    for (i, issue) in issues.iter().enumerate() {
        output.push_str(&format!(
            "{}. 📍 {}\n   💬 {}\n",
            i + 1,
            display_path(&issue.path),
            issue.message
        ));
    }
    output
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

fn symbol(action: Action) -> &'static str {
    match action {
        Action::Add => "+",
        Action::Modify => "~",
        Action::Unset => "-",
    }
}

/// Format a diff tree for human reading, one node per line
fn format_diff_human(diff: Option<&Diff<'_>>) -> Result<String> {
    let Some(diff) = diff else {
        return Ok("✅ No changes\n".to_string());
    };
    let mut output = String::new();
    render_node(diff, "", 0, &mut output)?;
    Ok(output)
}

fn render_node(diff: &Diff<'_>, path: &str, depth: usize, output: &mut String) -> Result<()> {
    let indent = "  ".repeat(depth);
    let head = format!("{}{} {}", indent, symbol(diff.action), display_path(path));

    let Some(children) = &diff.children else {
        output.push_str(&format!("{}: {}\n", head, describe_change(diff)?));
        return Ok(());
    };

    output.push_str(&format!("{} ({} {})\n", head, diff.action, diff.kind.as_str()));
    match children {
        DiffChildren::Props(props) => {
            for (name, child) in props {
                render_node(child, &format!("{}.{}", path, name), depth + 1, output)?;
            }
        }
        DiffChildren::Tuple(positions) => {
            for (index, child) in positions.iter().enumerate() {
                if let Some(child) = child {
                    render_node(child, &format!("{}[{}]", path, index), depth + 1, output)?;
                }
            }
        }
        DiffChildren::Items(items) => {
            for (index, child) in items.iter().enumerate() {
                render_node(child, &format!("{}[{}]", path, index), depth + 1, output)?;
            }
        }
    }
    Ok(())
}

fn describe_change(diff: &Diff<'_>) -> Result<String> {
    let render = |value: &Option<jsonshape_core::Value>| -> Result<String> {
        Ok(match value {
            Some(value) => format_value_compact(&serde_json::to_value(value)?),
            None => "undefined".to_string(),
        })
    };
    Ok(match diff.action {
        Action::Add => render(&diff.new_value)?,
        Action::Unset => render(&diff.old_value)?,
        Action::Modify => format!("{} → {}", render(&diff.old_value)?, render(&diff.new_value)?),
    })
}

/// Format a flattened diff for human reading
fn format_flat_diff_human(changes: &[FlatChange]) -> String {
    if changes.is_empty() {
        return "✅ No changes\n".to_string();
    }
    changes
        .iter()
        .map(|change| format!("{} {} ({})\n", symbol(change.action), display_path(&change.path), change.action))
        .collect()
}

/// Format a JSON value in a compact, human-readable way
fn format_value_compact(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            if arr.len() <= 3 {
                format!(
                    "[{}]",
                    arr.iter().map(format_value_compact).collect::<Vec<_>>().join(", ")
                )
            } else {
                format!("[{} items]", arr.len())
            }
        }
        Value::Object(obj) => {
            if obj.len() <= 2 {
                let items: Vec<String> = obj
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, format_value_compact(v)))
                    .collect();
                format!("{{{}}}", items.join(", "))
            } else {
                format!("{{{} fields}}", obj.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
