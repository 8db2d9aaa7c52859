//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Project};

/// Locate the project named by `--project`, or the one around the
/// current directory
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    Project::locate(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// Load layered configuration for a project
pub fn load_config(project: &Project) -> Config {
    Config::load_for(Some(project))
}

/// Resolve `--format auto` against the configured default, then the
/// command's own default
pub fn effective_format(global: &GlobalOpts, config: &Config, fallback: OutputFormat) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| f.parse::<OutputFormat>().ok())
        .filter(|f| *f != OutputFormat::Auto)
        .unwrap_or(fallback)
}

/// Write report content to a file, or stdout when no path is given
pub fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

/// Format an optional dimension in meters, "-" when unknown
pub fn format_dimension(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}", v))
}

/// Format a weight in kilograms with two decimals
pub fn format_weight(kg: f64) -> String {
    format!("{:.2} kg", kg)
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
