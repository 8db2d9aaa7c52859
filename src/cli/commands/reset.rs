//! `scaf reset` command - Discard the last calculation
//!
//! Clears the stored usage record. Stock quantities are never touched; a
//! calculation already applied with `--apply` stays applied.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ResetArgs {}

pub fn run(_args: ResetArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let usage_path = project.usage_path();

    if usage_path.exists() {
        std::fs::remove_file(&usage_path).into_diagnostic()?;
        tracing::debug!(path = %usage_path.display(), "removed usage record");
        if !global.quiet {
            println!("{} Cleared the last calculation", style("✓").green());
        }
    } else if !global.quiet {
        println!("{}", style("Nothing to reset").dim());
    }
    Ok(())
}
