//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    calc::CalcArgs, categorize::CategorizeArgs, completions::CompletionsArgs,
    config::ConfigCommands, init::InitArgs, part::PartCommands, report::ReportCommands,
    reset::ResetArgs, segment::SegmentArgs, withdraw::WithdrawCommands,
};

#[derive(Parser)]
#[command(name = "scaf")]
#[command(author, version, about = "Scaffolding stock calculator")]
#[command(long_about = "Keeps a plain-text inventory of scaffolding parts and works out the parts a scaffold of a given height, length and width needs.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .scaf/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new scaf project
    Init(InitArgs),

    /// Inventory part management
    #[command(subcommand)]
    Part(PartCommands),

    /// Stock withdrawals
    #[command(subcommand)]
    Withdraw(WithdrawCommands),

    /// Calculate the parts needed for a scaffold and draw them from stock
    Calc(CalcArgs),

    /// Discard the last calculation
    Reset(ResetArgs),

    /// Usage and stock reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Show the category detected for part names
    Categorize(CategorizeArgs),

    /// Split a run length into standard segments
    Segment(SegmentArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    /// Parse a configured `default_format` value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <OutputFormat as ValueEnum>::from_str(s, true)
    }
}
