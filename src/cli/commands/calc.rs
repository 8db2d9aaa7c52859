//! `scaf calc` command - Scaffold needs calculation
//!
//! Computes the parts a scaffold envelope needs, draws them from the
//! inventory snapshot and stores the result as the project's usage record.
//! With `--apply` the drawn quantities are also deducted from stored stock.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{effective_format, format_weight, load_config, open_project};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::allocate::AllocationMode;
use crate::core::inventory::Inventory;
use crate::core::segment::SegmentStrategy;
use crate::core::session::{CalculationReport, Session};
use crate::yaml::write_yaml_file;

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Scaffold height in meters
    #[arg(long)]
    pub height: f64,

    /// Run length in meters
    #[arg(long)]
    pub length: f64,

    /// Working width in meters
    #[arg(long)]
    pub width: f64,

    /// Segmentation strategy (default from config: greedy)
    #[arg(long)]
    pub strategy: Option<SegmentStrategy>,

    /// Allocation mode (default from config: per-part)
    #[arg(long)]
    pub mode: Option<AllocationMode>,

    /// Deduct the used parts from stock and record withdrawals
    #[arg(long)]
    pub apply: bool,
}

pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = load_config(&project);
    let mut inventory = Inventory::load(&project)?;

    let mut dimensions = config.dimensions();
    if let Some(strategy) = args.strategy {
        dimensions.segment_strategy = strategy;
    }
    let mode = args.mode.unwrap_or_else(|| config.allocation_mode());

    let mut session = Session::new(&inventory, dimensions, mode)?;
    let mut report = session
        .calculate(args.height, args.length, args.width)
        .map_err(|e| miette::miette!("{}", e))?
        .clone();

    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }

    if args.apply {
        let recorded = inventory.apply_allocation(&report.usage, config.operator())?;
        inventory.save(&project)?;
        report.applied = true;
        tracing::info!(withdrawals = recorded.len(), "deducted calculation from stock");
    }

    write_yaml_file(&project.usage_path(), &report)?;

    match effective_format(global, &config, OutputFormat::Auto) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        _ if global.quiet => {
            println!("{}", report.total_used());
        }
        _ => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &CalculationReport) {
    let meta = &report.meta;
    let segments: Vec<String> = meta.segments.iter().map(|s| format!("{}", s)).collect();

    println!(
        "{} {} x {} x {} m",
        style("Scaffold").bold(),
        report.geometry.height,
        report.geometry.length,
        report.geometry.width
    );
    println!("  {:<12} {}", "Levels:", style(meta.levels).cyan());
    println!(
        "  {:<12} {} [{}]",
        "Bays:",
        style(meta.segment_count()).cyan(),
        segments.join(", ")
    );
    println!("  {:<12} {}", "Frames:", style(meta.frame_count).cyan());
    println!("  {:<12} {} m", "Deck width:", style(meta.deck_width).cyan());
    println!();

    println!("{}", style("Needs").bold().underlined());
    let mut needs = Builder::default();
    needs.push_record(["Category", "Quantity"]);
    for (category, quantity) in report.needs.iter() {
        needs.push_record([category.to_string(), quantity.to_string()]);
    }
    println!("{}", needs.build().with(Style::markdown()));
    println!();

    println!(
        "{} {}",
        style("Usage").bold().underlined(),
        style(format!("({})", report.mode)).dim()
    );
    if report.usage.is_empty() {
        println!("{}", style("No matching parts in stock").dim());
    } else {
        let mut usage = Builder::default();
        usage.push_record(["ID", "Part", "Category", "Used", "Remaining", "Weight"]);
        for line in &report.usage {
            usage.push_record([
                line.part.id.to_string(),
                line.part.name.clone(),
                line.category.to_string(),
                line.used.to_string(),
                line.remaining.to_string(),
                format_weight(line.weight()),
            ]);
        }
        println!("{}", usage.build().with(Style::markdown()));
    }
    println!();

    if !report.warnings.is_empty() {
        for warning in &report.warnings {
            println!("{} {}", style("!").yellow(), warning);
        }
        println!();
    }

    println!(
        "{} {} part(s), {}",
        style("Total:").bold(),
        style(report.total_used()).cyan(),
        style(format_weight(report.total_weight())).cyan()
    );
    if report.applied {
        println!("{} Stock updated", style("✓").green());
    } else {
        println!(
            "{}",
            style("Stock unchanged. Re-run with --apply to deduct these parts.").dim()
        );
    }
}
