//! Stock report: totals, per-category breakdown and low-stock parts

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{effective_format, format_weight, load_config, open_project, write_output};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::inventory::{Inventory, StockStats};
use crate::entities::Part;

#[derive(clap::Args, Debug)]
pub struct StockArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Override the configured low-stock threshold
    #[arg(long)]
    pub threshold: Option<u32>,
}

#[derive(Serialize)]
struct StockExport<'a> {
    #[serde(flatten)]
    stats: StockStats,
    low_stock_parts: Vec<&'a Part>,
}

pub fn run(args: StockArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = load_config(&project);
    let inventory = Inventory::load(&project)?;

    let threshold = args
        .threshold
        .unwrap_or_else(|| config.low_stock_threshold());
    let stats = inventory.stats(threshold);
    let low: Vec<&Part> = inventory.low_stock(threshold).collect();

    let content = match effective_format(global, &config, OutputFormat::Md) {
        OutputFormat::Csv => render_csv(&stats)?,
        OutputFormat::Json => {
            let export = StockExport {
                stats,
                low_stock_parts: low,
            };
            let mut json = serde_json::to_string_pretty(&export).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => {
            let export = StockExport {
                stats,
                low_stock_parts: low,
            };
            serde_yml::to_string(&export).into_diagnostic()?
        }
        _ => render_markdown(&stats, &low),
    };

    write_output(&content, args.output)
}

fn render_csv(stats: &StockStats) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["category", "parts", "units", "weight"])
        .into_diagnostic()?;
    for cat in &stats.categories {
        writer
            .write_record([
                cat.category.to_string(),
                cat.parts.to_string(),
                cat.units.to_string(),
                format!("{:.2}", cat.weight),
            ])
            .into_diagnostic()?;
    }
    writer
        .write_record([
            "Total".to_string(),
            stats.total_parts.to_string(),
            stats.total_units.to_string(),
            format!("{:.2}", stats.total_weight),
        ])
        .into_diagnostic()?;
    let bytes = writer.into_inner().into_diagnostic()?;
    String::from_utf8(bytes).into_diagnostic()
}

fn render_markdown(stats: &StockStats, low: &[&Part]) -> String {
    let mut output = String::new();
    output.push_str("# Stock Report\n\n");

    output.push_str("## Summary\n\n");
    let mut summary = Builder::default();
    summary.push_record(["Metric", "Value"]);
    summary.push_record(["Parts".to_string(), stats.total_parts.to_string()]);
    summary.push_record(["Units".to_string(), stats.total_units.to_string()]);
    summary.push_record(["Total weight".to_string(), format_weight(stats.total_weight)]);
    summary.push_record([
        format!("Low stock (<= {})", stats.low_stock_threshold),
        stats.low_stock.to_string(),
    ]);
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push_str("\n\n");

    output.push_str("## By Category\n\n");
    if stats.categories.is_empty() {
        output.push_str("_No parts in stock._\n");
    } else {
        let mut table = Builder::default();
        table.push_record(["Category", "Parts", "Units", "Weight"]);
        for cat in &stats.categories {
            table.push_record([
                cat.category.to_string(),
                cat.parts.to_string(),
                cat.units.to_string(),
                format_weight(cat.weight),
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    if !low.is_empty() {
        output.push_str("\n## Low Stock\n\n");
        let mut table = Builder::default();
        table.push_record(["ID", "Part", "Quantity"]);
        for part in low {
            table.push_record([
                part.id.to_string(),
                part.name.clone(),
                part.quantity.to_string(),
            ]);
        }
        output.push_str(&table.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    output
}
