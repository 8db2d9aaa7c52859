//! Withdrawal report: count, units and weight per operator

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::withdraw::days_ago;
use crate::cli::helpers::{effective_format, format_weight, load_config, open_project, write_output};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::inventory::{Inventory, OperatorStats};

#[derive(clap::Args, Debug)]
pub struct WithdrawalsArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Only withdrawals from the last N days
    #[arg(long)]
    pub days: Option<u32>,
}

#[derive(Serialize)]
struct WithdrawalsExport {
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
    operators: Vec<OperatorStats>,
    total_withdrawals: usize,
    total_units: u64,
    total_weight: f64,
}

impl WithdrawalsExport {
    fn new(operators: Vec<OperatorStats>, days: Option<u32>) -> Self {
        Self {
            days,
            total_withdrawals: operators.iter().map(|o| o.withdrawals).sum(),
            total_units: operators.iter().map(|o| o.units).sum(),
            total_weight: operators.iter().map(|o| o.weight).sum(),
            operators,
        }
    }
}

pub fn run(args: WithdrawalsArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = load_config(&project);
    let inventory = Inventory::load(&project)?;

    let export = WithdrawalsExport::new(
        inventory.operator_stats(args.days.map(days_ago)),
        args.days,
    );

    let content = match effective_format(global, &config, OutputFormat::Md) {
        OutputFormat::Csv => render_csv(&export)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&export).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yml::to_string(&export).into_diagnostic()?,
        _ => render_markdown(&export),
    };

    write_output(&content, args.output)
}

fn render_csv(export: &WithdrawalsExport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["operator", "withdrawals", "units", "weight"])
        .into_diagnostic()?;
    for op in &export.operators {
        writer
            .write_record([
                op.operator.clone(),
                op.withdrawals.to_string(),
                op.units.to_string(),
                format!("{:.2}", op.weight),
            ])
            .into_diagnostic()?;
    }
    writer
        .write_record([
            "Total".to_string(),
            export.total_withdrawals.to_string(),
            export.total_units.to_string(),
            format!("{:.2}", export.total_weight),
        ])
        .into_diagnostic()?;
    let bytes = writer.into_inner().into_diagnostic()?;
    String::from_utf8(bytes).into_diagnostic()
}

fn render_markdown(export: &WithdrawalsExport) -> String {
    let mut output = String::from("# Withdrawals by Operator\n\n");
    if let Some(days) = export.days {
        output.push_str(&format!("_Last {} day(s)._\n\n", days));
    }

    if export.operators.is_empty() {
        output.push_str("_No withdrawals recorded._\n");
        return output;
    }

    let mut table = Builder::default();
    table.push_record(["Operator", "Withdrawals", "Units", "Weight"]);
    for op in &export.operators {
        table.push_record([
            op.operator.clone(),
            op.withdrawals.to_string(),
            op.units.to_string(),
            format_weight(op.weight),
        ]);
    }
    table.push_record([
        "**Total**".to_string(),
        export.total_withdrawals.to_string(),
        export.total_units.to_string(),
        format_weight(export.total_weight),
    ]);
    output.push_str(&table.build().with(Style::markdown()).to_string());
    output.push('\n');
    output
}
