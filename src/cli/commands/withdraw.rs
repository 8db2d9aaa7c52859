//! `scaf withdraw` command - Record and list stock withdrawals

use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, format_weight, load_config, open_project};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::inventory::Inventory;
use crate::entities::Withdrawal;

#[derive(Subcommand, Debug)]
pub enum WithdrawCommands {
    /// Withdraw stock from a part
    New(NewArgs),

    /// List recorded withdrawals
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part ID
    pub id: u32,

    /// Quantity to withdraw
    pub qty: u32,

    /// Free-text note (site, order number...)
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only withdrawals of this part
    #[arg(long, short = 'p')]
    pub part: Option<u32>,

    /// Only withdrawals from the last N days
    #[arg(long)]
    pub days: Option<u32>,

    /// Show only the most recent N withdrawals
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

const WITHDRAWAL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("date", "DATE", 16),
    ColumnDef::new("part", "PART", 6),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("qty", "QTY", 6),
    ColumnDef::new("weight", "KG", 9),
    ColumnDef::new("operator", "BY", 14),
    ColumnDef::new("note", "NOTE", 24),
];

pub fn run(cmd: WithdrawCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        WithdrawCommands::New(args) => run_new(args, global),
        WithdrawCommands::List(args) => run_list(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = load_config(&project);
    let mut inventory = Inventory::load(&project)?;

    let withdrawal = inventory.withdraw(args.id, args.qty, config.operator(), args.note)?;
    inventory.save(&project)?;

    if global.quiet {
        println!("{}", withdrawal.id);
        return Ok(());
    }

    println!(
        "{} Withdrew {} x {} ({})",
        style("✓").green(),
        style(withdrawal.quantity).yellow(),
        style(&withdrawal.part_name).cyan(),
        format_weight(withdrawal.total_weight)
    );
    println!("   {} remaining", style(withdrawal.remaining).cyan());
    if withdrawal.remaining <= config.low_stock_threshold() {
        println!(
            "   {} stock of part {} is low",
            style("!").yellow(),
            withdrawal.part_id
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = load_config(&project);
    let inventory = Inventory::load(&project)?;

    let since = args.days.map(days_ago);
    let mut withdrawals: Vec<&Withdrawal> = match since {
        Some(since) => inventory.withdrawals_since(since).collect(),
        None => inventory.withdrawals().iter().collect(),
    };
    if let Some(id) = args.part {
        withdrawals.retain(|w| w.part_id == id);
    }
    withdrawals.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    if let Some(limit) = args.limit {
        withdrawals.truncate(limit);
    }

    let format = effective_format(global, &config, OutputFormat::Tsv);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&withdrawals).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&withdrawals).into_diagnostic()?);
        }
        _ => {
            let mut formatter = TableFormatter::new(WITHDRAWAL_COLUMNS, "withdrawal");
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(withdrawals.iter().map(|w| withdrawal_row(w)), format)?;

            if !global.quiet && matches!(format, OutputFormat::Tsv) {
                let total: f64 = withdrawals.iter().map(|w| w.total_weight).sum();
                println!("Total weight: {}", style(format_weight(total)).cyan());
            }
        }
    }
    Ok(())
}

/// Start of the window covering the last `days` days
pub(crate) fn days_ago(days: u32) -> DateTime<Utc> {
    Utc::now() - Duration::days(i64::from(days))
}

fn withdrawal_row(w: &Withdrawal) -> TableRow {
    TableRow::new(w.id)
        .cell("date", CellValue::DateTime(w.date))
        .cell("part", CellValue::Number(w.part_id as i64))
        .cell("name", CellValue::Text(w.part_name.clone()))
        .cell("qty", CellValue::Number(w.quantity as i64))
        .cell("weight", CellValue::Float(w.total_weight, 2))
        .cell(
            "operator",
            w.operator
                .clone()
                .map_or(CellValue::Empty, CellValue::Text),
        )
        .cell(
            "note",
            w.note.clone().map_or(CellValue::Empty, CellValue::Text),
        )
}
