//! `scaf part` command - Inventory part management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;

use crate::cli::helpers::{
    effective_format, format_dimension, format_weight, load_config, open_project,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::category::{group_by_category, Category};
use crate::core::inventory::{AddOutcome, Inventory, NewPart};
use crate::entities::Part;

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// List parts with filtering
    List(ListArgs),

    /// Add a part, or restock an identical one
    Add(AddArgs),

    /// Show a part's details
    Show(ShowArgs),

    /// Set the quantity on hand
    SetQty(SetQtyArgs),

    /// Add or subtract stock
    Adjust(AdjustArgs),

    /// Remove a part from the inventory
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by category (e.g. upright, ledger, platform)
    #[arg(long, short = 'c')]
    pub category: Option<Category>,

    /// Show only parts at or below the low-stock threshold
    #[arg(long)]
    pub low_stock: bool,

    /// Minimum quantity on hand
    #[arg(long)]
    pub min_qty: Option<u32>,

    /// Maximum quantity on hand
    #[arg(long)]
    pub max_qty: Option<u32>,

    /// Group parts under category headings
    #[arg(long)]
    pub by_category: bool,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Part name; drives category detection
    #[arg(long, short = 'n')]
    pub name: String,

    /// Quantity to add
    #[arg(long)]
    pub qty: u32,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Length in meters
    #[arg(long)]
    pub length: Option<f64>,

    /// Width in meters
    #[arg(long)]
    pub width: Option<f64>,

    /// Height in meters
    #[arg(long)]
    pub height: Option<f64>,

    /// Unit weight in kilograms
    #[arg(long)]
    pub weight: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part ID
    pub id: u32,
}

#[derive(clap::Args, Debug)]
pub struct SetQtyArgs {
    /// Part ID
    pub id: u32,

    /// New quantity on hand
    pub qty: u32,
}

#[derive(clap::Args, Debug)]
pub struct AdjustArgs {
    /// Part ID
    pub id: u32,

    /// Signed change, e.g. 10 or -5
    #[arg(allow_negative_numbers = true)]
    pub delta: i64,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Part ID
    pub id: u32,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const PART_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("category", "CATEGORY", 11),
    ColumnDef::new("length", "L (m)", 7),
    ColumnDef::new("width", "W (m)", 7),
    ColumnDef::new("height", "H (m)", 7),
    ColumnDef::new("qty", "QTY", 7),
    ColumnDef::new("weight", "KG/U", 7),
];

/// Run a part subcommand
pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::List(args) => run_list(args, global),
        PartCommands::Add(args) => run_add(args, global),
        PartCommands::Show(args) => run_show(args, global),
        PartCommands::SetQty(args) => run_set_qty(args, global),
        PartCommands::Adjust(args) => run_adjust(args, global),
        PartCommands::Remove(args) => run_remove(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = load_config(&project);
    let inventory = Inventory::load(&project)?;
    let threshold = config.low_stock_threshold();

    let parts: Vec<&Part> = inventory
        .parts()
        .iter()
        .filter(|p| args.search.as_deref().map_or(true, |s| p.matches_search(s)))
        .filter(|p| args.category.map_or(true, |c| p.category() == c))
        .filter(|p| !args.low_stock || p.quantity <= threshold)
        .filter(|p| args.min_qty.map_or(true, |min| p.quantity >= min))
        .filter(|p| args.max_qty.map_or(true, |max| p.quantity <= max))
        .collect();

    if args.count {
        println!("{}", parts.len());
        return Ok(());
    }

    let format = effective_format(global, &config, OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml if args.by_category => {
            let grouped: BTreeMap<Category, Vec<&Part>> = group_by_category(parts);
            print_serialized(&grouped, format)?;
        }
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(&parts, format)?,
        _ if args.by_category => {
            for (category, group) in group_by_category(parts) {
                println!(
                    "{} {}",
                    style(category.to_string()).bold().underlined(),
                    style(format!("({})", group.len())).dim()
                );
                formatter(global)
                    .without_summary()
                    .output(group.into_iter().map(|p| part_row(p, threshold)), format)?;
                println!();
            }
        }
        _ => {
            formatter(global).output(parts.into_iter().map(|p| part_row(p, threshold)), format)?;
        }
    }

    Ok(())
}

fn formatter(global: &GlobalOpts) -> TableFormatter<'static> {
    let formatter = TableFormatter::new(PART_COLUMNS, "part");
    if global.quiet {
        formatter.without_summary()
    } else {
        formatter
    }
}

fn part_row(part: &Part, threshold: u32) -> TableRow {
    TableRow::new(part.id)
        .cell("name", CellValue::Text(part.name.clone()))
        .cell("category", CellValue::Category(part.category()))
        .cell("length", CellValue::Dimension(part.length))
        .cell("width", CellValue::Dimension(part.width))
        .cell("height", CellValue::Dimension(part.height))
        .cell(
            "qty",
            CellValue::Quantity {
                value: part.quantity,
                low: part.quantity <= threshold,
            },
        )
        .cell(
            "weight",
            part.weight.map_or(CellValue::Empty, |w| CellValue::Float(w, 2)),
        )
}

fn print_serialized<T: serde::Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    } else {
        print!("{}", serde_yml::to_string(value).into_diagnostic()?);
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    for (field, value) in [
        ("length", args.length),
        ("width", args.width),
        ("height", args.height),
        ("weight", args.weight),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(miette::miette!("{} must be a non-negative number, got {}", field, v));
            }
        }
    }

    let project = open_project(global)?;
    let mut inventory = Inventory::load(&project)?;

    let outcome = inventory.add(NewPart {
        name: args.name.clone(),
        description: args.description,
        length: args.length,
        width: args.width,
        height: args.height,
        quantity: args.qty,
        weight: args.weight,
    })?;
    inventory.save(&project)?;

    if global.quiet {
        println!("{}", outcome.id());
        return Ok(());
    }

    match outcome {
        AddOutcome::Created(id) => println!(
            "{} Created part {} {} [{}]",
            style("✓").green(),
            style(id).cyan(),
            style(&args.name).yellow(),
            crate::core::categorize(&args.name)
        ),
        AddOutcome::Restocked { id, quantity } => println!(
            "{} Restocked part {} {} {} now {} on hand",
            style("✓").green(),
            style(id).cyan(),
            style(&args.name).yellow(),
            style("→").dim(),
            style(quantity).cyan()
        ),
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let inventory = Inventory::load(&project)?;
    let part = inventory.get(args.id)?;

    match global.format {
        OutputFormat::Yaml => print_serialized(part, OutputFormat::Yaml)?,
        OutputFormat::Json => print_serialized(part, OutputFormat::Json)?,
        OutputFormat::Id => println!("{}", part.id),
        _ => {
            let config = load_config(&project);
            let withdrawn: u32 = inventory.withdrawals_for(part.id).map(|w| w.quantity).sum();

            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(part.id).cyan());
            println!("{}: {}", style("Name").bold(), style(&part.name).yellow());
            println!("{}: {}", style("Category").bold(), part.category());
            if let Some(ref description) = part.description {
                println!("{}: {}", style("Description").bold(), description);
            }
            println!(
                "{}: {} x {} x {} m",
                style("Dimensions").bold(),
                format_dimension(part.length),
                format_dimension(part.width),
                format_dimension(part.height)
            );
            let quantity = if part.quantity <= config.low_stock_threshold() {
                style(part.quantity.to_string()).red().bold()
            } else {
                style(part.quantity.to_string()).green()
            };
            println!("{}: {}", style("On hand").bold(), quantity);
            if let Some(weight) = part.weight {
                println!("{}: {}", style("Unit weight").bold(), format_weight(weight));
                println!(
                    "{}: {}",
                    style("Stock weight").bold(),
                    format_weight(part.weight_for(part.quantity))
                );
            }
            println!("{}: {}", style("Withdrawn to date").bold(), withdrawn);
            println!("{}", style("─".repeat(60)).dim());
        }
    }
    Ok(())
}

fn run_set_qty(args: SetQtyArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut inventory = Inventory::load(&project)?;

    let previous = inventory.set_quantity(args.id, args.qty)?;
    inventory.save(&project)?;

    if !global.quiet {
        println!(
            "{} Part {} quantity {} {} {}",
            style("✓").green(),
            style(args.id).cyan(),
            previous,
            style("→").dim(),
            style(args.qty).yellow()
        );
    }
    Ok(())
}

fn run_adjust(args: AdjustArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut inventory = Inventory::load(&project)?;

    let quantity = inventory.adjust(args.id, args.delta)?;
    inventory.save(&project)?;

    if !global.quiet {
        println!(
            "{} Part {} adjusted by {:+} {} {} on hand",
            style("✓").green(),
            style(args.id).cyan(),
            args.delta,
            style("→").dim(),
            style(quantity).yellow()
        );
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut inventory = Inventory::load(&project)?;
    let name = inventory.get(args.id)?.name.clone();

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remove part {} '{}'?", args.id, name))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }
    }

    inventory.remove(args.id)?;
    inventory.save(&project)?;

    if !global.quiet {
        println!(
            "{} Removed part {} {}",
            style("✓").green(),
            style(args.id).cyan(),
            style(&name).yellow()
        );
    }
    Ok(())
}
