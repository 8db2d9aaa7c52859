//! `scaf config` command - Configuration management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_yml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::open_project;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::allocate::AllocationMode;
use crate::core::segment::SegmentStrategy;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `scaf config keys`)
    pub key: String,

    /// Value to set; lists are comma separated (e.g. 3.07,2.57,2.07)
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

const VALID_KEYS: &[(&str, &str)] = &[
    ("operator", "Name recorded on withdrawals"),
    ("default_format", "Default output format (tsv, json, yaml, csv, md)"),
    ("standard_level_height", "Height of one scaffold level in meters"),
    ("segment_lengths", "Panel lengths available to cover a run (m)"),
    ("deck_widths", "Deck widths in stock (m)"),
    ("low_stock_threshold", "Quantity at or below which stock is low"),
    ("segment_strategy", "greedy or min-pieces"),
    ("allocation_mode", "per-part or cumulative"),
];

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load_for(open_project(global).ok().as_ref());

    if let Some(key) = &args.key {
        check_key(key)?;
        return match config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        match config_value(&config, key) {
            Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
            None => println!("  {}: {}", style(key).cyan(), style("(default)").dim()),
        }
    }
    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (SCAF_OPERATOR, SCAF_FORMAT)");
    println!("  2. Project config (.scaf/config.yaml)");
    println!("  3. Global config (~/.config/scaf/config.yaml)");
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let value = typed_value(&args.key, &args.value)?;
    let path = target_path(args.global, global)?;

    let mut map = read_mapping(&path)?;
    map.insert(Value::String(args.key.clone()), value);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&map).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;
    tracing::debug!(path = %path.display(), key = %args.key, "updated config");

    if !global.quiet {
        println!(
            "{} Set {} = {} in {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            style(&args.value).yellow(),
            scope(args.global)
        );
    }
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let path = target_path(args.global, global)?;
    if !path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            path.display()
        ));
    }

    let mut map = read_mapping(&path)?;
    if map.remove(Value::String(args.key.clone())).is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    let yaml = serde_yml::to_string(&map).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Removed {} from {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            scope(args.global)
        );
    }
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let global_path = global_path()?;
    println!("{}", style("Configuration file paths:").bold());
    println!();
    println!(
        "  {} {} {}",
        style("Global:").cyan(),
        global_path.display(),
        exists_note(&global_path)
    );
    match open_project(global) {
        Ok(project) => {
            let path = project.config_path();
            println!(
                "  {} {} {}",
                style("Project:").cyan(),
                path.display(),
                exists_note(&path)
            );
        }
        Err(_) => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a scaf project)").dim()
        ),
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<24} {}", style(key).cyan(), style(description).dim());
    }
    println!();
    println!(
        "{}",
        style("Use 'scaf config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

fn scope(global: bool) -> &'static str {
    if global {
        "global"
    } else {
        "project"
    }
}

fn exists_note(path: &Path) -> console::StyledObject<&'static str> {
    if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    }
}

fn global_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn target_path(use_global: bool, global: &GlobalOpts) -> Result<PathBuf> {
    if use_global {
        global_path()
    } else {
        Ok(open_project(global)?.config_path())
    }
}

fn read_mapping(path: &Path) -> Result<Mapping> {
    if !path.exists() {
        return Ok(Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<Value>(&content).into_diagnostic()? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(miette::miette!(
            "{} is not a YAML mapping",
            path.display()
        )),
    }
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "run 'scaf config keys' to list valid keys",
            "Unknown config key '{}'",
            key
        ))
    }
}

fn parse_meters(key: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(miette::miette!(
            "{} expects positive lengths in meters, got '{}'",
            key,
            raw
        )),
    }
}

/// Convert a command-line value into the YAML type the key deserializes from
fn typed_value(key: &str, raw: &str) -> Result<Value> {
    let value = match key {
        "standard_level_height" => Value::from(parse_meters(key, raw)?),
        "segment_lengths" | "deck_widths" => {
            let items = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_meters(key, s).map(Value::from))
                .collect::<Result<Vec<_>>>()?;
            if items.is_empty() {
                return Err(miette::miette!("{} needs at least one value", key));
            }
            Value::Sequence(items)
        }
        "low_stock_threshold" => {
            let n: u32 = raw.trim().parse().map_err(|_| {
                miette::miette!("{} expects a whole number, got '{}'", key, raw)
            })?;
            Value::from(n)
        }
        "segment_strategy" => {
            let s: SegmentStrategy = raw.parse().map_err(|e: String| miette::miette!("{}", e))?;
            Value::String(s.to_string())
        }
        "allocation_mode" => {
            let m: AllocationMode = raw.parse().map_err(|e: String| miette::miette!("{}", e))?;
            Value::String(m.to_string())
        }
        "default_format" => {
            let f: OutputFormat = raw.parse().map_err(|e: String| miette::miette!("{}", e))?;
            Value::String(format!("{:?}", f).to_lowercase())
        }
        _ => Value::String(raw.to_string()),
    };
    Ok(value)
}

fn join_meters(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "operator" => config.operator.clone(),
        "default_format" => config.default_format.clone(),
        "standard_level_height" => config.standard_level_height.map(|v| v.to_string()),
        "segment_lengths" => config.segment_lengths.as_deref().map(join_meters),
        "deck_widths" => config.deck_widths.as_deref().map(join_meters),
        "low_stock_threshold" => config.low_stock_threshold.map(|v| v.to_string()),
        "segment_strategy" => config.segment_strategy.map(|v| v.to_string()),
        "allocation_mode" => config.allocation_mode.map(|v| v.to_string()),
        _ => None,
    }
}
