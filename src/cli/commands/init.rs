//! `scaf init` command - Initialize a new scaf project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::inventory::Inventory;
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .scaf/ already exists
    #[arg(long)]
    pub force: bool,

    /// Start with an empty inventory instead of the standard catalogue
    #[arg(long)]
    pub empty: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let seed = !args.empty;
    let project = if args.force {
        Project::init_force(&path, seed)
    } else {
        Project::init(&path, seed)
    };

    match project {
        Ok(project) => {
            tracing::info!(root = %project.root().display(), seed, "initialized project");
            println!(
                "{} Initialized scaf project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(project.root());

            let inventory = Inventory::load(&project)?;
            if !inventory.parts().is_empty() {
                println!();
                println!(
                    "Inventory holds {} part(s), {} unit(s)",
                    style(inventory.parts().len()).cyan(),
                    style(inventory.stats(0).total_units).cyan()
                );
            }

            println!();
            println!("Next steps:");
            println!("  {} List the inventory", style("scaf part list").yellow());
            println!(
                "  {} Plan a scaffold",
                style("scaf calc --height 4 --length 6 --width 1").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} scaf project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("scaf init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let entries = [
        ".scaf/",
        ".scaf/config.yaml",
        "inventory/",
        "inventory/parts.yaml",
        "inventory/withdrawals.yaml",
    ];

    for entry in entries {
        if root.join(entry).exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}
