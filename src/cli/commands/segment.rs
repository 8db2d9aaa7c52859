//! `scaf segment` command - Split a run length into standard segments

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_project;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::segment::{segment_with, SegmentStrategy};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct SegmentArgs {
    /// Run length in meters
    pub length: f64,

    /// Available segment lengths (default from config)
    #[arg(long, value_delimiter = ',')]
    pub lengths: Option<Vec<f64>>,

    /// Segmentation strategy (default from config: greedy)
    #[arg(long)]
    pub strategy: Option<SegmentStrategy>,
}

pub fn run(args: SegmentArgs, global: &GlobalOpts) -> Result<()> {
    // Usable outside a project; project config applies when there is one
    let config = match open_project(global) {
        Ok(project) => Config::load_for(Some(&project)),
        Err(_) => Config::load_for(None),
    };
    let dimensions = config.dimensions();
    let lengths = args.lengths.unwrap_or(dimensions.segment_lengths);
    let strategy = args.strategy.unwrap_or(dimensions.segment_strategy);

    let segmentation =
        segment_with(args.length, &lengths, strategy).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&segmentation).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&segmentation).into_diagnostic()?);
        }
        _ => {
            let parts: Vec<String> = segmentation.segments.iter().map(|s| s.to_string()).collect();
            if global.quiet {
                println!("{}", parts.join(" "));
            } else {
                println!(
                    "{} segment(s): {}",
                    style(segmentation.count()).cyan(),
                    parts.join(" + ")
                );
                println!(
                    "Covers {} m ({})",
                    style(format!("{:.2}", segmentation.total())).cyan(),
                    strategy
                );
            }
            if segmentation.truncated {
                println!(
                    "{} stopped at the segment limit; the run is not fully covered",
                    style("!").yellow()
                );
            }
        }
    }
    Ok(())
}
