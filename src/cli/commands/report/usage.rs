//! Usage report for the last calculation

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{
    effective_format, format_dimension, format_weight, load_config, open_project, write_output,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::allocate::ExportRow;
use crate::core::session::CalculationReport;
use crate::yaml::parse_yaml_file;

#[derive(clap::Args, Debug)]
pub struct UsageArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct UsageExport {
    geometry: crate::core::GeometryRequest,
    applied: bool,
    rows: Vec<ExportRow>,
    total_used: u64,
    total_weight: f64,
}

const USAGE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("used", "USED", 6),
    ColumnDef::new("length", "L (m)", 7),
    ColumnDef::new("width", "W (m)", 7),
    ColumnDef::new("height", "H (m)", 7),
    ColumnDef::new("weight", "KG/U", 7),
];

pub fn run(args: UsageArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = load_config(&project);

    let path = project.usage_path();
    if !path.exists() {
        return Err(miette::miette!(
            help = "run 'scaf calc --height H --length L --width W' first",
            "no calculation recorded"
        ));
    }
    let report: CalculationReport = parse_yaml_file(&path)?;

    let format = effective_format(global, &config, OutputFormat::Md);
    let content = match format {
        OutputFormat::Csv => render_csv(&report)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&export(&report)).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yml::to_string(&export(&report)).into_diagnostic()?,
        OutputFormat::Tsv | OutputFormat::Id => {
            let rows: Vec<TableRow> = report
                .export_rows()
                .into_iter()
                .enumerate()
                .map(|(i, row)| usage_row(i + 1, row))
                .collect();
            let mut out = TableFormatter::new(USAGE_COLUMNS, "usage line")
                .without_summary()
                .render(&rows, format)?;
            if format == OutputFormat::Tsv {
                out.push_str(&format!(
                    "\nTotal weight: {}\n",
                    format_weight(report.total_weight())
                ));
            }
            out
        }
        _ => render_markdown(&report),
    };

    write_output(&content, args.output)
}

fn export(report: &CalculationReport) -> UsageExport {
    UsageExport {
        geometry: report.geometry,
        applied: report.applied,
        rows: report.export_rows(),
        total_used: report.total_used(),
        total_weight: report.total_weight(),
    }
}

fn usage_row(index: usize, row: ExportRow) -> TableRow {
    TableRow::new(index)
        .cell("name", CellValue::Text(row.name))
        .cell("used", CellValue::Number(row.used as i64))
        .cell("length", CellValue::Dimension(row.length))
        .cell("width", CellValue::Dimension(row.width))
        .cell("height", CellValue::Dimension(row.height))
        .cell("weight", CellValue::Dimension(row.weight))
}

fn render_csv(report: &CalculationReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in report.export_rows() {
        writer.serialize(row).into_diagnostic()?;
    }
    writer
        .write_record([
            "Total".to_string(),
            report.total_used().to_string(),
            String::new(),
            String::new(),
            String::new(),
            format!("{:.2}", report.total_weight()),
        ])
        .into_diagnostic()?;
    let bytes = writer.into_inner().into_diagnostic()?;
    String::from_utf8(bytes).into_diagnostic()
}

fn render_markdown(report: &CalculationReport) -> String {
    let mut output = String::new();
    output.push_str("# Scaffold Usage Report\n\n");
    output.push_str(&format!(
        "**Envelope:** {} x {} x {} m (height x length x width)\n\n",
        report.geometry.height, report.geometry.length, report.geometry.width
    ));
    output.push_str(&format!(
        "**Calculated:** {}\n\n",
        report.created.format("%Y-%m-%d %H:%M UTC")
    ));

    let mut builder = Builder::default();
    builder.push_record(["Part", "Used", "Length (m)", "Width (m)", "Height (m)", "Weight (kg)"]);
    for row in report.export_rows() {
        builder.push_record([
            row.name.clone(),
            row.used.to_string(),
            format_dimension(row.length),
            format_dimension(row.width),
            format_dimension(row.height),
            format_dimension(row.weight),
        ]);
    }
    output.push_str(&builder.build().with(Style::markdown()).to_string());
    output.push_str("\n\n");

    output.push_str(&format!("**Total parts:** {}\n\n", report.total_used()));
    output.push_str(&format!(
        "**Total weight:** {}\n",
        format_weight(report.total_weight())
    ));

    if !report.shortfalls.is_empty() {
        output.push_str("\n## Shortfalls\n\n");
        for shortfall in &report.shortfalls {
            output.push_str(&format!("- {}\n", shortfall));
        }
    }

    if report.applied {
        output.push_str("\n_Deducted from stock._\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::needs::StandardDimensions;
    use crate::core::session::Session;
    use crate::core::AllocationMode;
    use crate::entities::Part;

    fn report() -> CalculationReport {
        let stock = vec![
            Part::new(1, "Poteau 2m", 200)
                .with_dimensions(None, None, Some(2.0))
                .with_weight(19.5),
            Part::new(2, "Plancher alu 0.73m", 2)
                .with_dimensions(Some(2.07), Some(0.73), None)
                .with_weight(21.0),
        ];
        let mut session =
            Session::new(&stock, StandardDimensions::default(), AllocationMode::PerPart).unwrap();
        session.calculate(4.0, 6.0, 1.0).unwrap().clone()
    }

    #[test]
    fn test_render_csv_has_total_row() {
        let csv = render_csv(&report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,used,length,width,height,weight");
        assert_eq!(lines[1], "Poteau 2m,12,,,2.0,19.5");
        assert_eq!(lines[2], "Plancher alu 0.73m,2,2.07,0.73,,21.0");
        // 12 x 19.5 + 2 x 21.0
        assert_eq!(lines[3], "Total,14,,,,276.00");
    }

    #[test]
    fn test_render_markdown() {
        let md = render_markdown(&report());
        assert!(md.contains("# Scaffold Usage Report"));
        assert!(md.contains("| Poteau 2m"));
        assert!(md.contains("**Total weight:** 276.00 kg"));
        assert!(md.contains("## Shortfalls"));
    }
}
