//! Table formatting utilities for CLI list commands
//!
//! Parts, withdrawals and categorization results all print through
//! [`TableFormatter`], which renders TSV for the terminal, CSV for
//! spreadsheets and Markdown for reports.

use chrono::{DateTime, Local, Utc};
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::core::category::Category;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Plain text, truncated to the column width
    Text(String),
    /// Part category, colored by kind
    Category(Category),
    /// Stock quantity; low stock is highlighted
    Quantity { value: u32, low: bool },
    /// Optional dimension in meters
    Dimension(Option<f64>),
    /// Float value with precision
    Float(f64, usize),
    /// Integer value
    Number(i64),
    /// DateTime displayed with time
    DateTime(DateTime<Utc>),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Category(category) => {
                let s = category.to_string();
                let styled = match category {
                    Category::Other => style(s).dim(),
                    Category::Upright | Category::Ledger | Category::Transom => style(s).cyan(),
                    Category::Platform | Category::ToeBoard | Category::Guardrail => {
                        style(s).green()
                    }
                    _ => style(s).white(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Quantity { value, low } => {
                let styled = if *low {
                    style(value.to_string()).red().bold()
                } else {
                    style(value.to_string()).white()
                };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::Dimension(dim) => match dim {
                Some(d) => format!("{:>width$}", d, width = width),
                None => format!("{:>width$}", style("-").dim(), width = width),
            },
            CellValue::Float(f, precision) => {
                format!("{:>width$.prec$}", f, width = width, prec = precision)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                format!("{:<width$}", local.format("%Y-%m-%d %H:%M"), width = width)
            }
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (no colors; quoting is left to the writer)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Dimension(dim) => dim.map(|d| d.to_string()).unwrap_or_default(),
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                local.format("%Y-%m-%dT%H:%M:%S").to_string()
            }
            CellValue::Empty => String::new(),
            other => other.raw(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Quantity { value, low: true } => format!("**{}**", value),
            CellValue::Dimension(None) | CellValue::Empty => "-".to_string(),
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                local.format("%Y-%m-%d %H:%M").to_string()
            }
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Category(category) => category.to_string(),
            CellValue::Quantity { value, .. } => value.to_string(),
            CellValue::Dimension(dim) => dim.map(|d| d.to_string()).unwrap_or_default(),
            CellValue::Float(f, precision) => format!("{:.prec$}", f, prec = precision),
            CellValue::Number(n) => n.to_string(),
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                local.format("%Y-%m-%dT%H:%M:%S").to_string()
            }
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Text(s) => s.chars().count(),
            CellValue::DateTime(_) => 16, // "YYYY-MM-DD HH:MM"
            CellValue::Dimension(None) | CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and width cap
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Hide the "N found" line (for quiet mode)
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat) -> Result<()>
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();
        print!("{}", self.render(&rows, format)?);
        Ok(())
    }

    /// Render rows to a string in the specified format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> Result<String> {
        let out = match format {
            OutputFormat::Csv => self.render_csv(rows)?,
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Id => rows.iter().map(|r| format!("{}\n", r.id)).collect(),
            _ => self.render_tsv(rows),
        };
        Ok(out)
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let id_width = rows
            .iter()
            .map(|r| r.id.len())
            .max()
            .unwrap_or(2)
            .max(2); // "ID" header
        let mut widths = vec![id_width];

        for col in self.columns {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);
            // +2 leaves room for truncate_str's buffer; capped at the column width
            let natural_width = col.header.len().max(max_content.saturating_add(2));
            widths.push(natural_width.min(col.width));
        }

        widths
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.calculate_widths(rows);
        let mut out = String::new();

        let mut header_parts = vec![format!("{:<width$}", style("ID").bold().dim(), width = widths[0])];
        for (col, width) in self.columns.iter().zip(&widths[1..]) {
            header_parts.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        out.push_str(&header_parts.join(" "));
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            let mut row_parts = vec![format!("{:<width$}", style(&row.id).cyan(), width = widths[0])];
            for (col, width) in self.columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => row_parts.push(value.format_tsv(*width)),
                    None => row_parts.push(format!("{:<width$}", "-", width = *width)),
                }
            }
            out.push_str(&row_parts.join(" "));
            out.push('\n');
        }

        if self.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {}(s) found.\n",
                style(rows.len()).cyan(),
                self.entity_name
            ));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let headers = std::iter::once("id").chain(self.columns.iter().map(|c| c.key));
        writer.write_record(headers).into_diagnostic()?;

        for row in rows {
            let mut record = vec![row.id.clone()];
            for col in self.columns {
                record.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            writer.write_record(&record).into_diagnostic()?;
        }
        let bytes = writer.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();
        let mut headers = vec!["ID".to_string()];
        headers.extend(self.columns.iter().map(|c| c.header.to_string()));
        out.push_str(&format!("| {} |\n", headers.join(" | ")));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        out.push_str(&format!("|{}|\n", separators.join("|")));

        for row in rows {
            let mut values = vec![row.id.clone()];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            out.push_str(&format!("| {} |\n", values.join(" | ")));
        }
        out
    }
}
