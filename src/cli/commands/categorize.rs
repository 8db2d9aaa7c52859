//! `scaf categorize` command - Show detected categories for part names

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::category::{matched_keyword, Category};

#[derive(clap::Args, Debug)]
pub struct CategorizeArgs {
    /// Part names to categorize
    #[arg(required_unless_present = "keywords")]
    pub names: Vec<String>,

    /// List the keywords that select each category
    #[arg(long)]
    pub keywords: bool,
}

#[derive(Serialize)]
struct Categorized<'a> {
    name: &'a str,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'static str>,
}

#[derive(Serialize)]
struct CategoryKeywords {
    category: Category,
    keywords: &'static [&'static str],
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 40),
    ColumnDef::new("category", "CATEGORY", 11),
    ColumnDef::new("keyword", "MATCHED", 22),
];

pub fn run(args: CategorizeArgs, global: &GlobalOpts) -> Result<()> {
    if args.keywords {
        return print_keywords(global.format);
    }

    let results: Vec<Categorized> = args
        .names
        .iter()
        .map(|name| {
            let matched = matched_keyword(name);
            Categorized {
                name,
                category: matched.map_or(Category::Other, |(cat, _)| cat),
                keyword: matched.map(|(_, word)| word),
            }
        })
        .collect();

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&results).into_diagnostic()?);
        }
        OutputFormat::Auto => {
            for r in &results {
                match r.keyword {
                    Some(word) => println!("{}\t{}\t{}", r.category, r.name, word),
                    None => println!("{}\t{}", r.category, r.name),
                }
            }
        }
        format => {
            let rows = results.iter().enumerate().map(|(i, r)| {
                TableRow::new(i + 1)
                    .cell("name", CellValue::Text(r.name.to_string()))
                    .cell("category", CellValue::Category(r.category))
                    .cell(
                        "keyword",
                        r.keyword
                            .map_or(CellValue::Empty, |w| CellValue::Text(w.to_string())),
                    )
            });
            TableFormatter::new(COLUMNS, "name")
                .without_summary()
                .output(rows, format)?;
        }
    }
    Ok(())
}

fn print_keywords(format: OutputFormat) -> Result<()> {
    let table: Vec<CategoryKeywords> = Category::ALL
        .iter()
        .filter(|c| **c != Category::Other)
        .map(|c| CategoryKeywords {
            category: *c,
            keywords: c.keywords(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&table).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&table).into_diagnostic()?),
        _ => {
            for entry in &table {
                println!("{}\t{}", entry.category, entry.keywords.join(", "));
            }
        }
    }
    Ok(())
}
