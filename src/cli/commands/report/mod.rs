//! `scaf report` command - Usage, stock and withdrawal reports

mod stock;
mod usage;
mod withdrawals;

use clap::Subcommand;
use miette::Result;

use crate::cli::GlobalOpts;

pub use stock::StockArgs;
pub use usage::UsageArgs;
pub use withdrawals::WithdrawalsArgs;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Parts used by the last calculation, with total weight
    Usage(UsageArgs),

    /// Stock totals, low-stock parts and per-category breakdown
    Stock(StockArgs),

    /// Withdrawal count, units and weight per operator
    Withdrawals(WithdrawalsArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Usage(args) => usage::run(args, global),
        ReportCommands::Stock(args) => stock::run(args, global),
        ReportCommands::Withdrawals(args) => withdrawals::run(args, global),
    }
}
