//! CLI command implementations

pub mod calc;
pub mod categorize;
pub mod completions;
pub mod config;
pub mod init;
pub mod part;
pub mod report;
pub mod reset;
pub mod segment;
pub mod withdraw;
