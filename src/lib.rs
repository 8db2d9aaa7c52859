//! scaf: scaffolding stock calculator
//!
//! Keeps a plain-text inventory of scaffolding parts and estimates the parts
//! a scaffold of a given height, length and width needs, drawing them from
//! stock.

pub mod cli;
pub mod core;
pub mod entities;
pub mod templates;
pub mod yaml;
