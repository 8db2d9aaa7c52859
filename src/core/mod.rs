//! Core module - calculator, inventory store and project plumbing

pub mod allocate;
pub mod category;
pub mod config;
pub mod inventory;
pub mod needs;
pub mod project;
pub mod segment;
pub mod session;

pub use allocate::{allocate, allocate_with, Allocation, AllocationMode, Shortfall, UsageLine};
pub use category::{categorize, Category};
pub use config::Config;
pub use inventory::{Inventory, InventoryError};
pub use needs::{compute_needs, CalcError, GeometryRequest, NeedsMap, NeedsMeta, StandardDimensions};
pub use project::{Project, ProjectError};
pub use segment::{segment, segment_with, SegmentError, SegmentStrategy, Segmentation};
pub use session::{CalculationReport, InventorySource, Session, StockLine};
