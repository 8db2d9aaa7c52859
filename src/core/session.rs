//! Calculation session: the entry point tying needs and allocation together
//!
//! A [`Session`] holds a snapshot of the stock. Each [`Session::calculate`]
//! draws the computed needs from that snapshot, marks every part with the
//! quantity it contributed and replaces the previous report.
//! [`Session::reset`] clears the markers without touching quantities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::allocate::{allocate_with, AllocationMode, ExportRow, Shortfall, UsageLine};
use crate::core::inventory::{Inventory, InventoryError};
use crate::core::needs::{
    compute_needs, CalcError, GeometryRequest, NeedsMap, NeedsMeta, StandardDimensions,
};
use crate::entities::Part;

/// Anything the calculator can read the current stock from
pub trait InventorySource {
    fn fetch_inventory(&self) -> Result<Vec<Part>, InventoryError>;
}

impl InventorySource for Vec<Part> {
    fn fetch_inventory(&self) -> Result<Vec<Part>, InventoryError> {
        Ok(self.clone())
    }
}

impl InventorySource for Inventory {
    fn fetch_inventory(&self) -> Result<Vec<Part>, InventoryError> {
        Ok(self.parts().to_vec())
    }
}

/// A part in the session snapshot with the quantity drawn by the last
/// calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLine {
    pub part: Part,
    pub used: u32,
}

/// Everything produced by one calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReport {
    pub geometry: GeometryRequest,
    pub needs: NeedsMap,
    pub meta: NeedsMeta,
    pub usage: Vec<UsageLine>,
    pub adjusted: Vec<Part>,
    pub shortfalls: Vec<Shortfall>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub mode: AllocationMode,
    pub created: DateTime<Utc>,

    /// Set once the usage has been deducted from stored stock
    #[serde(default)]
    pub applied: bool,
}

impl CalculationReport {
    pub fn total_weight(&self) -> f64 {
        self.usage.iter().map(UsageLine::weight).sum()
    }

    pub fn total_used(&self) -> u64 {
        self.usage.iter().map(|l| l.used as u64).sum()
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        crate::core::allocate::export_rows(&self.usage)
    }
}

pub struct Session {
    stock: Vec<StockLine>,
    dimensions: StandardDimensions,
    mode: AllocationMode,
    report: Option<CalculationReport>,
}

impl Session {
    /// Start a session from a stock snapshot
    pub fn new<S: InventorySource + ?Sized>(
        source: &S,
        dimensions: StandardDimensions,
        mode: AllocationMode,
    ) -> Result<Self, InventoryError> {
        let stock = source
            .fetch_inventory()?
            .into_iter()
            .map(|part| StockLine { part, used: 0 })
            .collect();
        Ok(Self {
            stock,
            dimensions,
            mode,
            report: None,
        })
    }

    pub fn dimensions(&self) -> &StandardDimensions {
        &self.dimensions
    }

    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    pub fn stock(&self) -> &[StockLine] {
        &self.stock
    }

    pub fn report(&self) -> Option<&CalculationReport> {
        self.report.as_ref()
    }

    /// Compute needs for the envelope and draw them from the snapshot
    ///
    /// Invalid geometry fails before any state changes.
    pub fn calculate(
        &mut self,
        height: f64,
        length: f64,
        width: f64,
    ) -> Result<&CalculationReport, CalcError> {
        let geometry = GeometryRequest::new(height, length, width)?;
        let (needs, meta) = compute_needs(&geometry, &self.dimensions)?;

        let parts: Vec<Part> = self.stock.iter().map(|l| l.part.clone()).collect();
        let allocation = allocate_with(&parts, &needs, self.mode);

        let mut warnings = Vec::new();
        if meta.truncated {
            warnings.push(format!(
                "run of {} m needed more than the segment limit; the layout is incomplete",
                geometry.length
            ));
        }
        warnings.extend(
            allocation
                .shortfalls
                .iter()
                .map(|s| format!("insufficient stock: {}", s)),
        );

        self.stock = allocation
            .adjusted
            .iter()
            .map(|part| StockLine {
                used: allocation.used_for(part.id),
                part: part.clone(),
            })
            .collect();

        let report = CalculationReport {
            geometry,
            needs,
            meta,
            usage: allocation.usage,
            adjusted: allocation.adjusted,
            shortfalls: allocation.shortfalls,
            warnings,
            mode: self.mode,
            created: Utc::now(),
            applied: false,
        };
        Ok(self.report.insert(report))
    }

    /// Clear the used markers and the report; quantities are unchanged
    pub fn reset(&mut self) -> &[StockLine] {
        for line in &mut self.stock {
            line.used = 0;
        }
        self.report = None;
        &self.stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::Category;

    fn stock() -> Vec<Part> {
        vec![
            Part::new(1, "Poteau 2m", 3).with_weight(19.5),
            Part::new(2, "Plateau alu", 40).with_weight(21.0),
            Part::new(3, "Ancrage mural", 12),
        ]
    }

    fn session() -> Session {
        Session::new(&stock(), StandardDimensions::default(), AllocationMode::PerPart).unwrap()
    }

    #[test]
    fn test_calculate_reference_scenario() {
        let mut session = session();
        let report = session.calculate(4.0, 6.0, 1.0).unwrap();

        assert_eq!(report.meta.levels, 2);
        assert_eq!(report.needs.get(Category::Upright), 12);
        assert_eq!(report.usage.len(), 2);
        assert_eq!(report.shortfalls.len(), 1);
        assert_eq!(report.shortfalls[0].needed, 12);
        assert_eq!(report.shortfalls[0].available, 3);
        assert_eq!(report.warnings.len(), 1);
        // 3 uprights at 19.5 + 4 platforms at 21.0
        assert!((report.total_weight() - 142.5).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_marks_stock() {
        let mut session = session();
        session.calculate(4.0, 6.0, 1.0).unwrap();

        let stock = session.stock();
        assert_eq!(stock[0].used, 3);
        assert_eq!(stock[0].part.quantity, 0);
        assert_eq!(stock[1].used, 4);
        assert_eq!(stock[1].part.quantity, 36);
        assert_eq!(stock[2].used, 0);
        assert_eq!(stock[2].part.quantity, 12);
    }

    #[test]
    fn test_reset_keeps_quantities() {
        let mut session = session();
        session.calculate(4.0, 6.0, 1.0).unwrap();
        let quantities: Vec<u32> = session.stock().iter().map(|l| l.part.quantity).collect();

        let after = session.reset();
        assert!(after.iter().all(|l| l.used == 0));
        assert_eq!(
            after.iter().map(|l| l.part.quantity).collect::<Vec<_>>(),
            quantities
        );
        assert!(session.report().is_none());

        session.reset();
        assert!(session.stock().iter().all(|l| l.used == 0));
    }

    #[test]
    fn test_invalid_geometry_leaves_state() {
        let mut session = session();
        let err = session.calculate(0.0, 6.0, 1.0).unwrap_err();
        assert!(matches!(err, CalcError::InvalidGeometry { field: "height", .. }));
        assert_eq!(session.stock()[0].part.quantity, 3);
        assert!(session.report().is_none());
    }

    #[test]
    fn test_new_calculation_replaces_report() {
        let mut session = session();
        session.calculate(4.0, 6.0, 1.0).unwrap();
        let report = session.calculate(2.0, 3.0, 1.0).unwrap();

        assert_eq!(report.meta.levels, 1);
        assert_eq!(report.geometry.length, 3.0);
        // platforms drawn again from the adjusted snapshot
        assert_eq!(session.stock()[1].part.quantity, 35);
    }

    #[test]
    fn test_inventory_source_for_store() {
        let inventory = Inventory::new(stock());
        let session =
            Session::new(&inventory, StandardDimensions::default(), AllocationMode::Cumulative)
                .unwrap();
        assert_eq!(session.stock().len(), 3);
        assert_eq!(session.mode(), AllocationMode::Cumulative);
    }
}
