//! Inventory store backed by the project's YAML files
//!
//! Parts live in `inventory/parts.yaml` and withdrawals in
//! `inventory/withdrawals.yaml`. Both files are read whole, modified in
//! memory and written back whole.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::allocate::UsageLine;
use crate::core::category::Category;
use crate::core::Project;
use crate::entities::{Part, Withdrawal};
use crate::yaml::{parse_yaml_file, write_yaml_file, YamlError};

/// Errors raised by inventory operations
#[derive(Debug, Error, Diagnostic)]
pub enum InventoryError {
    #[error("part {0} not found")]
    #[diagnostic(
        code(scaf::inventory::not_found),
        help("run 'scaf part list' to see part ids")
    )]
    PartNotFound(u32),

    #[error("not enough stock for '{name}': {available} available, {requested} requested")]
    #[diagnostic(code(scaf::inventory::insufficient_stock))]
    InsufficientStock {
        part_id: u32,
        name: String,
        available: u32,
        requested: u32,
    },

    #[error("adjusting '{name}' by {delta} would leave negative stock ({current} on hand)")]
    #[diagnostic(code(scaf::inventory::negative_stock))]
    NegativeStock {
        part_id: u32,
        name: String,
        current: u32,
        delta: i64,
    },

    #[error("part name cannot be empty")]
    #[diagnostic(code(scaf::inventory::empty_name))]
    EmptyName,

    #[error("withdrawal quantity must be at least 1")]
    #[diagnostic(code(scaf::inventory::zero_quantity))]
    ZeroQuantity,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PartsFile {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WithdrawalsFile {
    #[serde(default)]
    withdrawals: Vec<Withdrawal>,
}

/// Fields for a new (or restocked) part
#[derive(Debug, Clone, Default)]
pub struct NewPart {
    pub name: String,
    pub description: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub quantity: u32,
    pub weight: Option<f64>,
}

/// Result of [`Inventory::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new part was created
    Created(u32),
    /// An identical article existed and its quantity was increased
    Restocked { id: u32, quantity: u32 },
}

impl AddOutcome {
    pub fn id(&self) -> u32 {
        match self {
            AddOutcome::Created(id) => *id,
            AddOutcome::Restocked { id, .. } => *id,
        }
    }
}

/// Per-category stock summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: Category,
    pub parts: usize,
    pub units: u64,
    pub weight: f64,
}

/// Stock summary across the inventory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockStats {
    pub total_parts: usize,
    pub total_units: u64,
    pub total_weight: f64,
    pub low_stock: usize,
    pub low_stock_threshold: u32,
    pub categories: Vec<CategoryStats>,
}

/// Name grouped under when a withdrawal has no operator
pub const UNKNOWN_OPERATOR: &str = "(unknown)";

/// Withdrawal totals for one operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorStats {
    pub operator: String,
    pub withdrawals: usize,
    pub units: u64,
    pub weight: f64,
}

/// In-memory view of the parts and withdrawal log
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    parts: Vec<Part>,
    withdrawals: Vec<Withdrawal>,
}

impl Inventory {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            parts,
            withdrawals: Vec::new(),
        }
    }

    /// Load parts and withdrawals from a project; missing files are empty
    pub fn load(project: &Project) -> Result<Self, InventoryError> {
        let parts_path = project.parts_path();
        let withdrawals_path = project.withdrawals_path();

        let parts = if parts_path.exists() {
            parse_yaml_file::<Option<PartsFile>>(&parts_path)?
                .unwrap_or_default()
                .parts
        } else {
            Vec::new()
        };
        let withdrawals = if withdrawals_path.exists() {
            parse_yaml_file::<Option<WithdrawalsFile>>(&withdrawals_path)?
                .unwrap_or_default()
                .withdrawals
        } else {
            Vec::new()
        };

        tracing::debug!(
            parts = parts.len(),
            withdrawals = withdrawals.len(),
            "loaded inventory"
        );
        Ok(Self { parts, withdrawals })
    }

    /// Write parts and withdrawals back to the project
    pub fn save(&self, project: &Project) -> Result<(), InventoryError> {
        write_yaml_file(
            &project.parts_path(),
            &PartsFile {
                parts: self.parts.clone(),
            },
        )?;
        write_yaml_file(
            &project.withdrawals_path(),
            &WithdrawalsFile {
                withdrawals: self.withdrawals.clone(),
            },
        )?;
        Ok(())
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn withdrawals(&self) -> &[Withdrawal] {
        &self.withdrawals
    }

    /// Withdrawals recorded against one part
    pub fn withdrawals_for(&self, part_id: u32) -> impl Iterator<Item = &Withdrawal> {
        self.withdrawals.iter().filter(move |w| w.part_id == part_id)
    }

    /// Withdrawals recorded at or after `since`
    pub fn withdrawals_since(&self, since: DateTime<Utc>) -> impl Iterator<Item = &Withdrawal> {
        self.withdrawals.iter().filter(move |w| w.date >= since)
    }

    /// Withdrawal count, units and weight per operator, most units first
    pub fn operator_stats(&self, since: Option<DateTime<Utc>>) -> Vec<OperatorStats> {
        let mut by_operator: BTreeMap<&str, OperatorStats> = BTreeMap::new();
        for w in self
            .withdrawals
            .iter()
            .filter(|w| since.map_or(true, |s| w.date >= s))
        {
            let operator = w.operator.as_deref().unwrap_or(UNKNOWN_OPERATOR);
            let entry = by_operator.entry(operator).or_insert_with(|| OperatorStats {
                operator: operator.to_string(),
                withdrawals: 0,
                units: 0,
                weight: 0.0,
            });
            entry.withdrawals += 1;
            entry.units += w.quantity as u64;
            entry.weight += w.total_weight;
        }

        let mut stats: Vec<OperatorStats> = by_operator.into_values().collect();
        stats.sort_by(|a, b| b.units.cmp(&a.units).then_with(|| a.operator.cmp(&b.operator)));
        stats
    }

    pub fn get(&self, id: u32) -> Result<&Part, InventoryError> {
        self.parts
            .iter()
            .find(|p| p.id == id)
            .ok_or(InventoryError::PartNotFound(id))
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Part, InventoryError> {
        self.parts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(InventoryError::PartNotFound(id))
    }

    fn next_part_id(&self) -> u32 {
        self.parts.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    fn next_withdrawal_id(&self) -> u32 {
        self.withdrawals.iter().map(|w| w.id).max().unwrap_or(0) + 1
    }

    /// Add a part, or restock the existing part with the same name and
    /// dimensions
    pub fn add(&mut self, new: NewPart) -> Result<AddOutcome, InventoryError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(InventoryError::EmptyName);
        }

        if let Some(existing) = self
            .parts
            .iter_mut()
            .find(|p| p.same_article(&name, new.length, new.width, new.height))
        {
            existing.quantity = existing.quantity.saturating_add(new.quantity);
            if new.weight.is_some() {
                existing.weight = new.weight;
            }
            if new.description.is_some() {
                existing.description = new.description;
            }
            tracing::debug!(id = existing.id, quantity = existing.quantity, "restocked part");
            return Ok(AddOutcome::Restocked {
                id: existing.id,
                quantity: existing.quantity,
            });
        }

        let id = self.next_part_id();
        let mut part = Part::new(id, name, new.quantity).with_dimensions(
            new.length,
            new.width,
            new.height,
        );
        part.weight = new.weight;
        part.description = new.description;
        self.parts.push(part);
        tracing::debug!(id, "created part");
        Ok(AddOutcome::Created(id))
    }

    /// Overwrite the on-hand quantity, returning the previous value
    pub fn set_quantity(&mut self, id: u32, quantity: u32) -> Result<u32, InventoryError> {
        let part = self.get_mut(id)?;
        let previous = part.quantity;
        part.quantity = quantity;
        Ok(previous)
    }

    /// Add a signed delta to the on-hand quantity; the result cannot go
    /// below zero
    pub fn adjust(&mut self, id: u32, delta: i64) -> Result<u32, InventoryError> {
        let part = self.get_mut(id)?;
        let updated = part.quantity as i64 + delta;
        if updated < 0 {
            return Err(InventoryError::NegativeStock {
                part_id: id,
                name: part.name.clone(),
                current: part.quantity,
                delta,
            });
        }
        part.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
        Ok(part.quantity)
    }

    /// Remove a part; its withdrawal history is kept
    pub fn remove(&mut self, id: u32) -> Result<Part, InventoryError> {
        let index = self
            .parts
            .iter()
            .position(|p| p.id == id)
            .ok_or(InventoryError::PartNotFound(id))?;
        Ok(self.parts.remove(index))
    }

    /// Withdraw stock from one part and record it
    pub fn withdraw(
        &mut self,
        id: u32,
        quantity: u32,
        operator: Option<String>,
        note: Option<String>,
    ) -> Result<Withdrawal, InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::ZeroQuantity);
        }
        let withdrawal_id = self.next_withdrawal_id();
        let part = self.get_mut(id)?;
        if part.quantity < quantity {
            return Err(InventoryError::InsufficientStock {
                part_id: id,
                name: part.name.clone(),
                available: part.quantity,
                requested: quantity,
            });
        }

        let withdrawal = Withdrawal::new(withdrawal_id, part, quantity, operator).with_note(note);
        part.quantity -= quantity;
        self.withdrawals.push(withdrawal.clone());
        Ok(withdrawal)
    }

    /// Deduct every usage line from stock, one withdrawal per line
    ///
    /// All lines are checked against current stock before anything changes,
    /// so a failure leaves the inventory untouched.
    pub fn apply_allocation(
        &mut self,
        usage: &[UsageLine],
        operator: Option<String>,
    ) -> Result<Vec<Withdrawal>, InventoryError> {
        let mut totals: BTreeMap<u32, u32> = BTreeMap::new();
        for line in usage.iter().filter(|l| l.used > 0) {
            *totals.entry(line.part.id).or_default() += line.used;
        }
        for (&id, &requested) in &totals {
            let part = self.get(id)?;
            if part.quantity < requested {
                return Err(InventoryError::InsufficientStock {
                    part_id: id,
                    name: part.name.clone(),
                    available: part.quantity,
                    requested,
                });
            }
        }

        let mut recorded = Vec::new();
        for line in usage.iter().filter(|l| l.used > 0) {
            let withdrawal = self.withdraw(
                line.part.id,
                line.used,
                operator.clone(),
                Some("scaffold calculation".to_string()),
            )?;
            recorded.push(withdrawal);
        }
        tracing::info!(withdrawals = recorded.len(), "applied allocation to stock");
        Ok(recorded)
    }

    /// Parts at or below the threshold
    pub fn low_stock(&self, threshold: u32) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(move |p| p.quantity <= threshold)
    }

    /// Stock totals overall and per category
    pub fn stats(&self, low_stock_threshold: u32) -> StockStats {
        let mut categories: BTreeMap<Category, CategoryStats> = BTreeMap::new();
        for part in &self.parts {
            let category = part.category();
            let entry = categories.entry(category).or_insert(CategoryStats {
                category,
                parts: 0,
                units: 0,
                weight: 0.0,
            });
            entry.parts += 1;
            entry.units += part.quantity as u64;
            entry.weight += part.weight_for(part.quantity);
        }

        StockStats {
            total_parts: self.parts.len(),
            total_units: self.parts.iter().map(|p| p.quantity as u64).sum(),
            total_weight: self.parts.iter().map(|p| p.weight_for(p.quantity)).sum(),
            low_stock: self.low_stock(low_stock_threshold).count(),
            low_stock_threshold,
            categories: categories.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Inventory {
        Inventory::new(vec![
            Part::new(1, "Poteau 2m", 20)
                .with_dimensions(None, None, Some(2.0))
                .with_weight(19.5),
            Part::new(2, "Moise 2.07m", 5)
                .with_dimensions(Some(2.07), None, None)
                .with_weight(13.5),
            Part::new(3, "Cale bois 50mm", 300).with_weight(0.5),
        ])
    }

    fn usage(part: &Part, used: u32) -> UsageLine {
        UsageLine {
            part: part.clone(),
            category: part.category(),
            used,
            remaining: part.quantity.saturating_sub(used),
        }
    }

    #[test]
    fn test_add_creates_with_next_id() {
        let mut inv = sample();
        let outcome = inv
            .add(NewPart {
                name: "Plinthe alu 2.07m".to_string(),
                length: Some(2.07),
                quantity: 10,
                ..NewPart::default()
            })
            .unwrap();
        assert_eq!(outcome, AddOutcome::Created(4));
        assert_eq!(inv.get(4).unwrap().quantity, 10);
    }

    #[test]
    fn test_add_restocks_same_article() {
        let mut inv = sample();
        let outcome = inv
            .add(NewPart {
                name: "Moise 2.07m".to_string(),
                length: Some(2.07),
                quantity: 7,
                ..NewPart::default()
            })
            .unwrap();
        assert_eq!(outcome, AddOutcome::Restocked { id: 2, quantity: 12 });
        assert_eq!(inv.parts().len(), 3);
    }

    #[test]
    fn test_add_different_dimensions_creates() {
        let mut inv = sample();
        let outcome = inv
            .add(NewPart {
                name: "Moise 2.07m".to_string(),
                length: Some(2.57),
                quantity: 1,
                ..NewPart::default()
            })
            .unwrap();
        assert!(matches!(outcome, AddOutcome::Created(_)));
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let mut inv = sample();
        let err = inv
            .add(NewPart {
                name: "   ".to_string(),
                ..NewPart::default()
            })
            .unwrap_err();
        assert!(matches!(err, InventoryError::EmptyName));
    }

    #[test]
    fn test_adjust() {
        let mut inv = sample();
        assert_eq!(inv.adjust(2, 3).unwrap(), 8);
        assert_eq!(inv.adjust(2, -8).unwrap(), 0);

        let err = inv.adjust(2, -1).unwrap_err();
        assert!(matches!(err, InventoryError::NegativeStock { current: 0, .. }));
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut inv = sample();
        assert_eq!(inv.set_quantity(1, 4).unwrap(), 20);
        assert_eq!(inv.get(1).unwrap().quantity, 4);

        let removed = inv.remove(1).unwrap();
        assert_eq!(removed.name, "Poteau 2m");
        assert!(matches!(inv.get(1), Err(InventoryError::PartNotFound(1))));
    }

    #[test]
    fn test_withdraw_records_weight() {
        let mut inv = sample();
        let w = inv
            .withdraw(1, 4, Some("marc".to_string()), None)
            .unwrap();
        assert_eq!(w.id, 1);
        assert_eq!(w.total_weight, 78.0);
        assert_eq!(w.remaining, 16);
        assert_eq!(inv.get(1).unwrap().quantity, 16);
        assert_eq!(inv.withdrawals_for(1).count(), 1);
    }

    #[test]
    fn test_withdraw_insufficient() {
        let mut inv = sample();
        let err = inv.withdraw(2, 6, None, None).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(inv.get(2).unwrap().quantity, 5);
        assert!(inv.withdrawals().is_empty());
    }

    #[test]
    fn test_withdraw_zero() {
        let mut inv = sample();
        assert!(matches!(
            inv.withdraw(1, 0, None, None),
            Err(InventoryError::ZeroQuantity)
        ));
    }

    #[test]
    fn test_apply_allocation() {
        let mut inv = sample();
        let lines = vec![
            usage(&inv.parts()[0], 12),
            usage(&inv.parts()[1], 0),
            usage(&inv.parts()[2], 8),
        ];
        let recorded = inv.apply_allocation(&lines, None).unwrap();

        assert_eq!(recorded.len(), 2);
        assert_eq!(inv.get(1).unwrap().quantity, 8);
        assert_eq!(inv.get(2).unwrap().quantity, 5);
        assert_eq!(inv.get(3).unwrap().quantity, 292);
    }

    #[test]
    fn test_apply_allocation_is_all_or_nothing() {
        let mut inv = sample();
        let lines = vec![usage(&inv.parts()[0], 10), usage(&inv.parts()[1], 5)];
        inv.set_quantity(2, 1).unwrap();

        let err = inv.apply_allocation(&lines, None).unwrap_err();
        assert!(matches!(err, InventoryError::InsufficientStock { part_id: 2, .. }));
        assert_eq!(inv.get(1).unwrap().quantity, 20);
        assert!(inv.withdrawals().is_empty());
    }

    #[test]
    fn test_stats() {
        let inv = sample();
        let stats = inv.stats(10);

        assert_eq!(stats.total_parts, 3);
        assert_eq!(stats.total_units, 325);
        assert_eq!(stats.low_stock, 1);
        let upright = stats
            .categories
            .iter()
            .find(|c| c.category == Category::Upright)
            .unwrap();
        assert_eq!(upright.units, 20);
        assert_eq!(upright.weight, 390.0);
    }

    #[test]
    fn test_withdrawals_since() {
        let mut inv = sample();
        inv.withdraw(1, 2, None, None).unwrap();
        inv.withdraw(3, 10, None, None).unwrap();
        inv.withdrawals[0].date = Utc::now() - chrono::Duration::days(30);

        let cutoff = Utc::now() - chrono::Duration::days(7);
        let recent: Vec<u32> = inv.withdrawals_since(cutoff).map(|w| w.id).collect();
        assert_eq!(recent, vec![2]);
    }

    #[test]
    fn test_operator_stats() {
        let mut inv = sample();
        inv.withdraw(1, 4, Some("marc".to_string()), None).unwrap();
        inv.withdraw(3, 50, Some("lea".to_string()), None).unwrap();
        inv.withdraw(1, 2, Some("marc".to_string()), None).unwrap();
        inv.withdraw(2, 1, None, None).unwrap();

        let stats = inv.operator_stats(None);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].operator, "lea");
        assert_eq!(stats[0].units, 50);
        assert_eq!(stats[1].operator, "marc");
        assert_eq!(stats[1].withdrawals, 2);
        assert_eq!(stats[1].units, 6);
        assert_eq!(stats[1].weight, 117.0);
        assert_eq!(stats[2].operator, UNKNOWN_OPERATOR);

        inv.withdrawals[1].date = Utc::now() - chrono::Duration::days(30);
        let recent = inv.operator_stats(Some(Utc::now() - chrono::Duration::days(7)));
        assert_eq!(recent[0].operator, "marc");
        assert!(recent.iter().all(|s| s.operator != "lea"));
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        let mut inv = sample();
        inv.withdraw(3, 50, None, Some("site A".to_string())).unwrap();
        inv.save(&project).unwrap();

        let loaded = Inventory::load(&project).unwrap();
        assert_eq!(loaded.parts(), inv.parts());
        assert_eq!(loaded.withdrawals().len(), 1);
        assert_eq!(loaded.withdrawals()[0].note.as_deref(), Some("site A"));
    }

    #[test]
    fn test_load_empty_project() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        let inv = Inventory::load(&project).unwrap();
        assert!(inv.parts().is_empty());
        assert!(inv.withdrawals().is_empty());
    }

    #[test]
    fn test_load_reports_yaml_errors() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        std::fs::write(project.parts_path(), "parts:\n- id: one\n  name: x\n").unwrap();

        let err = Inventory::load(&project).unwrap_err();
        assert!(matches!(err, InventoryError::Yaml(_)));
    }
}
