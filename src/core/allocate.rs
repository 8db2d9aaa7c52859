//! Stock allocation against computed needs
//!
//! The default [`AllocationMode::PerPart`] checks every part independently
//! against the full need of its category: two parts sharing a category are
//! each drawn down by up to the whole need. [`AllocationMode::Cumulative`]
//! instead consumes one category need across its parts, largest stock first.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::core::category::{categorize, Category};
use crate::core::needs::NeedsMap;
use crate::entities::part::Part;

/// How a category need is drawn from stock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationMode {
    #[default]
    PerPart,
    Cumulative,
}

impl std::fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationMode::PerPart => write!(f, "per-part"),
            AllocationMode::Cumulative => write!(f, "cumulative"),
        }
    }
}

impl std::str::FromStr for AllocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "per-part" | "perpart" => Ok(AllocationMode::PerPart),
            "cumulative" => Ok(AllocationMode::Cumulative),
            _ => Err(format!(
                "Invalid allocation mode: {}. Use 'per-part' or 'cumulative'",
                s
            )),
        }
    }
}

/// One part drawn into a calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLine {
    /// Part as it was before allocation
    pub part: Part,
    pub category: Category,
    pub used: u32,
    pub remaining: u32,
}

impl UsageLine {
    fn new(part: &Part, category: Category, used: u32) -> Self {
        Self {
            part: part.clone(),
            category,
            used,
            remaining: part.quantity - used,
        }
    }

    pub fn weight(&self) -> f64 {
        self.part.weight_for(self.used)
    }
}

/// A category whose stock does not cover its need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub category: Category,
    pub needed: u32,
    pub available: u32,

    /// Part checked against the need (per-part mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
}

impl Shortfall {
    pub fn missing(&self) -> u32 {
        self.needed.saturating_sub(self.available)
    }
}

impl std::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.part_name {
            Some(name) => write!(
                f,
                "{} [{}] (needed: {}, available: {})",
                name, self.category, self.needed, self.available
            ),
            None => write!(
                f,
                "{} (needed: {}, available: {}, missing: {})",
                self.category,
                self.needed,
                self.available,
                self.missing()
            ),
        }
    }
}

/// Exported usage row: name, quantity used, dimensions and unit weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub name: String,
    pub used: u32,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

/// Outcome of one allocation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Parts matched to a non-zero need
    pub usage: Vec<UsageLine>,

    /// Inventory with used quantities subtracted
    pub adjusted: Vec<Part>,

    pub shortfalls: Vec<Shortfall>,
}

impl Allocation {
    /// Total weight of all used parts, unknown weights counting as zero
    pub fn total_weight(&self) -> f64 {
        self.usage.iter().map(UsageLine::weight).sum()
    }

    pub fn total_used(&self) -> u64 {
        self.usage.iter().map(|l| l.used as u64).sum()
    }

    /// Units drawn from a given part
    pub fn used_for(&self, part_id: u32) -> u32 {
        self.usage
            .iter()
            .filter(|l| l.part.id == part_id)
            .map(|l| l.used)
            .sum()
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        export_rows(&self.usage)
    }
}

/// Rows for CSV/Markdown export of a usage report
pub fn export_rows(usage: &[UsageLine]) -> Vec<ExportRow> {
    usage
        .iter()
        .map(|l| ExportRow {
            name: l.part.name.clone(),
            used: l.used,
            length: l.part.length,
            width: l.part.width,
            height: l.part.height,
            weight: l.part.weight,
        })
        .collect()
}

/// Allocate needs against inventory using per-part consumption
pub fn allocate(inventory: &[Part], needs: &NeedsMap) -> Allocation {
    allocate_with(inventory, needs, AllocationMode::PerPart)
}

/// Allocate needs against inventory
pub fn allocate_with(inventory: &[Part], needs: &NeedsMap, mode: AllocationMode) -> Allocation {
    let allocation = match mode {
        AllocationMode::PerPart => allocate_per_part(inventory, needs),
        AllocationMode::Cumulative => allocate_cumulative(inventory, needs),
    };
    tracing::debug!(
        %mode,
        lines = allocation.usage.len(),
        shortfalls = allocation.shortfalls.len(),
        "allocated stock"
    );
    allocation
}

fn allocate_per_part(inventory: &[Part], needs: &NeedsMap) -> Allocation {
    let mut allocation = Allocation::default();

    for part in inventory {
        let category = categorize(&part.name);
        let need = needs.get(category);
        if need == 0 {
            allocation.adjusted.push(part.clone());
            continue;
        }

        let used = part.quantity.min(need);
        if part.quantity < need {
            allocation.shortfalls.push(Shortfall {
                category,
                needed: need,
                available: part.quantity,
                part_id: Some(part.id),
                part_name: Some(part.name.clone()),
            });
        }

        allocation.usage.push(UsageLine::new(part, category, used));
        let mut adjusted = part.clone();
        adjusted.quantity -= used;
        allocation.adjusted.push(adjusted);
    }

    allocation
}

fn allocate_cumulative(inventory: &[Part], needs: &NeedsMap) -> Allocation {
    let mut allocation = Allocation::default();
    let mut adjusted: Vec<Part> = inventory.to_vec();
    let categories: Vec<Category> = inventory.iter().map(|p| categorize(&p.name)).collect();

    for category in Category::ALL {
        let need = needs.get(category);
        if need == 0 {
            continue;
        }

        // Largest stock first; parts without a length ahead of sized ones
        let mut candidates: Vec<usize> = (0..inventory.len())
            .filter(|i| categories[*i] == category)
            .collect();
        candidates.sort_by_key(|i| (Reverse(inventory[*i].quantity), inventory[*i].length.is_some()));

        let mut remaining_need = need;
        for idx in candidates {
            if remaining_need == 0 {
                break;
            }
            let part = &inventory[idx];
            let take = part.quantity.min(remaining_need);
            if take == 0 {
                continue;
            }
            allocation.usage.push(UsageLine::new(part, category, take));
            adjusted[idx].quantity -= take;
            remaining_need -= take;
        }

        if remaining_need > 0 {
            allocation.shortfalls.push(Shortfall {
                category,
                needed: need,
                available: need - remaining_need,
                part_id: None,
                part_name: None,
            });
        }
    }

    allocation.adjusted = adjusted;
    allocation
}
