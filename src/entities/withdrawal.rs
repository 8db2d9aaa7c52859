//! Withdrawal entity type - stock removed from the inventory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::part::Part;

/// A recorded stock withdrawal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Sequential withdrawal number
    pub id: u32,

    /// Withdrawn part
    pub part_id: u32,

    /// Part name at the time of withdrawal
    pub part_name: String,

    /// Units withdrawn
    pub quantity: u32,

    /// Total weight in kilograms (quantity x unit weight)
    pub total_weight: f64,

    /// Stock left after the withdrawal
    pub remaining: u32,

    /// When the withdrawal was recorded
    pub date: DateTime<Utc>,

    /// Who recorded it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Withdrawal {
    /// Build a withdrawal for `quantity` units of `part`
    ///
    /// `part` is the state before the withdrawal; the caller checks stock.
    pub fn new(id: u32, part: &Part, quantity: u32, operator: Option<String>) -> Self {
        Self {
            id,
            part_id: part.id,
            part_name: part.name.clone(),
            quantity,
            total_weight: part.weight_for(quantity),
            remaining: part.quantity.saturating_sub(quantity),
            date: Utc::now(),
            operator,
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}
