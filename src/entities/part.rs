//! Part entity type - a stocked scaffolding article

use serde::{Deserialize, Serialize};

use crate::core::category::{categorize, Category};

/// A stocked part (article) with its on-hand quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Unique identifier within the inventory
    pub id: u32,

    /// Part name, used for categorization
    pub name: String,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Length in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Width in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Height in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    /// Quantity on hand
    #[serde(default)]
    pub quantity: u32,

    /// Weight per unit in kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Part {
    /// Create a part with no dimensions or weight
    pub fn new(id: u32, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            length: None,
            width: None,
            height: None,
            quantity,
            weight: None,
        }
    }

    pub fn with_dimensions(
        mut self,
        length: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Self {
        self.length = length;
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Category derived from the part name
    pub fn category(&self) -> Category {
        categorize(&self.name)
    }

    /// Weight of `quantity` units, unknown weight counting as zero
    pub fn weight_for(&self, quantity: u32) -> f64 {
        self.weight.unwrap_or(0.0) * quantity as f64
    }

    /// Whether name and all three dimensions match another article
    pub fn same_article(
        &self,
        name: &str,
        length: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    ) -> bool {
        self.name == name
            && same_dimension(self.length, length)
            && same_dimension(self.width, width)
            && same_dimension(self.height, height)
    }

    /// Case-insensitive search over name and description
    pub fn matches_search(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_ref()
                .map_or(false, |d| d.to_lowercase().contains(&needle))
    }
}

fn same_dimension(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => (x - y).abs() < 1e-9,
        _ => false,
    }
}
