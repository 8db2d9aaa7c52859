//! Scaffolding needs calculator
//!
//! Turns a requested height/length/width into per-category part quantities.
//! Quantities follow a "never under-provision" policy: any fractional
//! intermediate is rounded up.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::category::Category;
use crate::core::segment::{segment_with, SegmentError, SegmentStrategy};

/// Default height of one scaffold level, in meters
pub const DEFAULT_LEVEL_HEIGHT: f64 = 2.0;

/// Default standard ledger (bay) lengths, in meters
pub const DEFAULT_SEGMENT_LENGTHS: [f64; 6] = [0.75, 1.0, 1.5, 2.0, 2.5, 3.0];

/// Default standard deck widths, in meters
pub const DEFAULT_DECK_WIDTHS: [f64; 3] = [0.75, 1.0, 1.5];

/// Errors raised by the needs calculator
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("invalid {field}: {value} (enter a positive height, length and width in meters)")]
    InvalidGeometry { field: &'static str, value: f64 },

    #[error("no standard segment lengths configured (check `segment_lengths`)")]
    EmptyAvailableLengths,

    #[error("no standard deck widths configured (check `deck_widths`)")]
    EmptyAvailableWidths,

    #[error("invalid standard level height: {0} (must be a positive number)")]
    InvalidLevelHeight(f64),

    #[error("invalid standard dimension: {0} (must be a positive number)")]
    InvalidStandardDimension(f64),

    #[error("{what} count is too large for this request (reduce the height or length)")]
    QuantityOverflow { what: &'static str },
}

impl From<SegmentError> for CalcError {
    fn from(err: SegmentError) -> Self {
        match err {
            SegmentError::EmptyLengths => CalcError::EmptyAvailableLengths,
            SegmentError::InvalidLength(v) => CalcError::InvalidStandardDimension(v),
            SegmentError::InvalidTarget(v) => CalcError::InvalidGeometry {
                field: "length",
                value: v,
            },
        }
    }
}

/// Requested scaffold envelope, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryRequest {
    pub height: f64,
    pub length: f64,
    pub width: f64,
}

impl GeometryRequest {
    /// Build a request, rejecting missing or non-positive values
    pub fn new(height: f64, length: f64, width: f64) -> Result<Self, CalcError> {
        let request = Self {
            height,
            length,
            width,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), CalcError> {
        for (field, value) in [
            ("height", self.height),
            ("length", self.length),
            ("width", self.width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::InvalidGeometry { field, value });
            }
        }
        Ok(())
    }
}

/// Standard dimension tables the calculator works against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDimensions {
    pub standard_level_height: f64,
    pub segment_lengths: Vec<f64>,
    pub deck_widths: Vec<f64>,
    #[serde(default)]
    pub segment_strategy: SegmentStrategy,
}

impl Default for StandardDimensions {
    fn default() -> Self {
        Self {
            standard_level_height: DEFAULT_LEVEL_HEIGHT,
            segment_lengths: DEFAULT_SEGMENT_LENGTHS.to_vec(),
            deck_widths: DEFAULT_DECK_WIDTHS.to_vec(),
            segment_strategy: SegmentStrategy::default(),
        }
    }
}

impl StandardDimensions {
    /// Check the tables are usable; failures are configuration defects
    pub fn validate(&self) -> Result<(), CalcError> {
        if !self.standard_level_height.is_finite() || self.standard_level_height <= 0.0 {
            return Err(CalcError::InvalidLevelHeight(self.standard_level_height));
        }
        if self.segment_lengths.is_empty() {
            return Err(CalcError::EmptyAvailableLengths);
        }
        if self.deck_widths.is_empty() {
            return Err(CalcError::EmptyAvailableWidths);
        }
        if let Some(bad) = self
            .segment_lengths
            .iter()
            .chain(self.deck_widths.iter())
            .find(|v| !v.is_finite() || **v <= 0.0)
        {
            return Err(CalcError::InvalidStandardDimension(*bad));
        }
        Ok(())
    }

    /// Standard deck width for a requested width
    ///
    /// Exact match, else the largest standard width not above the request,
    /// else the requested width itself.
    pub fn choose_deck_width(&self, width: f64) -> f64 {
        if let Some(exact) = self.deck_widths.iter().find(|d| (**d - width).abs() < 1e-9) {
            return *exact;
        }
        self.deck_widths
            .iter()
            .copied()
            .filter(|d| *d <= width)
            .max_by(|a, b| a.total_cmp(b))
            .unwrap_or(width)
    }
}

/// Required quantity per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeedsMap(BTreeMap<Category, u32>);

impl NeedsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: Category, quantity: u32) {
        self.0.insert(category, quantity);
    }

    /// Need for a category, zero when absent
    pub fn get(&self, category: Category) -> u32 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        self.0.iter().map(|(c, q)| (*c, *q))
    }

    /// Total number of parts across all categories
    pub fn total(&self) -> u64 {
        self.0.values().map(|q| *q as u64).sum()
    }
}

impl FromIterator<(Category, u32)> for NeedsMap {
    fn from_iter<T: IntoIterator<Item = (Category, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Geometry derived while computing needs, kept for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsMeta {
    /// Number of scaffold levels
    pub levels: u32,

    /// Bay lengths along the run
    pub segments: Vec<f64>,

    /// Number of frames (bays + 1)
    pub frame_count: u32,

    /// Deck width used for the platforms
    pub deck_width: f64,

    /// Set when the segment cap cut the run short
    #[serde(default)]
    pub truncated: bool,
}

impl NeedsMeta {
    pub fn segment_count(&self) -> u32 {
        self.segments.len() as u32
    }
}

/// Multiply factors into a part count, failing instead of wrapping
fn quantity(what: &'static str, factors: &[u32]) -> Result<u32, CalcError> {
    factors
        .iter()
        .try_fold(1u64, |acc, f| acc.checked_mul(u64::from(*f)))
        .and_then(|q| u32::try_from(q).ok())
        .ok_or(CalcError::QuantityOverflow { what })
}

/// Compute per-category needs for a scaffold envelope
pub fn compute_needs(
    geometry: &GeometryRequest,
    dimensions: &StandardDimensions,
) -> Result<(NeedsMap, NeedsMeta), CalcError> {
    geometry.validate()?;
    dimensions.validate()?;

    let raw_levels = (geometry.height / dimensions.standard_level_height).ceil();
    if raw_levels > u32::MAX as f64 {
        return Err(CalcError::QuantityOverflow { what: "level" });
    }
    let levels = raw_levels as u32;
    let segmentation = segment_with(
        geometry.length,
        &dimensions.segment_lengths,
        dimensions.segment_strategy,
    )?;
    let segment_count = segmentation.count() as u32;
    let frame_count = segment_count + 1;
    let deck_width = dimensions.choose_deck_width(geometry.width);

    let platforms = quantity("platform", &[segment_count, levels])?;
    let needs: NeedsMap = [
        (Category::BaseJack, quantity("base jack", &[frame_count, 2])?),
        (Category::Shim, quantity("shim", &[frame_count, 2])?),
        (Category::Upright, quantity("upright", &[frame_count, 2, levels])?),
        (Category::Ledger, quantity("ledger", &[segment_count, 2, levels])?),
        (Category::Transom, quantity("transom", &[segment_count, levels])?),
        (Category::Brace, quantity("brace", &[segment_count.div_ceil(2), levels])?),
        (Category::Platform, platforms),
        (Category::ToeBoard, platforms),
        (Category::Guardrail, quantity("guardrail", &[segment_count, levels, 2])?),
    ]
    .into_iter()
    .collect();

    tracing::debug!(
        levels,
        segments = segment_count,
        frames = frame_count,
        deck_width,
        "computed scaffold needs"
    );

    let meta = NeedsMeta {
        levels,
        segments: segmentation.segments,
        frame_count,
        deck_width,
        truncated: segmentation.truncated,
    };
    Ok((needs, meta))
}
