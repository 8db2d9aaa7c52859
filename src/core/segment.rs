//! Run-length segmentation into standard bay lengths
//!
//! A scaffold run of length L is split into bays (travées), each bay using one
//! of the standard ledger lengths. Two strategies are available:
//!
//! - [`SegmentStrategy::Greedy`]: largest length that still fits, falling back
//!   to the smallest length when nothing fits (the last bay may overshoot).
//! - [`SegmentStrategy::MinPieces`]: exact minimum-piece combination at
//!   centimetre resolution, then least overshoot, then greedy. Runs whose
//!   search table would exceed 1 km of grid fall back to greedy.
//!
//! Both stop after [`MAX_SEGMENTS`] bays and flag the result as truncated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on the number of bays in one segmentation
pub const MAX_SEGMENTS: usize = 2000;

/// Remaining length below which a run counts as covered
pub const REMAINING_EPSILON: f64 = 1e-6;

/// Slack allowed when testing whether a length fits the remainder
pub const FIT_EPSILON: f64 = 1e-9;

/// Grid used by the coin-change search (centimetres)
const RESOLUTION: f64 = 100.0;

/// Largest table the coin-change search may build (1 km at 1 cm)
const MAX_GRID_CELLS: usize = 100_000;

/// How a run length is partitioned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentStrategy {
    #[default]
    Greedy,
    MinPieces,
}

impl std::fmt::Display for SegmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentStrategy::Greedy => write!(f, "greedy"),
            SegmentStrategy::MinPieces => write!(f, "min-pieces"),
        }
    }
}

impl std::str::FromStr for SegmentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "greedy" => Ok(SegmentStrategy::Greedy),
            "min-pieces" | "minpieces" => Ok(SegmentStrategy::MinPieces),
            _ => Err(format!(
                "Invalid segment strategy: {}. Use 'greedy' or 'min-pieces'",
                s
            )),
        }
    }
}

/// Result of partitioning a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Chosen bay lengths, in placement order
    pub segments: Vec<f64>,

    /// True when the segment cap stopped the partition early
    #[serde(default)]
    pub truncated: bool,
}

impl Segmentation {
    pub fn count(&self) -> usize {
        self.segments.len()
    }

    /// Sum of all bay lengths
    pub fn total(&self) -> f64 {
        self.segments.iter().sum()
    }
}

/// Errors raised for unusable segmentation inputs
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SegmentError {
    #[error("no standard segment lengths available")]
    EmptyLengths,

    #[error("invalid standard segment length: {0} (must be a positive number)")]
    InvalidLength(f64),

    #[error("invalid run length: {0} (must be a positive number)")]
    InvalidTarget(f64),
}

/// Partition `target` using the greedy strategy
pub fn segment(target: f64, available: &[f64]) -> Result<Segmentation, SegmentError> {
    segment_with(target, available, SegmentStrategy::Greedy)
}

/// Partition `target` into standard lengths using `strategy`
pub fn segment_with(
    target: f64,
    available: &[f64],
    strategy: SegmentStrategy,
) -> Result<Segmentation, SegmentError> {
    let sorted = sorted_lengths(available)?;
    if !target.is_finite() || target <= 0.0 {
        return Err(SegmentError::InvalidTarget(target));
    }

    let result = match strategy {
        SegmentStrategy::Greedy => greedy(target, &sorted),
        SegmentStrategy::MinPieces => min_pieces(target, &sorted),
    };

    if result.truncated {
        tracing::warn!(
            run_length = target,
            segments = result.count(),
            "segment cap reached, run only partially covered"
        );
    }
    tracing::debug!(run_length = target, %strategy, segments = ?result.segments, "segmented run");

    Ok(result)
}

/// Validate and sort lengths descending
fn sorted_lengths(available: &[f64]) -> Result<Vec<f64>, SegmentError> {
    if available.is_empty() {
        return Err(SegmentError::EmptyLengths);
    }
    if let Some(bad) = available.iter().find(|l| !l.is_finite() || **l <= 0.0) {
        return Err(SegmentError::InvalidLength(*bad));
    }
    let mut sorted = available.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    Ok(sorted)
}

/// Largest length that fits `remaining`, or the smallest one
fn pick_greedy(remaining: f64, sorted: &[f64]) -> f64 {
    sorted
        .iter()
        .copied()
        .find(|m| *m <= remaining + FIT_EPSILON)
        .unwrap_or(sorted[sorted.len() - 1])
}

fn greedy(target: f64, sorted: &[f64]) -> Segmentation {
    let mut remaining = target;
    let mut segments = Vec::new();

    while remaining > REMAINING_EPSILON {
        if segments.len() >= MAX_SEGMENTS {
            return Segmentation {
                segments,
                truncated: true,
            };
        }
        let choice = pick_greedy(remaining, sorted);
        segments.push(choice);
        remaining -= choice;
    }

    Segmentation {
        segments,
        truncated: false,
    }
}

fn min_pieces(target: f64, sorted: &[f64]) -> Segmentation {
    let largest = sorted[0];
    let mut remaining = target;
    let mut segments = Vec::new();

    while remaining > REMAINING_EPSILON {
        if segments.len() >= MAX_SEGMENTS {
            return Segmentation {
                segments,
                truncated: true,
            };
        }

        if remaining <= largest && to_grid(remaining + largest) <= MAX_GRID_CELLS {
            let covers = |combo: &Vec<f64>| {
                !combo.is_empty() && combo.iter().sum::<f64>() >= remaining - REMAINING_EPSILON
            };
            let combo = coin_change_exact(remaining, sorted)
                .filter(covers)
                .or_else(|| coin_change_min_over(remaining, sorted, largest).filter(covers));
            if let Some(combo) = combo {
                let room = MAX_SEGMENTS - segments.len();
                let truncated = combo.len() > room;
                segments.extend(combo.into_iter().take(room));
                return Segmentation {
                    segments,
                    truncated,
                };
            }
        }

        let choice = pick_greedy(remaining, sorted);
        segments.push(choice);
        remaining = (remaining - choice).max(0.0);
    }

    Segmentation {
        segments,
        truncated: false,
    }
}

fn to_grid(x: f64) -> usize {
    (x * RESOLUTION).round().max(0.0) as usize
}

/// Grid units needed to reach `x`; never rounds a run down
fn to_grid_ceil(x: f64) -> usize {
    (x * RESOLUTION - REMAINING_EPSILON).ceil().max(0.0) as usize
}

/// Minimum-count table over `0..=limit` grid units
///
/// Returns per-amount piece counts and the index of the last piece used.
fn coin_table(limit: usize, coins: &[usize]) -> (Vec<usize>, Vec<Option<usize>>) {
    let mut count = vec![usize::MAX; limit + 1];
    let mut parent = vec![None; limit + 1];
    count[0] = 0;
    for amount in 1..=limit {
        for (idx, &coin) in coins.iter().enumerate() {
            if coin == 0 || coin > amount || count[amount - coin] == usize::MAX {
                continue;
            }
            if count[amount - coin] + 1 < count[amount] {
                count[amount] = count[amount - coin] + 1;
                parent[amount] = Some(idx);
            }
        }
    }
    (count, parent)
}

fn rebuild(mut amount: usize, coins: &[usize], pieces: &[f64], parent: &[Option<usize>]) -> Vec<f64> {
    let mut out = Vec::new();
    while amount > 0 {
        match parent[amount] {
            Some(idx) => {
                out.push(pieces[idx]);
                amount -= coins[idx];
            }
            None => break,
        }
    }
    out
}

/// Fewest pieces summing exactly to `target` on the centimetre grid
fn coin_change_exact(target: f64, pieces: &[f64]) -> Option<Vec<f64>> {
    let goal = to_grid_ceil(target);
    let coins: Vec<usize> = pieces.iter().map(|p| to_grid(*p)).collect();
    let (count, parent) = coin_table(goal, &coins);
    if count[goal] == usize::MAX {
        return None;
    }
    Some(rebuild(goal, &coins, pieces, &parent))
}

/// Combination reaching at least `target` with the least overshoot
/// (bounded by `max_over`), ties broken by fewest pieces
fn coin_change_min_over(target: f64, pieces: &[f64], max_over: f64) -> Option<Vec<f64>> {
    let goal = to_grid_ceil(target);
    let limit = to_grid(target + max_over);
    let coins: Vec<usize> = pieces.iter().map(|p| to_grid(*p)).collect();
    let (count, parent) = coin_table(limit, &coins);

    let best = (goal..=limit)
        .filter(|amount| count[*amount] != usize::MAX)
        .min_by_key(|amount| (amount - goal, count[*amount]))?;
    Some(rebuild(best, &coins, pieces, &parent))
}
