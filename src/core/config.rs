//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::allocate::AllocationMode;
use crate::core::needs::StandardDimensions;
use crate::core::segment::SegmentStrategy;
use crate::core::Project;
use crate::templates::DEFAULT_LOW_STOCK_THRESHOLD;

/// scaf configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name recorded on withdrawals
    pub operator: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Height of one scaffold level in meters
    pub standard_level_height: Option<f64>,

    /// Panel lengths available to cover a run
    pub segment_lengths: Option<Vec<f64>>,

    /// Deck widths in stock
    pub deck_widths: Option<Vec<f64>>,

    /// Quantity at or below which a part counts as low stock
    pub low_stock_threshold: Option<u32>,

    pub segment_strategy: Option<SegmentStrategy>,

    pub allocation_mode: Option<AllocationMode>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the getters)

        // 2. Global user config (~/.config/scaf/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.scaf/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(operator) = std::env::var("SCAF_OPERATOR") {
            config.operator = Some(operator);
        }
        if let Ok(format) = std::env::var("SCAF_FORMAT") {
            config.default_format = Some(format);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config file");
                return None;
            }
        };
        match serde_yml::from_str::<Option<Config>>(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "scaf")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.operator.is_some() {
            self.operator = other.operator;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.standard_level_height.is_some() {
            self.standard_level_height = other.standard_level_height;
        }
        if other.segment_lengths.is_some() {
            self.segment_lengths = other.segment_lengths;
        }
        if other.deck_widths.is_some() {
            self.deck_widths = other.deck_widths;
        }
        if other.low_stock_threshold.is_some() {
            self.low_stock_threshold = other.low_stock_threshold;
        }
        if other.segment_strategy.is_some() {
            self.segment_strategy = other.segment_strategy;
        }
        if other.allocation_mode.is_some() {
            self.allocation_mode = other.allocation_mode;
        }
    }

    /// Get the operator name, falling back to the login name
    pub fn operator(&self) -> Option<String> {
        self.operator
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
    }

    /// Standard dimensions for the needs calculator
    pub fn dimensions(&self) -> StandardDimensions {
        let defaults = StandardDimensions::default();
        StandardDimensions {
            standard_level_height: self
                .standard_level_height
                .unwrap_or(defaults.standard_level_height),
            segment_lengths: self
                .segment_lengths
                .clone()
                .unwrap_or(defaults.segment_lengths),
            deck_widths: self.deck_widths.clone().unwrap_or(defaults.deck_widths),
            segment_strategy: self.segment_strategy.unwrap_or(defaults.segment_strategy),
        }
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
    }

    pub fn allocation_mode(&self) -> AllocationMode {
        self.allocation_mode.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let dims = config.dimensions();
        assert_eq!(dims.standard_level_height, 2.0);
        assert_eq!(dims.segment_lengths, vec![0.75, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(config.low_stock_threshold(), 10);
        assert_eq!(config.allocation_mode(), AllocationMode::PerPart);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            standard_level_height: Some(2.0),
            low_stock_threshold: Some(5),
            ..Config::default()
        };
        base.merge(Config {
            standard_level_height: Some(1.5),
            segment_strategy: Some(SegmentStrategy::MinPieces),
            ..Config::default()
        });

        assert_eq!(base.standard_level_height, Some(1.5));
        assert_eq!(base.low_stock_threshold, Some(5));
        assert_eq!(base.dimensions().segment_strategy, SegmentStrategy::MinPieces);
    }

    #[test]
    fn test_read_project_config() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        std::fs::write(
            project.config_path(),
            "standard_level_height: 1.8\nsegment_lengths: [1.0, 2.0]\nallocation_mode: cumulative\n",
        )
        .unwrap();

        let config = Config::read_file(&project.config_path()).unwrap();
        assert_eq!(config.standard_level_height, Some(1.8));
        assert_eq!(config.segment_lengths, Some(vec![1.0, 2.0]));
        assert_eq!(config.allocation_mode(), AllocationMode::Cumulative);
    }

    #[test]
    fn test_rendered_config_round_trips() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        let config = Config::read_file(&project.config_path()).unwrap();
        assert_eq!(config.low_stock_threshold, Some(10));
        assert_eq!(config.deck_widths, Some(vec![0.75, 1.0, 1.5]));
        assert_eq!(config.segment_strategy, Some(SegmentStrategy::Greedy));
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "low_stock_threshold: [not, a, number]\n").unwrap();
        assert!(Config::read_file(&path).is_none());
    }
}
