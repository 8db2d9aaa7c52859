//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::templates::{TemplateError, TemplateGenerator};

/// Marker directory holding project configuration
pub const PROJECT_DIR: &str = ".scaf";

/// Represents a scaffolding stock project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .scaf/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Use an explicit project root if given, otherwise auto-detect
    pub fn locate(explicit: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new project structure at the given path
    ///
    /// With `seed`, the inventory starts with the standard scaffolding
    /// catalogue; otherwise it starts empty.
    pub fn init(path: &Path, seed: bool) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::write_structure(root, seed)
    }

    /// Force initialization even if .scaf/ exists
    ///
    /// Configuration is rewritten; existing inventory files are kept.
    pub fn init_force(path: &Path, seed: bool) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_structure(root, seed)
    }

    fn write_structure(root: PathBuf, seed: bool) -> Result<Self, ProjectError> {
        let project = Self { root };
        let generator = TemplateGenerator::new()?;

        std::fs::create_dir_all(project.scaf_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::create_dir_all(project.inventory_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(project.config_path(), generator.default_config()?)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        if !project.parts_path().exists() {
            let parts = if seed {
                generator.seed_parts()?
            } else {
                "parts: []\n".to_string()
            };
            std::fs::write(project.parts_path(), parts)
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        if !project.withdrawals_path().exists() {
            std::fs::write(project.withdrawals_path(), "withdrawals: []\n")
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(project)
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .scaf configuration directory
    pub fn scaf_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.scaf_dir().join("config.yaml")
    }

    /// Last calculation's usage record
    pub fn usage_path(&self) -> PathBuf {
        self.scaf_dir().join("usage.yaml")
    }

    pub fn inventory_dir(&self) -> PathBuf {
        self.root.join("inventory")
    }

    pub fn parts_path(&self) -> PathBuf {
        self.inventory_dir().join("parts.yaml")
    }

    pub fn withdrawals_path(&self) -> PathBuf {
        self.inventory_dir().join("withdrawals.yaml")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a scaf project (searched from {searched_from:?}). Run 'scaf init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("scaf project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}
