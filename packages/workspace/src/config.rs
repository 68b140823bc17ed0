//! Project configuration (`folio.config.json`)
//!
//! Passed explicitly into [`crate::Project`]; nothing here is read from the
//! environment. Every field has a default, so an absent file or a partial
//! one is fine.

use crate::errors::{ProjectError, ProjectResult};
use folio_editor::SliceBudgets;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "folio.config.json";

/// Generator settings carried for callers that drive the generation loop
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub generator: GeneratorConfig,
    pub slice: SliceBudgets,
    pub snapshot_file: String,
    pub working_file: String,
    pub manifest_file: String,
    pub patch_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            slice: SliceBudgets::default(),
            snapshot_file: "book.xml".to_string(),
            working_file: "current.xml".to_string(),
            manifest_file: "manifest.json".to_string(),
            patch_dir: "patches".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Read `folio.config.json` from `dir`, or defaults if there is none
    pub fn load(dir: &Path) -> ProjectResult<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|source| ProjectError::Config { path, source })
    }

    pub fn save(&self, dir: &Path) -> ProjectResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(CONFIG_FILE), text)?;
        Ok(())
    }

    pub fn snapshot_path(&self, root: &Path) -> PathBuf {
        root.join(&self.snapshot_file)
    }

    pub fn working_path(&self, root: &Path) -> PathBuf {
        root.join(&self.working_file)
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest_file)
    }

    pub fn patch_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.patch_dir)
    }
}
