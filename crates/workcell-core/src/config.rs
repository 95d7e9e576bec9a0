//! Layout configuration loaded from RON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::AssetLibrary;
use crate::dimensions::DimensionSet;
use crate::error::LayoutError;
use crate::scene::{CellPlacement, HumanPlan, Scene, SceneOptions, assemble_scene};
use crate::workcell::WorkcellConfig;

/// Configuration format version written by this crate
pub const CURRENT_VERSION: u32 = 1;

/// Configuration error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(String),
    /// Malformed RON or an unknown value
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Complete description of a facility build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub dimensions: DimensionSet,
    #[serde(default = "default_cells")]
    pub cells: Vec<CellPlacement>,
    #[serde(default)]
    pub humans: HumanPlan,
    #[serde(default)]
    pub assets: AssetLibrary,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            dimensions: DimensionSet::default(),
            cells: default_cells(),
            humans: HumanPlan::default(),
            assets: AssetLibrary::default(),
        }
    }
}

/// Two cells five metres apart with a walkway between them
fn default_cells() -> Vec<CellPlacement> {
    vec![
        CellPlacement::new([-2.5, 0.0, 0.0], 1, WorkcellConfig::Mixed),
        CellPlacement::new([2.5, 0.0, 0.0], 2, WorkcellConfig::AllSuspended),
    ]
}

impl LayoutConfig {
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.version > CURRENT_VERSION {
            tracing::warn!(
                "Config version {} is newer than supported version {}",
                config.version,
                CURRENT_VERSION
            );
        }
        Ok(config)
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn to_ron_pretty(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save the configuration to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = self.to_ron_pretty()?;
        std::fs::write(path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            dimensions: self.dimensions.clone(),
            humans: self.humans.clone(),
        }
    }

    /// Build the scene this configuration describes
    pub fn assemble(&self) -> Result<Scene, ConfigError> {
        Ok(assemble_scene(&self.cells, &self.scene_options())?)
    }
}
