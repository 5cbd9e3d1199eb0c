use serde::{Deserialize, Serialize};

use crate::constants::PhysicsConfig;
use crate::cushion::CushionModel;
use crate::layout::LayoutKind;

/// Default simulation step: 512 ticks per second.
pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 512.0;
/// Default cap on discarded resolution passes within one `advance`.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: u32 = 100;

const DEFAULT_CONFIG_PATH: &str = "config/baize.toml";

/// Everything needed to build a table, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub cushion_model: CushionModel,
    pub layout: LayoutKind,
    pub fixed_step: f64,
    pub max_resolution_depth: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            cushion_model: CushionModel::default(),
            layout: LayoutKind::default(),
            fixed_step: DEFAULT_FIXED_STEP,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

impl SimConfig {
    /// Load config from the file named by `BAIZE_SIM_CONFIG`, else
    /// `config/baize.toml`, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("BAIZE_SIM_CONFIG")
            && let Some(config) = Self::read_file(&path)
        {
            return config;
        }
        Self::read_file(DEFAULT_CONFIG_PATH).unwrap_or_default()
    }

    fn read_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match Self::from_toml_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded simulation config from {path}");
                Some(config)
            },
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                None
            },
        }
    }

    /// Parse a TOML document and sanitize out-of-range values.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        config.sanitize();
        Ok(config)
    }

    fn sanitize(&mut self) {
        if self.fixed_step.is_nan() || self.fixed_step <= 0.0 {
            tracing::warn!(
                fixed_step = self.fixed_step,
                "fixed_step must be > 0, using default"
            );
            self.fixed_step = DEFAULT_FIXED_STEP;
        }
        if self.max_resolution_depth == 0 {
            tracing::warn!("max_resolution_depth must be > 0, using default");
            self.max_resolution_depth = DEFAULT_MAX_RESOLUTION_DEPTH;
        }
    }
}
