use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    #[serde(default = "FieldConfig::default_width")]
    pub width: f32,
    #[serde(default = "FieldConfig::default_height")]
    pub height: f32,
    #[serde(default = "FieldConfig::default_wall_thickness")]
    pub wall_thickness: f32,
}

impl FieldConfig {
    const fn default_width() -> f32 {
        1280.0
    }

    const fn default_height() -> f32 {
        720.0
    }

    const fn default_wall_thickness() -> f32 {
        48.0
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            wall_thickness: Self::default_wall_thickness(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysicsConfig {
    /// World gravity. The field is top-down, so the default is zero.
    #[serde(default)]
    pub gravity: [f32; 2],
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { gravity: [0.0, 0.0] }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SandboxConfig {
    /// Operation budget for one script invocation. A script that exhausts
    /// it fails with a runtime error instead of stalling the tick.
    #[serde(default = "SandboxConfig::default_max_operations")]
    pub max_operations: u64,
}

impl SandboxConfig {
    const fn default_max_operations() -> u64 {
        500_000
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self { max_operations: Self::default_max_operations() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneryConfig {
    #[serde(default = "SceneryConfig::default_count")]
    pub count: u32,
    #[serde(default = "SceneryConfig::default_half_extent")]
    pub half_extent: f32,
}

impl SceneryConfig {
    const fn default_count() -> u32 {
        24
    }

    const fn default_half_extent() -> f32 {
        14.0
    }
}

impl Default for SceneryConfig {
    fn default() -> Self {
        Self { count: Self::default_count(), half_extent: Self::default_half_extent() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SimConfig {
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub scenery: SceneryConfig,
}

impl SimConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }
}
