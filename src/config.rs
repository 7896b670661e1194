//! Tunable defaults, persisted as TOML.
//!
//! Every key is optional; a missing section or key falls back to the
//! classroom defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, TutorResult};

/// Defaults substituted by the physics builders when extraction comes up
/// short.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// m/s², used unless the problem states `g`.
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// kg.
    #[serde(default = "default_mass")]
    pub default_mass: f64,
    /// Degrees.
    #[serde(default = "default_incline_angle")]
    pub default_incline_angle: f64,
    /// Used when a problem mentions friction without a coefficient.
    #[serde(default = "default_friction_coefficient")]
    pub default_friction_coefficient: f64,
    /// m/s, for projectile problems with no stated speed.
    #[serde(default = "default_launch_velocity")]
    pub default_launch_velocity: f64,
    /// Degrees, for projectile problems with no stated angle.
    #[serde(default = "default_launch_angle")]
    pub default_launch_angle: f64,
}

fn default_gravity() -> f64 {
    10.0
}
fn default_mass() -> f64 {
    5.0
}
fn default_incline_angle() -> f64 {
    30.0
}
fn default_friction_coefficient() -> f64 {
    0.3
}
fn default_launch_velocity() -> f64 {
    20.0
}
fn default_launch_angle() -> f64 {
    45.0
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            default_mass: default_mass(),
            default_incline_angle: default_incline_angle(),
            default_friction_coefficient: default_friction_coefficient(),
            default_launch_velocity: default_launch_velocity(),
            default_launch_angle: default_launch_angle(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiologyConfig {
    /// Longest DNA strand drawn; longer sequences are truncated.
    #[serde(default = "default_max_base_pairs")]
    pub max_base_pairs: usize,
    /// Strand drawn when the problem does not spell one out.
    #[serde(default = "default_dna_strand")]
    pub default_dna_strand: String,
}

fn default_max_base_pairs() -> usize {
    12
}
fn default_dna_strand() -> String {
    "ATGCGTAC".into()
}

impl Default for BiologyConfig {
    fn default() -> Self {
        Self {
            max_base_pairs: default_max_base_pairs(),
            default_dna_strand: default_dna_strand(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Rebuild a division diagram from ASCII layouts in tutor messages.
    #[serde(default = "default_true")]
    pub rescue_enabled: bool,
    /// Raise an external diagram's `visibleStep` when it lags behind the
    /// step the previous turn implies.
    #[serde(default)]
    pub enforce_monotonic_steps: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            rescue_enabled: true,
            enforce_monotonic_steps: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub biology: BiologyConfig,
    #[serde(default)]
    pub evolution: EvolutionConfig,
}

impl TutorConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> TutorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })?;
        Ok(config)
    }

    /// Parse from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> TutorResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }
}
