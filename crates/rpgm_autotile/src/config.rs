//! Decomposition settings, loadable from TOML

use rpgm_autotile_rules::ColliderHint;
use serde::{Deserialize, Serialize};

use crate::decompose::validate_source;
use crate::{AutotileError, Convention};

/// Settings for one autotile decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Name given to the generated rule set
    pub name: String,
    pub convention: Convention,
    /// Cell edge in pixels; inferred from the source width when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_size: Option<u32>,
    /// Horizontal animation frames in the source
    pub frame_count: u32,
    /// Frames per second for animated rules
    pub animation_speed: f32,
    pub collider: ColliderHint,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            name: "autotile".to_string(),
            convention: Convention::Xp,
            cell_size: None,
            frame_count: 1,
            animation_speed: 1.0,
            collider: ColliderHint::Sprite,
        }
    }
}

impl DecomposeConfig {
    pub fn new(convention: Convention) -> Self {
        Self {
            convention,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Animated source with `frame_count` frames played at `animation_speed`
    pub fn with_frames(mut self, frame_count: u32, animation_speed: f32) -> Self {
        self.frame_count = frame_count;
        self.animation_speed = animation_speed;
        self
    }

    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = Some(cell_size);
        self
    }

    pub fn with_collider(mut self, collider: ColliderHint) -> Self {
        self.collider = collider;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, AutotileError> {
        let config: DecomposeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, AutotileError> {
        Ok(toml::to_string(self)?)
    }

    /// Check the settings that do not depend on a source image
    pub fn validate(&self) -> Result<(), AutotileError> {
        if self.frame_count == 0 {
            return Err(AutotileError::Config(
                "frame_count must be at least 1".to_string(),
            ));
        }
        if !self.animation_speed.is_finite() || self.animation_speed <= 0.0 {
            return Err(AutotileError::Config(format!(
                "animation_speed must be positive, got {}",
                self.animation_speed
            )));
        }
        if let Some(cell_size) = self.cell_size {
            if cell_size == 0 || cell_size % 2 != 0 {
                return Err(AutotileError::Config(format!(
                    "cell_size must be even and positive, got {cell_size}"
                )));
            }
        }
        Ok(())
    }

    /// Cell size to use for a `width` x `height` source.
    ///
    /// An explicit `cell_size` is checked against the source; otherwise the
    /// size is inferred from the width. Either way the source must divide
    /// exactly into frames of the configured convention.
    pub fn resolved_cell_size(&self, width: u32, height: u32) -> Result<u32, AutotileError> {
        match self.cell_size {
            Some(cell_size) => {
                validate_source(width, height, cell_size, self.frame_count, self.convention)?;
                Ok(cell_size)
            }
            None => self
                .convention
                .infer_cell_size(width, height, self.frame_count)
                .ok_or_else(|| {
                    let (columns, _) = self.convention.frame_grid();
                    AutotileError::InvalidSourceDimensions {
                        width,
                        height,
                        frame_count: self.frame_count,
                        cell_size: width / columns.saturating_mul(self.frame_count).max(1),
                        convention: self.convention,
                    }
                }),
        }
    }
}
