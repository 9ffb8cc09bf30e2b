//! Derby configuration.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! overrides:
//!
//! ```
//! use derby_core::config::DerbyConfig;
//!
//! let config = DerbyConfig::from_json(r#"{ "seed": 7, "pairing": "unordered" }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.width, 800.0);
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::PairingMode;
use crate::entity::VehicleKind;
use crate::error::{DerbyError, Result};
use crate::render::Easing;

/// Rendered sprite size of each vehicle kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSizes {
    /// Sedan size.
    pub sedan: Vec2,
    /// Police car size.
    pub police_car: Vec2,
    /// Motorcycle size.
    pub motorcycle: Vec2,
    /// Tank size.
    pub tank: Vec2,
}

impl SpriteSizes {
    /// Size of a kind's sprite.
    #[must_use]
    pub const fn for_kind(&self, kind: VehicleKind) -> Vec2 {
        match kind {
            VehicleKind::Sedan => self.sedan,
            VehicleKind::PoliceCar => self.police_car,
            VehicleKind::Motorcycle => self.motorcycle,
            VehicleKind::Tank => self.tank,
        }
    }
}

impl Default for SpriteSizes {
    fn default() -> Self {
        Self {
            sedan: Vec2::new(50.0, 25.0),
            police_car: Vec2::new(50.0, 25.0),
            motorcycle: Vec2::new(30.0, 15.0),
            tank: Vec2::new(50.0, 50.0),
        }
    }
}

/// Configuration of a derby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerbyConfig {
    /// Arena width.
    pub width: f32,
    /// Arena height.
    pub height: f32,
    /// Margin a sprite travels past the edge before wrapping.
    pub overhang: f32,
    /// Milliseconds between collision sweeps.
    pub collision_interval_ms: u64,
    /// Seed for spawn positions.
    pub seed: u64,
    /// Easing used by the headless backend.
    pub easing: Easing,
    /// Pair visiting strategy of the collision sweep.
    pub pairing: PairingMode,
    /// Sprite sizes per kind.
    pub sprite_sizes: SpriteSizes,
}

impl Default for DerbyConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            overhang: 50.0,
            collision_interval_ms: 750,
            seed: 0,
            easing: Easing::Linear,
            pairing: PairingMode::Ordered,
            sprite_sizes: SpriteSizes::default(),
        }
    }
}

impl DerbyConfig {
    /// Returns the default configuration with a different seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DerbyError::ConfigParse`] for malformed JSON and
    /// [`DerbyError::InvalidConfig`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DerbyError::Io`] if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`DerbyError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width >= 1.0) {
            return Err(invalid(format!("width must be at least 1, got {}", self.width)));
        }
        if !(self.height.is_finite() && self.height >= 1.0) {
            return Err(invalid(format!("height must be at least 1, got {}", self.height)));
        }
        if !(self.overhang.is_finite() && self.overhang >= 0.0) {
            return Err(invalid(format!(
                "overhang must be non-negative, got {}",
                self.overhang
            )));
        }
        if self.collision_interval_ms == 0 {
            return Err(invalid("collision_interval_ms must be positive".to_string()));
        }
        for kind in VehicleKind::ALL {
            let size = self.sprite_sizes.for_kind(kind);
            if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
                return Err(invalid(format!("sprite size for {kind} must be positive, got {size}")));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> DerbyError {
    DerbyError::InvalidConfig(message)
}
