//! Aggregate configuration, JSON loading and validation.
//!
//! Every section defaults independently, so a file only needs the fields it
//! changes:
//!
//! ```json
//! { "arbiter": { "score_cooldown": 0.5 }, "creatures": { "base_speed": 0.3 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arbiter::ArbiterConfig;
use crate::bounds::{BoundingVolume, BoundsConfig, BoundsError};
use crate::creature::CreatureConfig;
use crate::physics::ContactConfig;
use crate::pose::PoseConfig;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The file is not valid JSON for [`ShoalConfig`].
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A bounding box is malformed.
    #[error("invalid {section} bounds: {source}")]
    Bounds {
        /// Section holding the box.
        section: &'static str,
        /// Validation failure.
        source: BoundsError,
    },
    /// A numeric field is outside its admissible range.
    #[error("{field} must be {requirement} (got {value})")]
    OutOfRange {
        /// Dotted field path.
        field: &'static str,
        /// Human-readable constraint.
        requirement: &'static str,
        /// Offending value.
        value: f32,
    },
}

/// Everything the simulation can be tuned with.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoalConfig {
    /// Hand pose estimation.
    pub pose: PoseConfig,
    /// Creature steering.
    pub creatures: CreatureConfig,
    /// Scoring policy.
    pub arbiter: ArbiterConfig,
    /// Proximity contact source.
    pub contacts: ContactConfig,
    /// Default swim area for creatures, relative to the tank anchor.
    pub tank: BoundsConfig,
}

fn check(
    field: &'static str,
    requirement: &'static str,
    value: f32,
    ok: impl Fn(f32) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            requirement,
            value,
        })
    }
}

const POSITIVE: &str = "positive";
const NON_NEGATIVE: &str = "non-negative";
const UNIT_OPEN: &str = "in (0, 1]";
const UNIT_CLOSED: &str = "in [0, 1]";
const HALF_TURN: &str = "in [0, 180] degrees";

impl ShoalConfig {
    /// Reads and validates a JSON file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, and any error
    /// from [`ShoalConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        Self::from_json_str(&text)
    }

    /// Parses and validates JSON text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON and the first
    /// validation failure otherwise.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every range constraint.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pose = &self.pose;
        check("pose.base_hand_size", POSITIVE, pose.base_hand_size, |v| v > 0.0)?;
        check("pose.smoothing", UNIT_OPEN, pose.smoothing, |v| v > 0.0 && v <= 1.0)?;
        check("pose.hide_delay", POSITIVE, pose.hide_delay, |v| v > 0.0)?;
        check("pose.receive_timeout", POSITIVE, pose.receive_timeout, |v| v > 0.0)?;
        check(
            "pose.rotation.smoothing",
            UNIT_CLOSED,
            pose.rotation.smoothing,
            |v| (0.0..=1.0).contains(&v),
        )?;
        if let Some((lo, hi)) = pose.depth_ratio_limits {
            check("pose.depth_ratio_limits.0", POSITIVE, lo, |v| v > 0.0)?;
            check(
                "pose.depth_ratio_limits.1",
                "at least the lower limit",
                hi,
                |v| v >= lo,
            )?;
        }
        if let Some(bounds) = pose.bounds {
            BoundingVolume::try_from(bounds).map_err(|source| ConfigError::Bounds {
                section: "pose",
                source,
            })?;
        }

        let fish = &self.creatures;
        check("creatures.base_speed", NON_NEGATIVE, fish.base_speed, |v| v >= 0.0)?;
        check("creatures.turn_rate", NON_NEGATIVE, fish.turn_rate, |v| v >= 0.0)?;
        check(
            "creatures.direction_interval",
            POSITIVE,
            fish.direction_interval,
            |v| v > 0.0,
        )?;
        check(
            "creatures.direction_jitter",
            "in [0, direction_interval]",
            fish.direction_jitter,
            |v| (0.0..=fish.direction_interval).contains(&v),
        )?;
        check(
            "creatures.major_turn_chance",
            UNIT_CLOSED,
            fish.major_turn_chance,
            |v| (0.0..=1.0).contains(&v),
        )?;
        check(
            "creatures.minor_turn_degrees",
            HALF_TURN,
            fish.minor_turn_degrees,
            |v| (0.0..=180.0).contains(&v),
        )?;
        check(
            "creatures.avoidance_jitter_degrees",
            HALF_TURN,
            fish.avoidance_jitter_degrees,
            |v| (0.0..=180.0).contains(&v),
        )?;
        check(
            "creatures.max_tilt_degrees",
            "in [0, 90]",
            fish.max_tilt_degrees,
            |v| (0.0..=90.0).contains(&v),
        )?;
        check("creatures.pitch_gain", NON_NEGATIVE, fish.pitch_gain, |v| v >= 0.0)?;
        check(
            "creatures.escape_speed_multiplier",
            POSITIVE,
            fish.escape_speed_multiplier,
            |v| v > 0.0,
        )?;
        check(
            "creatures.alarmed_duration",
            NON_NEGATIVE,
            fish.alarmed_duration,
            |v| v >= 0.0,
        )?;

        check(
            "arbiter.score_cooldown",
            NON_NEGATIVE,
            self.arbiter.score_cooldown,
            |v| v >= 0.0,
        )?;

        check(
            "contacts.hand_radius",
            NON_NEGATIVE,
            self.contacts.hand_radius,
            |v| v >= 0.0,
        )?;
        check(
            "contacts.creature_radius",
            NON_NEGATIVE,
            self.contacts.creature_radius,
            |v| v >= 0.0,
        )?;

        self.tank_volume().map(|_| ())
    }

    /// The validated default swim area.
    ///
    /// # Errors
    /// Returns [`ConfigError::Bounds`] if the tank box is malformed.
    pub fn tank_volume(&self) -> Result<BoundingVolume, ConfigError> {
        BoundingVolume::try_from(self.tank).map_err(|source| ConfigError::Bounds {
            section: "tank",
            source,
        })
    }
}
