//! Axis-aligned bounding volumes expressed in an anchor's local frame.
//!
//! Creatures are contained in the local frame of their tank anchor; the hand
//! pose is clamped in world space, which is simply the identity anchor.

use bevy::prelude::Transform;
use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a bounding volume cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BoundsError {
    /// After padding, the usable interval along `axis` is empty.
    #[error("axis {axis}: min {min} must stay below max {max} after padding")]
    Inverted {
        /// Axis name (`x`, `y` or `z`).
        axis: char,
        /// Padded lower limit.
        min: f32,
        /// Padded upper limit.
        max: f32,
    },
    /// Padding was negative or not finite.
    #[error("padding must be a finite, non-negative distance (got {0})")]
    InvalidPadding(f32),
    /// A corner coordinate was NaN or infinite.
    #[error("bounds corners must be finite")]
    NonFinite,
}

/// Serialisable description of a box, validated into a [`BoundingVolume`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    /// Lower corner.
    pub min: Vec3,
    /// Upper corner.
    pub max: Vec3,
    /// Distance kept clear of each face.
    pub padding: f32,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            min: Vec3::new(-5.0, -2.0, -5.0),
            max: Vec3::new(5.0, 2.0, 5.0),
            padding: 0.1,
        }
    }
}

impl TryFrom<BoundsConfig> for BoundingVolume {
    type Error = BoundsError;

    fn try_from(config: BoundsConfig) -> Result<Self, Self::Error> {
        Self::new(config.min, config.max, config.padding)
    }
}

/// Result of [`BoundingVolume::contain`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Containment {
    /// Position clamped into the padded interior.
    pub position: Vec3,
    /// Velocity with outward components reflected on clamped axes.
    pub velocity: Vec3,
    /// Whether any axis was clamped.
    pub hit: bool,
}

/// Validated box with `min + padding < max - padding` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    min: Vec3,
    max: Vec3,
    padding: f32,
}

impl BoundingVolume {
    /// Validates and builds a volume.
    ///
    /// # Errors
    /// Returns [`BoundsError`] when a corner is not finite, the padding is
    /// negative, or an axis has no interior left after padding.
    pub fn new(min: Vec3, max: Vec3, padding: f32) -> Result<Self, BoundsError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(BoundsError::NonFinite);
        }
        if !padding.is_finite() || padding < 0.0 {
            return Err(BoundsError::InvalidPadding(padding));
        }
        let lo = min + Vec3::splat(padding);
        let hi = max - Vec3::splat(padding);
        let axes = lo.to_array().into_iter().zip(hi.to_array());
        for (axis, (l, h)) in ['x', 'y', 'z'].into_iter().zip(axes) {
            if l >= h {
                return Err(BoundsError::Inverted {
                    axis,
                    min: l,
                    max: h,
                });
            }
        }
        Ok(Self { min, max, padding })
    }

    /// Lower corner, without padding.
    #[must_use]
    pub const fn min(&self) -> Vec3 {
        self.min
    }

    /// Upper corner, without padding.
    #[must_use]
    pub const fn max(&self) -> Vec3 {
        self.max
    }

    /// Padding kept clear of each face.
    #[must_use]
    pub const fn padding(&self) -> f32 {
        self.padding
    }

    /// Lowest admissible point.
    #[must_use]
    pub fn inner_min(&self) -> Vec3 {
        self.min + Vec3::splat(self.padding)
    }

    /// Highest admissible point.
    #[must_use]
    pub fn inner_max(&self) -> Vec3 {
        self.max - Vec3::splat(self.padding)
    }

    /// Whether `point` lies in the padded interior, inclusive.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.inner_min()).all() && point.cmple(self.inner_max()).all()
    }

    /// Clamps `point` into the padded interior.
    #[must_use]
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.inner_min(), self.inner_max())
    }

    /// Clamps a local position and reflects the velocity on clamped axes.
    ///
    /// A velocity component is negated only when it points out through the
    /// face that was hit, so speed along each axis is preserved.
    #[must_use]
    pub fn contain(&self, position: Vec3, velocity: Vec3) -> Containment {
        let lo = self.inner_min();
        let hi = self.inner_max();
        let below = position.cmplt(lo);
        let above = position.cmpgt(hi);
        let outward =
            (below & velocity.cmplt(Vec3::ZERO)) | (above & velocity.cmpgt(Vec3::ZERO));
        Containment {
            position: position.clamp(lo, hi),
            velocity: Vec3::select(outward, -velocity, velocity),
            hit: (below | above).any(),
        }
    }

    /// Grows the volume so `point` lies in the interior.
    ///
    /// Each violated face moves to `padding + margin` beyond the point. The
    /// volume is returned unchanged when the point is already inside.
    #[must_use]
    pub fn expanded_to_include(&self, point: Vec3, margin: f32) -> Self {
        let reach = Vec3::splat(self.padding + margin.max(0.0));
        let lo = self.inner_min();
        let hi = self.inner_max();
        let min = Vec3::select(point.cmplt(lo), point - reach, self.min);
        let max = Vec3::select(point.cmpgt(hi), point + reach, self.max);
        Self {
            min,
            max,
            padding: self.padding,
        }
    }
}

/// Rigid frame a bounding volume is expressed in.
///
/// Points go through the full affine transform; directions only through the
/// rotation, so reflected velocities keep their magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorFrame {
    to_world: Affine3A,
    to_local: Affine3A,
    rotation: Quat,
}

impl Default for AnchorFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AnchorFrame {
    /// World space.
    pub const IDENTITY: Self = Self {
        to_world: Affine3A::IDENTITY,
        to_local: Affine3A::IDENTITY,
        rotation: Quat::IDENTITY,
    };

    /// Frame of an anchor entity's transform.
    #[must_use]
    pub fn from_transform(transform: &Transform) -> Self {
        let to_world = transform.compute_affine();
        Self {
            to_world,
            to_local: to_world.inverse(),
            rotation: transform.rotation.normalize(),
        }
    }

    /// World point into the anchor frame.
    #[must_use]
    pub fn to_local_point(&self, point: Vec3) -> Vec3 {
        self.to_local.transform_point3(point)
    }

    /// Anchor-frame point into world space.
    #[must_use]
    pub fn to_world_point(&self, point: Vec3) -> Vec3 {
        self.to_world.transform_point3(point)
    }

    /// World direction into the anchor frame.
    #[must_use]
    pub fn to_local_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation.inverse() * direction
    }

    /// Anchor-frame direction into world space.
    #[must_use]
    pub fn to_world_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }
}
