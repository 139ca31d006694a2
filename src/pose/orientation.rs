//! Palm frame construction and rotation filtering.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::landmarks::HandLandmarks;
use crate::vector_math::{look_rotation, normalize_above, wrap_degrees};
use crate::MIN_AXIS_LENGTH;

/// Orthonormal axes of the palm in detector image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PalmFrame {
    /// Wrist towards middle knuckle.
    pub finger: Vec3,
    /// Re-orthogonalised wrist towards index knuckle.
    pub side: Vec3,
    /// Palm normal, `finger x side`.
    pub normal: Vec3,
}

impl PalmFrame {
    /// Builds the frame from the wrist and the index and middle knuckles.
    ///
    /// Returns `None` when any axis is too short to normalise, which happens
    /// when the three keypoints are coincident or collinear.
    #[must_use]
    pub fn from_hand(hand: &HandLandmarks) -> Option<Self> {
        let wrist = hand.wrist();
        let finger = normalize_above(hand.middle_knuckle() - wrist, MIN_AXIS_LENGTH)?;
        let side = normalize_above(hand.index_knuckle() - wrist, MIN_AXIS_LENGTH)?;
        let normal = normalize_above(finger.cross(side), MIN_AXIS_LENGTH)?;
        let side = normalize_above(normal.cross(finger), MIN_AXIS_LENGTH)?;
        Some(Self {
            finger,
            side,
            normal,
        })
    }
}

/// Image space has `y` down and `z` towards the camera; world space has `y`
/// up and looks down `-z`. This is a half turn about `x`.
#[must_use]
pub fn image_to_world(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.y, -v.z)
}

/// World-space hand orientation from a palm frame.
///
/// Local `-Z` follows the palm normal and local `+Y` the fingers, expressed
/// relative to the camera and followed by the calibration `offset`.
#[must_use]
pub fn palm_orientation(hand: &HandLandmarks, camera_rotation: Quat, offset: Quat) -> Option<Quat> {
    let frame = PalmFrame::from_hand(hand)?;
    let look = look_rotation(image_to_world(frame.normal), image_to_world(frame.finger))?;
    Some((camera_rotation * look * offset).normalize())
}

/// How the filtered orientation follows the measured one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RotationMode {
    /// Slerp towards the target, optionally limiting each Euler angle.
    Full {
        /// Largest deviation from rest in degrees as `(pitch, yaw, roll)`.
        clamp_degrees: Option<Vec3>,
    },
    /// Follow only the twist about the local `z` axis.
    TwistOnly {
        /// Twist changes smaller than this are ignored, in degrees.
        deadzone_degrees: f32,
        /// Largest twist away from rest, in degrees.
        clamp_degrees: f32,
    },
}

impl Default for RotationMode {
    fn default() -> Self {
        Self::Full {
            clamp_degrees: None,
        }
    }
}

/// Orientation tracking settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// When `false` the hand keeps its rest orientation.
    pub enabled: bool,
    /// Calibration rotation applied after the palm frame, Euler degrees.
    pub offset_degrees: Vec3,
    /// Fraction of the remaining rotation applied per sample.
    pub smoothing: f32,
    /// Filtering mode.
    pub mode: RotationMode,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            offset_degrees: Vec3::ZERO,
            smoothing: 0.3,
            mode: RotationMode::default(),
        }
    }
}

impl RotationConfig {
    /// Offset rotation built from [`RotationConfig::offset_degrees`].
    #[must_use]
    pub fn offset(&self) -> Quat {
        euler_degrees_to_quat(self.offset_degrees)
    }

    /// Moves `current` towards `target` according to the configured mode.
    #[must_use]
    pub fn filter(&self, current: Quat, target: Quat) -> Quat {
        let t = self.smoothing.clamp(0.0, 1.0);
        match self.mode {
            RotationMode::Full { clamp_degrees } => {
                let blended = current.slerp(target, t).normalize();
                clamp_degrees.map_or(blended, |limits| clamp_euler(blended, limits))
            }
            RotationMode::TwistOnly {
                deadzone_degrees,
                clamp_degrees,
            } => {
                let (yaw, pitch, roll) = current.to_euler(EulerRot::YXZ);
                let (_, _, target_roll) = target.to_euler(EulerRot::YXZ);
                let delta = wrap_degrees((target_roll - roll).to_degrees());
                let mut next = roll.to_degrees();
                if delta.abs() >= deadzone_degrees {
                    next += delta * t;
                }
                let limit = clamp_degrees.abs();
                let next = wrap_degrees(next).clamp(-limit, limit);
                Quat::from_euler(EulerRot::YXZ, yaw, pitch, next.to_radians())
            }
        }
    }
}

/// `(pitch, yaw, roll)` degrees to a rotation applied yaw, then pitch, then roll.
#[must_use]
pub fn euler_degrees_to_quat(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

fn clamp_euler(rotation: Quat, limits: Vec3) -> Quat {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    let limits = limits.abs();
    let clamp = |angle: f32, limit: f32| wrap_degrees(angle.to_degrees()).clamp(-limit, limit);
    euler_degrees_to_quat(Vec3::new(
        clamp(pitch, limits.x),
        clamp(yaw, limits.y),
        clamp(roll, limits.z),
    ))
}
