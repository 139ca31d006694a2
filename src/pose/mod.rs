//! Hand pose estimation from landmark samples.
//!
//! [`PoseEstimator`] turns each validated sample into a target position
//! (image plane mapped through the camera axes, depth from apparent hand
//! size), clamps it into the configured bounds and smooths towards it. The
//! palm frame gives the orientation, which is filtered separately. Visibility
//! is derived from how long ago the last sample was applied.

mod depth;
mod orientation;

use bevy::prelude::{Deref, DerefMut, Resource};
use glam::{Quat, Vec3};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounds::{BoundingVolume, BoundsConfig, BoundsError};
use crate::landmark_buffer::LandmarkBuffer;
use crate::landmarks::{HandLandmarks, LandmarkSample, SampleError};

pub use depth::{depth_from_hand_size, hand_size};
pub use orientation::{
    euler_degrees_to_quat, image_to_world, palm_orientation, PalmFrame, RotationConfig,
    RotationMode,
};

/// Tuning for [`PoseEstimator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Hand span (image units) that maps to zero depth.
    pub base_hand_size: f32,
    /// World units of depth per unit of size ratio.
    pub depth_scale: f32,
    /// Optional `(min, max)` clamp on `base_hand_size / hand_size`.
    pub depth_ratio_limits: Option<(f32, f32)>,
    /// Horizontal sensitivity along the camera's right axis.
    pub scale_x: f32,
    /// Vertical sensitivity along the camera's up axis.
    pub scale_y: f32,
    /// Camera orientation; supplies the right/up axes and the palm frame's
    /// reference.
    pub camera_rotation: Quat,
    /// World axis that depth moves along.
    pub depth_axis: Vec3,
    /// World position of the image centre at zero depth.
    pub offset: Vec3,
    /// Fraction of the remaining distance covered per sample.
    pub smoothing: f32,
    /// World-space box the hand may not leave.
    pub bounds: Option<BoundsConfig>,
    /// Seconds without an applied sample before the hand is hidden.
    pub hide_delay: f32,
    /// Seconds without an applied sample before tracking counts as lost.
    pub receive_timeout: f32,
    /// Also project the five fingertips.
    pub track_fingertips: bool,
    /// Orientation tracking.
    pub rotation: RotationConfig,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            base_hand_size: 0.15,
            depth_scale: 15.0,
            depth_ratio_limits: Some((0.25, 4.0)),
            scale_x: 8.0,
            scale_y: 8.0,
            camera_rotation: Quat::IDENTITY,
            depth_axis: Vec3::X,
            offset: Vec3::ZERO,
            smoothing: 0.5,
            bounds: None,
            hide_delay: 0.2,
            receive_timeout: 2.0,
            track_fingertips: false,
            rotation: RotationConfig::default(),
        }
    }
}

/// Current estimate of the hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    /// Smoothed world position.
    pub position: Vec3,
    /// Filtered world orientation.
    pub orientation: Quat,
    /// Time of the last applied sample.
    pub last_update: Option<f32>,
    /// Whether the pose is fresh enough to interact with.
    pub visible: bool,
    /// World positions of the fingertips, thumb first, when tracked.
    pub fingertips: Option<[Vec3; 5]>,
}

impl HandPose {
    /// Resting pose at `position`, hidden.
    #[must_use]
    pub const fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            last_update: None,
            visible: false,
            fingertips: None,
        }
    }
}

/// What [`PoseEstimator::update`] did with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseUpdate {
    /// Position (and possibly orientation) moved.
    Applied {
        /// `false` when the palm frame was degenerate and orientation froze.
        orientation_updated: bool,
    },
    /// The sample was malformed; nothing changed.
    Rejected(SampleError),
    /// The hand span was too small to infer depth; nothing changed.
    DegenerateScale,
}

/// Depth calibration failures.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CalibrationError {
    /// No sample has ever been published.
    #[error("no landmark sample available for calibration")]
    NoSample,
    /// The sample could not be validated.
    #[error("cannot calibrate from this sample: {0}")]
    Sample(#[from] SampleError),
    /// The hand span is too small to serve as a reference.
    #[error("hand span {size} is too small to calibrate against")]
    DegenerateHand {
        /// Measured span.
        size: f32,
    },
}

/// Stateful pose estimator driven once per tick.
#[derive(Debug, Clone)]
pub struct PoseEstimator {
    config: PoseConfig,
    bounds: Option<BoundingVolume>,
    pose: HandPose,
    receiving: bool,
}

impl PoseEstimator {
    /// Builds an estimator resting at the configured offset.
    ///
    /// # Errors
    /// Returns [`BoundsError`] if the configured bounds are invalid.
    pub fn new(config: PoseConfig) -> Result<Self, BoundsError> {
        let bounds = config.bounds.map(BoundingVolume::try_from).transpose()?;
        Ok(Self {
            config,
            bounds,
            pose: HandPose::at_rest(config.offset),
            receiving: false,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PoseConfig {
        &self.config
    }

    /// Latest pose.
    #[must_use]
    pub const fn pose(&self) -> &HandPose {
        &self.pose
    }

    /// Whether samples arrived within the receive timeout at the last refresh.
    #[must_use]
    pub const fn is_receiving(&self) -> bool {
        self.receiving
    }

    /// Applies one sample taken at `now`.
    ///
    /// Malformed samples and collapsed hands leave the pose untouched.
    pub fn update(&mut self, sample: &LandmarkSample, now: f32) -> PoseUpdate {
        let hand = match sample.hand() {
            Ok(hand) => hand,
            Err(err) => {
                debug!("dropping landmark sample: {err}");
                return PoseUpdate::Rejected(err);
            }
        };
        let Some(depth) = depth_from_hand_size(
            hand_size(&hand),
            self.config.base_hand_size,
            self.config.depth_scale,
            self.config.depth_ratio_limits,
        ) else {
            debug!("hand span collapsed; skipping pose update");
            return PoseUpdate::DegenerateScale;
        };

        let target = self.clamp(self.map_to_world(hand.middle_knuckle(), depth));
        self.pose.position = self.pose.position.lerp(target, self.config.smoothing);

        self.pose.fingertips = self.config.track_fingertips.then(|| {
            hand.fingertips()
                .map(|tip| self.clamp(self.map_to_world(tip, depth)))
        });

        let orientation_updated = self.update_orientation(&hand);

        if !self.receiving {
            info!("hand tracking data received");
            self.receiving = true;
        }
        self.pose.last_update = Some(now);
        self.pose.visible = true;
        PoseUpdate::Applied {
            orientation_updated,
        }
    }

    /// Re-evaluates visibility and liveness at `now` and returns visibility.
    ///
    /// The hand stays visible while `now - last_update < hide_delay`.
    pub fn refresh(&mut self, now: f32) -> bool {
        let age = self.pose.last_update.map(|t| now - t);
        let visible = age.is_some_and(|age| age < self.config.hide_delay);
        if visible != self.pose.visible {
            debug!("hand {}", if visible { "shown" } else { "hidden" });
            self.pose.visible = visible;
        }
        if self.receiving && age.is_none_or(|age| age > self.config.receive_timeout) {
            info!("hand tracking data lost");
            self.receiving = false;
        }
        visible
    }

    /// Makes the hand span in `sample` the zero-depth reference.
    ///
    /// # Errors
    /// Fails when the sample is malformed or the hand span is degenerate.
    pub fn calibrate_depth(&mut self, sample: &LandmarkSample) -> Result<f32, CalibrationError> {
        let hand = sample.hand()?;
        let size = hand_size(&hand);
        if !size.is_finite() || size < crate::MIN_HAND_SIZE {
            return Err(CalibrationError::DegenerateHand { size });
        }
        self.config.base_hand_size = size;
        info!("depth calibrated: hand span {size:.4} is now zero depth");
        Ok(size)
    }

    /// Image-space point to world space at the given depth.
    #[must_use]
    pub fn map_to_world(&self, point: Vec3, depth: f32) -> Vec3 {
        let right = self.config.camera_rotation * Vec3::X;
        let up = self.config.camera_rotation * Vec3::Y;
        self.config.offset
            + right * ((point.x - 0.5) * self.config.scale_x)
            + up * (-(point.y - 0.5) * self.config.scale_y)
            + self.config.depth_axis * depth
    }

    fn clamp(&self, point: Vec3) -> Vec3 {
        self.bounds.map_or(point, |b| b.clamp_point(point))
    }

    fn update_orientation(&mut self, hand: &HandLandmarks) -> bool {
        let rotation = &self.config.rotation;
        if !rotation.enabled {
            return false;
        }
        let Some(target) = palm_orientation(hand, self.config.camera_rotation, rotation.offset())
        else {
            debug!("degenerate palm frame; orientation frozen");
            return false;
        };
        self.pose.orientation = rotation.filter(self.pose.orientation, target);
        true
    }
}

/// Bevy resource owning the tick's [`PoseEstimator`].
#[derive(Resource, Debug, Clone, Deref, DerefMut)]
pub struct HandTracker(pub PoseEstimator);

impl HandTracker {
    /// Calibrates depth from the buffer's newest sample without consuming it.
    ///
    /// # Errors
    /// Returns [`CalibrationError::NoSample`] if nothing was ever published,
    /// otherwise any error from [`PoseEstimator::calibrate_depth`].
    pub fn calibrate_from_latest(
        &mut self,
        buffer: &LandmarkBuffer,
    ) -> Result<f32, CalibrationError> {
        let sample = buffer.latest().ok_or(CalibrationError::NoSample)?;
        self.0.calibrate_depth(&sample)
    }
}
