//! Raw hand-landmark samples as produced by the external detector.
//!
//! A [`LandmarkSample`] is whatever the detector handed over; it may have the
//! wrong number of points. [`HandLandmarks`] is the validated view the pose
//! estimator works on and always holds exactly [`LANDMARK_COUNT`] finite
//! points.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of keypoints in a complete hand sample.
pub const LANDMARK_COUNT: usize = 21;
/// Index of the wrist keypoint.
pub const WRIST: usize = 0;
/// Index of the thumb tip.
pub const THUMB_TIP: usize = 4;
/// Index of the index-finger knuckle (metacarpophalangeal joint).
pub const INDEX_KNUCKLE: usize = 5;
/// Index of the index-finger tip.
pub const INDEX_TIP: usize = 8;
/// Index of the middle-finger knuckle.
pub const MIDDLE_KNUCKLE: usize = 9;
/// Index of the middle-finger tip.
pub const MIDDLE_TIP: usize = 12;
/// Index of the ring-finger tip.
pub const RING_TIP: usize = 16;
/// Index of the little-finger tip.
pub const PINKY_TIP: usize = 20;

/// Reasons a sample cannot be used for pose estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The detector produced a partial (or oversized) hand.
    #[error("expected 21 landmarks, sample has {found}")]
    WrongPointCount {
        /// Number of points present in the rejected sample.
        found: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("landmark {index} is not finite")]
    NonFinite {
        /// Index of the offending keypoint.
        index: usize,
    },
}

/// One detector frame of normalised hand keypoints.
///
/// `x` and `y` lie in `[0, 1]` image space with `y` growing downwards; `z` is
/// the detector's relative depth, roughly in `[-1, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSample {
    points: Vec<Vec3>,
}

impl LandmarkSample {
    /// Wraps the detector output without validating it.
    #[must_use]
    pub const fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// Raw keypoints in detector order.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of keypoints in the sample.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the sample holds no keypoints at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Validates the sample into a complete hand.
    ///
    /// # Errors
    /// Returns [`SampleError::WrongPointCount`] unless exactly
    /// [`LANDMARK_COUNT`] points are present, and [`SampleError::NonFinite`]
    /// if any coordinate is NaN or infinite.
    pub fn hand(&self) -> Result<HandLandmarks, SampleError> {
        HandLandmarks::try_from(self)
    }
}

impl From<Vec<Vec3>> for LandmarkSample {
    fn from(points: Vec<Vec3>) -> Self {
        Self::new(points)
    }
}

/// A complete, finite set of hand keypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks {
    points: [Vec3; LANDMARK_COUNT],
}

impl HandLandmarks {
    /// Keypoint at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// All keypoints in detector order.
    #[must_use]
    pub const fn points(&self) -> &[Vec3; LANDMARK_COUNT] {
        &self.points
    }

    /// Wrist keypoint.
    #[must_use]
    pub const fn wrist(&self) -> Vec3 {
        self.points[WRIST]
    }

    /// Index-finger knuckle keypoint.
    #[must_use]
    pub const fn index_knuckle(&self) -> Vec3 {
        self.points[INDEX_KNUCKLE]
    }

    /// Middle-finger knuckle keypoint; the hand's reference position.
    #[must_use]
    pub const fn middle_knuckle(&self) -> Vec3 {
        self.points[MIDDLE_KNUCKLE]
    }

    /// Fingertip keypoints, thumb first.
    #[must_use]
    pub const fn fingertips(&self) -> [Vec3; 5] {
        [
            self.points[THUMB_TIP],
            self.points[INDEX_TIP],
            self.points[MIDDLE_TIP],
            self.points[RING_TIP],
            self.points[PINKY_TIP],
        ]
    }
}

impl TryFrom<&LandmarkSample> for HandLandmarks {
    type Error = SampleError;

    fn try_from(sample: &LandmarkSample) -> Result<Self, Self::Error> {
        let points: [Vec3; LANDMARK_COUNT] =
            sample
                .points
                .as_slice()
                .try_into()
                .map_err(|_| SampleError::WrongPointCount {
                    found: sample.len(),
                })?;
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(SampleError::NonFinite { index });
        }
        Ok(Self { points })
    }
}
