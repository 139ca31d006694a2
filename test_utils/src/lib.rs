//! Utility helpers for tests.
//!
//! Builders for landmark samples with known geometry and a headless Bevy app
//! with a fixed frame duration.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shoal::landmarks::{INDEX_KNUCKLE, MIDDLE_KNUCKLE, WRIST};
use shoal::{LandmarkSample, ShoalConfig, ShoalPlugin, LANDMARK_COUNT};

/// Open hand in image space with the middle knuckle at `knuckle` and the wrist
/// `span` below it.
///
/// Points other than wrist and knuckles sit on the middle knuckle, which is
/// enough for depth and palm-frame estimation.
///
/// # Examples
/// ```
/// use glam::Vec2;
/// use test_utils::open_hand;
///
/// let sample = open_hand(Vec2::splat(0.5), 0.15);
/// assert_eq!(sample.len(), shoal::LANDMARK_COUNT);
/// ```
#[must_use]
pub fn open_hand(knuckle: Vec2, span: f32) -> LandmarkSample {
    rolled_hand(knuckle, span, 0.0)
}

/// Like [`open_hand`] but rotated by `roll_degrees` in the image plane about
/// the middle knuckle.
#[must_use]
pub fn rolled_hand(knuckle: Vec2, span: f32, roll_degrees: f32) -> LandmarkSample {
    let rotation = Vec2::from_angle(roll_degrees.to_radians());
    let place = |offset: Vec2| {
        let p = knuckle + rotation.rotate(offset * span);
        Vec3::new(p.x, p.y, 0.0)
    };
    let mut points = vec![place(Vec2::ZERO); LANDMARK_COUNT];
    if let Some(wrist) = points.get_mut(WRIST) {
        *wrist = place(Vec2::new(0.0, 1.0));
    }
    if let Some(index) = points.get_mut(INDEX_KNUCKLE) {
        *index = place(Vec2::new(-0.25, 0.0));
    }
    if let Some(middle) = points.get_mut(MIDDLE_KNUCKLE) {
        *middle = place(Vec2::ZERO);
    }
    LandmarkSample::new(points)
}

/// Sample with only `count` points, as a detector emits for a partial hand.
#[must_use]
pub fn truncated_sample(count: usize) -> LandmarkSample {
    LandmarkSample::new(vec![Vec3::splat(0.5); count])
}

/// Deterministic RNG for steering tests.
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Headless app running [`ShoalPlugin`] with each update advancing time by
/// `frame`.
///
/// The first update only starts the clock; elapsed time after `n` updates is
/// `(n - 1) * frame`.
#[must_use]
pub fn headless_app(config: ShoalConfig, frame: Duration) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(ShoalPlugin::new(config))
        .insert_resource(TimeUpdateStrategy::ManualDuration(frame));
    app.finish();
    app.cleanup();
    app
}
