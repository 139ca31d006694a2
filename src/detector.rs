//! Synthetic landmark producer.
//!
//! Stands in for a camera-based hand detector: a background thread traces a
//! Lissajous path through image space, breathes the hand span so depth
//! changes, and optionally drops the hand out for a while so visibility
//! transitions get exercised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use log::{debug, info};

use crate::landmark_buffer::LandmarkBuffer;
use crate::landmarks::{LandmarkSample, LANDMARK_COUNT, MIDDLE_KNUCKLE, WRIST};

/// Horizontal knuckle offsets of the index, middle, ring and little fingers,
/// as fractions of the hand span.
const KNUCKLE_SPREAD: [f32; 4] = [-0.25, 0.0, 0.22, 0.42];
/// Length of one finger segment as a fraction of the hand span.
const SEGMENT: f32 = 0.3;

/// Parametric hand used by the synthetic detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticHand {
    /// Image-space centre of the path.
    pub centre: Vec2,
    /// Half-extent of the path on each axis.
    pub amplitude: Vec2,
    /// Angular frequency of the path on each axis, in radians per second.
    pub frequency: Vec2,
    /// Wrist-to-middle-knuckle distance at rest.
    pub span: f32,
    /// Relative span change, which reads as depth motion.
    pub breathing: f32,
    /// Hand disappears for `.1` seconds out of every `.0` seconds.
    pub dropout: Option<(f32, f32)>,
}

impl Default for SyntheticHand {
    fn default() -> Self {
        Self {
            centre: Vec2::splat(0.5),
            amplitude: Vec2::new(0.3, 0.2),
            frequency: Vec2::new(0.7, 1.1),
            span: 0.15,
            breathing: 0.25,
            dropout: Some((12.0, 1.5)),
        }
    }
}

impl SyntheticHand {
    /// Sample at `t` seconds, or `None` while the hand is dropped out.
    #[must_use]
    pub fn sample_at(&self, t: f32) -> Option<LandmarkSample> {
        if let Some((period, length)) = self.dropout {
            if period > 0.0 && t.rem_euclid(period) >= period - length {
                return None;
            }
        }
        let knuckle = self.centre
            + self.amplitude
                * Vec2::new((self.frequency.x * t).sin(), (self.frequency.y * t).sin());
        let span = self.span * (1.0 + self.breathing * (0.4 * t).sin());
        Some(Self::shape(knuckle, span))
    }

    /// Open palm with the middle knuckle at `knuckle`, fingers pointing up.
    fn shape(knuckle: Vec2, span: f32) -> LandmarkSample {
        let at = |dx: f32, dy: f32| Vec3::new(knuckle.x + dx * span, knuckle.y + dy * span, 0.0);
        let mut points = Vec::with_capacity(LANDMARK_COUNT);
        points.push(at(0.0, 1.0));
        // Thumb fans out from the wrist towards the index side.
        points.extend((1..=4).map(|j| {
            let j = j as f32;
            at(-0.2 * j, 1.0 - 0.2 * j)
        }));
        for dx in KNUCKLE_SPREAD {
            points.extend((0..4).map(|j| at(dx, -SEGMENT * j as f32)));
        }
        debug_assert_eq!(points.len(), LANDMARK_COUNT);
        debug_assert!(
            points
                .get(WRIST)
                .zip(points.get(MIDDLE_KNUCKLE))
                .is_some_and(|(w, m)| (w.distance(*m) - span).abs() < 1e-4)
        );
        LandmarkSample::new(points)
    }
}

/// Background thread publishing [`SyntheticHand`] samples.
#[derive(Debug)]
pub struct SyntheticDetector {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl SyntheticDetector {
    /// Starts publishing `hand` into `buffer` at `rate_hz`.
    ///
    /// # Errors
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(
        buffer: LandmarkBuffer,
        hand: SyntheticHand,
        rate_hz: f32,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let interval = Duration::from_secs_f32(1.0 / rate_hz.max(1.0));

        let thread = thread::Builder::new()
            .name("landmark-detector".into())
            .spawn(move || {
                let start = Instant::now();
                let mut published = 0_u64;
                while flag.load(Ordering::Acquire) {
                    if let Some(sample) = hand.sample_at(start.elapsed().as_secs_f32()) {
                        buffer.publish(sample);
                        published += 1;
                    }
                    thread::sleep(interval);
                }
                debug!("detector thread exiting after {published} samples");
                published
            })?;
        info!("synthetic detector running at {rate_hz} Hz");
        Ok(Self {
            running,
            thread: Some(thread),
        })
    }

    /// Whether the thread has been asked to keep going.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops the thread and returns how many samples it published.
    pub fn stop(&mut self) -> u64 {
        self.running.store(false, Ordering::Release);
        self.thread
            .take()
            .and_then(|thread| thread.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for SyntheticDetector {
    fn drop(&mut self) {
        self.stop();
    }
}
