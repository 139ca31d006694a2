//! Session-wide registers shared by the pose, arbitration and UI layers.
//!
//! Each register has one writer: the arbitration phase owns `score`, the pose
//! phase owns `hand_visible`, and whatever drives the UI or camera owns
//! `interaction_blocked`. Readers on any thread see the last published value
//! without locking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use bevy::prelude::Resource;
use log::info;

use crate::vector_math::wrap_degrees;

#[derive(Debug, Default)]
struct Registers {
    score: AtomicU64,
    hand_visible: AtomicBool,
    interaction_blocked: AtomicBool,
    round: AtomicU64,
}

/// Point-in-time copy of every register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Accumulated score for the current round.
    pub score: u64,
    /// Whether the hand pose is fresh enough to interact.
    pub hand_visible: bool,
    /// Whether an external mode currently suppresses scoring.
    pub interaction_blocked: bool,
    /// Number of round restarts since the session began.
    pub round: u64,
}

/// Injected handle to the session registers.
///
/// Cloning shares the registers, which lets a UI thread observe the score
/// while the Bevy world owns the writers.
#[derive(Resource, Debug, Clone, Default)]
pub struct SessionState {
    registers: Arc<Registers>,
}

impl SessionState {
    /// Creates a fresh session with a zero score and no visible hand.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.registers.score.load(Ordering::Acquire)
    }

    /// Adds `points` in a single atomic step and returns the new total.
    pub fn add_score(&self, points: u32) -> u64 {
        let points = u64::from(points);
        self.registers
            .score
            .fetch_add(points, Ordering::AcqRel)
            .saturating_add(points)
    }

    /// Whether the hand is currently tracked.
    #[must_use]
    pub fn hand_visible(&self) -> bool {
        self.registers.hand_visible.load(Ordering::Acquire)
    }

    /// Publishes the hand visibility. Owned by the pose phase.
    pub fn set_hand_visible(&self, visible: bool) {
        self.registers.hand_visible.store(visible, Ordering::Release);
    }

    /// Whether an external mode suppresses scoring.
    #[must_use]
    pub fn interaction_blocked(&self) -> bool {
        self.registers.interaction_blocked.load(Ordering::Acquire)
    }

    /// Publishes the interaction-mode flag.
    pub fn set_interaction_blocked(&self, blocked: bool) {
        self.registers
            .interaction_blocked
            .store(blocked, Ordering::Release);
    }

    /// Number of completed round restarts.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.registers.round.load(Ordering::Acquire)
    }

    /// Copies every register.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.score(),
            hand_visible: self.hand_visible(),
            interaction_blocked: self.interaction_blocked(),
            round: self.round(),
        }
    }

    /// Zeroes the score and advances the round counter.
    ///
    /// Visibility and mode flags are left alone; their owners republish them
    /// every tick.
    pub fn reset_round(&self) {
        let previous = self.registers.score.swap(0, Ordering::AcqRel);
        let round = self.registers.round.fetch_add(1, Ordering::AcqRel) + 1;
        info!("round {round} started (previous score {previous})");
    }
}

/// Whether a camera yaw (degrees) falls outside the interaction window.
///
/// Interaction is allowed only while the signed yaw is below
/// `max_yaw_degrees`, e.g. when the player has turned towards the tank.
///
/// # Examples
/// ```
/// use shoal::session::camera_yaw_blocks_interaction;
/// assert!(!camera_yaw_blocks_interaction(290.0, -50.0));
/// assert!(camera_yaw_blocks_interaction(0.0, -50.0));
/// ```
#[must_use]
pub fn camera_yaw_blocks_interaction(yaw_degrees: f32, max_yaw_degrees: f32) -> bool {
    wrap_degrees(yaw_degrees) >= max_yaw_degrees
}
