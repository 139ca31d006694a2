//! Autonomous creature steering.
//!
//! Each creature is a small state machine: it cruises towards a heading that
//! is redrawn on a per-entity schedule, or, once startled, flees along a fixed
//! heading until its alarm expires. In both modes it is kept inside its swim
//! area by clamping and reflecting in the area's local frame.

mod controller;
mod orientation;
mod steering;

use bevy::prelude::{Component, Deref, DerefMut, Entity};
use glam::{Quat, Vec3};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::bounds::{AnchorFrame, BoundingVolume};

pub use controller::{Confinement, CreatureController, TickReport};
pub use orientation::{target_orientation, turn_towards};
pub use steering::{
    adjust_heading, desired_speed, initial_change_delay, next_change_delay, next_heading,
    random_heading, reseed_if_stalled, steer, value_noise,
};

/// Periodic modulation of cruising speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedVariation {
    /// Relative amplitude of the sine wave.
    pub amplitude: f32,
    /// Angular frequency of the sine wave, radians per second.
    pub frequency: f32,
    /// Relative amplitude of the low-frequency noise term.
    pub noise_amplitude: f32,
    /// Lattice steps per second of the noise term.
    pub noise_frequency: f32,
}

impl Default for SpeedVariation {
    fn default() -> Self {
        Self {
            amplitude: 0.2,
            frequency: 3.0,
            noise_amplitude: 0.1,
            noise_frequency: 0.25,
        }
    }
}

/// Tuning shared by every creature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    /// Cruising speed in world units per second.
    pub base_speed: f32,
    /// Steering and turning rate per second.
    pub turn_rate: f32,
    /// Mean seconds between heading changes.
    pub direction_interval: f32,
    /// Uniform jitter applied to each interval, seconds.
    pub direction_jitter: f32,
    /// Vertical component scale applied to new headings.
    pub vertical_damping: f32,
    /// Probability that a heading change is a full re-orientation.
    pub major_turn_chance: f32,
    /// Largest yaw of a minor heading adjustment, degrees.
    pub minor_turn_degrees: f32,
    /// Cruising speed modulation; `None` keeps speed constant.
    pub speed_variation: Option<SpeedVariation>,
    /// Speed factor while alarmed.
    pub escape_speed_multiplier: f32,
    /// Seconds an alarm lasts.
    pub alarmed_duration: f32,
    /// Steering rate factor while alarmed.
    pub alarmed_turn_multiplier: f32,
    /// Bank and pitch limit, degrees.
    pub max_tilt_degrees: f32,
    /// Degrees of pitch per unit of vertical speed.
    pub pitch_gain: f32,
    /// Model-space correction applied after the heading rotation, Euler
    /// degrees.
    pub forward_offset_degrees: Vec3,
    /// Vertical component scale used when deriving the heading.
    pub heading_vertical_damping: f32,
    /// Random perturbation of avoidance headings, degrees.
    pub avoidance_jitter_degrees: f32,
    /// Seconds the touch pulse stays active.
    pub touch_pulse_duration: f32,
    /// Extra clearance when growing a swim area around a spawn point.
    pub spawn_expand_margin: f32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.155,
            turn_rate: 0.6,
            direction_interval: 3.0,
            direction_jitter: 1.0,
            vertical_damping: 0.3,
            major_turn_chance: 0.35,
            minor_turn_degrees: 30.0,
            speed_variation: Some(SpeedVariation::default()),
            escape_speed_multiplier: 2.5,
            alarmed_duration: 1.5,
            alarmed_turn_multiplier: 2.0,
            max_tilt_degrees: 8.0,
            pitch_gain: 12.4,
            forward_offset_degrees: Vec3::ZERO,
            heading_vertical_damping: 0.5,
            avoidance_jitter_degrees: 20.0,
            touch_pulse_duration: 0.3,
            spawn_expand_margin: 0.1,
        }
    }
}

/// Behavioural mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CreatureMode {
    /// Wandering with scheduled heading changes.
    #[default]
    Cruising,
    /// Fleeing until the given time.
    Alarmed {
        /// Time at which the creature calms down.
        until: f32,
    },
}

/// Per-creature simulation state.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct CreatureState {
    /// World position.
    pub position: Vec3,
    /// World velocity.
    pub velocity: Vec3,
    /// World orientation.
    pub orientation: Quat,
    /// Unit heading the velocity is steered towards.
    pub target_direction: Vec3,
    /// Current mode.
    pub mode: CreatureMode,
    /// Wake-at time for the next heading change.
    pub next_direction_change: f32,
    /// Time of the last touch that passed the cooldown.
    pub last_score_time: Option<f32>,
    /// Whether this creature has scored this round.
    pub has_scored_once: bool,
    /// Phase offset of the speed wave, radians.
    pub phase: f32,
    /// Seed of the speed noise term.
    pub noise_seed: u32,
    /// Wake-at time at which the touch pulse ends.
    pub pulse_until: Option<f32>,
}

impl CreatureState {
    /// Whether the creature is currently fleeing.
    #[must_use]
    pub const fn is_alarmed(&self) -> bool {
        matches!(self.mode, CreatureMode::Alarmed { .. })
    }

    /// Whether the touch pulse is active at `now`.
    #[must_use]
    pub fn is_pulsing(&self, now: f32) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }

    /// Forgets scoring history, as at the start of a round.
    pub fn reset_scoring(&mut self) {
        self.last_score_time = None;
        self.has_scored_once = false;
    }
}

/// Score awarded for touching a creature.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatureTraits {
    /// Points added to the session score.
    pub score_value: u32,
}

impl Default for CreatureTraits {
    fn default() -> Self {
        Self { score_value: 10 }
    }
}

/// Per-creature random source, seeded at spawn for reproducible runs.
#[derive(Component, Debug, Clone, Deref, DerefMut)]
pub struct CreatureRng(pub StdRng);

impl CreatureRng {
    /// Deterministic generator for `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Volume a creature is confined to.
///
/// With an `anchor` the volume is expressed in that entity's local frame;
/// without one it is in world space.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SwimArea {
    /// Admissible region.
    pub volume: BoundingVolume,
    /// Entity whose transform defines the volume's frame.
    pub anchor: Option<Entity>,
    /// Whether the spawn-time expansion has run.
    pub settled: bool,
}

impl SwimArea {
    /// Area in world space.
    #[must_use]
    pub const fn world(volume: BoundingVolume) -> Self {
        Self {
            volume,
            anchor: None,
            settled: false,
        }
    }

    /// Area in `anchor`'s local frame.
    #[must_use]
    pub const fn anchored(volume: BoundingVolume, anchor: Entity) -> Self {
        Self {
            volume,
            anchor: Some(anchor),
            settled: false,
        }
    }

    /// Grows the volume once so `position` is admissible.
    ///
    /// Returns `true` if the volume changed. Later calls are no-ops.
    pub fn settle(&mut self, frame: &AnchorFrame, position: Vec3, margin: f32) -> bool {
        if self.settled {
            return false;
        }
        self.settled = true;
        let local = frame.to_local_point(position);
        if self.volume.contains(local) {
            return false;
        }
        self.volume = self.volume.expanded_to_include(local, margin);
        debug!("swim area expanded to include spawn point {local}");
        true
    }
}
