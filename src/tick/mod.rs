//! Bevy integration: the fixed phase order every frame runs through.
//!
//! Each frame drains the landmark buffer into the hand pose, gathers contact
//! events, arbitrates them, advances every creature and finally copies the
//! results into `Transform`s for presentation. Phases are chained system
//! sets, so a later phase always sees the earlier phases' writes from the
//! same frame.

mod plugin;
mod systems;

use bevy::prelude::*;
use thiserror::Error;

use crate::creature::{CreatureRng, CreatureState, CreatureTraits, SwimArea};
use crate::physics::ContactSensor;

pub use plugin::ShoalPlugin;
pub use systems::{
    arbitrate_contacts_system, camera_mode_gate_system, steer_creatures_system,
    sync_creature_transforms_system, update_hand_pose_system,
};

/// Ordered phases of one simulation tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Landmark intake, pose estimation, visibility and mode registers.
    Pose,
    /// Contact detection.
    Contacts,
    /// Scoring and startle decisions.
    Arbitration,
    /// Creature steering and containment.
    Creatures,
    /// Copying simulation state into transforms.
    Presentation,
}

/// Marks the entity that mirrors the hand pose.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HandProxy;

/// Marks an entity that mirrors one fingertip, thumb first.
#[derive(Component, Debug, Clone, Copy)]
pub struct FingertipProxy(pub usize);

/// Marks the camera whose yaw drives the interaction gate.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct InteractionCamera;

/// Where a [`TickAnomaly`] was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyContext {
    /// Plugin setup rejected the configuration.
    Init,
    /// A swim area names an anchor without a `Transform`.
    MissingAnchor,
    /// A contact names an entity that is not a creature.
    UnknownCreature,
}

/// Recoverable problem noticed during a tick.
///
/// Ticks never fail; anomalies are raised as events and logged by an
/// observer.
#[derive(Event, Debug, Clone, Error)]
#[error("{context:?}: {detail}")]
pub struct TickAnomaly {
    /// Where the anomaly occurred.
    pub context: AnomalyContext,
    /// Description of the problem.
    pub detail: String,
}

impl TickAnomaly {
    /// Builds an anomaly event.
    pub fn new(context: AnomalyContext, detail: impl Into<String>) -> Self {
        Self {
            context,
            detail: detail.into(),
        }
    }
}

/// Starts a new round: zeroes the score and clears every creature's scoring
/// memory.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RoundRestart;

/// Components for one creature entity, with its transform in sync.
pub fn creature_bundle(
    state: CreatureState,
    traits: CreatureTraits,
    rng: CreatureRng,
    area: SwimArea,
    sensor_radius: f32,
) -> impl Bundle {
    (
        Transform::from_translation(state.position).with_rotation(state.orientation),
        state,
        traits,
        rng,
        area,
        ContactSensor {
            radius: sensor_radius,
        },
    )
}
