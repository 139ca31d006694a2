//! Sphere-proximity contact source.
//!
//! Stands in for a real broad-phase: every tick the hand (and its fingertip
//! proxies) and each creature are treated as spheres, and only pairs that
//! start overlapping produce a [`ContactEvent`]. Pairs that stay in contact
//! stay silent until they separate.

use bevy::prelude::*;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::config::ShoalConfig;
use crate::contacts::{ContactEvent, ContactInbox};
use crate::creature::CreatureState;
use crate::pose::{HandPose, HandTracker};

/// Settings for the proximity contact source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Run the built-in proximity source. Disable when contacts come from an
    /// external physics engine.
    pub enabled: bool,
    /// Radius of the hand sphere.
    pub hand_radius: f32,
    /// Radius of each fingertip sphere.
    pub fingertip_radius: f32,
    /// Sensor radius given to creatures spawned without one.
    pub creature_radius: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hand_radius: 0.15,
            fingertip_radius: 0.05,
            creature_radius: 0.1,
        }
    }
}

/// Spherical trigger volume attached to a creature.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ContactSensor {
    /// Sphere radius in world units.
    pub radius: f32,
}

/// Whether two spheres overlap, touching included.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use shoal::physics::spheres_overlap;
///
/// assert!(spheres_overlap(Vec3::ZERO, 0.5, Vec3::X, 0.5));
/// assert!(!spheres_overlap(Vec3::ZERO, 0.4, Vec3::X, 0.5));
/// ```
#[must_use]
pub fn spheres_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}

/// Remembers which pairs overlapped last tick so only begin edges are emitted.
#[derive(Resource, Debug, Default)]
pub struct OverlapTracker {
    active: HashSet<ContactEvent>,
}

impl OverlapTracker {
    /// Replaces the active set with `current` and returns pairs that were not
    /// active before, in `current` order.
    pub fn begin_edges<I>(&mut self, current: I) -> Vec<ContactEvent>
    where
        I: IntoIterator<Item = ContactEvent>,
    {
        let mut next = HashSet::new();
        let mut begun = Vec::new();
        for event in current {
            if !self.active.contains(&event) && !next.contains(&event) {
                begun.push(event.clone());
            }
            next.insert(event);
        }
        self.active = next;
        begun
    }

    /// Number of pairs currently overlapping.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Forgets every pair.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

fn hand_spheres(pose: &HandPose, config: &ContactConfig) -> Vec<(Vec3, f32)> {
    let mut spheres = vec![(pose.position, config.hand_radius)];
    if let Some(tips) = pose.fingertips {
        spheres.extend(tips.into_iter().map(|tip| (tip, config.fingertip_radius)));
    }
    spheres
}

/// Emits begin-edge contacts between the hand, creatures and each other.
///
/// The hand only takes part once a sample has been applied, so a hand that
/// was never tracked does not sit in the tank touching whatever swims past.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems receive resources and queries by value."
)]
pub fn proximity_contacts_system(
    config: Res<ShoalConfig>,
    tracker: Res<HandTracker>,
    mut overlaps: ResMut<OverlapTracker>,
    mut inbox: ResMut<ContactInbox>,
    creatures: Query<(Entity, &CreatureState, &ContactSensor)>,
) {
    let contacts = &config.contacts;
    let pose = tracker.pose();
    let hand = if pose.last_update.is_some() {
        hand_spheres(pose, contacts)
    } else {
        Vec::new()
    };

    let bodies: Vec<(Entity, Vec3, f32)> = creatures
        .iter()
        .map(|(entity, state, sensor)| (entity, state.position, sensor.radius))
        .collect();

    let mut current = Vec::new();
    for (i, &(entity, position, radius)) in bodies.iter().enumerate() {
        if hand
            .iter()
            .any(|&(centre, r)| spheres_overlap(position, radius, centre, r))
        {
            current.push(ContactEvent::hand(entity));
        }
        for &(other, other_position, other_radius) in bodies.iter().skip(i + 1) {
            if spheres_overlap(position, radius, other_position, other_radius) {
                current.push(ContactEvent::creature(entity, other));
                current.push(ContactEvent::creature(other, entity));
            }
        }
    }
    inbox.extend(overlaps.begin_edges(current));
}
