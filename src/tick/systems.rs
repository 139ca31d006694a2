//! Systems for each [`TickPhase`](super::TickPhase).

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use hashbrown::HashSet;
use log::{debug, error, info, trace, warn};

use super::{
    AnomalyContext, FingertipProxy, HandProxy, InteractionCamera, RoundRestart, TickAnomaly,
};
use crate::arbiter::{InteractionArbiter, TouchOutcome};
use crate::bounds::AnchorFrame;
use crate::config::ShoalConfig;
use crate::contacts::{ContactInbox, ContactTag};
use crate::creature::{
    Confinement, CreatureController, CreatureRng, CreatureState, CreatureTraits, SwimArea,
};
use crate::landmark_buffer::LandmarkBuffer;
use crate::pose::HandTracker;
use crate::session::{camera_yaw_blocks_interaction, SessionState};

/// Applies the newest landmark sample, refreshes visibility and moves the
/// hand proxies.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems receive resources and queries by value."
)]
pub fn update_hand_pose_system(
    time: Res<Time>,
    buffer: Res<LandmarkBuffer>,
    session: Res<SessionState>,
    mut tracker: ResMut<HandTracker>,
    mut hands: Query<&mut Transform, (With<HandProxy>, Without<FingertipProxy>)>,
    mut tips: Query<(&FingertipProxy, &mut Transform), Without<HandProxy>>,
) {
    let now = time.elapsed_secs();
    if let Some(sample) = buffer.try_take() {
        tracker.update(&sample, now);
    }
    session.set_hand_visible(tracker.refresh(now));

    let pose = *tracker.pose();
    for mut transform in &mut hands {
        transform.translation = pose.position;
        transform.rotation = pose.orientation;
    }
    if let Some(fingertips) = pose.fingertips {
        for (FingertipProxy(index), mut transform) in &mut tips {
            if let Some(tip) = fingertips.get(*index) {
                transform.translation = *tip;
            }
        }
    }
}

/// Derives the interaction-blocked flag from the camera yaw, when the gate
/// is configured.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems receive resources and queries by value."
)]
pub fn camera_mode_gate_system(
    config: Res<ShoalConfig>,
    session: Res<SessionState>,
    cameras: Query<&Transform, With<InteractionCamera>>,
) {
    let Some(gate) = config.arbiter.camera_yaw_gate else {
        return;
    };
    let Ok(camera) = cameras.single() else {
        trace!("no single interaction camera; mode flag unchanged");
        return;
    };
    let (yaw, _, _) = camera.rotation.to_euler(EulerRot::YXZ);
    session.set_interaction_blocked(camera_yaw_blocks_interaction(yaw.to_degrees(), gate));
}

/// Resolves queued contacts: hand touches go through the arbiter, creature
/// bumps trigger avoidance, anything else is dropped.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems receive resources and queries by value."
)]
pub fn arbitrate_contacts_system(
    mut commands: Commands,
    time: Res<Time>,
    session: Res<SessionState>,
    arbiter: Res<InteractionArbiter>,
    controller: Res<CreatureController>,
    mut inbox: ResMut<ContactInbox>,
    mut creatures: Query<(&mut CreatureState, &CreatureTraits, &mut CreatureRng)>,
) {
    if inbox.is_empty() {
        return;
    }
    let now = time.elapsed_secs();
    let events: Vec<_> = inbox.drain().collect();
    for event in events {
        match event.other {
            ContactTag::Hand => {
                let Ok((mut state, traits, mut rng)) = creatures.get_mut(event.creature) else {
                    commands.trigger(TickAnomaly::new(
                        AnomalyContext::UnknownCreature,
                        format!("hand touched {:?}, which is not a creature", event.creature),
                    ));
                    continue;
                };
                let outcome =
                    arbiter.resolve_touch(&session, &mut state, traits, &controller, &mut rng.0, now);
                if let TouchOutcome::Scored { points, total } = outcome {
                    info!("+{points} points (score {total})");
                }
            }
            ContactTag::Creature(other) => {
                let Ok((other_state, _, _)) = creatures.get(other) else {
                    continue;
                };
                let other_position = other_state.position;
                if let Ok((mut state, _, mut rng)) = creatures.get_mut(event.creature) {
                    controller.avoid(&mut state, other_position, &mut rng.0);
                }
            }
            ContactTag::Other(tag) => {
                trace!("ignoring contact with {tag}");
            }
        }
    }
}

/// Advances every creature, resolving its swim area against the anchor.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems receive resources and queries by value."
)]
pub fn steer_creatures_system(
    mut commands: Commands,
    time: Res<Time>,
    controller: Res<CreatureController>,
    anchors: Query<&Transform, Without<CreatureState>>,
    mut creatures: Query<(
        Entity,
        &mut CreatureState,
        &mut CreatureRng,
        Option<&mut SwimArea>,
    )>,
    mut reported: Local<HashSet<Entity>>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();
    let margin = controller.config().spawn_expand_margin;

    for (entity, mut state, mut rng, area) in &mut creatures {
        let confinement = area.and_then(|mut area| {
            let frame = match area.anchor {
                None => AnchorFrame::IDENTITY,
                Some(anchor) => {
                    let Ok(transform) = anchors.get(anchor) else {
                        if reported.insert(entity) {
                            commands.trigger(TickAnomaly::new(
                                AnomalyContext::MissingAnchor,
                                format!("{entity:?} anchors to {anchor:?}, which has no transform"),
                            ));
                        }
                        return None;
                    };
                    AnchorFrame::from_transform(transform)
                }
            };
            area.settle(&frame, state.position, margin);
            Some(Confinement {
                volume: area.volume,
                frame,
            })
        });
        controller.tick(&mut state, confinement.as_ref(), &mut rng.0, now, dt);
    }
}

/// Mirrors creature state into transforms.
pub fn sync_creature_transforms_system(
    mut creatures: Query<(&CreatureState, &mut Transform), Changed<CreatureState>>,
) {
    for (state, mut transform) in &mut creatures {
        transform.translation = state.position;
        transform.rotation = state.orientation;
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value."
)]
pub(super) fn log_tick_anomaly(event: On<TickAnomaly>) {
    let TickAnomaly { context, detail } = event.event();
    match context {
        AnomalyContext::Init => error!("setup rejected: {detail}"),
        AnomalyContext::MissingAnchor | AnomalyContext::UnknownCreature => {
            warn!("tick anomaly ({context:?}): {detail}");
        }
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value."
)]
pub(super) fn restart_round(
    _event: On<RoundRestart>,
    session: Res<SessionState>,
    mut creatures: Query<&mut CreatureState>,
) {
    session.reset_round();
    let mut count = 0_usize;
    for mut state in &mut creatures {
        state.reset_scoring();
        count += 1;
    }
    debug!("cleared scoring memory of {count} creatures");
}
