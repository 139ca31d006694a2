//! Bevy plugin wiring the tick phases into the schedule.

use bevy::prelude::*;

use super::systems::{
    arbitrate_contacts_system, camera_mode_gate_system, log_tick_anomaly, restart_round,
    steer_creatures_system, sync_creature_transforms_system, update_hand_pose_system,
};
use super::{AnomalyContext, TickAnomaly, TickPhase};
use crate::arbiter::InteractionArbiter;
use crate::config::ShoalConfig;
use crate::contacts::ContactInbox;
use crate::creature::CreatureController;
use crate::landmark_buffer::LandmarkBuffer;
use crate::physics::{proximity_contacts_system, OverlapTracker};
use crate::pose::{HandTracker, PoseEstimator};
use crate::session::SessionState;

/// Installs the shoal resources and per-frame systems.
///
/// A [`LandmarkBuffer`] or [`SessionState`] inserted before the plugin is
/// kept, so a producer thread can be handed its clone up front.
#[derive(Debug, Clone, Default)]
pub struct ShoalPlugin {
    /// Configuration for every subsystem.
    pub config: ShoalConfig,
}

impl ShoalPlugin {
    /// Plugin using `config`.
    #[must_use]
    pub const fn new(config: ShoalConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ShoalPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(log_tick_anomaly);
        app.add_observer(restart_round);

        let config = self.config;
        if let Err(e) = config.validate() {
            app.world_mut()
                .trigger(TickAnomaly::new(AnomalyContext::Init, e.to_string()));
            return;
        }
        let estimator = match PoseEstimator::new(config.pose) {
            Ok(estimator) => estimator,
            Err(e) => {
                app.world_mut()
                    .trigger(TickAnomaly::new(AnomalyContext::Init, e.to_string()));
                return;
            }
        };

        app.insert_resource(config)
            .init_resource::<LandmarkBuffer>()
            .init_resource::<SessionState>()
            .init_resource::<ContactInbox>()
            .insert_resource(HandTracker(estimator))
            .insert_resource(CreatureController::new(config.creatures))
            .insert_resource(InteractionArbiter::new(config.arbiter));

        app.configure_sets(
            Update,
            (
                TickPhase::Pose,
                TickPhase::Contacts,
                TickPhase::Arbitration,
                TickPhase::Creatures,
                TickPhase::Presentation,
            )
                .chain(),
        );
        app.add_systems(
            Update,
            (
                (update_hand_pose_system, camera_mode_gate_system)
                    .chain()
                    .in_set(TickPhase::Pose),
                arbitrate_contacts_system.in_set(TickPhase::Arbitration),
                steer_creatures_system.in_set(TickPhase::Creatures),
                sync_creature_transforms_system.in_set(TickPhase::Presentation),
            ),
        );

        if config.contacts.enabled {
            app.init_resource::<OverlapTracker>();
            app.add_systems(Update, proximity_contacts_system.in_set(TickPhase::Contacts));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn plugin_initialises_resources() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ShoalPlugin::default());
        let world = app.world();
        assert!(world.contains_resource::<LandmarkBuffer>());
        assert!(world.contains_resource::<SessionState>());
        assert!(world.contains_resource::<HandTracker>());
        assert!(world.contains_resource::<OverlapTracker>());
        app.update();
    }

    #[rstest]
    fn preinserted_buffer_is_kept() {
        let buffer = LandmarkBuffer::default();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(buffer.clone());
        app.add_plugins(ShoalPlugin::default());
        buffer.publish(crate::LandmarkSample::new(vec![
            Vec3::ZERO;
            crate::LANDMARK_COUNT
        ]));
        assert!(app.world().resource::<LandmarkBuffer>().has_fresh());
    }

    #[rstest]
    fn invalid_config_installs_nothing() {
        let mut config = ShoalConfig::default();
        config.pose.smoothing = 0.0;
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ShoalPlugin::new(config));
        assert!(!app.world().contains_resource::<HandTracker>());
    }

    #[rstest]
    fn external_contacts_skip_the_proximity_source() {
        let mut config = ShoalConfig::default();
        config.contacts.enabled = false;
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ShoalPlugin::new(config));
        assert!(!app.world().contains_resource::<OverlapTracker>());
        assert!(app.world().contains_resource::<ContactInbox>());
    }
}
