//! End-to-end frames through `ShoalPlugin` in a headless app.

#[path = "support/anomaly_capture.rs"]
mod anomaly_capture;

use std::time::Duration;

use anomaly_capture::{captured_contexts, install_anomaly_capture};
use bevy::prelude::*;
use glam::Vec2;
use rstest::rstest;
use shoal::tick::AnomalyContext;
use shoal::{
    creature_bundle, ContactEvent, ContactInbox, ContactTag, CreatureController, CreatureRng,
    CreatureState, CreatureTraits, HandProxy, HandTracker, InteractionCamera, LandmarkBuffer,
    RoundRestart, SessionState, ShoalConfig, SwimArea,
};
use test_utils::{headless_app, open_hand, truncated_sample};

const FRAME: Duration = Duration::from_millis(100);
/// Where a reference-size hand at image (0.75, 0.5) lands with default
/// camera settings.
const HAND_AT: Vec3 = Vec3::new(2.0, 0.0, 0.0);

fn app_with(config: ShoalConfig) -> App {
    let mut app = headless_app(config, FRAME);
    install_anomaly_capture(&mut app);
    app
}

fn immediate_config() -> ShoalConfig {
    let mut config = ShoalConfig::default();
    config.pose.smoothing = 1.0;
    config
}

fn publish_hand(app: &App) {
    app.world()
        .resource::<LandmarkBuffer>()
        .publish(open_hand(Vec2::new(0.75, 0.5), 0.15));
}

fn spawn_creature(app: &mut App, position: Vec3, area: Option<SwimArea>) -> Entity {
    let controller = app.world().resource::<CreatureController>().clone();
    let tank = app
        .world()
        .resource::<ShoalConfig>()
        .tank_volume()
        .unwrap_or_else(|err| panic!("default tank rejected: {err}"));
    let mut rng = CreatureRng::seeded(position.x.to_bits().into());
    let state = controller.spawn_state(position, Vec3::NEG_Z, &mut rng.0, 0.0);
    app.world_mut()
        .spawn(creature_bundle(
            state,
            CreatureTraits::default(),
            rng,
            area.unwrap_or(SwimArea::world(tank)),
            0.1,
        ))
        .id()
}

fn creature(app: &App, entity: Entity) -> CreatureState {
    app.world()
        .get::<CreatureState>(entity)
        .cloned()
        .unwrap_or_else(|| panic!("{entity:?} has no creature state"))
}

/// Pushes the next scheduled heading change out of the test's reach.
fn hold_course(app: &mut App, entity: Entity) {
    if let Some(mut state) = app.world_mut().get_mut::<CreatureState>(entity) {
        state.next_direction_change = 1_000.0;
    }
}

fn session(app: &App) -> SessionState {
    app.world().resource::<SessionState>().clone()
}

#[rstest]
fn hand_proxy_follows_published_samples() {
    let mut app = app_with(immediate_config());
    let proxy = app
        .world_mut()
        .spawn((Transform::default(), HandProxy))
        .id();

    publish_hand(&app);
    app.update();

    let transform = app
        .world()
        .get::<Transform>(proxy)
        .copied()
        .unwrap_or_else(|| panic!("proxy lost its transform"));
    assert!(transform.translation.distance(HAND_AT) < 1e-4);
    assert!(session(&app).hand_visible());
}

#[rstest]
fn malformed_sample_leaves_the_pose_alone() {
    let mut app = app_with(immediate_config());
    publish_hand(&app);
    app.update();
    let before = *app.world().resource::<HandTracker>().pose();

    app.world()
        .resource::<LandmarkBuffer>()
        .publish(truncated_sample(10));
    app.update();

    let after = *app.world().resource::<HandTracker>().pose();
    assert_eq!(after.position, before.position);
    assert_eq!(after.orientation, before.orientation);
    assert_eq!(after.last_update, before.last_update);
}

#[rstest]
fn touching_a_creature_scores_once_and_startles_it() {
    let mut app = app_with(immediate_config());
    let fish = spawn_creature(&mut app, HAND_AT, None);

    publish_hand(&app);
    app.update();

    assert_eq!(session(&app).score(), 10);
    let state = creature(&app, fish);
    assert!(state.is_alarmed());
    assert!(state.last_score_time.is_some());

    for _ in 0..5 {
        publish_hand(&app);
        app.update();
    }
    assert_eq!(session(&app).score(), 10, "held contact must not rescore");
}

#[rstest]
fn hidden_hand_startles_without_scoring() {
    let mut app = app_with(immediate_config());
    let fish = spawn_creature(&mut app, Vec3::new(-3.0, 0.0, 0.0), None);

    publish_hand(&app);
    app.update();
    for _ in 0..3 {
        app.update();
    }
    assert!(!session(&app).hand_visible());

    if let Some(mut state) = app.world_mut().get_mut::<CreatureState>(fish) {
        state.position = HAND_AT;
    }
    app.update();

    assert_eq!(session(&app).score(), 0);
    assert!(creature(&app, fish).is_alarmed());
}

#[rstest]
fn round_restart_clears_score_and_memory() {
    let mut app = app_with(immediate_config());
    let fish = spawn_creature(&mut app, HAND_AT, None);
    publish_hand(&app);
    app.update();
    assert_eq!(session(&app).score(), 10);

    app.world_mut().trigger(RoundRestart);

    let snapshot = session(&app).snapshot();
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.round, 1);
    assert_eq!(creature(&app, fish).last_score_time, None);
}

#[rstest]
fn missing_anchor_is_reported_once_and_skips_containment() {
    let mut app = app_with(ShoalConfig::default());
    let gone = app.world_mut().spawn(Transform::IDENTITY).id();
    app.world_mut().despawn(gone);
    let tank = ShoalConfig::default()
        .tank_volume()
        .unwrap_or_else(|err| panic!("default tank rejected: {err}"));
    spawn_creature(
        &mut app,
        Vec3::new(-3.0, 0.0, 0.0),
        Some(SwimArea::anchored(tank, gone)),
    );

    for _ in 0..3 {
        app.update();
    }
    assert_eq!(
        captured_contexts(&app),
        vec![AnomalyContext::MissingAnchor]
    );
}

#[rstest]
#[case::facing_the_tank(10.0, false)]
#[case::turned_away(90.0, true)]
#[case::turned_the_other_way(-90.0, false)]
fn camera_yaw_gates_interaction(#[case] yaw_degrees: f32, #[case] blocked: bool) {
    let mut config = ShoalConfig::default();
    config.arbiter.camera_yaw_gate = Some(45.0);
    let mut app = app_with(config);
    app.world_mut().spawn((
        Transform::from_rotation(Quat::from_rotation_y(yaw_degrees.to_radians())),
        InteractionCamera,
    ));

    app.update();
    assert_eq!(session(&app).interaction_blocked(), blocked);
}

#[rstest]
fn creature_transforms_track_state_inside_the_tank() {
    let mut app = app_with(ShoalConfig::default());
    let fishes: Vec<Entity> = (0..4)
        .map(|i| spawn_creature(&mut app, Vec3::new(i as f32 - 1.5, 0.0, 0.0), None))
        .collect();

    for _ in 0..200 {
        app.update();
    }

    let tank = ShoalConfig::default()
        .tank_volume()
        .unwrap_or_else(|err| panic!("default tank rejected: {err}"));
    for fish in fishes {
        let state = creature(&app, fish);
        let transform = app
            .world()
            .get::<Transform>(fish)
            .copied()
            .unwrap_or_else(|| panic!("creature lost its transform"));
        assert_eq!(transform.translation, state.position);
        assert_eq!(transform.rotation, state.orientation);
        assert!(tank.contains(state.position), "{} escaped", state.position);
    }
}

#[rstest]
fn overlapping_creatures_steer_apart() {
    let mut app = app_with(ShoalConfig::default());
    let left = spawn_creature(&mut app, Vec3::new(-0.05, 0.0, 0.0), None);
    let right = spawn_creature(&mut app, Vec3::new(0.05, 0.0, 0.0), None);
    hold_course(&mut app, left);
    hold_course(&mut app, right);

    app.update();

    let left_state = creature(&app, left);
    let right_state = creature(&app, right);
    assert!(
        left_state.target_direction.x < -0.9,
        "left heads {}",
        left_state.target_direction
    );
    assert!(
        right_state.target_direction.x > 0.9,
        "right heads {}",
        right_state.target_direction
    );
    assert!(!left_state.is_alarmed() && !right_state.is_alarmed());
    assert_eq!(session(&app).score(), 0);
}

#[rstest]
fn untagged_contacts_change_nothing() {
    let mut app = app_with(immediate_config());
    let fish = spawn_creature(&mut app, Vec3::new(-3.0, 0.0, 0.0), None);
    hold_course(&mut app, fish);
    publish_hand(&app);
    app.update();
    assert!(session(&app).hand_visible());
    let heading = creature(&app, fish).target_direction;

    app.world_mut()
        .resource_mut::<ContactInbox>()
        .push(ContactEvent {
            creature: fish,
            other: ContactTag::Other("rock".into()),
        });
    publish_hand(&app);
    app.update();

    let state = creature(&app, fish);
    assert!(app.world().resource::<ContactInbox>().is_empty());
    assert_eq!(session(&app).score(), 0);
    assert!(!state.is_alarmed());
    assert_eq!(state.last_score_time, None);
    assert_eq!(state.pulse_until, None);
    assert_eq!(state.target_direction, heading);
}
