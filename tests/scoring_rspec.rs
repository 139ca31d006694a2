//! Behavioural test: touching creatures with a tracked hand.

#[path = "support/thread_safe_app.rs"]
mod thread_safe_app;

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use std::sync::MutexGuard;
use std::time::Duration;

use bevy::prelude::*;
use glam::Vec2;
use rspec::block::Context as Scenario;
use rspec_runner::run_serial;
use shoal::{
    creature_bundle, CreatureController, CreatureMode, CreatureRng, CreatureState, CreatureTraits,
    LandmarkBuffer, SessionState, ShoalConfig, SwimArea,
};
use test_utils::{headless_app, open_hand};
use thread_safe_app::{lock_app, share, SharedApp, ThreadSafeApp};

const HAND_AT: Vec3 = Vec3::new(2.0, 0.0, 0.0);
const PARKED: Vec3 = Vec3::new(-3.0, 0.0, 0.0);

#[derive(Debug, Clone)]
struct TankFixture {
    app: SharedApp,
    creature: Entity,
}

impl TankFixture {
    fn bootstrap() -> Self {
        let mut config = ShoalConfig::default();
        config.pose.smoothing = 1.0;
        let mut app = headless_app(config, Duration::from_millis(100));
        let controller = app.world().resource::<CreatureController>().clone();
        let mut rng = CreatureRng::seeded(3);
        let state = controller.spawn_state(PARKED, Vec3::NEG_Z, &mut rng.0, 0.0);
        let tank = config
            .tank_volume()
            .unwrap_or_else(|err| panic!("default tank rejected: {err}"));
        let creature = app
            .world_mut()
            .spawn(creature_bundle(
                state,
                CreatureTraits { score_value: 25 },
                rng,
                SwimArea::world(tank),
                0.1,
            ))
            .id();
        Self {
            app: share(app),
            creature,
        }
    }

    fn app_guard(&self) -> MutexGuard<'_, ThreadSafeApp> {
        lock_app(&self.app)
    }

    /// Parks a calm creature away from the hand and lets the contact end.
    fn reset(&self) {
        let mut app = self.app_guard();
        app.world().resource::<SessionState>().reset_round();
        if let Some(mut state) = app.world_mut().get_mut::<CreatureState>(self.creature) {
            state.position = PARKED;
            state.reset_scoring();
            state.mode = CreatureMode::Cruising;
        }
        app.update();
    }

    fn track_hand(&self, frames: usize) {
        let mut app = self.app_guard();
        for _ in 0..frames {
            app.world()
                .resource::<LandmarkBuffer>()
                .publish(open_hand(Vec2::new(0.75, 0.5), 0.15));
            app.update();
        }
    }

    fn idle(&self, frames: usize) {
        let mut app = self.app_guard();
        for _ in 0..frames {
            app.update();
        }
    }

    fn swim_into_hand(&self) {
        let mut app = self.app_guard();
        if let Some(mut state) = app.world_mut().get_mut::<CreatureState>(self.creature) {
            state.position = HAND_AT;
        }
        app.update();
    }

    fn score(&self) -> u64 {
        self.app_guard().world().resource::<SessionState>().score()
    }

    fn creature_alarmed(&self) -> bool {
        self.app_guard()
            .world()
            .get::<CreatureState>(self.creature)
            .is_some_and(CreatureState::is_alarmed)
    }
}

#[test]
fn touching_creatures_scores_points() {
    let fixture = TankFixture::bootstrap();
    run_serial(&rspec::given(
        "a tank with one creature and a tracked hand",
        fixture,
        |scenario: &mut Scenario<TankFixture>| {
            scenario.before_each(|tank| tank.reset());

            scenario.when("the creature swims into the visible hand", |ctx| {
                ctx.before_each(|tank| {
                    tank.track_hand(1);
                    tank.swim_into_hand();
                });
                ctx.then("the creature's value is added to the score", |tank| {
                    assert_eq!(tank.score(), 25);
                });
                ctx.then("the creature flees", |tank| {
                    assert!(tank.creature_alarmed());
                });
            });

            scenario.when("the hand has not been seen for a while", |ctx| {
                ctx.before_each(|tank| {
                    tank.track_hand(1);
                    tank.idle(4);
                    tank.swim_into_hand();
                });
                ctx.then("no points are awarded", |tank| {
                    assert_eq!(tank.score(), 0);
                });
                ctx.then("the creature still flees", |tank| {
                    assert!(tank.creature_alarmed());
                });
            });
        },
    ));
}
