//! Per-tick creature update, startle and avoidance.

use bevy::prelude::Resource;
use glam::{Quat, Vec3};
use log::debug;
use rand::Rng;

use super::{
    desired_speed, initial_change_delay, next_change_delay, next_heading, random_heading,
    reseed_if_stalled, steer, target_orientation, turn_towards, CreatureConfig, CreatureMode,
    CreatureState,
};
use crate::bounds::{AnchorFrame, BoundingVolume};
use crate::vector_math::{look_rotation, normalize_above, random_unit_vector};
use crate::MIN_AXIS_LENGTH;

/// Swim volume resolved against its anchor for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confinement {
    /// Admissible region in the anchor frame.
    pub volume: BoundingVolume,
    /// Anchor frame of the volume.
    pub frame: AnchorFrame,
}

/// What happened during [`CreatureController::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// The alarm expired this tick.
    pub calmed: bool,
    /// A scheduled heading change fired.
    pub redirected: bool,
    /// The creature hit a wall and was clamped back inside.
    pub contained: bool,
}

/// Shared steering logic for every creature.
#[derive(Resource, Debug, Clone, Default)]
pub struct CreatureController {
    config: CreatureConfig,
}

impl CreatureController {
    /// Controller with the given tuning.
    #[must_use]
    pub const fn new(config: CreatureConfig) -> Self {
        Self { config }
    }

    /// Active tuning.
    #[must_use]
    pub const fn config(&self) -> &CreatureConfig {
        &self.config
    }

    /// Initial state for a creature placed at `position` facing `forward`.
    ///
    /// The first heading change is scheduled uniformly within one interval so
    /// creatures spawned together turn at different times.
    pub fn spawn_state<R: Rng + ?Sized>(
        &self,
        position: Vec3,
        forward: Vec3,
        rng: &mut R,
        now: f32,
    ) -> CreatureState {
        let forward = normalize_above(forward, MIN_AXIS_LENGTH).unwrap_or(Vec3::NEG_Z);
        CreatureState {
            position,
            velocity: forward * self.config.base_speed,
            orientation: look_rotation(forward, Vec3::Y).unwrap_or(Quat::IDENTITY),
            target_direction: random_heading(rng, self.config.vertical_damping),
            mode: CreatureMode::Cruising,
            next_direction_change: now + initial_change_delay(&self.config, rng),
            last_score_time: None,
            has_scored_once: false,
            phase: rng.gen_range(0.0..std::f32::consts::TAU),
            noise_seed: rng.gen(),
            pulse_until: None,
        }
    }

    /// Advances one creature by `dt` seconds ending at `now`.
    ///
    /// Without a `confinement` the creature moves freely for this tick.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        state: &mut CreatureState,
        confinement: Option<&Confinement>,
        rng: &mut R,
        now: f32,
        dt: f32,
    ) -> TickReport {
        let config = &self.config;
        let mut report = TickReport::default();

        if let CreatureMode::Alarmed { until } = state.mode {
            if now >= until {
                state.mode = CreatureMode::Cruising;
                report.calmed = true;
                debug!("creature calmed down at {now:.2}s");
            }
        }

        if !state.is_alarmed() && now >= state.next_direction_change {
            state.target_direction = next_heading(state.target_direction, config, rng);
            state.next_direction_change = now + next_change_delay(config, rng);
            report.redirected = true;
        }

        let speed = desired_speed(config, state.mode, state.phase, state.noise_seed, now);
        let rate = self.turn_rate(state.mode);
        let velocity = steer(state.velocity, state.target_direction, speed, rate, dt);
        state.velocity = reseed_if_stalled(velocity, speed, rng);

        let next = state.position + state.velocity * dt;
        state.position = match confinement {
            Some(Confinement { volume, frame }) => {
                let out = volume.contain(
                    frame.to_local_point(next),
                    frame.to_local_direction(state.velocity),
                );
                if out.hit {
                    state.velocity = frame.to_world_direction(out.velocity);
                    if let Some(heading) = normalize_above(state.velocity, MIN_AXIS_LENGTH) {
                        state.target_direction = heading;
                    }
                    report.contained = true;
                }
                frame.to_world_point(out.position)
            }
            None => next,
        };

        if let Some(target) = target_orientation(state.orientation, state.velocity, config) {
            state.orientation = turn_towards(state.orientation, target, rate, dt);
        }

        if state.pulse_until.is_some_and(|until| now >= until) {
            state.pulse_until = None;
        }
        report
    }

    /// Switches to Alarmed with a fresh escape heading and starts the pulse.
    pub fn startle<R: Rng + ?Sized>(&self, state: &mut CreatureState, rng: &mut R, now: f32) {
        let heading = random_unit_vector(rng);
        state.mode = CreatureMode::Alarmed {
            until: now + self.config.alarmed_duration,
        };
        state.target_direction = heading;
        state.velocity = heading * self.config.base_speed * self.config.escape_speed_multiplier;
        state.pulse_until = Some(now + self.config.touch_pulse_duration);
        debug!("creature startled at {now:.2}s");
    }

    /// Steers away from another creature at `other`.
    ///
    /// The new heading points away from the other creature, turned by a
    /// small random yaw. Alarmed creatures keep their escape heading.
    pub fn avoid<R: Rng + ?Sized>(&self, state: &mut CreatureState, other: Vec3, rng: &mut R) {
        if state.is_alarmed() {
            return;
        }
        let away = normalize_above(state.position - other, MIN_AXIS_LENGTH)
            .unwrap_or_else(|| random_heading(rng, self.config.vertical_damping));
        let limit = self.config.avoidance_jitter_degrees.abs().to_radians();
        let yaw = if limit > 0.0 {
            rng.gen_range(-limit..=limit)
        } else {
            0.0
        };
        state.target_direction = (Quat::from_rotation_y(yaw) * away).normalize();
    }

    fn turn_rate(&self, mode: CreatureMode) -> f32 {
        match mode {
            CreatureMode::Cruising => self.config.turn_rate,
            CreatureMode::Alarmed { .. } => {
                self.config.turn_rate * self.config.alarmed_turn_multiplier
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::{fixture, rstest};

    #[fixture]
    fn controller() -> CreatureController {
        CreatureController::default()
    }

    #[fixture]
    fn rng() -> StdRng {
        StdRng::seed_from_u64(21)
    }

    fn tank() -> Confinement {
        Confinement {
            volume: BoundingVolume::new(Vec3::splat(-1.0), Vec3::splat(1.0), 0.1)
                .unwrap_or_else(|err| panic!("{err}")),
            frame: AnchorFrame::IDENTITY,
        }
    }

    #[rstest]
    fn startle_sets_escape_velocity(controller: CreatureController, mut rng: StdRng) {
        let mut state = controller.spawn_state(Vec3::ZERO, Vec3::NEG_Z, &mut rng, 0.0);
        controller.startle(&mut state, &mut rng, 2.0);
        assert_eq!(state.mode, CreatureMode::Alarmed { until: 3.5 });
        assert_relative_eq!(state.velocity.length(), 0.155 * 2.5, epsilon = 1e-5);
        assert_eq!(state.pulse_until, Some(2.3));
    }

    #[rstest]
    fn alarm_expires_at_deadline(controller: CreatureController, mut rng: StdRng) {
        let mut state = controller.spawn_state(Vec3::ZERO, Vec3::NEG_Z, &mut rng, 0.0);
        controller.startle(&mut state, &mut rng, 0.0);
        let heading = state.target_direction;
        let report = controller.tick(&mut state, None, &mut rng, 1.0, 0.05);
        assert!(!report.calmed);
        assert_eq!(state.target_direction, heading);
        let report = controller.tick(&mut state, None, &mut rng, 1.5, 0.05);
        assert!(report.calmed);
        assert!(!state.is_alarmed());
    }

    #[rstest]
    fn wall_hit_reflects_and_retargets(controller: CreatureController, mut rng: StdRng) {
        let mut state = controller.spawn_state(Vec3::new(0.89, 0.0, 0.0), Vec3::X, &mut rng, 0.0);
        state.velocity = Vec3::new(1.0, 0.0, 0.0);
        state.target_direction = Vec3::X;
        state.next_direction_change = 100.0;
        let report = controller.tick(&mut state, Some(&tank()), &mut rng, 0.1, 0.1);
        assert!(report.contained);
        assert!(state.velocity.x < 0.0);
        assert!(state.target_direction.x < 0.0);
        assert_relative_eq!(state.position.x, 0.9, epsilon = 1e-5);
    }

    #[rstest]
    fn avoid_points_away_from_neighbour(controller: CreatureController, mut rng: StdRng) {
        let mut state = controller.spawn_state(Vec3::ZERO, Vec3::NEG_Z, &mut rng, 0.0);
        controller.avoid(&mut state, Vec3::new(0.0, 0.0, -0.5), &mut rng);
        assert!(state.target_direction.z > 0.9);
    }

    #[rstest]
    fn widest_admissible_steering_keeps_ticking(mut rng: StdRng) {
        let controller = CreatureController::new(CreatureConfig {
            direction_interval: 0.2,
            direction_jitter: 0.2,
            minor_turn_degrees: 180.0,
            avoidance_jitter_degrees: 180.0,
            max_tilt_degrees: 90.0,
            major_turn_chance: 0.0,
            ..CreatureConfig::default()
        });
        let mut state = controller.spawn_state(Vec3::ZERO, Vec3::NEG_Z, &mut rng, 0.0);
        for step in 1..=200_u16 {
            let now = f32::from(step) * 0.05;
            controller.tick(&mut state, Some(&tank()), &mut rng, now, 0.05);
            controller.avoid(&mut state, Vec3::new(0.0, 0.0, -0.1), &mut rng);
        }
        assert!(state.position.is_finite());
        assert!(state.target_direction.is_normalized());
    }
}
