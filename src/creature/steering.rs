//! Heading selection and velocity steering.

use glam::{Quat, Vec3};
use rand::Rng;

use super::{CreatureConfig, CreatureMode};
use crate::vector_math::{normalize_above, random_unit_vector};
use crate::{
    MIN_AXIS_LENGTH, MIN_DIRECTION_INTERVAL, MINOR_TURN_PITCH_FRACTION, STALL_RESEED_FRACTION,
    STALL_SPEED_SQ,
};

fn flatten(direction: Vec3, vertical_damping: f32, fallback: Vec3) -> Vec3 {
    let damped = Vec3::new(direction.x, direction.y * vertical_damping, direction.z);
    normalize_above(damped, MIN_AXIS_LENGTH).unwrap_or(fallback)
}

/// Random heading biased towards the horizontal plane.
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R, vertical_damping: f32) -> Vec3 {
    flatten(random_unit_vector(rng), vertical_damping, Vec3::NEG_Z)
}

/// Perturbs `current` by up to `max_degrees` of yaw and a quarter as much
/// pitch.
pub fn adjust_heading<R: Rng + ?Sized>(
    current: Vec3,
    rng: &mut R,
    max_degrees: f32,
    vertical_damping: f32,
) -> Vec3 {
    let Some(current) = normalize_above(current, MIN_AXIS_LENGTH) else {
        return random_heading(rng, vertical_damping);
    };
    let limit = max_degrees.abs().to_radians();
    let yaw = if limit > 0.0 {
        rng.gen_range(-limit..=limit)
    } else {
        0.0
    };
    let pitch_limit = limit * MINOR_TURN_PITCH_FRACTION;
    let pitch = if pitch_limit > 0.0 {
        rng.gen_range(-pitch_limit..=pitch_limit)
    } else {
        0.0
    };
    let turned = Quat::from_rotation_y(yaw) * current;
    let right = normalize_above(turned.cross(Vec3::Y), MIN_AXIS_LENGTH).unwrap_or(Vec3::X);
    flatten(Quat::from_axis_angle(right, pitch) * turned, vertical_damping, turned)
}

/// Draws the heading for a scheduled direction change.
pub fn next_heading<R: Rng + ?Sized>(current: Vec3, config: &CreatureConfig, rng: &mut R) -> Vec3 {
    if rng.gen::<f32>() < config.major_turn_chance {
        random_heading(rng, config.vertical_damping)
    } else {
        adjust_heading(
            current,
            rng,
            config.minor_turn_degrees,
            config.vertical_damping,
        )
    }
}

/// Delay until the next heading change: `interval` plus uniform jitter.
pub fn next_change_delay<R: Rng + ?Sized>(config: &CreatureConfig, rng: &mut R) -> f32 {
    let jitter = config.direction_jitter.abs();
    let offset = if jitter > 0.0 {
        rng.gen_range(-jitter..=jitter)
    } else {
        0.0
    };
    (config.direction_interval + offset).max(MIN_DIRECTION_INTERVAL)
}

/// Delay before a newly spawned creature's first heading change.
///
/// Uniform over one interval so a population spawned together does not turn
/// in lockstep.
pub fn initial_change_delay<R: Rng + ?Sized>(config: &CreatureConfig, rng: &mut R) -> f32 {
    let interval = config.direction_interval.max(0.0);
    if interval > 0.0 {
        rng.gen_range(0.0..=interval)
    } else {
        0.0
    }
}

/// Speed the creature steers towards at `now`.
#[must_use]
pub fn desired_speed(
    config: &CreatureConfig,
    mode: CreatureMode,
    phase: f32,
    noise_seed: u32,
    now: f32,
) -> f32 {
    let base = config.base_speed;
    match mode {
        CreatureMode::Alarmed { .. } => base * config.escape_speed_multiplier,
        CreatureMode::Cruising => {
            let Some(variation) = config.speed_variation else {
                return base;
            };
            let wave = (now * variation.frequency + phase).sin();
            let noise = value_noise(noise_seed, now * variation.noise_frequency);
            (base * (1.0 + wave * variation.amplitude + noise * variation.noise_amplitude)).max(0.0)
        }
    }
}

/// Blends `velocity` towards `direction * speed` by `rate * dt`.
#[must_use]
pub fn steer(velocity: Vec3, direction: Vec3, speed: f32, rate: f32, dt: f32) -> Vec3 {
    velocity.lerp(direction * speed, (rate * dt).clamp(0.0, 1.0))
}

/// Replaces a near-zero velocity with a small random one.
pub fn reseed_if_stalled<R: Rng + ?Sized>(velocity: Vec3, speed: f32, rng: &mut R) -> Vec3 {
    if velocity.length_squared() < STALL_SPEED_SQ {
        random_unit_vector(rng) * speed * STALL_RESEED_FRACTION
    } else {
        velocity
    }
}

fn lattice(seed: u32, cell: i32) -> f32 {
    let mut h = seed ^ (cell as u32).wrapping_mul(0x9E37_79B9);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7FEB_352D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846C_A68B);
    h ^= h >> 16;
    (h as f32 / u32::MAX as f32) * 2.0 - 1.0
}

/// Smooth one-dimensional value noise in `[-1, 1]`.
///
/// Continuous in `x`, deterministic for a given `seed`.
#[must_use]
pub fn value_noise(seed: u32, x: f32) -> f32 {
    let cell = x.floor();
    let t = x - cell;
    let smooth = t * t * (3.0 - 2.0 * t);
    let i = cell as i32;
    let a = lattice(seed, i);
    let b = lattice(seed, i.wrapping_add(1));
    a + (b - a) * smooth
}
