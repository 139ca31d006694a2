//! Body orientation derived from velocity.

use glam::{EulerRot, Quat, Vec3};

use super::CreatureConfig;
use crate::pose::euler_degrees_to_quat;
use crate::vector_math::{look_rotation, signed_angle_degrees};
use crate::MIN_HEADING_SPEED_SQ;

/// Orientation a creature should settle into given its velocity.
///
/// Heads along the velocity with its vertical part damped, banks into turns
/// by the signed angle between the current facing and the velocity, and
/// pitches with vertical speed. Bank and pitch are limited to
/// `max_tilt_degrees`. Returns `None` when the creature is almost still.
#[must_use]
pub fn target_orientation(current: Quat, velocity: Vec3, config: &CreatureConfig) -> Option<Quat> {
    if velocity.length_squared() < MIN_HEADING_SPEED_SQ {
        return None;
    }
    let heading = Vec3::new(
        velocity.x,
        velocity.y * config.heading_vertical_damping,
        velocity.z,
    );
    let look = look_rotation(heading, Vec3::Y)? * euler_degrees_to_quat(config.forward_offset_degrees);

    let tilt = config.max_tilt_degrees.abs();
    let facing = current * Vec3::NEG_Z;
    let bank = signed_angle_degrees(facing, velocity, Vec3::Y).clamp(-tilt, tilt);
    let pitch = (velocity.y * config.pitch_gain).clamp(-tilt, tilt);
    let lean = Quat::from_euler(EulerRot::YXZ, 0.0, pitch.to_radians(), bank.to_radians());
    Some((look * lean).normalize())
}

/// Slerps `current` towards `target` by `rate * dt`.
#[must_use]
pub fn turn_towards(current: Quat, target: Quat, rate: f32, dt: f32) -> Quat {
    current.slerp(target, (rate * dt).clamp(0.0, 1.0)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    fn still_creatures_keep_their_orientation() {
        let config = CreatureConfig::default();
        assert!(target_orientation(Quat::IDENTITY, Vec3::splat(1e-4), &config).is_none());
    }

    #[rstest]
    fn straight_level_swim_has_no_lean() {
        let config = CreatureConfig::default();
        let target = target_orientation(Quat::IDENTITY, Vec3::new(0.0, 0.0, -0.2), &config)
            .unwrap_or_else(|| panic!("moving creature had no orientation"));
        assert_relative_eq!(target.angle_between(Quat::IDENTITY), 0.0, epsilon = 1e-4);
    }

    #[rstest]
    #[case::hard_left(Vec3::new(-1.0, 0.0, 0.0))]
    #[case::climbing(Vec3::new(0.0, 5.0, -0.1))]
    fn lean_is_limited(#[case] velocity: Vec3) {
        let config = CreatureConfig::default();
        let target = target_orientation(Quat::IDENTITY, velocity, &config)
            .unwrap_or_else(|| panic!("moving creature had no orientation"));
        let heading = Vec3::new(velocity.x, velocity.y * 0.5, velocity.z);
        let look = look_rotation(heading, Vec3::Y).unwrap_or(Quat::IDENTITY);
        let lean = look.inverse() * target;
        let (_, pitch, roll) = lean.to_euler(EulerRot::YXZ);
        assert!(pitch.to_degrees().abs() <= 8.0 + 1e-3);
        assert!(roll.to_degrees().abs() <= 8.0 + 1e-3);
    }

    #[rstest]
    fn turn_rate_is_clamped() {
        let target = Quat::from_rotation_y(1.0);
        let turned = turn_towards(Quat::IDENTITY, target, 5.0, 1.0);
        assert_relative_eq!(turned.angle_between(target), 0.0, epsilon = 1e-4);
    }
}
