//! Basic vector and rotation helpers.
//! Frame construction, signed angles and random directions shared by the pose
//! estimator and the creature controller.
use std::f32::consts::TAU;

use glam::{Mat3, Quat, Vec3};
use rand::Rng;

/// Returns the unit vector along `vector`, or `None` when it is shorter than
/// `min_length` or not finite.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use shoal::vector_math::normalize_above;
///
/// let unit = normalize_above(Vec3::new(3.0, 0.0, 4.0), 1e-4).unwrap();
/// assert!((unit.length() - 1.0).abs() < 1e-6);
/// assert!(normalize_above(Vec3::splat(1e-6), 1e-4).is_none());
/// ```
#[must_use]
pub fn normalize_above(vector: Vec3, min_length: f32) -> Option<Vec3> {
    if !vector.is_finite() || vector.length_squared() < min_length * min_length {
        return None;
    }
    vector.try_normalize()
}

/// Builds the rotation that points local `-Z` along `forward` with local `+Y`
/// as close to `up` as possible.
///
/// Matches the convention of `Transform::looking_to`. Returns `None` when
/// either vector is degenerate or the two are parallel.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use shoal::vector_math::look_rotation;
///
/// let rotation = look_rotation(Vec3::X, Vec3::Y).unwrap();
/// let facing = rotation * Vec3::NEG_Z;
/// assert!((facing - Vec3::X).length() < 1e-5);
/// assert!(look_rotation(Vec3::Y, Vec3::Y).is_none());
/// ```
#[must_use]
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let back = -normalize_above(forward, crate::MIN_AXIS_LENGTH)?;
    let right = normalize_above(up.cross(back), crate::MIN_AXIS_LENGTH)?;
    let true_up = back.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, true_up, back)).normalize())
}

/// Signed angle in degrees from `from` to `to`, measured around `axis`.
///
/// The sign follows the right-hand rule about `axis`. Degenerate inputs give
/// zero.
#[must_use]
pub fn signed_angle_degrees(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let (Some(a), Some(b)) = (
        normalize_above(from, crate::MIN_AXIS_LENGTH),
        normalize_above(to, crate::MIN_AXIS_LENGTH),
    ) else {
        return 0.0;
    };
    let unsigned = a.angle_between(b).to_degrees();
    if axis.dot(a.cross(b)) < 0.0 {
        -unsigned
    } else {
        unsigned
    }
}

/// Wraps an angle in degrees into `(-180, 180]`.
///
/// # Examples
/// ```
/// use shoal::vector_math::wrap_degrees;
/// assert!((wrap_degrees(270.0) + 90.0).abs() < 1e-4);
/// assert!((wrap_degrees(-190.0) - 170.0).abs() < 1e-4);
/// ```
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Draws a direction uniformly distributed over the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..TAU);
    let radius = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(radius * theta.cos(), radius * theta.sin(), z)
}
