//! Numeric thresholds shared across the simulation.
//!
//! Tunable behaviour lives in the configuration types; the values here are
//! guards against degenerate geometry and are not meant to be adjusted per
//! scene.

/// Hand spans shorter than this (in normalised image units) are treated as a
/// lost measurement and skip the pose update entirely.
pub const MIN_HAND_SIZE: f32 = 1e-4;

/// Axis vectors shorter than this cannot anchor an orthonormal frame.
pub const MIN_AXIS_LENGTH: f32 = 1e-4;

/// Squared speed below which a creature is considered stalled and reseeded.
pub const STALL_SPEED_SQ: f32 = 1e-4;

/// Fraction of the desired speed used when reseeding a stalled creature.
pub const STALL_RESEED_FRACTION: f32 = 0.1;

/// Squared speed below which creature orientation is left untouched.
pub const MIN_HEADING_SPEED_SQ: f32 = 1e-4;

/// Shortest allowed gap between two scheduled direction changes, in seconds.
pub const MIN_DIRECTION_INTERVAL: f32 = 0.1;

/// Pitch applied to minor heading adjustments is this fraction of the yaw
/// range.
pub const MINOR_TURN_PITCH_FRACTION: f32 = 0.25;
