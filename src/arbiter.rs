//! Scoring decisions for hand/creature contacts.
//!
//! A touch first has to clear the creature's cooldown; touches inside the
//! window are ignored outright. A touch that clears it stamps the cooldown
//! and is then checked against the remaining gates. Only when every gate
//! passes is the score committed, but the creature is startled either way
//! unless `effects_after_denied` is off.

use bevy::prelude::Resource;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::creature::{CreatureController, CreatureState, CreatureTraits};
use crate::session::SessionState;

/// Scoring policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Minimum seconds between two effective touches of one creature.
    pub score_cooldown: f32,
    /// Deny scoring while the hand is not visible.
    pub require_hand_visible: bool,
    /// Each creature scores at most once per round.
    pub score_once_per_creature: bool,
    /// Startle and pulse even when the score is denied.
    pub effects_after_denied: bool,
    /// Block interaction unless the camera yaw is below this many degrees.
    pub camera_yaw_gate: Option<f32>,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            score_cooldown: 1.0,
            require_hand_visible: true,
            score_once_per_creature: false,
            effects_after_denied: true,
            camera_yaw_gate: None,
        }
    }
}

/// Gate that denied a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The hand was not visible.
    HandHidden,
    /// An external mode blocked interaction.
    InteractionBlocked,
    /// The creature already scored this round.
    AlreadyScored,
}

/// Result of [`InteractionArbiter::resolve_touch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// Points were added.
    Scored {
        /// Points awarded for this touch.
        points: u32,
        /// Session score after the increment.
        total: u64,
    },
    /// A gate denied the score.
    Denied {
        /// First failing gate.
        gate: Gate,
        /// Whether the creature was still startled.
        startled: bool,
    },
    /// Inside the cooldown window; nothing happened.
    Ignored,
}

/// Applies [`ArbiterConfig`] to incoming hand contacts.
#[derive(Resource, Debug, Clone, Default)]
pub struct InteractionArbiter {
    config: ArbiterConfig,
}

impl InteractionArbiter {
    /// Arbiter with the given policy.
    #[must_use]
    pub const fn new(config: ArbiterConfig) -> Self {
        Self { config }
    }

    /// Active policy.
    #[must_use]
    pub const fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    /// First gate that denies scoring, if any.
    #[must_use]
    pub fn denying_gate(&self, session: &SessionState, state: &CreatureState) -> Option<Gate> {
        if self.config.require_hand_visible && !session.hand_visible() {
            Some(Gate::HandHidden)
        } else if session.interaction_blocked() {
            Some(Gate::InteractionBlocked)
        } else if self.config.score_once_per_creature && state.has_scored_once {
            Some(Gate::AlreadyScored)
        } else {
            None
        }
    }

    /// Whether the creature's cooldown has elapsed at `now`.
    #[must_use]
    pub fn cooldown_elapsed(&self, state: &CreatureState, now: f32) -> bool {
        state
            .last_score_time
            .is_none_or(|last| now - last >= self.config.score_cooldown)
    }

    /// Resolves one hand touch on a creature at `now`.
    pub fn resolve_touch<R: Rng + ?Sized>(
        &self,
        session: &SessionState,
        state: &mut CreatureState,
        traits: &CreatureTraits,
        controller: &CreatureController,
        rng: &mut R,
        now: f32,
    ) -> TouchOutcome {
        if !self.cooldown_elapsed(state, now) {
            debug!("touch at {now:.2}s ignored: cooldown");
            return TouchOutcome::Ignored;
        }
        state.last_score_time = Some(now);

        if let Some(gate) = self.denying_gate(session, state) {
            let startled = self.config.effects_after_denied;
            if startled {
                controller.startle(state, rng, now);
            }
            debug!("touch at {now:.2}s denied by {gate:?}");
            return TouchOutcome::Denied { gate, startled };
        }

        let total = session.add_score(traits.score_value);
        if self.config.score_once_per_creature {
            state.has_scored_once = true;
        }
        controller.startle(state, rng, now);
        debug!("touch at {now:.2}s scored {} (total {total})", traits.score_value);
        TouchOutcome::Scored {
            points: traits.score_value,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn setup() -> (SessionState, CreatureState, CreatureController, StdRng) {
        let controller = CreatureController::default();
        let mut rng = StdRng::seed_from_u64(4);
        let state = controller.spawn_state(Vec3::ZERO, Vec3::NEG_Z, &mut rng, 0.0);
        let session = SessionState::new();
        session.set_hand_visible(true);
        (session, state, controller, rng)
    }

    #[rstest]
    fn touch_within_cooldown_is_ignored() {
        let (session, mut state, controller, mut rng) = setup();
        let arbiter = InteractionArbiter::default();
        let traits = CreatureTraits::default();
        let first = arbiter.resolve_touch(&session, &mut state, &traits, &controller, &mut rng, 5.0);
        assert_eq!(first, TouchOutcome::Scored { points: 10, total: 10 });
        let before = state.clone();
        let second = arbiter.resolve_touch(&session, &mut state, &traits, &controller, &mut rng, 5.5);
        assert_eq!(second, TouchOutcome::Ignored);
        assert_eq!(state, before);
        assert_eq!(session.score(), 10);
    }

    #[rstest]
    fn denied_touch_still_stamps_cooldown() {
        let (session, mut state, controller, mut rng) = setup();
        session.set_hand_visible(false);
        let arbiter = InteractionArbiter::default();
        let outcome = arbiter.resolve_touch(
            &session,
            &mut state,
            &CreatureTraits::default(),
            &controller,
            &mut rng,
            2.0,
        );
        assert_eq!(
            outcome,
            TouchOutcome::Denied {
                gate: Gate::HandHidden,
                startled: true
            }
        );
        assert_eq!(state.last_score_time, Some(2.0));
        assert!(state.is_alarmed());
    }

    #[rstest]
    fn effects_can_be_suppressed_on_denial() {
        let (session, mut state, controller, mut rng) = setup();
        session.set_interaction_blocked(true);
        let arbiter = InteractionArbiter::new(ArbiterConfig {
            effects_after_denied: false,
            ..ArbiterConfig::default()
        });
        let outcome = arbiter.resolve_touch(
            &session,
            &mut state,
            &CreatureTraits::default(),
            &controller,
            &mut rng,
            2.0,
        );
        assert_eq!(
            outcome,
            TouchOutcome::Denied {
                gate: Gate::InteractionBlocked,
                startled: false
            }
        );
        assert!(!state.is_alarmed());
        assert_eq!(state.pulse_until, None);
    }
}
