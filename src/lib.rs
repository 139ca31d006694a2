//! Library crate providing the Shoal interaction core.
//! A tracked hand swims among steered creatures; touching one scores points.
//! Re-exports the common types and systems for the binary and tests.
pub mod arbiter;
pub mod bounds;
pub mod config;
pub mod constants;
pub mod contacts;
pub mod creature;
pub mod detector;
pub mod landmark_buffer;
pub mod landmarks;
pub mod logging;
pub mod physics;
pub mod pose;
pub mod session;
pub mod tick;
pub mod vector_math;
pub use constants::*;

// Re-export commonly used items
pub use arbiter::{ArbiterConfig, Gate, InteractionArbiter, TouchOutcome};
pub use bounds::{AnchorFrame, BoundingVolume, BoundsConfig, BoundsError, Containment};
pub use config::{ConfigError, ShoalConfig};
pub use contacts::{ContactEvent, ContactInbox, ContactTag};
pub use creature::{
    CreatureConfig, CreatureController, CreatureMode, CreatureRng, CreatureState, CreatureTraits,
    SwimArea,
};
pub use detector::{SyntheticDetector, SyntheticHand};
pub use landmark_buffer::{BufferStats, LandmarkBuffer};
pub use landmarks::{HandLandmarks, LandmarkSample, SampleError, LANDMARK_COUNT};
pub use logging::init as init_logging;
pub use physics::{ContactConfig, ContactSensor};
pub use pose::{HandPose, HandTracker, PoseConfig, PoseEstimator, PoseUpdate};
pub use session::{SessionSnapshot, SessionState};
pub use tick::{
    creature_bundle, FingertipProxy, HandProxy, InteractionCamera, RoundRestart, ShoalPlugin,
    TickAnomaly, TickPhase,
};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use shoal::prelude::*;
    //! ```

    pub use crate::creature_bundle;
    pub use crate::CreatureController;
    pub use crate::CreatureRng;
    pub use crate::CreatureTraits;
    pub use crate::HandProxy;
    pub use crate::LandmarkBuffer;
    pub use crate::SessionState;
    pub use crate::ShoalConfig;
    pub use crate::ShoalPlugin;
    pub use crate::SwimArea;
}
