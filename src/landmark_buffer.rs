//! Single-slot mailbox between the detector thread and the simulation tick.
//!
//! The detector publishes at its own cadence; the tick takes at most one
//! sample per frame. Samples published between two takes overwrite each other
//! so the tick always sees the freshest frame.

use std::sync::Arc;

use bevy::prelude::Resource;
use parking_lot::Mutex;

use crate::landmarks::LandmarkSample;

#[derive(Debug, Default)]
struct Slot {
    latest: Option<LandmarkSample>,
    fresh: bool,
    published: u64,
    superseded: u64,
}

/// Publish/supersede counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Total samples published since creation.
    pub published: u64,
    /// Samples overwritten before the tick took them.
    pub superseded: u64,
}

/// Cloneable handle to the shared landmark slot.
///
/// Every clone refers to the same slot, so the detector thread keeps one
/// handle and the Bevy world keeps another as a resource.
///
/// # Examples
/// ```
/// use shoal::{LandmarkBuffer, LandmarkSample};
///
/// let buffer = LandmarkBuffer::default();
/// let producer = buffer.clone();
/// producer.publish(LandmarkSample::default());
/// assert!(buffer.try_take().is_some());
/// assert!(buffer.try_take().is_none());
/// ```
#[derive(Resource, Debug, Clone, Default)]
pub struct LandmarkBuffer {
    slot: Arc<Mutex<Slot>>,
}

impl LandmarkBuffer {
    /// Replaces the held sample. Callable from any thread.
    pub fn publish(&self, sample: LandmarkSample) {
        let mut slot = self.slot.lock();
        if slot.fresh {
            slot.superseded += 1;
        }
        slot.latest = Some(sample);
        slot.fresh = true;
        slot.published += 1;
    }

    /// Returns the newest sample not yet taken, clearing the fresh flag.
    ///
    /// The sample stays readable through [`LandmarkBuffer::latest`] so depth
    /// calibration can still inspect it.
    #[must_use]
    pub fn try_take(&self) -> Option<LandmarkSample> {
        let mut slot = self.slot.lock();
        if !slot.fresh {
            return None;
        }
        slot.fresh = false;
        slot.latest.clone()
    }

    /// Most recent sample regardless of whether it was already taken.
    #[must_use]
    pub fn latest(&self) -> Option<LandmarkSample> {
        self.slot.lock().latest.clone()
    }

    /// Whether a sample is waiting for the next tick.
    #[must_use]
    pub fn has_fresh(&self) -> bool {
        self.slot.lock().fresh
    }

    /// Snapshot of the publish counters.
    #[must_use]
    pub fn stats(&self) -> BufferStats {
        let slot = self.slot.lock();
        BufferStats {
            published: slot.published,
            superseded: slot.superseded,
        }
    }
}
