//! Contact-begin events delivered by the physics layer.

use bevy::prelude::{Entity, Resource};

/// What a creature's volume started overlapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContactTag {
    /// The tracked hand or one of its fingertip proxies.
    Hand,
    /// Another creature.
    Creature(Entity),
    /// Any other tagged volume; ignored by arbitration.
    Other(String),
}

/// A creature started overlapping a tagged volume.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactEvent {
    /// Creature whose volume was entered.
    pub creature: Entity,
    /// What entered it.
    pub other: ContactTag,
}

impl ContactEvent {
    /// Hand touching `creature`.
    #[must_use]
    pub const fn hand(creature: Entity) -> Self {
        Self {
            creature,
            other: ContactTag::Hand,
        }
    }

    /// `creature` bumping into `other`.
    #[must_use]
    pub const fn creature(creature: Entity, other: Entity) -> Self {
        Self {
            creature,
            other: ContactTag::Creature(other),
        }
    }
}

/// Buffered contact events awaiting arbitration.
#[derive(Resource, Debug, Default)]
pub struct ContactInbox {
    events: Vec<ContactEvent>,
}

impl ContactInbox {
    /// Queues one event.
    pub fn push(&mut self, event: ContactEvent) {
        self.events.push(event);
    }

    /// Queues several events in order.
    pub fn extend<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = ContactEvent>,
    {
        self.events.extend(events);
    }

    /// Removes and yields every queued event in arrival order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, ContactEvent> {
        self.events.drain(..)
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }
}
