//! Event log for telemetry.
//!
//! The controller records what happened during commands and ticks. Events
//! never drive simulation state; callers drain them with
//! [`EventLog::take_events`] for logging, replay comparison or tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, VehicleKind};

/// Something that happened in the derby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DerbyEvent {
    /// A vehicle entered the arena.
    Spawned {
        /// Simulation time.
        at_ms: u64,
        /// New vehicle.
        id: EntityId,
        /// Its kind.
        kind: VehicleKind,
        /// Spawn position.
        position: Vec2,
    },
    /// Two vehicles overlapped during a sweep.
    Collision {
        /// Simulation time.
        at_ms: u64,
        /// Outer member of the pair.
        first: EntityId,
        /// Inner member of the pair.
        second: EntityId,
    },
    /// A vehicle took a hit and survived.
    Damaged {
        /// Simulation time.
        at_ms: u64,
        /// Vehicle hit.
        id: EntityId,
        /// Damage points after the hit.
        points: u32,
    },
    /// A vehicle left the arena.
    Destroyed {
        /// Simulation time.
        at_ms: u64,
        /// Vehicle destroyed.
        id: EntityId,
        /// Its kind.
        kind: VehicleKind,
        /// Damage points at removal.
        damage_points: u32,
    },
    /// A vehicle shifted gears.
    Reversed {
        /// Simulation time.
        at_ms: u64,
        /// Vehicle.
        id: EntityId,
        /// `true` if now in reverse.
        reversed: bool,
    },
    /// The global siren flag flipped.
    SirensToggled {
        /// Simulation time.
        at_ms: u64,
        /// New state of the flag.
        blinking: bool,
    },
}

/// Append-only event buffer.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<DerbyEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event.
    pub fn push(&mut self, event: DerbyEvent) {
        self.events.push(event);
    }

    /// Drains and returns all recorded events in order.
    pub fn take_events(&mut self) -> Vec<DerbyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[DerbyEvent] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
