//! Arena module for the derby.
//!
//! The Arena is the container for every live vehicle. It provides:
//! - Fixed bounds (width × height)
//! - Vehicle storage with deterministic iteration order (`BTreeMap`)
//! - Membership management (insert/remove)
//! - Damage bookkeeping that removes vehicles at tolerance
//!
//! # Architecture
//!
//! Entity IDs are assigned monotonically, so the `BTreeMap`'s key order is
//! creation order. Sweeps over the arena (sirens, gears, collisions) always
//! see vehicles oldest first.
//!
//! The arena never touches the render backend; tearing down a removed
//! vehicle's visual is the caller's job.
//!
//! # Example
//!
//! ```
//! use derby_core::arena::Arena;
//! use derby_core::entity::{Vehicle, VehicleKind};
//!
//! let mut arena = Arena::new(800.0, 600.0);
//!
//! let id = arena.next_id();
//! arena.insert(Vehicle::new(id, VehicleKind::Sedan));
//!
//! assert!(arena.contains(id));
//! assert_eq!(arena.len(), 1);
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::{DamageOutcome, EntityId, Vehicle};

/// Outcome of [`Arena::apply_damage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaDamage {
    /// The vehicle survived with `points` damage.
    Damaged {
        /// Vehicle hit.
        id: EntityId,
        /// Damage points after the hit.
        points: u32,
    },
    /// The vehicle reached tolerance and was removed from the arena.
    Destroyed(Vehicle),
    /// The vehicle was not live; nothing happened.
    Ignored(EntityId),
}

/// Fixed-size arena holding the live vehicles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Arena width and height.
    size: Vec2,
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Live vehicles in creation order.
    vehicles: BTreeMap<EntityId, Vehicle>,
}

impl Arena {
    /// Creates an empty arena of the given size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            next_id: 0,
            vehicles: BTreeMap::new(),
        }
    }

    /// Arena width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.size.x
    }

    /// Arena height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.size.y
    }

    /// The ID the next inserted vehicle must carry.
    ///
    /// Peeking does not consume the ID, so a spawn that fails before
    /// [`insert`](Self::insert) leaves the arena untouched.
    #[must_use]
    pub const fn next_id(&self) -> EntityId {
        EntityId::new(self.next_id)
    }

    /// Adds a vehicle to the live collection.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the vehicle does not carry
    /// [`next_id`](Self::next_id).
    pub fn insert(&mut self, vehicle: Vehicle) -> EntityId {
        let id = vehicle.id();
        debug_assert_eq!(id, self.next_id(), "vehicle inserted out of order");
        self.next_id = self.next_id.max(id.as_u64() + 1);
        self.vehicles.insert(id, vehicle);
        id
    }

    /// Removes a vehicle. Returns `None` if it was not live.
    pub fn remove(&mut self, id: EntityId) -> Option<Vehicle> {
        self.vehicles.remove(&id)
    }

    /// Returns `true` if the vehicle is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.vehicles.contains_key(&id)
    }

    /// Returns a live vehicle.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    /// Returns a live vehicle mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(&id)
    }

    /// Live vehicle IDs in creation order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.vehicles.keys().copied()
    }

    /// Live vehicles in creation order.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles.values()
    }

    /// Number of live vehicles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Returns `true` if no vehicle is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Applies one damage point, removing the vehicle when it reaches
    /// tolerance.
    ///
    /// Damaging a vehicle that is not live violates a precondition: debug
    /// builds panic, release builds log and ignore it.
    pub fn apply_damage(&mut self, id: EntityId) -> ArenaDamage {
        let Some(vehicle) = self.vehicles.get_mut(&id) else {
            debug_assert!(false, "damage applied to vehicle {id} which is not live");
            warn!(%id, "damage applied to vehicle that is not live");
            return ArenaDamage::Ignored(id);
        };
        match vehicle.apply_damage() {
            DamageOutcome::Damaged { points } => ArenaDamage::Damaged { id, points },
            DamageOutcome::Destroyed { .. } => match self.vehicles.remove(&id) {
                Some(vehicle) => ArenaDamage::Destroyed(vehicle),
                None => ArenaDamage::Ignored(id),
            },
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
