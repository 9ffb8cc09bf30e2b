//! Entity module for the derby.
//!
//! This module provides the vehicle types that populate the arena:
//! - [`EntityId`]: Unique identifier for vehicles
//! - [`VehicleKind`]: Kind tag selecting a static [`KindProfile`]
//! - [`Vehicle`]: Damage, gear and siren state of one live vehicle
//!
//! # Architecture
//!
//! There is a single concrete vehicle type. All per-kind behaviour is a
//! lookup into the kind's profile rather than a type hierarchy. A vehicle
//! holds no position: its visual is owned by the render backend and its
//! bounds are read back through the vehicle's [`VisualHandle`].
//!
//! # Example
//!
//! ```
//! use derby_core::entity::{EntityId, Vehicle, VehicleKind};
//!
//! let sedan = Vehicle::new(EntityId::new(42), VehicleKind::Sedan);
//!
//! assert_eq!(sedan.id().as_u64(), 42);
//! assert_eq!(sedan.damage_tolerance(), 2);
//! assert!(sedan.handle().is_none());
//! ```

pub mod kind;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use kind::{Axis, Direction, KindProfile, VehicleKind};

use crate::render::VisualHandle;

/// Unique identifier for a vehicle.
///
/// IDs are assigned monotonically by the arena, so ordering by ID is
/// ordering by creation.
///
/// # Example
///
/// ```
/// use derby_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Result of applying one damage point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The vehicle survived the hit.
    Damaged {
        /// Damage points after the hit.
        points: u32,
    },
    /// The hit brought the vehicle to its tolerance.
    Destroyed {
        /// Damage points after the hit.
        points: u32,
    },
}

impl DamageOutcome {
    /// Returns `true` if the vehicle must be removed.
    #[must_use]
    pub const fn is_destroyed(self) -> bool {
        matches!(self, Self::Destroyed { .. })
    }
}

/// One vehicle in the derby.
///
/// # Invariants
///
/// - `damage_points` never decreases
/// - once `damage_points >= damage_tolerance` the vehicle is removed from the
///   arena by its owner and never touched again
/// - `reversed` only changes for kinds that can reverse, `siren_on` only for
///   kinds with a siren
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    id: EntityId,
    kind: VehicleKind,
    handle: Option<VisualHandle>,
    damage_points: u32,
    reversed: bool,
    siren_on: bool,
}

impl Vehicle {
    /// Creates an undamaged vehicle in forward gear with its siren off.
    ///
    /// The vehicle has no visual until [`attach`](Self::attach) is called.
    #[must_use]
    pub const fn new(id: EntityId, kind: VehicleKind) -> Self {
        Self {
            id,
            kind,
            handle: None,
            damage_points: 0,
            reversed: false,
            siren_on: false,
        }
    }

    /// Binds the vehicle to its visual.
    pub fn attach(&mut self, handle: VisualHandle) {
        debug_assert!(self.handle.is_none(), "vehicle {} already has a visual", self.id);
        self.handle = Some(handle);
    }

    /// Returns the vehicle's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the vehicle's kind.
    #[must_use]
    pub const fn kind(&self) -> VehicleKind {
        self.kind
    }

    /// Returns the static profile of the vehicle's kind.
    #[must_use]
    pub const fn profile(&self) -> &'static KindProfile {
        self.kind.profile()
    }

    /// Returns the handle of the vehicle's visual, if spawned.
    #[must_use]
    pub const fn handle(&self) -> Option<VisualHandle> {
        self.handle
    }

    /// Returns accumulated damage points.
    #[must_use]
    pub const fn damage_points(&self) -> u32 {
        self.damage_points
    }

    /// Returns the number of hits that destroy this vehicle.
    #[must_use]
    pub const fn damage_tolerance(&self) -> u32 {
        self.kind.profile().damage_tolerance
    }

    /// Returns the traversal duration in milliseconds.
    #[must_use]
    pub const fn speed_ms(&self) -> u64 {
        self.kind.profile().speed_ms
    }

    /// Returns `true` while in reverse gear.
    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Returns `true` while the siren is blinking.
    #[must_use]
    pub const fn siren_on(&self) -> bool {
        self.siren_on
    }

    /// Returns `true` once damage has reached tolerance.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.damage_points >= self.damage_tolerance()
    }

    /// Returns the directions the vehicle currently drives.
    #[must_use]
    pub fn movement_pattern(&self) -> &'static [Direction] {
        let profile = self.profile();
        match (self.reversed, profile.reverse) {
            (true, Some(reverse)) => reverse,
            _ => profile.forward,
        }
    }

    /// Adds one damage point.
    pub fn apply_damage(&mut self) -> DamageOutcome {
        debug_assert!(!self.is_destroyed(), "vehicle {} damaged after destruction", self.id);
        self.damage_points = self.damage_points.saturating_add(1);
        if self.is_destroyed() {
            DamageOutcome::Destroyed {
                points: self.damage_points,
            }
        } else {
            DamageOutcome::Damaged {
                points: self.damage_points,
            }
        }
    }

    /// Flips the gear and returns the new movement pattern.
    ///
    /// Returns `None` and leaves the state untouched for kinds that cannot
    /// reverse.
    pub fn shift_gear(&mut self) -> Option<&'static [Direction]> {
        if !self.profile().can_reverse() {
            return None;
        }
        self.reversed = !self.reversed;
        Some(self.movement_pattern())
    }

    /// Sets the siren state. Returns `true` if the state changed.
    ///
    /// Always returns `false` for kinds without a siren.
    pub fn set_siren(&mut self, on: bool) -> bool {
        if !self.profile().has_siren || self.siren_on == on {
            return false;
        }
        self.siren_on = on;
        true
    }
}
