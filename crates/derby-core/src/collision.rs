//! Collision detection and damage for the derby.
//!
//! The [`CollisionDetector`] runs on a fixed tick. It tests vehicle pairs for
//! rectangle overlap and applies one damage point to each member of every
//! overlapping pair.
//!
//! # Snapshot sweep
//!
//! Bounds are read once per tick into a snapshot. Every pair test of the
//! tick uses that snapshot, in snapshot (creation) order. Damage can remove
//! a vehicle part-way through the sweep; a pair is only evaluated when both
//! members are still live, so a destroyed vehicle neither takes nor deals
//! damage for the rest of the tick.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::{Arena, ArenaDamage};
use crate::entity::EntityId;
use crate::render::Rect;

/// Overlap test between two bounding boxes.
///
/// Boxes sharing an exact top-left corner never overlap. This excludes a box
/// tested against itself, and also two distinct boxes that happen to sit at
/// the same coordinates. Touching edges count as overlap.
///
/// # Example
///
/// ```
/// use derby_core::collision::overlaps;
/// use derby_core::render::Rect;
/// use glam::Vec2;
///
/// let a = Rect::new(Vec2::new(10.0, 10.0), Vec2::new(40.0, 40.0));
/// let b = Rect::new(Vec2::new(11.0, 10.0), Vec2::new(40.0, 40.0));
/// let far = Rect::new(Vec2::new(100.0, 100.0), Vec2::new(40.0, 40.0));
///
/// assert!(overlaps(&a, &b));
/// assert!(!overlaps(&a, &a));
/// assert!(!overlaps(&a, &far));
/// ```
#[must_use]
#[allow(clippy::float_cmp)]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    let distinct_corner = a.top != b.top || a.left != b.left;
    distinct_corner
        && !(a.bottom() < b.top || a.top > b.bottom() || a.right() < b.left || a.left > b.right())
}

/// Which index pairs a sweep visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingMode {
    /// Every ordered pair `(i, j)`, including `i == j`. A colliding pair is
    /// visited twice per tick, so each member can take two hits.
    #[default]
    Ordered,
    /// Pairs with `i <= j`. Each member of a colliding pair takes one hit.
    Unordered,
}

/// A detected collision between two vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    /// Vehicle on the outer side of the pair.
    pub first: EntityId,
    /// Vehicle on the inner side of the pair.
    pub second: EntityId,
}

/// One step of a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// An overlapping pair was found.
    Collision(Collision),
    /// Damage was applied to one member of the preceding collision.
    Damage(ArenaDamage),
}

/// Everything a sweep did, in the order it happened.
///
/// Each [`SweepOutcome::Collision`] is followed by the damage it caused.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Collisions and damage outcomes in application order.
    pub outcomes: Vec<SweepOutcome>,
}

impl SweepReport {
    /// Returns the overlapping pairs that were damaged.
    pub fn collisions(&self) -> impl Iterator<Item = Collision> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            SweepOutcome::Collision(collision) => Some(*collision),
            SweepOutcome::Damage(_) => None,
        })
    }

    /// Returns the IDs of vehicles destroyed during the sweep.
    pub fn destroyed(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            SweepOutcome::Damage(ArenaDamage::Destroyed(vehicle)) => Some(vehicle.id()),
            _ => None,
        })
    }
}

/// O(n²) pairwise collision detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionDetector {
    mode: PairingMode,
}

impl CollisionDetector {
    /// Creates a detector using the given pairing mode.
    #[must_use]
    pub const fn new(mode: PairingMode) -> Self {
        Self { mode }
    }

    /// Returns the pairing mode.
    #[must_use]
    pub const fn mode(&self) -> PairingMode {
        self.mode
    }

    /// Tests every pair of the snapshot and damages overlapping pairs.
    ///
    /// Vehicles destroyed by the sweep are removed from `arena` and returned
    /// in the report for the caller to tear down.
    pub fn sweep(&self, arena: &mut Arena, snapshot: &[(EntityId, Rect)]) -> SweepReport {
        let mut report = SweepReport::default();

        for (i, (first, first_rect)) in snapshot.iter().enumerate() {
            let start = match self.mode {
                PairingMode::Ordered => 0,
                PairingMode::Unordered => i,
            };
            for (second, second_rect) in &snapshot[start..] {
                if !arena.contains(*first) {
                    break;
                }
                if !arena.contains(*second) || !overlaps(first_rect, second_rect) {
                    continue;
                }

                debug!(first = %first, second = %second, "collision");
                report.outcomes.push(SweepOutcome::Collision(Collision {
                    first: *first,
                    second: *second,
                }));
                report
                    .outcomes
                    .push(SweepOutcome::Damage(arena.apply_damage(*first)));
                if arena.contains(*second) {
                    report
                        .outcomes
                        .push(SweepOutcome::Damage(arena.apply_damage(*second)));
                }
            }
        }

        report
    }
}

// =============================================================================
// Tests
// =============================================================================
