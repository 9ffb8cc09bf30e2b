//! Motion driver: endless edge-to-edge traversal with wrap-around.
//!
//! A vehicle moving in a [`Direction`] is animated from its current
//! coordinate to the far edge over its full traversal duration. When the
//! animation completes the coordinate jumps to the opposite edge and the
//! next traversal is armed. This repeats until the vehicle is halted.
//!
//! # Edge convention
//!
//! | direction | animate to   | wrap to      |
//! |-----------|--------------|--------------|
//! | right     | `width`      | `-overhang`  |
//! | left      | `-overhang`  | `width`      |
//! | down      | `height`     | `0`          |
//! | up        | `-overhang`  | `height`     |
//!
//! # Cancellation
//!
//! Every traversal carries a [`MotionTicket`] stamped with the vehicle's
//! current generation. [`MotionDriver::halt`] bumps the generation, so a
//! ticket issued before the halt is stale and can never re-arm a loop, even
//! if a backend were to return it after all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::entity::{Direction, EntityId};
use crate::error::RenderError;
use crate::render::{RenderBackend, VisualHandle};

/// Completion token for one traversal of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MotionTicket {
    /// Vehicle being moved.
    pub entity: EntityId,
    /// Direction of the traversal.
    pub direction: Direction,
    /// Generation of the vehicle's motion when the traversal was armed.
    pub generation: u64,
}

impl MotionTicket {
    /// Creates a ticket.
    #[must_use]
    pub const fn new(entity: EntityId, direction: Direction, generation: u64) -> Self {
        Self {
            entity,
            direction,
            generation,
        }
    }
}

/// Drives traversal loops for every moving vehicle.
#[derive(Debug, Clone)]
pub struct MotionDriver {
    width: f32,
    height: f32,
    overhang: f32,
    generations: BTreeMap<EntityId, u64>,
}

impl MotionDriver {
    /// Creates a driver for an arena of the given size.
    #[must_use]
    pub fn new(width: f32, height: f32, overhang: f32) -> Self {
        Self {
            width,
            height,
            overhang,
            generations: BTreeMap::new(),
        }
    }

    /// Coordinate a traversal in `direction` animates towards.
    #[must_use]
    pub fn target(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Right => self.width,
            Direction::Down => self.height,
            Direction::Left | Direction::Up => -self.overhang,
        }
    }

    /// Coordinate a vehicle jumps to after completing a traversal.
    #[must_use]
    pub fn wrap_to(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Right => -self.overhang,
            Direction::Left => self.width,
            Direction::Up => self.height,
            Direction::Down => 0.0,
        }
    }

    /// Returns the current generation of a vehicle's motion, if tracked.
    #[must_use]
    pub fn generation(&self, entity: EntityId) -> Option<u64> {
        self.generations.get(&entity).copied()
    }

    /// Returns `true` if the ticket belongs to a vehicle's current motion.
    #[must_use]
    pub fn is_current(&self, ticket: &MotionTicket) -> bool {
        self.generation(ticket.entity) == Some(ticket.generation)
    }

    /// Arms one traversal in `direction` from the visual's current position.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn move_along<R: RenderBackend + ?Sized>(
        &mut self,
        renderer: &mut R,
        entity: EntityId,
        handle: VisualHandle,
        direction: Direction,
        speed_ms: u64,
    ) -> Result<(), RenderError> {
        let generation = *self.generations.entry(entity).or_insert(0);
        let ticket = MotionTicket::new(entity, direction, generation);
        trace!(%entity, %direction, generation, "arming traversal");
        renderer.animate(
            handle,
            direction.axis(),
            self.target(direction),
            speed_ms,
            ticket,
        )
    }

    /// Starts every direction of a movement pattern concurrently.
    ///
    /// # Errors
    ///
    /// Propagates the first backend failure; directions armed before the
    /// failure keep running until the caller halts the vehicle.
    pub fn start<R: RenderBackend + ?Sized>(
        &mut self,
        renderer: &mut R,
        entity: EntityId,
        handle: VisualHandle,
        pattern: &[Direction],
        speed_ms: u64,
    ) -> Result<(), RenderError> {
        for &direction in pattern {
            self.move_along(renderer, entity, handle, direction, speed_ms)?;
        }
        Ok(())
    }

    /// Cancels every in-flight traversal of a vehicle.
    ///
    /// Outstanding tickets become stale and the backend drops the
    /// animations where they stand.
    pub fn halt<R: RenderBackend + ?Sized>(
        &mut self,
        renderer: &mut R,
        entity: EntityId,
        handle: VisualHandle,
    ) {
        let generation = self.generations.entry(entity).or_insert(0);
        *generation += 1;
        debug!(%entity, generation = *generation, "motion halted");
        renderer.halt_animation(handle);
    }

    /// Stops tracking a vehicle. Any ticket for it is stale afterwards.
    pub fn forget(&mut self, entity: EntityId) {
        self.generations.remove(&entity);
    }

    /// Handles a finished traversal: wraps the visual to the opposite edge
    /// and arms the next traversal.
    ///
    /// Returns `Ok(false)` without touching the backend if the ticket is
    /// stale.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the loop for that direction stops.
    pub fn complete<R: RenderBackend + ?Sized>(
        &mut self,
        renderer: &mut R,
        ticket: MotionTicket,
        handle: VisualHandle,
        speed_ms: u64,
    ) -> Result<bool, RenderError> {
        if !self.is_current(&ticket) {
            trace!(entity = %ticket.entity, generation = ticket.generation, "stale ticket");
            return Ok(false);
        }
        let direction = ticket.direction;
        renderer.set_position(handle, direction.axis(), self.wrap_to(direction))?;
        self.move_along(renderer, ticket.entity, handle, direction, speed_ms)?;
        Ok(true)
    }
}
