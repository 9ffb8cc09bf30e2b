//! The derby controller.
//!
//! [`Derby`] owns everything: the arena, the render backend, the motion
//! driver, the collision detector and the virtual clock. Callers issue
//! commands (spawn, shift gears, toggle sirens) and move time forward with
//! [`Derby::advance`] or [`Derby::run_until`].
//!
//! # Event loop
//!
//! Time is virtual and cooperative. Two sources schedule work:
//!
//! 1. the backend, whose animations complete at known times
//! 2. the collision tick, every `collision_interval_ms`
//!
//! The loop repeatedly jumps to the earliest of the two. At equal
//! timestamps, animation completions are dispatched before the collision
//! tick, so the sweep sees wrapped positions.
//!
//! # Example
//!
//! ```
//! use derby_core::prelude::*;
//! use glam::Vec2;
//!
//! let mut derby = Derby::new(DerbyConfig::default()).unwrap();
//! let id = derby.spawn_at(VehicleKind::Sedan, Vec2::new(100.0, 10.0)).unwrap();
//!
//! derby.advance(5000);
//!
//! // The sedan reached the right edge and wrapped to the left overhang.
//! let bounds = derby.bounds(id).unwrap();
//! assert_eq!(bounds.left, -50.0);
//! ```

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::arena::{Arena, ArenaDamage};
use crate::collision::{CollisionDetector, SweepOutcome};
use crate::config::DerbyConfig;
use crate::entity::{EntityId, Vehicle, VehicleKind};
use crate::error::{RenderError, Result};
use crate::event::{DerbyEvent, EventLog};
use crate::motion::{MotionDriver, MotionTicket};
use crate::render::{HeadlessRenderer, Rect, RenderBackend, StyleFlags, VisualHandle};

/// Style class every vehicle visual carries besides its kind's class.
pub const BASE_CLASS: &str = "vehicle";

// =============================================================================
// Snapshots
// =============================================================================

/// Serializable view of one live vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    /// Vehicle ID.
    pub id: EntityId,
    /// Kind.
    pub kind: VehicleKind,
    /// Current bounding box, if the backend knows the visual.
    pub bounds: Option<Rect>,
    /// Accumulated damage.
    pub damage_points: u32,
    /// Reverse gear engaged.
    pub reversed: bool,
    /// Siren blinking.
    pub siren_on: bool,
}

/// Serializable view of the whole derby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerbySnapshot {
    /// Simulation time.
    pub now_ms: u64,
    /// Collision ticks run so far.
    pub tick_count: u64,
    /// Global siren state.
    pub sirens_blinking: bool,
    /// Live vehicles in creation order.
    pub vehicles: Vec<VehicleSnapshot>,
}

// =============================================================================
// Derby
// =============================================================================

/// A running crash derby.
pub struct Derby<R: RenderBackend = HeadlessRenderer> {
    config: DerbyConfig,
    arena: Arena,
    renderer: R,
    motion: MotionDriver,
    detector: CollisionDetector,
    rng: ChaCha8Rng,
    clock_ms: u64,
    next_collision_ms: u64,
    tick_count: u64,
    sirens_blinking: bool,
    events: EventLog,
}

impl Derby<HeadlessRenderer> {
    /// Creates a derby rendered by a [`HeadlessRenderer`] using the
    /// configured easing.
    ///
    /// # Errors
    ///
    /// Returns [`DerbyError::InvalidConfig`](crate::DerbyError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn new(config: DerbyConfig) -> Result<Self> {
        let renderer = HeadlessRenderer::with_easing(config.easing);
        Self::with_renderer(config, renderer)
    }
}

impl<R: RenderBackend> Derby<R> {
    /// Creates a derby on top of an arbitrary render backend.
    ///
    /// # Errors
    ///
    /// Returns [`DerbyError::InvalidConfig`](crate::DerbyError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn with_renderer(config: DerbyConfig, renderer: R) -> Result<Self> {
        config.validate()?;
        info!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            pairing = ?config.pairing,
            "derby created"
        );
        Ok(Self {
            arena: Arena::new(config.width, config.height),
            motion: MotionDriver::new(config.width, config.height, config.overhang),
            detector: CollisionDetector::new(config.pairing),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            clock_ms: 0,
            next_collision_ms: config.collision_interval_ms,
            tick_count: 0,
            sirens_blinking: false,
            events: EventLog::new(),
            renderer,
            config,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DerbyConfig {
        &self.config
    }

    /// Returns the arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns the render backend.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns the render backend mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Returns the current simulation time.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Returns the number of collision ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns the global siren state.
    #[must_use]
    pub const fn sirens_blinking(&self) -> bool {
        self.sirens_blinking
    }

    /// Returns the current bounding box of a live vehicle.
    #[must_use]
    pub fn bounds(&self, id: EntityId) -> Option<Rect> {
        self.arena
            .get(id)
            .and_then(Vehicle::handle)
            .and_then(|handle| self.renderer.bounds(handle))
    }

    /// Builds a serializable view of the derby.
    #[must_use]
    pub fn snapshot(&self) -> DerbySnapshot {
        DerbySnapshot {
            now_ms: self.clock_ms,
            tick_count: self.tick_count,
            sirens_blinking: self.sirens_blinking,
            vehicles: self
                .arena
                .vehicles()
                .map(|v| VehicleSnapshot {
                    id: v.id(),
                    kind: v.kind(),
                    bounds: v.handle().and_then(|h| self.renderer.bounds(h)),
                    damage_points: v.damage_points(),
                    reversed: v.is_reversed(),
                    siren_on: v.siren_on(),
                })
                .collect(),
        }
    }

    /// Returns and clears the recorded events.
    pub fn drain_events(&mut self) -> Vec<DerbyEvent> {
        self.events.take_events()
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Spawns a vehicle at a random whole-number position inside the arena.
    ///
    /// # Errors
    ///
    /// Returns [`DerbyError::Render`](crate::DerbyError::Render) if the
    /// backend refuses the visual or its first animation. Nothing is added
    /// to the arena in that case.
    pub fn spawn(&mut self, kind: VehicleKind) -> Result<EntityId> {
        let x = self.rng.gen_range(0.0..self.config.width).floor();
        let y = self.rng.gen_range(0.0..self.config.height).floor();
        self.spawn_at(kind, Vec2::new(x, y))
    }

    /// Spawns a vehicle by name (`sedan`, `car`, `police`, `cop`,
    /// `motorcycle`, `moto`, `tank`).
    ///
    /// # Errors
    ///
    /// Returns [`DerbyError::UnknownKind`](crate::DerbyError::UnknownKind) for
    /// an unrecognized name, otherwise as [`spawn`](Self::spawn).
    pub fn spawn_named(&mut self, name: &str) -> Result<EntityId> {
        let kind: VehicleKind = name.parse()?;
        self.spawn(kind)
    }

    /// Spawns a vehicle with its top-left corner at `position`.
    ///
    /// The vehicle starts its movement pattern immediately. A police car
    /// spawned while sirens are on starts blinking.
    ///
    /// # Errors
    ///
    /// As [`spawn`](Self::spawn).
    pub fn spawn_at(&mut self, kind: VehicleKind, position: Vec2) -> Result<EntityId> {
        let id = self.arena.next_id();
        let profile = kind.profile();
        let size = self.config.sprite_sizes.for_kind(kind);
        let class = format!("{BASE_CLASS} {}", profile.class_name);

        let handle = self.renderer.create_visual(position, size, &class)?;
        let mut vehicle = Vehicle::new(id, kind);
        vehicle.attach(handle);

        if let Err(err) = self.arm_new_vehicle(&mut vehicle, handle) {
            warn!(%id, %kind, %err, "spawn failed, discarding visual");
            self.motion.halt(&mut self.renderer, id, handle);
            self.motion.forget(id);
            self.renderer.destroy_visual(handle);
            return Err(err.into());
        }

        self.arena.insert(vehicle);
        info!(%id, %kind, x = position.x, y = position.y, "vehicle spawned");
        self.events.push(DerbyEvent::Spawned {
            at_ms: self.clock_ms,
            id,
            kind,
            position,
        });
        Ok(id)
    }

    /// Starts motion and applies the global siren state to a vehicle that is
    /// not yet in the arena.
    fn arm_new_vehicle(
        &mut self,
        vehicle: &mut Vehicle,
        handle: VisualHandle,
    ) -> std::result::Result<(), RenderError> {
        self.motion.start(
            &mut self.renderer,
            vehicle.id(),
            handle,
            vehicle.movement_pattern(),
            vehicle.speed_ms(),
        )?;
        if self.sirens_blinking && vehicle.set_siren(true) {
            self.renderer.add_style_flag(handle, StyleFlags::BLINKING)?;
        }
        Ok(())
    }

    /// Shifts gears on every live sedan and police car.
    pub fn shift_gears(&mut self) {
        let ids: Vec<EntityId> = self
            .arena
            .vehicles()
            .filter(|v| v.profile().can_reverse())
            .map(Vehicle::id)
            .collect();
        debug!(count = ids.len(), "shifting gears");
        for id in ids {
            self.reverse_direction(id);
        }
    }

    /// Flips one vehicle between forward and reverse and restarts its motion
    /// from where it stands. Returns `false` for kinds that cannot reverse.
    ///
    /// Reversing a vehicle that is not live violates a precondition: debug
    /// builds panic, release builds log and ignore it.
    pub fn reverse_direction(&mut self, id: EntityId) -> bool {
        let Some(vehicle) = self.arena.get_mut(id) else {
            debug_assert!(false, "reverse on vehicle {id} which is not live");
            warn!(%id, "reverse on vehicle that is not live");
            return false;
        };
        let Some(handle) = vehicle.handle() else {
            return false;
        };
        let Some(pattern) = vehicle.shift_gear() else {
            return false;
        };
        let reversed = vehicle.is_reversed();
        let speed_ms = vehicle.speed_ms();

        self.motion.halt(&mut self.renderer, id, handle);
        if let Err(err) = self
            .motion
            .start(&mut self.renderer, id, handle, pattern, speed_ms)
        {
            warn!(%id, %err, "motion not restarted after gear shift");
        }

        debug!(%id, reversed, "gear shifted");
        self.events.push(DerbyEvent::Reversed {
            at_ms: self.clock_ms,
            id,
            reversed,
        });
        true
    }

    /// Flips the global siren state; every live police car follows it.
    pub fn toggle_sirens(&mut self) {
        self.sirens_blinking = !self.sirens_blinking;
        let blinking = self.sirens_blinking;
        info!(blinking, "sirens toggled");

        let ids: Vec<EntityId> = self
            .arena
            .vehicles()
            .filter(|v| v.profile().has_siren)
            .map(Vehicle::id)
            .collect();
        for id in ids {
            self.set_siren(id, blinking);
        }
        self.events.push(DerbyEvent::SirensToggled {
            at_ms: self.clock_ms,
            blinking,
        });
    }

    /// Flips the siren of a single police car. Returns `false` for kinds
    /// without a siren.
    ///
    /// Toggling a vehicle that is not live violates a precondition: debug
    /// builds panic, release builds log and ignore it.
    pub fn toggle_siren(&mut self, id: EntityId) -> bool {
        let Some(vehicle) = self.arena.get(id) else {
            debug_assert!(false, "siren toggled on vehicle {id} which is not live");
            warn!(%id, "siren toggled on vehicle that is not live");
            return false;
        };
        let on = !vehicle.siren_on();
        self.set_siren(id, on)
    }

    fn set_siren(&mut self, id: EntityId, on: bool) -> bool {
        let Some(vehicle) = self.arena.get_mut(id) else {
            return false;
        };
        if !vehicle.set_siren(on) {
            return false;
        }
        let Some(handle) = vehicle.handle() else {
            return true;
        };
        let applied = if on {
            self.renderer.add_style_flag(handle, StyleFlags::BLINKING)
        } else {
            self.renderer.remove_style_flag(handle, StyleFlags::BLINKING)
        };
        if let Err(err) = applied {
            warn!(%id, %err, "siren style not applied");
        }
        true
    }

    /// Applies one damage point to a live vehicle, removing it at tolerance.
    pub fn apply_damage(&mut self, id: EntityId) {
        let outcome = self.arena.apply_damage(id);
        self.settle_damage(outcome);
    }

    /// Removes a live vehicle: its motion is cancelled and its visual
    /// destroyed. Returns the removed vehicle.
    pub fn remove(&mut self, id: EntityId) -> Option<Vehicle> {
        let vehicle = self.arena.remove(id)?;
        self.tear_down(&vehicle);
        Some(vehicle)
    }

    // -------------------------------------------------------------------------
    // Collision tick
    // -------------------------------------------------------------------------

    /// Runs one collision sweep over the current positions.
    pub fn tick(&mut self) {
        self.tick_count += 1;
        let snapshot: Vec<(EntityId, Rect)> = self
            .arena
            .vehicles()
            .filter_map(|v| {
                let handle = v.handle()?;
                Some((v.id(), self.renderer.bounds(handle)?))
            })
            .collect();

        let report = self.detector.sweep(&mut self.arena, &snapshot);
        let collisions = report.collisions().count();
        if collisions > 0 {
            debug!(tick = self.tick_count, collisions, "collision sweep");
        }
        for outcome in report.outcomes {
            match outcome {
                SweepOutcome::Collision(collision) => {
                    self.events.push(DerbyEvent::Collision {
                        at_ms: self.clock_ms,
                        first: collision.first,
                        second: collision.second,
                    });
                }
                SweepOutcome::Damage(damage) => self.settle_damage(damage),
            }
        }
    }

    fn settle_damage(&mut self, outcome: ArenaDamage) {
        match outcome {
            ArenaDamage::Damaged { id, points } => {
                trace!(%id, points, "vehicle damaged");
                self.events.push(DerbyEvent::Damaged {
                    at_ms: self.clock_ms,
                    id,
                    points,
                });
            }
            ArenaDamage::Destroyed(vehicle) => self.tear_down(&vehicle),
            ArenaDamage::Ignored(_) => {}
        }
    }

    fn tear_down(&mut self, vehicle: &Vehicle) {
        let id = vehicle.id();
        if let Some(handle) = vehicle.handle() {
            self.motion.halt(&mut self.renderer, id, handle);
            self.renderer.destroy_visual(handle);
        }
        self.motion.forget(id);
        info!(%id, kind = %vehicle.kind(), damage = vehicle.damage_points(), "vehicle destroyed");
        self.events.push(DerbyEvent::Destroyed {
            at_ms: self.clock_ms,
            id,
            kind: vehicle.kind(),
            damage_points: vehicle.damage_points(),
        });
    }

    // -------------------------------------------------------------------------
    // Event loop
    // -------------------------------------------------------------------------

    /// Moves simulation time forward by `ms`.
    pub fn advance(&mut self, ms: u64) {
        self.run_until(self.clock_ms.saturating_add(ms));
    }

    /// Runs the event loop until simulation time reaches `target_ms`.
    ///
    /// Targets in the past are ignored.
    pub fn run_until(&mut self, target_ms: u64) {
        if target_ms < self.clock_ms {
            warn!(target_ms, now_ms = self.clock_ms, "run_until target in the past");
            return;
        }

        // Latest instant at which the backend announced a completion but
        // delivered nothing; announcements up to it are ignored.
        let mut stalled_at: Option<u64> = None;
        loop {
            let completion = self
                .renderer
                .next_completion()
                .map(|t| t.max(self.clock_ms))
                .filter(|&at| stalled_at.map_or(true, |stalled| at > stalled));
            let tick = self.next_collision_ms;

            match completion {
                Some(at) if at <= tick && at <= target_ms => {
                    self.clock_ms = at;
                    let fired = self.renderer.advance_to(at);
                    if fired.is_empty() {
                        warn!(at, "backend reported a completion it did not deliver");
                        stalled_at = Some(at);
                    }
                    for ticket in fired {
                        self.on_motion_complete(ticket);
                    }
                }
                _ if tick <= target_ms => {
                    self.clock_ms = tick;
                    for ticket in self.renderer.advance_to(tick) {
                        self.on_motion_complete(ticket);
                    }
                    self.tick();
                    self.next_collision_ms = tick + self.config.collision_interval_ms;
                }
                _ => break,
            }
        }

        self.clock_ms = target_ms;
        for ticket in self.renderer.advance_to(target_ms) {
            self.on_motion_complete(ticket);
        }
    }

    fn on_motion_complete(&mut self, ticket: MotionTicket) {
        let Some(vehicle) = self.arena.get(ticket.entity) else {
            trace!(entity = %ticket.entity, "completion for vehicle no longer live");
            return;
        };
        let Some(handle) = vehicle.handle() else {
            return;
        };
        let speed_ms = vehicle.speed_ms();
        if let Err(err) = self
            .motion
            .complete(&mut self.renderer, ticket, handle, speed_ms)
        {
            warn!(entity = %ticket.entity, direction = %ticket.direction, %err, "motion loop stopped");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
