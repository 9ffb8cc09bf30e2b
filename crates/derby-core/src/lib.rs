//! # Derby Core
//!
//! Crash derby simulation: vehicles drive endless edge-to-edge loops across
//! a fixed arena, collide, take damage and are removed once they reach
//! their damage tolerance.
//!
//! ## Architecture
//!
//! - **Entities**: [`Vehicle`] with a per-kind [`KindProfile`] table
//! - **Render backend**: the [`RenderBackend`] trait owns visuals and
//!   animations; [`HeadlessRenderer`] runs them on a virtual clock
//! - **Motion**: [`MotionDriver`] chains traversals and cancels them with
//!   generation-stamped tickets
//! - **Collisions**: [`CollisionDetector`] sweeps a snapshot of bounds
//! - **Controller**: [`Derby`] owns the arena and runs the event loop
//!
//! ## Usage
//!
//! ```
//! use derby_core::prelude::*;
//!
//! let mut derby = Derby::new(DerbyConfig::default().with_seed(42)).unwrap();
//! derby.spawn(VehicleKind::Sedan).unwrap();
//! derby.spawn(VehicleKind::Tank).unwrap();
//! derby.toggle_sirens();
//! derby.advance(10_000);
//!
//! let snapshot = derby.snapshot();
//! assert_eq!(snapshot.now_ms, 10_000);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod motion;
pub mod render;
pub mod simulation;

pub use arena::{Arena, ArenaDamage};
pub use collision::{
    overlaps, Collision, CollisionDetector, PairingMode, SweepOutcome, SweepReport,
};
pub use config::{DerbyConfig, SpriteSizes};
pub use entity::{Axis, DamageOutcome, Direction, EntityId, KindProfile, Vehicle, VehicleKind};
pub use error::{DerbyError, RenderError, Result};
pub use event::{DerbyEvent, EventLog};
pub use motion::{MotionDriver, MotionTicket};
pub use render::{Easing, HeadlessRenderer, Rect, RenderBackend, StyleFlags, VisualHandle};
pub use simulation::{Derby, DerbySnapshot, VehicleSnapshot};

/// Commonly used types.
pub mod prelude {
    pub use crate::config::DerbyConfig;
    pub use crate::entity::{EntityId, VehicleKind};
    pub use crate::error::{DerbyError, Result};
    pub use crate::event::DerbyEvent;
    pub use crate::render::{HeadlessRenderer, Rect, RenderBackend};
    pub use crate::simulation::{Derby, DerbySnapshot};
}

#[cfg(test)]
mod tests;
