//! Render backend seam.
//!
//! The derby never owns sprite positions: visuals live in a render backend
//! which animates them and reports when an animation finishes. The
//! [`RenderBackend`] trait is the boundary; [`HeadlessRenderer`] is an
//! in-memory implementation driven by a virtual clock.
//!
//! # Completion callbacks
//!
//! Animations carry a [`MotionTicket`]. Instead of invoking a closure, the
//! backend hands finished tickets back from [`RenderBackend::advance_to`] and
//! the caller decides what to do with them. Halting a visual drops its
//! in-flight tickets so they are never returned.

mod headless;

pub use headless::HeadlessRenderer;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entity::Axis;
use crate::error::RenderError;
use crate::motion::MotionTicket;

/// Opaque handle to a visual owned by the render backend.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VisualHandle(u64);

impl VisualHandle {
    /// Creates a handle from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for VisualHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VisualHandle({})", self.0)
    }
}

bitflags! {
    /// Visual flags toggled on top of a visual's style class.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StyleFlags: u8 {
        /// Siren blinking.
        const BLINKING = 0b0000_0001;
    }
}

/// Easing curve applied by a backend when interpolating an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// Slow start and end, `0.5 - cos(p * PI) / 2`.
    Swing,
}

impl Easing {
    /// Maps animation progress in `[0, 1]` to eased progress in `[0, 1]`.
    #[must_use]
    pub fn apply(self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Self::Linear => p,
            Self::Swing => 0.5 - (p * std::f32::consts::PI).cos() / 2.0,
        }
    }
}

/// Axis-aligned bounding box of a visual, in arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Creates a rect from its top-left corner and size.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            left: position.x,
            top: position.y,
            width: size.x,
            height: size.y,
        }
    }

    /// Bottom edge, `top + height`.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Right edge, `left + width`.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Top-left corner.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// Returns the coordinate driven along `axis`.
    #[must_use]
    pub const fn coordinate(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    /// Sets the coordinate driven along `axis`.
    pub fn set_coordinate(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.left = value,
            Axis::Vertical => self.top = value,
        }
    }
}

/// Operations the derby needs from a rendering/animation backend.
///
/// Implementations own every visual's position. Time only moves through
/// [`advance_to`](Self::advance_to); all other calls act at the backend's
/// current time.
pub trait RenderBackend {
    /// Creates a visual with its top-left corner at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::CreateFailed`] if the backend cannot allocate it.
    fn create_visual(
        &mut self,
        position: Vec2,
        size: Vec2,
        style_class: &str,
    ) -> Result<VisualHandle, RenderError>;

    /// Animates one coordinate of a visual from its current value to `target`
    /// over `duration_ms`. Replaces any animation already running on that
    /// axis of the visual without completing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown or the animation is refused.
    fn animate(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        target: f32,
        duration_ms: u64,
        ticket: MotionTicket,
    ) -> Result<(), RenderError>;

    /// Stops every animation on the visual where it stands. Their tickets are
    /// discarded. Unknown handles are ignored.
    fn halt_animation(&mut self, handle: VisualHandle);

    /// Moves one coordinate instantly.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownHandle`] for an unknown handle.
    fn set_position(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        value: f32,
    ) -> Result<(), RenderError>;

    /// Returns the current bounding box of a visual.
    fn bounds(&self, handle: VisualHandle) -> Option<Rect>;

    /// Destroys a visual and drops its animations. Unknown handles are ignored.
    fn destroy_visual(&mut self, handle: VisualHandle);

    /// Adds style flags to a visual.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownHandle`] for an unknown handle.
    fn add_style_flag(&mut self, handle: VisualHandle, flag: StyleFlags)
        -> Result<(), RenderError>;

    /// Removes style flags from a visual.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownHandle`] for an unknown handle.
    fn remove_style_flag(
        &mut self,
        handle: VisualHandle,
        flag: StyleFlags,
    ) -> Result<(), RenderError>;

    /// Returns the style flags currently set on a visual.
    fn style_flags(&self, handle: VisualHandle) -> Option<StyleFlags>;

    /// Returns the earliest time at which an in-flight animation completes.
    fn next_completion(&self) -> Option<u64>;

    /// Moves the backend clock to `now_ms`, updating every visual, and returns
    /// the tickets of animations that finished, ordered by completion time.
    fn advance_to(&mut self, now_ms: u64) -> Vec<MotionTicket>;
}
