//! Test helper functions for setting up derbies.

use glam::Vec2;

use crate::config::DerbyConfig;
use crate::entity::{Axis, EntityId, VehicleKind};
use crate::error::RenderError;
use crate::event::DerbyEvent;
use crate::motion::MotionTicket;
use crate::render::{HeadlessRenderer, Rect, RenderBackend, StyleFlags, VisualHandle};
use crate::simulation::Derby;

// =============================================================================
// Scenario Setup
// =============================================================================

/// Creates a derby with the default configuration and the given seed.
pub fn seeded_derby(seed: u64) -> Derby {
    Derby::new(DerbyConfig::default().with_seed(seed)).unwrap()
}

/// Spawns one vehicle of every kind at random positions.
pub fn spawn_one_of_each<R: RenderBackend>(derby: &mut Derby<R>) -> Vec<EntityId> {
    VehicleKind::ALL
        .into_iter()
        .map(|kind| derby.spawn(kind).unwrap())
        .collect()
}

/// Runs a fixed command script: spawns, gear shifts and siren toggles
/// spread over 20 seconds.
pub fn run_script<R: RenderBackend>(derby: &mut Derby<R>) {
    spawn_one_of_each(derby);
    derby.advance(1_500);
    derby.toggle_sirens();
    derby.spawn(VehicleKind::PoliceCar).unwrap();
    derby.advance(2_250);
    derby.shift_gears();
    spawn_one_of_each(derby);
    derby.advance(6_000);
    derby.shift_gears();
    derby.toggle_sirens();
    derby.advance(10_250);
}

/// Counts collision events.
pub fn collision_count(events: &[DerbyEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, DerbyEvent::Collision { .. }))
        .count()
}

/// Position of a live vehicle.
pub fn position_of<R: RenderBackend>(derby: &Derby<R>, id: EntityId) -> Vec2 {
    derby.bounds(id).unwrap().position()
}

// =============================================================================
// Fault-Injecting Backend
// =============================================================================

/// A [`HeadlessRenderer`] that fails on request.
#[derive(Debug, Default)]
pub struct FailingRenderer {
    /// Backend doing the real work.
    pub inner: HeadlessRenderer,
    /// Refuse every `create_visual`.
    pub fail_create: bool,
    /// Number of `animate` calls to accept before refusing all others.
    pub animate_budget: Option<usize>,
    /// Refuse every style flag change.
    pub fail_style: bool,
    /// Completion time announced by `next_completion` but never delivered.
    pub phantom_completion: Option<u64>,
}

impl FailingRenderer {
    fn refuse(handle: VisualHandle, reason: &str) -> RenderError {
        RenderError::AnimateFailed {
            handle,
            reason: reason.to_string(),
        }
    }
}

impl RenderBackend for FailingRenderer {
    fn create_visual(
        &mut self,
        position: Vec2,
        size: Vec2,
        style_class: &str,
    ) -> Result<VisualHandle, RenderError> {
        if self.fail_create {
            return Err(RenderError::CreateFailed {
                class: style_class.to_string(),
                reason: "injected".to_string(),
            });
        }
        self.inner.create_visual(position, size, style_class)
    }

    fn animate(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        target: f32,
        duration_ms: u64,
        ticket: MotionTicket,
    ) -> Result<(), RenderError> {
        if let Some(budget) = self.animate_budget.as_mut() {
            if *budget == 0 {
                return Err(Self::refuse(handle, "injected"));
            }
            *budget -= 1;
        }
        self.inner.animate(handle, axis, target, duration_ms, ticket)
    }

    fn halt_animation(&mut self, handle: VisualHandle) {
        self.inner.halt_animation(handle);
    }

    fn set_position(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        value: f32,
    ) -> Result<(), RenderError> {
        self.inner.set_position(handle, axis, value)
    }

    fn bounds(&self, handle: VisualHandle) -> Option<Rect> {
        self.inner.bounds(handle)
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.inner.destroy_visual(handle);
    }

    fn add_style_flag(&mut self, handle: VisualHandle, flag: StyleFlags) -> Result<(), RenderError> {
        if self.fail_style {
            return Err(RenderError::UnknownHandle(handle));
        }
        self.inner.add_style_flag(handle, flag)
    }

    fn remove_style_flag(
        &mut self,
        handle: VisualHandle,
        flag: StyleFlags,
    ) -> Result<(), RenderError> {
        if self.fail_style {
            return Err(RenderError::UnknownHandle(handle));
        }
        self.inner.remove_style_flag(handle, flag)
    }

    fn style_flags(&self, handle: VisualHandle) -> Option<StyleFlags> {
        self.inner.style_flags(handle)
    }

    fn next_completion(&self) -> Option<u64> {
        match (self.phantom_completion, self.inner.next_completion()) {
            (Some(phantom), Some(real)) => Some(phantom.min(real)),
            (phantom, real) => phantom.or(real),
        }
    }

    fn advance_to(&mut self, now_ms: u64) -> Vec<MotionTicket> {
        self.inner.advance_to(now_ms)
    }
}

/// Creates a derby on a [`FailingRenderer`] with nothing failing yet.
pub fn failing_derby() -> Derby<FailingRenderer> {
    Derby::with_renderer(DerbyConfig::default(), FailingRenderer::default()).unwrap()
}
