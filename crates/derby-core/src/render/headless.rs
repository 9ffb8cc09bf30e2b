//! In-memory render backend driven by a virtual clock.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{Easing, Rect, RenderBackend, StyleFlags, VisualHandle};
use crate::entity::Axis;
use crate::error::RenderError;
use crate::motion::MotionTicket;

/// An animation of one coordinate.
#[derive(Debug, Clone, Copy)]
struct Animation {
    from: f32,
    to: f32,
    start_ms: u64,
    duration_ms: u64,
    ticket: MotionTicket,
}

impl Animation {
    fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    #[allow(clippy::cast_precision_loss)]
    fn value_at(&self, now_ms: u64, easing: Easing) -> f32 {
        if self.duration_ms == 0 {
            return self.to;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms) as f32;
        let progress = easing.apply(elapsed / self.duration_ms as f32);
        self.from + (self.to - self.from) * progress
    }
}

#[derive(Debug, Clone)]
struct Visual {
    rect: Rect,
    style_class: String,
    flags: StyleFlags,
    horizontal: Option<Animation>,
    vertical: Option<Animation>,
}

impl Visual {
    fn slot_mut(&mut self, axis: Axis) -> &mut Option<Animation> {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }
}

/// Render backend that keeps visuals in memory.
///
/// Positions are interpolated whenever the clock moves. Visuals are stored
/// in a `BTreeMap` so completions at the same instant come back in handle
/// order, horizontal before vertical.
///
/// # Example
///
/// ```
/// use derby_core::entity::{Axis, Direction, EntityId};
/// use derby_core::motion::MotionTicket;
/// use derby_core::render::{HeadlessRenderer, RenderBackend};
/// use glam::Vec2;
///
/// let mut renderer = HeadlessRenderer::new();
/// let handle = renderer
///     .create_visual(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0), "car")
///     .unwrap();
/// let ticket = MotionTicket::new(EntityId::new(0), Direction::Right, 0);
/// renderer.animate(handle, Axis::Horizontal, 100.0, 1000, ticket).unwrap();
///
/// assert!(renderer.advance_to(500).is_empty());
/// assert_eq!(renderer.bounds(handle).unwrap().left, 50.0);
/// assert_eq!(renderer.advance_to(1000), vec![ticket]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    now_ms: u64,
    next_handle: u64,
    easing: Easing,
    visuals: BTreeMap<VisualHandle, Visual>,
}

impl HeadlessRenderer {
    /// Creates an empty backend at time 0 with linear easing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty backend using the given easing curve.
    #[must_use]
    pub fn with_easing(easing: Easing) -> Self {
        Self {
            easing,
            ..Self::default()
        }
    }

    /// Returns the backend clock.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Returns the number of live visuals.
    #[must_use]
    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    /// Returns the style class a visual was created with.
    #[must_use]
    pub fn style_class(&self, handle: VisualHandle) -> Option<&str> {
        self.visuals.get(&handle).map(|v| v.style_class.as_str())
    }

    /// Returns `true` if the visual has an animation running on `axis`.
    #[must_use]
    pub fn is_animating(&self, handle: VisualHandle, axis: Axis) -> bool {
        self.visuals.get(&handle).is_some_and(|v| match axis {
            Axis::Horizontal => v.horizontal.is_some(),
            Axis::Vertical => v.vertical.is_some(),
        })
    }

    /// Returns the target of the animation running on `axis`, if any.
    #[must_use]
    pub fn animation_target(&self, handle: VisualHandle, axis: Axis) -> Option<f32> {
        let visual = self.visuals.get(&handle)?;
        let slot = match axis {
            Axis::Horizontal => visual.horizontal,
            Axis::Vertical => visual.vertical,
        };
        slot.map(|a| a.to)
    }

    fn visual_mut(&mut self, handle: VisualHandle) -> Result<&mut Visual, RenderError> {
        self.visuals
            .get_mut(&handle)
            .ok_or(RenderError::UnknownHandle(handle))
    }
}

impl RenderBackend for HeadlessRenderer {
    fn create_visual(
        &mut self,
        position: Vec2,
        size: Vec2,
        style_class: &str,
    ) -> Result<VisualHandle, RenderError> {
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(RenderError::CreateFailed {
                class: style_class.to_string(),
                reason: format!("non-positive size {size}"),
            });
        }
        let handle = VisualHandle::new(self.next_handle);
        self.next_handle += 1;
        self.visuals.insert(
            handle,
            Visual {
                rect: Rect::new(position, size),
                style_class: style_class.to_string(),
                flags: StyleFlags::empty(),
                horizontal: None,
                vertical: None,
            },
        );
        Ok(handle)
    }

    fn animate(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        target: f32,
        duration_ms: u64,
        ticket: MotionTicket,
    ) -> Result<(), RenderError> {
        let start_ms = self.now_ms;
        let visual = self.visual_mut(handle)?;
        let from = visual.rect.coordinate(axis);
        *visual.slot_mut(axis) = Some(Animation {
            from,
            to: target,
            start_ms,
            duration_ms,
            ticket,
        });
        Ok(())
    }

    fn halt_animation(&mut self, handle: VisualHandle) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.horizontal = None;
            visual.vertical = None;
        }
    }

    fn set_position(
        &mut self,
        handle: VisualHandle,
        axis: Axis,
        value: f32,
    ) -> Result<(), RenderError> {
        self.visual_mut(handle)?.rect.set_coordinate(axis, value);
        Ok(())
    }

    fn bounds(&self, handle: VisualHandle) -> Option<Rect> {
        self.visuals.get(&handle).map(|v| v.rect)
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.visuals.remove(&handle);
    }

    fn add_style_flag(
        &mut self,
        handle: VisualHandle,
        flag: StyleFlags,
    ) -> Result<(), RenderError> {
        self.visual_mut(handle)?.flags.insert(flag);
        Ok(())
    }

    fn remove_style_flag(
        &mut self,
        handle: VisualHandle,
        flag: StyleFlags,
    ) -> Result<(), RenderError> {
        self.visual_mut(handle)?.flags.remove(flag);
        Ok(())
    }

    fn style_flags(&self, handle: VisualHandle) -> Option<StyleFlags> {
        self.visuals.get(&handle).map(|v| v.flags)
    }

    fn next_completion(&self) -> Option<u64> {
        self.visuals
            .values()
            .flat_map(|v| v.horizontal.iter().chain(v.vertical.iter()))
            .map(Animation::end_ms)
            .min()
    }

    fn advance_to(&mut self, now_ms: u64) -> Vec<MotionTicket> {
        debug_assert!(now_ms >= self.now_ms, "backend clock moved backwards");
        let now_ms = now_ms.max(self.now_ms);
        self.now_ms = now_ms;

        let easing = self.easing;
        let mut finished: Vec<(u64, MotionTicket)> = Vec::new();
        for visual in self.visuals.values_mut() {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                let Some(animation) = *visual.slot_mut(axis) else {
                    continue;
                };
                if animation.end_ms() <= now_ms {
                    visual.rect.set_coordinate(axis, animation.to);
                    *visual.slot_mut(axis) = None;
                    finished.push((animation.end_ms(), animation.ticket));
                } else {
                    visual
                        .rect
                        .set_coordinate(axis, animation.value_at(now_ms, easing));
                }
            }
        }

        // Stable sort keeps handle/axis order for equal completion times.
        finished.sort_by_key(|(end, _)| *end);
        finished.into_iter().map(|(_, ticket)| ticket).collect()
    }
}
