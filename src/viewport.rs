use eframe::egui::{Pos2, Vec2, vec2};

use crate::geometry::clamp;

pub const MIN_SCALE: f32 = 1.0;
pub const MAX_SCALE: f32 = 5.0;
pub const ZOOM_IN: f32 = 1.1;
pub const ZOOM_OUT: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: MIN_SCALE,
            offset: Vec2::ZERO,
        }
    }
}

/// Pulls `offset` into the reachable range for `container` at `scale`, per axis.
pub fn clamp_offset(offset: Vec2, container: Vec2, scale: f32) -> Vec2 {
    vec2(
        clamp(offset.x, container.x - container.x * scale, 0.0),
        clamp(offset.y, container.y - container.y * scale, 0.0),
    )
}

fn stepped_scale(scale: f32, direction: f32) -> f32 {
    let next = if direction > 0.0 {
        scale * ZOOM_IN
    } else {
        scale * ZOOM_OUT
    };
    next.clamp(MIN_SCALE, MAX_SCALE)
}

impl Viewport {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn can_zoom_in(&self) -> bool {
        self.scale < MAX_SCALE
    }

    pub fn can_zoom_out(&self) -> bool {
        self.scale > MIN_SCALE
    }

    pub fn zoom_at(&mut self, pointer: Pos2, direction: f32, container: Vec2) {
        let next = stepped_scale(self.scale, direction);
        let factor = next / self.scale - 1.0;
        let offset = self.offset - vec2(factor * pointer.x, factor * pointer.y);

        self.scale = next;
        self.offset = clamp_offset(offset, container, next);
    }

    /// Toolbar zoom without a pointer anchor. Landing back on scale 1 recenters the content.
    pub fn zoom_step(&mut self, direction: f32, container: Vec2) {
        self.scale = stepped_scale(self.scale, direction);
        self.offset = if self.scale == MIN_SCALE {
            Vec2::ZERO
        } else {
            clamp_offset(self.offset, container, self.scale)
        };
    }

    pub fn pan_by(&mut self, delta: Vec2, container: Vec2) -> bool {
        if self.scale <= MIN_SCALE {
            return false;
        }
        self.offset = clamp_offset(self.offset + delta, container, self.scale);
        true
    }

    pub fn set_scale(&mut self, scale: f32, container: Vec2) {
        self.scale = if scale.is_finite() {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            MIN_SCALE
        };
        self.offset = clamp_offset(self.offset, container, self.scale);
    }

    pub fn fit_container(&mut self, container: Vec2) {
        self.offset = clamp_offset(self.offset, container, self.scale);
    }

    pub fn model_to_screen(&self, origin: Pos2, model: Pos2) -> Pos2 {
        origin + self.offset + model.to_vec2() * self.scale
    }

    pub fn screen_to_model(&self, origin: Pos2, screen: Pos2) -> Pos2 {
        ((screen - origin - self.offset) / self.scale).to_pos2()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragGesture {
    #[default]
    Idle,
    Dragging {
        last: Pos2,
    },
}

impl DragGesture {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn pointer_down(&mut self, pointer: Pos2, viewport: &Viewport) {
        if viewport.scale() > MIN_SCALE {
            *self = Self::Dragging { last: pointer };
        }
    }

    pub fn pointer_move(&mut self, pointer: Pos2, viewport: &mut Viewport, container: Vec2) {
        if let Self::Dragging { last } = self {
            viewport.pan_by(pointer - *last, container);
            *last = pointer;
        }
    }

    pub fn pointer_up(&mut self) {
        *self = Self::Idle;
    }

    pub fn pointer_leave(&mut self) {
        *self = Self::Idle;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    const CONTAINER: Vec2 = vec2(800.0, 600.0);

    #[test]
    fn zoom_step_caps_at_max_scale() {
        let mut viewport = Viewport::default();
        for _ in 0..20 {
            viewport.zoom_step(1.0, CONTAINER);
            assert!(viewport.scale() <= MAX_SCALE);
        }
        assert_eq!(viewport.scale(), MAX_SCALE);
        assert!(!viewport.can_zoom_in());
    }

    #[test]
    fn zoom_out_to_one_resets_offset() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(pos2(700.0, 500.0), 1.0, CONTAINER);
        assert_ne!(viewport.offset(), Vec2::ZERO);

        viewport.zoom_step(-1.0, CONTAINER);
        assert_eq!(viewport.scale(), MIN_SCALE);
        assert_eq!(viewport.offset(), Vec2::ZERO);
    }

    #[test]
    fn zoom_at_keeps_pointer_fixed() {
        let mut viewport = Viewport::default();
        let origin = Pos2::ZERO;
        let pointer = pos2(400.0, 300.0);
        let model = viewport.screen_to_model(origin, pointer);

        viewport.zoom_at(pointer, 1.0, CONTAINER);
        let after = viewport.model_to_screen(origin, model);

        assert!((after - pointer).length() < 1e-3);
    }

    #[test]
    fn pan_is_ignored_at_unit_scale() {
        let mut viewport = Viewport::default();
        assert!(!viewport.pan_by(vec2(-50.0, -50.0), CONTAINER));
        assert_eq!(viewport.offset(), Vec2::ZERO);
    }

    #[test]
    fn pan_is_clamped_to_content() {
        let mut viewport = Viewport::default();
        viewport.set_scale(2.0, CONTAINER);
        viewport.pan_by(vec2(-5000.0, 5000.0), CONTAINER);
        assert_eq!(viewport.offset(), vec2(-800.0, 0.0));
    }

    #[test]
    fn set_scale_silently_clamps() {
        let mut viewport = Viewport::default();
        viewport.set_scale(10.0, CONTAINER);
        assert_eq!(viewport.scale(), MAX_SCALE);
        viewport.set_scale(f32::NAN, CONTAINER);
        assert_eq!(viewport.scale(), MIN_SCALE);
    }

    #[test]
    fn clamp_is_idempotent() {
        let once = clamp_offset(vec2(-9000.0, 40.0), CONTAINER, 3.0);
        assert_eq!(clamp_offset(once, CONTAINER, 3.0), once);
    }

    #[test]
    fn drag_requires_zoom() {
        let mut viewport = Viewport::default();
        let mut drag = DragGesture::default();

        drag.pointer_down(pos2(10.0, 10.0), &viewport);
        assert!(!drag.is_dragging());

        viewport.set_scale(2.0, CONTAINER);
        drag.pointer_down(pos2(10.0, 10.0), &viewport);
        assert!(drag.is_dragging());

        drag.pointer_move(pos2(0.0, 5.0), &mut viewport, CONTAINER);
        drag.pointer_move(pos2(-10.0, 0.0), &mut viewport, CONTAINER);
        assert_eq!(viewport.offset(), vec2(-20.0, -10.0));

        drag.pointer_leave();
        assert_eq!(drag, DragGesture::Idle);
        drag.pointer_move(pos2(-100.0, 0.0), &mut viewport, CONTAINER);
        assert_eq!(viewport.offset(), vec2(-20.0, -10.0));
    }
}
