use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, vec2};

use crate::viewport::Viewport;

pub(super) const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
const DOT_SPACING: f32 = 24.0;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, viewport: &Viewport) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = DOT_SPACING * viewport.scale();
    let dot = Color32::from_rgba_unmultiplied(90, 100, 112, 90);
    let radius = (0.9 * viewport.scale().sqrt()).min(1.8);
    let start = rect.min + vec2(
        viewport.offset().x.rem_euclid(step),
        viewport.offset().y.rem_euclid(step),
    );

    let mut y = start.y;
    while y < rect.bottom() {
        let mut x = start.x;
        while x < rect.right() {
            painter.circle_filled(Pos2::new(x, y), radius, dot);
            x += step;
        }
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn outline(width: f32) -> Stroke {
    Stroke::new(width, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
}

pub(super) fn local(rect: Rect, pointer: Pos2) -> Pos2 {
    (pointer - rect.min).to_pos2()
}
