use eframe::egui::{Pos2, Vec2, pos2, vec2};

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if min > max {
        return min;
    }
    value.max(min).min(max)
}

pub fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    pos2((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

pub fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + vec2(radius * angle.cos(), radius * angle.sin())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    pub fn from_points(points: &[[f64; 2]]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            min: *first,
            max: *first,
        };

        for point in &points[1..] {
            for axis in 0..2 {
                bbox.min[axis] = bbox.min[axis].min(point[axis]);
                bbox.max[axis] = bbox.max[axis].max(point[axis]);
            }
        }

        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }
}

const MAX_MARGIN_SHARE: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTransform {
    pub scale: f64,
    pub offset: [f64; 2],
}

impl FitTransform {
    /// Fits `bbox` into `region` inset by `margin`, preserving aspect ratio and centering the
    /// result. The inset never takes more than a quarter of an axis, and an axis with zero
    /// extent does not take part in choosing the scale.
    pub fn fit(bbox: &BoundingBox, region: Vec2, margin: f32) -> Self {
        let margin_x = (margin as f64).min(region.x as f64 * MAX_MARGIN_SHARE);
        let margin_y = (margin as f64).min(region.y as f64 * MAX_MARGIN_SHARE);
        let available_width = (region.x as f64 - 2.0 * margin_x).max(1.0);
        let available_height = (region.y as f64 - 2.0 * margin_y).max(1.0);
        let width = bbox.width();
        let height = bbox.height();

        let x_factor = (width > f64::EPSILON).then(|| available_width / width);
        let y_factor = (height > f64::EPSILON).then(|| available_height / height);
        let scale = match (x_factor, y_factor) {
            (Some(x), Some(y)) => x.min(y),
            (Some(x), None) => x,
            (None, Some(y)) => y,
            (None, None) => 1.0,
        };

        Self {
            scale,
            offset: [
                margin_x + (available_width - width * scale) / 2.0 - scale * bbox.min[0],
                margin_y + (available_height - height * scale) / 2.0 - scale * bbox.min[1],
            ],
        }
    }

    pub fn apply(&self, point: [f64; 2]) -> Pos2 {
        pos2(
            (point[0] * self.scale + self.offset[0]) as f32,
            (point[1] * self.scale + self.offset[1]) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_inverted_bounds() {
        assert_eq!(clamp(5.0, 0.0, 3.0), 3.0);
        assert_eq!(clamp(-1.0, 0.0, 3.0), 0.0);
        assert_eq!(clamp(2.0, 4.0, 1.0), 4.0);
    }

    #[test]
    fn fit_centers_and_preserves_aspect() {
        let bbox = BoundingBox::from_points(&[[0.0, 0.0], [10.0, 5.0]]).unwrap();
        let fit = FitTransform::fit(&bbox, vec2(800.0, 600.0), 100.0);

        // 600x400 available; width-limited at 60, height 300 centered in 400.
        assert!((fit.scale - 60.0).abs() < 1e-9);
        let low = fit.apply([0.0, 0.0]);
        let high = fit.apply([10.0, 5.0]);
        assert_eq!(low, pos2(100.0, 150.0));
        assert_eq!(high, pos2(700.0, 450.0));
    }

    #[test]
    fn fit_ignores_flat_axis() {
        let bbox = BoundingBox::from_points(&[[1.0, 2.0], [3.0, 2.0]]).unwrap();
        let fit = FitTransform::fit(&bbox, vec2(800.0, 600.0), 100.0);

        assert!(fit.scale.is_finite());
        let a = fit.apply([1.0, 2.0]);
        let b = fit.apply([3.0, 2.0]);
        assert_eq!(a.y, 300.0);
        assert_eq!(b.y, 300.0);
        assert_eq!(a.x, 100.0);
        assert_eq!(b.x, 700.0);
    }

    #[test]
    fn fit_centers_single_point() {
        let bbox = BoundingBox::from_points(&[[4.0, -4.0]]).unwrap();
        let fit = FitTransform::fit(&bbox, vec2(800.0, 600.0), 100.0);
        assert_eq!(fit.apply([4.0, -4.0]), pos2(400.0, 300.0));
    }

    #[test]
    fn fit_shrinks_margin_in_small_regions() {
        let bbox = BoundingBox::from_points(&[[0.0, 0.0], [10.0, 10.0]]).unwrap();
        let fit = FitTransform::fit(&bbox, vec2(120.0, 120.0), 100.0);

        assert!((fit.scale - 6.0).abs() < 1e-9);
        assert_eq!(fit.apply([0.0, 0.0]), pos2(30.0, 30.0));
        assert_eq!(fit.apply([10.0, 10.0]), pos2(90.0, 90.0));
    }

    #[test]
    fn empty_points_have_no_bbox() {
        assert!(BoundingBox::from_points(&[]).is_none());
    }
}
