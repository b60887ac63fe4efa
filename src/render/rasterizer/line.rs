//! Bresenham line drawing for outlines and overlays.

use crate::math::Vec3;
use crate::render::framebuffer::FrameBuffer;

/// Draw a solid line between two pixel-space points.
///
/// The segment is first clipped to the buffer; endpoints are then truncated
/// to integer pixels and both are drawn. Segments with a non-finite endpoint
/// draw nothing. The depth buffer is neither consulted nor updated, so lines
/// always end up on top. Returns the number of pixels written.
pub fn draw_line(buffer: &mut FrameBuffer, from: Vec3, to: Vec3, color: u32) -> usize {
    // Anything in (-0.5, size - 0.5) truncates to a pixel inside the buffer.
    let max = (
        f64::from(buffer.width()) - 0.5,
        f64::from(buffer.height()) - 0.5,
    );
    let Some(((fx, fy), (tx, ty))) = clip_segment(
        (f64::from(from.x), f64::from(from.y)),
        (f64::from(to.x), f64::from(to.y)),
        max,
    ) else {
        return 0;
    };
    let (x0, y0) = (fx as i32, fy as i32);
    let (x1, y1) = (tx as i32, ty as i32);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let steps = dx.max(dy);

    let x_incr_direction = if x0 < x1 { 1 } else { -1 };
    let y_incr_direction = if y0 < y1 { 1 } else { -1 };

    // Positive error favors a step in x, negative a step in y.
    let mut err = dx - dy;
    let (mut x, mut y) = (x0, y0);
    let mut written = 0;

    for _ in 0..=steps {
        if buffer.set_pixel(x, y, color) {
            written += 1;
        }
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += x_incr_direction;
        }
        // both branches taken means a diagonal step
        if e2 < dx {
            err += dx;
            y += y_incr_direction;
        }
    }
    written
}

type Point = (f64, f64);

const CLIP_MIN: f64 = -0.5;

/// Liang-Barsky clip of `a`-`b` against `[-0.5, max.0] x [-0.5, max.1]`.
fn clip_segment(a: Point, b: Point, max: Point) -> Option<(Point, Point)> {
    if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, a.0 - CLIP_MIN),
        (dx, max.0 - a.0),
        (-dy, a.1 - CLIP_MIN),
        (dy, max.1 - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| (a.0 + dx * t, a.1 + dy * t);
    Some((at(t0), at(t1)))
}

/// Outline a closed polygon.
pub fn stroke_polygon(buffer: &mut FrameBuffer, points: &[Vec3], color: u32) -> usize {
    if points.len() < 2 {
        return 0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&a, &b)| draw_line(buffer, a, b, color))
        .sum()
}
