//! Color and depth storage with dirty-region tracking.
//!
//! Every accepted pixel write grows a [`DirtyRect`]. Resetting for the next
//! frame only clears that region, and displaying only transfers it (plus
//! whatever the previous reset wiped), so small objects on a large surface
//! stay cheap.

use super::depth::{DepthBuffer, FAR};
use super::surface::{PixelRect, Surface};
use crate::colors;

/// Bounding box of the pixels written since the last reset.
///
/// Bounds are inclusive. The empty state is inverted (minimum past the
/// surface, maximum before it) so the first included pixel sets both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    x_min: i32,
    y_min: i32,
    x_max: i32,
    y_max: i32,
}

impl DirtyRect {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            x_min: width as i32,
            y_min: height as i32,
            x_max: -1,
            y_max: -1,
        }
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x_min: 0,
            y_min: 0,
            x_max: width as i32 - 1,
            y_max: height as i32 - 1,
        }
    }

    #[inline]
    pub fn include(&mut self, x: i32, y: i32) {
        self.x_min = self.x_min.min(x);
        self.y_min = self.y_min.min(y);
        self.x_max = self.x_max.max(x);
        self.y_max = self.y_max.max(y);
    }

    pub fn is_empty(&self) -> bool {
        self.x_max < self.x_min || self.y_max < self.y_min
    }

    /// The covered area, or `None` if nothing was touched.
    pub fn to_rect(&self) -> Option<PixelRect> {
        if self.is_empty() {
            return None;
        }
        Some(PixelRect::new(
            self.x_min as u32,
            self.y_min as u32,
            (self.x_max - self.x_min + 1) as u32,
            (self.y_max - self.y_min + 1) as u32,
        ))
    }
}

/// Owning color buffer plus depth buffer.
///
/// Colors are packed ARGB (see [`colors`]).
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    color: Vec<u32>,
    depth: DepthBuffer,
    width: u32,
    height: u32,
    background: u32,
    dirty: DirtyRect,
    // Cleared by the last reset but not yet shown.
    cleared: Option<PixelRect>,
    depth_view: bool,
    scratch: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, background: u32) -> Self {
        Self {
            color: vec![background; (width * height) as usize],
            depth: DepthBuffer::new(width, height),
            width,
            height,
            background,
            dirty: DirtyRect::full(width, height),
            cleared: None,
            depth_view: false,
            scratch: Vec::new(),
        }
    }

    /// Reallocate for a new size; the whole surface is repainted next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self {
            depth_view: self.depth_view,
            ..Self::new(width, height, self.background)
        };
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    pub fn set_background(&mut self, background: u32) {
        self.background = background;
        self.dirty = DirtyRect::full(self.width, self.height);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    /// Depth-tested write.
    ///
    /// `shade` is only evaluated when the depth test passes. Returns whether
    /// the pixel was written; out-of-bounds pixels are silently ignored.
    #[inline]
    pub fn set_pixel_with_depth(
        &mut self,
        x: i32,
        y: i32,
        z: f32,
        shade: impl FnOnce() -> u32,
    ) -> bool {
        if !self.depth.test_and_set(x, y, z) {
            return false;
        }
        if let Some(idx) = self.index(x, y) {
            self.color[idx] = shade();
            self.dirty.include(x, y);
        }
        true
    }

    /// Write without depth testing (outlines, overlays).
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        self.color[idx] = color;
        self.dirty.include(x, y);
        true
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color[idx])
    }

    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.depth.get(x, y)
    }

    pub fn color_buffer(&self) -> &[u32] {
        &self.color
    }

    pub fn dirty_rect(&self) -> Option<PixelRect> {
        self.dirty.to_rect()
    }

    pub fn depth_view(&self) -> bool {
        self.depth_view
    }

    pub fn set_depth_view(&mut self, enabled: bool) {
        self.depth_view = enabled;
    }

    /// Show depth instead of color on the next display.
    pub fn toggle_depth_view(&mut self) {
        self.depth_view = !self.depth_view;
    }

    /// Clear the dirty region to the background and far depth.
    pub fn reset(&mut self) {
        let Some(rect) = self.dirty.to_rect() else {
            return;
        };
        for y in rect.y..rect.bottom() {
            let row = (y * self.width) as usize;
            self.color[row + rect.x as usize..row + rect.right() as usize].fill(self.background);
        }
        self.depth.reset_region(rect);
        self.cleared = Some(match self.cleared {
            Some(prev) => prev.union(&rect),
            None => rect,
        });
        self.dirty = DirtyRect::empty(self.width, self.height);
    }

    /// Transfer the changed region to `surface`.
    ///
    /// The region is the dirty rectangle joined with the area the previous
    /// reset cleared, so pixels an object vacated are repainted too. Returns
    /// the transferred rectangle, or `None` when nothing changed.
    pub fn display(&mut self, surface: &mut impl Surface) -> Option<PixelRect> {
        let region = match (self.dirty.to_rect(), self.cleared.take()) {
            (Some(d), Some(c)) => d.union(&c),
            (Some(r), None) | (None, Some(r)) => r,
            (None, None) => return None,
        };

        if self.depth_view {
            self.compose_depth_view(region);
            surface.blit(region, &self.scratch, region.width as usize);
        } else {
            let start = (region.y * self.width + region.x) as usize;
            surface.blit(region, &self.color[start..], self.width as usize);
        }
        Some(region)
    }

    // Depth inside `region` rescaled to [0, 1] and multiplied into the colors.
    fn compose_depth_view(&mut self, region: PixelRect) {
        self.scratch.clear();
        let range = self.depth.range(region);
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                let idx = (y * self.width + x) as usize;
                let color = self.color[idx];
                let z = self.depth.get(x as i32, y as i32).unwrap_or(FAR);
                let shaded = match range {
                    Some((lo, hi)) if z != FAR => {
                        let factor = if hi > lo { (z - lo) / (hi - lo) } else { 1.0 };
                        colors::modulate(color, factor)
                    }
                    _ => color,
                };
                self.scratch.push(shaded);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::ImageSurface;

    #[test]
    fn test_single_pixel_dirty_rect() {
        let mut fb = FrameBuffer::new(64, 64, colors::BLACK);
        fb.reset();
        assert_eq!(fb.dirty_rect(), None);
        fb.set_pixel_with_depth(10, 20, 0.0, || colors::RED);
        assert_eq!(fb.dirty_rect(), Some(PixelRect::new(10, 20, 1, 1)));
    }

    #[test]
    fn test_shade_only_runs_when_depth_passes() {
        let mut fb = FrameBuffer::new(8, 8, colors::BLACK);
        assert!(fb.set_pixel_with_depth(1, 1, 5.0, || colors::RED));
        let mut called = false;
        assert!(!fb.set_pixel_with_depth(1, 1, 4.0, || {
            called = true;
            colors::GREEN
        }));
        assert!(!called);
        // ties overwrite
        assert!(fb.set_pixel_with_depth(1, 1, 5.0, || colors::BLUE));
        assert_eq!(fb.get_pixel(1, 1), Some(colors::BLUE));
    }

    #[test]
    fn test_reset_clears_dirty_region_only() {
        let mut fb = FrameBuffer::new(8, 8, colors::BLACK);
        fb.reset();
        fb.set_pixel_with_depth(2, 2, 1.0, || colors::RED);
        fb.set_pixel_with_depth(3, 4, 1.0, || colors::RED);
        fb.reset();
        assert_eq!(fb.get_pixel(2, 2), Some(colors::BLACK));
        assert_eq!(fb.depth_at(3, 4), Some(FAR));
        assert_eq!(fb.dirty_rect(), None);
    }

    #[test]
    fn test_display_transfers_dirty_and_vacated_area() {
        let mut fb = FrameBuffer::new(16, 16, colors::BLACK);
        let mut surface = ImageSurface::new(16, 16);

        // first frame repaints everything
        fb.reset();
        fb.set_pixel_with_depth(2, 2, 0.0, || colors::RED);
        assert_eq!(fb.display(&mut surface), Some(PixelRect::new(0, 0, 16, 16)));
        assert_eq!(surface.pixel(2, 2), Some(colors::RED));

        fb.reset();
        fb.set_pixel_with_depth(5, 6, 0.0, || colors::GREEN);
        let shown = fb.display(&mut surface).unwrap();
        assert_eq!(shown, PixelRect::new(2, 2, 4, 5));
        assert_eq!(surface.pixel(2, 2), Some(colors::BLACK));
        assert_eq!(surface.pixel(5, 6), Some(colors::GREEN));

        fb.reset();
        fb.display(&mut surface);
        assert_eq!(fb.display(&mut surface), None);
    }

    #[test]
    fn test_depth_view_scales_colors() {
        let mut fb = FrameBuffer::new(4, 1, colors::BLACK);
        let mut surface = ImageSurface::new(4, 1);
        fb.reset();
        fb.set_pixel_with_depth(0, 0, 0.0, || colors::rgba(200, 200, 200, 255));
        fb.set_pixel_with_depth(1, 0, 10.0, || colors::rgba(200, 200, 200, 255));
        fb.toggle_depth_view();
        fb.display(&mut surface);
        assert_eq!(surface.pixel(0, 0), Some(colors::rgba(0, 0, 0, 255)));
        assert_eq!(surface.pixel(1, 0), Some(colors::rgba(200, 200, 200, 255)));
        // color data itself is untouched
        assert_eq!(fb.get_pixel(0, 0), Some(colors::rgba(200, 200, 200, 255)));
    }
}
