use macroquad::prelude::{Rect, Vec2};

/// Half-open window of grid cells `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileWindow {
    /// First column
    pub x0: u32,
    /// First row
    pub y0: u32,
    /// One past the last column
    pub x1: u32,
    /// One past the last row
    pub y1: u32,
}

impl TileWindow {
    /// Whether cell `(x, y)` lies in the window.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Whether the window covers no cell.
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Number of cells covered.
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (self.x1 - self.x0) as u64 * (self.y1 - self.y0) as u64
    }
}

fn span(start: f32, len: f32) -> (f32, f32) {
    if len < 0.0 {
        (start + len, start)
    } else {
        (start, start + len)
    }
}

/// A rect with non-negative width and height covering the same area.
pub fn normalize(r: Rect) -> Rect {
    let (x0, x1) = span(r.x, r.w);
    let (y0, y1) = span(r.y, r.h);
    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Part of `view` inside `bounds`, or `None` when they do not overlap.
/// Views with a non-finite origin or a NaN size never overlap.
pub fn clip_view(view: Rect, bounds: Rect) -> Option<Rect> {
    if !(view.x.is_finite() && view.y.is_finite()) || view.w.is_nan() || view.h.is_nan() {
        return None;
    }
    let (x0, x1) = span(view.x, view.w);
    let (y0, y1) = span(view.y, view.h);
    let left = x0.max(bounds.x);
    let top = y0.max(bounds.y);
    let right = x1.min(bounds.x + bounds.w);
    let bottom = y1.min(bounds.y + bounds.h);
    if !(right > left && bottom > top) {
        return None;
    }
    Some(Rect::new(left, top, right - left, bottom - top))
}

fn clamp_cell(v: f32, max: u32) -> u32 {
    if !(v > 0.0) {
        return 0;
    }
    if v >= max as f32 {
        return max;
    }
    v as u32
}

/// Cells of a `grid_w x grid_h` layer whose tiles can intersect `view`.
///
/// `origin` is the layer's pixel offset. The window is padded by `margin`
/// cells on every side, then clamped to the grid; out-of-range views give
/// an empty window rather than an error.
pub fn visible_window(
    view: Rect,
    origin: Vec2,
    tile_w: u32,
    tile_h: u32,
    grid_w: u32,
    grid_h: u32,
    margin: u32,
) -> TileWindow {
    if tile_w == 0 || tile_h == 0 {
        return TileWindow::default();
    }
    let view = normalize(view);
    let (tw, th) = (tile_w as f32, tile_h as f32);
    let m = margin as f32;

    let x0 = ((view.x - origin.x) / tw).floor() - m;
    let y0 = ((view.y - origin.y) / th).floor() - m;
    let x1 = ((view.x + view.w - origin.x) / tw).ceil() + m;
    let y1 = ((view.y + view.h - origin.y) / th).ceil() + m;

    TileWindow {
        x0: clamp_cell(x0, grid_w),
        y0: clamp_cell(y0, grid_h),
        x1: clamp_cell(x1, grid_w),
        y1: clamp_cell(y1, grid_h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_over_two_by_two_tiles() {
        let w = visible_window(Rect::new(0.0, 0.0, 32.0, 32.0), Vec2::ZERO, 16, 16, 10, 10, 0);
        assert_eq!(w, TileWindow { x0: 0, y0: 0, x1: 2, y1: 2 });
        assert!(w.contains(1, 1));
        assert!(!w.contains(2, 0));
        assert_eq!(w.area(), 4);
    }

    #[test]
    fn partial_tiles_at_the_edges_are_included() {
        let w = visible_window(Rect::new(8.0, 8.0, 16.0, 16.0), Vec2::ZERO, 16, 16, 10, 10, 0);
        assert_eq!(w, TileWindow { x0: 0, y0: 0, x1: 2, y1: 2 });
    }

    #[test]
    fn out_of_range_views_are_clamped() {
        let w = visible_window(Rect::new(-100.0, -50.0, 1000.0, 1000.0), Vec2::ZERO, 16, 16, 4, 3, 0);
        assert_eq!(w, TileWindow { x0: 0, y0: 0, x1: 4, y1: 3 });

        let off = visible_window(Rect::new(500.0, 500.0, 10.0, 10.0), Vec2::ZERO, 16, 16, 4, 3, 0);
        assert!(off.is_empty());
    }

    #[test]
    fn margin_and_origin_shift_the_window() {
        let w = visible_window(Rect::new(32.0, 32.0, 16.0, 16.0), Vec2::ZERO, 16, 16, 10, 10, 1);
        assert_eq!(w, TileWindow { x0: 1, y0: 1, x1: 4, y1: 4 });

        let shifted = visible_window(Rect::new(32.0, 32.0, 16.0, 16.0), Vec2::new(16.0, 0.0), 16, 16, 10, 10, 0);
        assert_eq!(shifted, TileWindow { x0: 1, y0: 2, x1: 2, y1: 3 });
    }

    #[test]
    fn views_are_clipped_to_bounds() {
        let bounds = Rect::new(0.0, 0.0, 64.0, 64.0);
        assert_eq!(
            clip_view(Rect::new(-10.0, 32.0, 1.0e6, 1.0e6), bounds),
            Some(Rect::new(0.0, 32.0, 64.0, 32.0))
        );
        assert_eq!(
            clip_view(Rect::new(0.0, 0.0, f32::INFINITY, f32::INFINITY), bounds),
            Some(bounds)
        );
        assert_eq!(clip_view(Rect::new(100.0, 0.0, 10.0, 10.0), bounds), None);
        assert_eq!(clip_view(Rect::new(f32::NAN, 0.0, 10.0, 10.0), bounds), None);
        assert_eq!(clip_view(Rect::new(f32::NEG_INFINITY, 0.0, f32::INFINITY, 10.0), bounds), None);
    }

    #[test]
    fn inverted_view_is_normalized() {
        let w = visible_window(Rect::new(32.0, 32.0, -32.0, -32.0), Vec2::ZERO, 16, 16, 10, 10, 0);
        assert_eq!(w, TileWindow { x0: 0, y0: 0, x1: 2, y1: 2 });
    }
}
