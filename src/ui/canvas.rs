use fittr::Point;
use ratatui::layout::Rect;

/// Maps terminal cells onto canvas pixels for the area the canvas is drawn in.
///
/// A cell covers a rectangle of canvas pixels, so a click is only known to
/// have landed somewhere inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMapping {
    inner: Rect,
    canvas_width: f64,
    canvas_height: f64,
}

impl CanvasMapping {
    pub fn new(inner: Rect, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            inner,
            canvas_width: f64::from(canvas_width),
            canvas_height: f64::from(canvas_height),
        }
    }

    pub fn pixels_per_column(&self) -> f64 {
        self.canvas_width / f64::from(self.inner.width.max(1))
    }

    pub fn pixels_per_row(&self) -> f64 {
        self.canvas_height / f64::from(self.inner.height.max(1))
    }

    /// Top-left and bottom-right canvas corners of a cell, `None` off-canvas
    pub fn cell_bounds(&self, column: u16, row: u16) -> Option<(Point, Point)> {
        let inside_x = column >= self.inner.x && column - self.inner.x < self.inner.width;
        let inside_y = row >= self.inner.y && row - self.inner.y < self.inner.height;
        if !inside_x || !inside_y {
            return None;
        }

        let cx = f64::from(column - self.inner.x);
        let cy = f64::from(row - self.inner.y);
        let (pw, ph) = (self.pixels_per_column(), self.pixels_per_row());
        Some((
            Point::new(cx * pw, cy * ph),
            Point::new((cx + 1.0) * pw, (cy + 1.0) * ph),
        ))
    }

    /// Canvas position of a click on a cell.
    ///
    /// With an `aim` (the active target's center) the click resolves to the
    /// point of the cell nearest to it, otherwise to the cell center.
    ///
    /// Snapping makes a target hittable from any cell its disc touches, so the
    /// effective target is the disc grown by up to one cell while the logged
    /// width stays `2r`. The snapped point also becomes the next movement's
    /// start, which is off from the real pointer by at most one cell.
    pub fn click_point(&self, column: u16, row: u16, aim: Option<Point>) -> Option<Point> {
        let (lo, hi) = self.cell_bounds(column, row)?;
        Some(match aim {
            Some(p) => Point::new(p.x.clamp(lo.x, hi.x), p.y.clamp(lo.y, hi.y)),
            None => Point::new((lo.x + hi.x) / 2.0, (lo.y + hi.y) / 2.0),
        })
    }

    /// Canvas-space y flipped for drawing, the canvas widget counts y upwards
    pub fn draw_y(&self, y: f64) -> f64 {
        self.canvas_height - y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> CanvasMapping {
        // 100x40 cells starting at (2, 3) for a 1000x800 canvas: 10x20 px cells
        CanvasMapping::new(Rect::new(2, 3, 100, 40), 1000, 800)
    }

    #[test]
    fn test_cell_bounds() {
        let m = mapping();
        assert_eq!(
            m.cell_bounds(2, 3),
            Some((Point::new(0.0, 0.0), Point::new(10.0, 20.0)))
        );
        assert_eq!(
            m.cell_bounds(101, 42),
            Some((Point::new(990.0, 780.0), Point::new(1000.0, 800.0)))
        );
    }

    #[test]
    fn test_outside_cells_map_to_nothing() {
        let m = mapping();
        assert_eq!(m.cell_bounds(1, 10), None);
        assert_eq!(m.cell_bounds(102, 10), None);
        assert_eq!(m.cell_bounds(10, 2), None);
        assert_eq!(m.cell_bounds(10, 43), None);
    }

    #[test]
    fn test_click_point_without_aim_is_cell_center() {
        let m = mapping();
        assert_eq!(m.click_point(52, 23, None), Some(Point::new(505.0, 410.0)));
    }

    #[test]
    fn test_click_point_snaps_toward_aim_within_cell() {
        let m = mapping();
        // aim inside the clicked cell resolves exactly onto it
        assert_eq!(
            m.click_point(52, 23, Some(Point::new(503.0, 401.0))),
            Some(Point::new(503.0, 401.0))
        );
        // aim elsewhere resolves to the nearest cell edge
        assert_eq!(
            m.click_point(52, 23, Some(Point::new(700.0, 100.0))),
            Some(Point::new(510.0, 400.0))
        );
    }

    #[test]
    fn test_snapping_grows_clickable_area_by_at_most_a_cell() {
        let m = mapping();
        // r = 5 disc centered in column 52 pokes 4 px into column 53
        let (center, r) = (Point::new(509.0, 401.0), 5.0);

        let snapped = m.click_point(53, 23, Some(center)).unwrap();
        assert_eq!(snapped, Point::new(510.0, 401.0));
        assert!(snapped.distance(center) <= r);

        // the pointer may have been anywhere in that cell, up to a cell width away
        let (_, far) = m.cell_bounds(53, 23).unwrap();
        assert!(far.x - center.x > r);
        assert!(far.x - center.x <= r + m.pixels_per_column());

        // a cell the disc does not reach stays a miss
        let beyond = m.click_point(54, 23, Some(center)).unwrap();
        assert!(beyond.distance(center) > r);
    }

    #[test]
    fn test_draw_y_flips() {
        let m = mapping();
        assert_eq!(m.draw_y(0.0), 800.0);
        assert_eq!(m.draw_y(300.0), 500.0);
    }
}
