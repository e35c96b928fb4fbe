/// Axis-aligned face bounds in frame pixel coordinates.
///
/// Coordinates may extend past the frame edges after scaling; consumers that
/// sample pixels clamp on their side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Scales width and height independently about the region center.
    ///
    /// The result is re-quantized by truncation toward zero, so the top-left
    /// corner of `(10, 10, 100, 100)` scaled by `(1.2, 1.0)` lands on `(0, 10)`.
    pub fn scaled(&self, sx: f64, sy: f64) -> Region {
        let (cx, cy) = self.center();
        let w = self.width as f64 * sx;
        let h = self.height as f64 * sy;
        Region {
            x: (cx - w / 2.0) as i32,
            y: (cy - h / 2.0) as i32,
            width: w as i32,
            height: h as i32,
        }
    }

    /// Clips the region to a `frame_w` x `frame_h` frame.
    ///
    /// Returns `None` when nothing of the region lies inside the frame.
    pub fn clamped(&self, frame_w: u32, frame_h: u32) -> Option<Region> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = (self.x + self.width).min(frame_w as i32);
        let y2 = (self.y + self.height).min(frame_h as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Region::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// `(x, y, width, height)` tuple, the layout persisted and rendered.
    pub fn as_tuple(&self) -> (i32, i32, i32, i32) {
        (self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_center() {
        let (cx, cy) = Region::new(10, 10, 100, 100).center();
        assert_relative_eq!(cx, 60.0);
        assert_relative_eq!(cy, 60.0);
    }

    #[test]
    fn test_scaled_widens_about_center() {
        let adjusted = Region::new(10, 10, 100, 100).scaled(1.2, 1.0);
        assert_eq!(adjusted, Region::new(0, 10, 120, 100));
        let (cx, cy) = adjusted.center();
        assert_relative_eq!(cx, 60.0);
        assert_relative_eq!(cy, 60.0);
    }

    #[test]
    fn test_scaled_identity() {
        let r = Region::new(37, 12, 81, 64);
        assert_eq!(r.scaled(1.0, 1.0), r);
    }

    #[rstest]
    #[case::taller(Region::new(100, 100, 50, 80), 1.0, 1.5, Region::new(100, 80, 50, 120))]
    #[case::shrink(Region::new(0, 0, 100, 100), 0.5, 0.5, Region::new(25, 25, 50, 50))]
    #[case::truncates_fraction(Region::new(0, 0, 11, 11), 1.1, 1.1, Region::new(0, 0, 12, 12))]
    fn test_scaled_cases(
        #[case] region: Region,
        #[case] sx: f64,
        #[case] sy: f64,
        #[case] expected: Region,
    ) {
        assert_eq!(region.scaled(sx, sy), expected);
    }

    #[test]
    fn test_clamped_inside_is_unchanged() {
        let r = Region::new(10, 10, 20, 20);
        assert_eq!(r.clamped(100, 100), Some(r));
    }

    #[test]
    fn test_clamped_clips_edges() {
        let r = Region::new(-10, 90, 30, 30);
        assert_eq!(r.clamped(100, 100), Some(Region::new(0, 90, 20, 10)));
    }

    #[test]
    fn test_clamped_outside_is_none() {
        assert_eq!(Region::new(200, 200, 10, 10).clamped(100, 100), None);
    }
}
