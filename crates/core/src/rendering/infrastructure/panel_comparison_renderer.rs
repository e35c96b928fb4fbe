use crate::rendering::domain::comparison_renderer::ComparisonRenderer;
use crate::shared::frame::Frame;
use crate::shared::frame_error::FrameError;
use crate::shared::landmarks::Landmarks;
use crate::shared::region::Region;

const PANELS: u32 = 3;
const BOX_COLOR: [u8; 3] = [0, 0, 255];
const BOX_THICKNESS: i32 = 2;
const POINT_COLOR: [u8; 3] = [255, 0, 0];
/// Half-width of the square drawn per landmark (3x3).
const POINT_RADIUS: i32 = 1;

/// Renders three equally sized gray panels into one RGB canvas.
pub struct PanelComparisonRenderer;

impl PanelComparisonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PanelComparisonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

struct Canvas {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 3],
            width,
            height,
        }
    }

    fn blit_gray(&mut self, panel: u32, frame: &Frame) {
        let pw = frame.width() as usize;
        let x0 = panel as usize * pw;
        for (y, row) in frame.data().chunks_exact(pw).enumerate() {
            for (x, &v) in row.iter().enumerate() {
                let i = (y * self.width as usize + x0 + x) * 3;
                self.data[i..i + 3].copy_from_slice(&[v, v, v]);
            }
        }
    }

    /// Set a pixel inside panel `panel` of width `panel_w`; clipped to it.
    fn put(&mut self, panel: u32, panel_w: u32, x: i32, y: i32, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= panel_w as i32 || y >= self.height as i32 {
            return;
        }
        let cx = (panel * panel_w) as usize + x as usize;
        let i = (y as usize * self.width as usize + cx) * 3;
        self.data[i..i + 3].copy_from_slice(&color);
    }

    fn rect(&mut self, panel: u32, panel_w: u32, r: &Region, color: [u8; 3]) {
        let (x1, y1) = (r.x, r.y);
        let (x2, y2) = (r.x + r.width - 1, r.y + r.height - 1);
        for t in 0..BOX_THICKNESS {
            for x in x1..=x2 {
                self.put(panel, panel_w, x, y1 + t, color);
                self.put(panel, panel_w, x, y2 - t, color);
            }
            for y in y1..=y2 {
                self.put(panel, panel_w, x1 + t, y, color);
                self.put(panel, panel_w, x2 - t, y, color);
            }
        }
    }

    fn dot(&mut self, panel: u32, panel_w: u32, x: i32, y: i32, color: [u8; 3]) {
        for dy in -POINT_RADIUS..=POINT_RADIUS {
            for dx in -POINT_RADIUS..=POINT_RADIUS {
                self.put(panel, panel_w, x + dx, y + dy, color);
            }
        }
    }
}

impl ComparisonRenderer for PanelComparisonRenderer {
    fn render(
        &self,
        normalized: &Frame,
        processed: &Frame,
        landmarks: &Landmarks,
        bounding_box: Option<Region>,
    ) -> Result<Frame, FrameError> {
        let (w, h) = (normalized.width(), normalized.height());
        if (processed.width(), processed.height()) != (w, h) {
            return Err(FrameError::Render(format!(
                "panel size mismatch: {w}x{h} vs {}x{}",
                processed.width(),
                processed.height()
            )));
        }
        if normalized.channels() != 1 || processed.channels() != 1 {
            return Err(FrameError::Render("panels must be single-channel".into()));
        }
        if w == 0 || h == 0 {
            return Err(FrameError::Render("empty panels".into()));
        }

        let mut canvas = Canvas::new(w * PANELS, h);
        canvas.blit_gray(0, normalized);
        canvas.blit_gray(1, processed);
        canvas.blit_gray(2, processed);

        if let Some(r) = bounding_box {
            for panel in 0..PANELS {
                canvas.rect(panel, w, &r, BOX_COLOR);
            }
        }
        for &(x, y) in landmarks.points() {
            canvas.dot(2, w, x, y, POINT_COLOR);
        }

        Ok(Frame::new(canvas.data, canvas.width, canvas.height, 3))
    }
}
