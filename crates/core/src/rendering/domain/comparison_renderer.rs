use crate::shared::frame::Frame;
use crate::shared::frame_error::FrameError;
use crate::shared::landmarks::Landmarks;
use crate::shared::region::Region;

/// Side-by-side visualization of one frame's buffers and landmarks.
pub trait ComparisonRenderer: Send + Sync {
    /// Compose an RGB image: normalized | processed | processed with
    /// landmarks. The bounding box, when given, is drawn on every panel.
    fn render(
        &self,
        normalized: &Frame,
        processed: &Frame,
        landmarks: &Landmarks,
        bounding_box: Option<Region>,
    ) -> Result<Frame, FrameError>;
}
