use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face-region detection.
///
/// `upsample_level` magnifies the frame before searching (level `n` means
/// 2^n per axis) so small faces become detectable. Candidates are returned in
/// detector order and expressed in the coordinates of the original frame.
///
/// Instances are owned by one worker and never shared, hence `&mut self`
/// and no `Send` bound.
pub trait FaceDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        upsample_level: u32,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
