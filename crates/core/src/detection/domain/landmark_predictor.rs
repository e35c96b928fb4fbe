use crate::shared::frame::Frame;
use crate::shared::landmarks::Landmarks;
use crate::shared::region::Region;

/// Domain interface for 68-point shape prediction inside a face region.
pub trait LandmarkPredictor {
    fn predict(
        &mut self,
        frame: &Frame,
        region: &Region,
    ) -> Result<Landmarks, Box<dyn std::error::Error>>;
}
