use crate::shared::frame::{Frame, RawFrame};
use crate::shared::frame_error::FrameError;

/// Produces the 8-bit buffer the face detector searches.
///
/// Implementations are shared by all workers.
pub trait FramePreprocessor: Send + Sync {
    fn preprocess(&self, raw: &RawFrame) -> Result<Frame, FrameError>;
}
