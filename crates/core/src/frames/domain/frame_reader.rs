use std::path::Path;

use crate::shared::frame::RawFrame;
use crate::shared::frame_error::FrameError;

/// Loads a frame file into an owned single-channel sample buffer.
///
/// No handle on the file outlives the call.
pub trait FrameReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<RawFrame, FrameError>;
}
