use std::path::Path;

use super::frame_source::FrameSource;

/// Enumerates the frame files of an input location in a stable order.
pub trait FrameCatalog {
    fn list(&self, input_dir: &Path) -> std::io::Result<Vec<FrameSource>>;
}
