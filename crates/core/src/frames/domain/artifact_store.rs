use crate::shared::frame::Frame;
use crate::shared::frame_error::FrameError;
use crate::shared::landmarks::Landmarks;

use super::output_layout::{ArtifactTag, OutputLayout};

/// Identifier- and tag-addressed persistence of per-frame artifacts.
///
/// Shared by all workers; every call touches only the files of one frame.
pub trait ArtifactStore: Send + Sync {
    fn save_normalized(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        frame: &Frame,
    ) -> Result<(), FrameError>;

    fn save_processed(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        frame: &Frame,
    ) -> Result<(), FrameError>;

    fn save_landmarks(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        landmarks: &Landmarks,
    ) -> Result<(), FrameError>;

    fn save_comparison(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        image: &Frame,
    ) -> Result<(), FrameError>;

    /// Reload a persisted normalized buffer, for re-rendering.
    fn load_normalized(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
    ) -> Result<Frame, FrameError>;

    /// Reload a persisted detection buffer, for re-rendering.
    fn load_processed(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
    ) -> Result<Frame, FrameError>;
}
