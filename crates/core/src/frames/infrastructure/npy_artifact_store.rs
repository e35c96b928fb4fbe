use std::fs;
use std::path::Path;

use crate::frames::domain::artifact_store::ArtifactStore;
use crate::frames::domain::output_layout::{ArtifactTag, OutputLayout};
use crate::shared::frame::Frame;
use crate::shared::frame_error::FrameError;
use crate::shared::landmarks::Landmarks;

use super::npy;

/// Buffers and landmarks as `.npy`, comparisons as PNG.
pub struct NpyArtifactStore;

impl NpyArtifactStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NpyArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

fn write_bytes(path: &Path, bytes: std::io::Result<Vec<u8>>) -> Result<(), FrameError> {
    let bytes = bytes.map_err(|e| FrameError::persist(path, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FrameError::persist(path, e))?;
    }
    fs::write(path, bytes).map_err(|e| FrameError::persist(path, e))
}

fn read_gray(path: &Path) -> Result<Frame, FrameError> {
    let bytes = fs::read(path).map_err(|e| FrameError::load(path, e))?;
    npy::decode_gray(&bytes).map_err(|e| FrameError::load(path, e))
}

impl ArtifactStore for NpyArtifactStore {
    fn save_normalized(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        frame: &Frame,
    ) -> Result<(), FrameError> {
        write_bytes(&layout.normalized_path(id, tag), npy::encode_gray(frame))
    }

    fn save_processed(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        frame: &Frame,
    ) -> Result<(), FrameError> {
        write_bytes(&layout.processed_path(id, tag), npy::encode_gray(frame))
    }

    fn save_landmarks(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        landmarks: &Landmarks,
    ) -> Result<(), FrameError> {
        write_bytes(&layout.landmarks_path(id, tag), npy::encode_landmarks(landmarks))
    }

    fn save_comparison(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        image: &Frame,
    ) -> Result<(), FrameError> {
        let path = layout.comparison_path(id, tag);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FrameError::persist(&path, e))?;
        }
        let img = image::RgbImage::from_raw(image.width(), image.height(), image.data().to_vec())
            .ok_or_else(|| FrameError::persist(&path, "comparison is not an RGB buffer"))?;
        img.save(&path).map_err(|e| FrameError::persist(&path, e))
    }

    fn load_normalized(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
    ) -> Result<Frame, FrameError> {
        read_gray(&layout.normalized_path(id, tag))
    }

    fn load_processed(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
    ) -> Result<Frame, FrameError> {
        read_gray(&layout.processed_path(id, tag))
    }
}
