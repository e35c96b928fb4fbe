use std::fs::File;
use std::path::Path;

use crate::frames::domain::frame_reader::FrameReader;
use crate::shared::constants::{IMAGE_EXTENSIONS, NPY_EXTENSION};
use crate::shared::frame::RawFrame;
use crate::shared::frame_error::FrameError;

use super::npy::{self, NpyError};

/// Reads `.npy` arrays through a memory map and common image formats
/// through the `image` crate.
///
/// Images decode to 16-bit luma so high bit-depth captures keep their range.
pub struct FileFrameReader;

impl FileFrameReader {
    pub fn new() -> Self {
        Self
    }

    /// Whether `path` has an extension this reader understands.
    pub fn supports(path: &Path) -> bool {
        match extension(path) {
            Some(ext) => ext == NPY_EXTENSION || IMAGE_EXTENSIONS.contains(&ext.as_str()),
            None => false,
        }
    }

    fn read_npy(path: &Path) -> Result<RawFrame, FrameError> {
        let file = File::open(path).map_err(|e| FrameError::load(path, e))?;
        // Safety: the map is read-only and dropped before this function
        // returns. Concurrent truncation of the file by another process
        // is not guarded against.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| FrameError::load(path, e))?;
        let decoded = npy::decode_frame(&mmap[..]);
        drop(mmap);
        drop(file);
        decoded.map_err(|e| match e {
            NpyError::Io(e) => FrameError::load(path, e),
            NpyError::Layout(reason) => FrameError::layout(path, reason),
        })
    }

    fn read_image(path: &Path) -> Result<RawFrame, FrameError> {
        let img = image::open(path).map_err(|e| FrameError::load(path, e))?;
        let luma = img.into_luma16();
        let (w, h) = luma.dimensions();
        let samples = luma.into_raw().into_iter().map(f64::from).collect();
        Ok(RawFrame::new(samples, w, h))
    }
}

impl Default for FileFrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader for FileFrameReader {
    fn read(&self, path: &Path) -> Result<RawFrame, FrameError> {
        match extension(path).as_deref() {
            Some(NPY_EXTENSION) => Self::read_npy(path),
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => Self::read_image(path),
            _ => Err(FrameError::layout(path, "unsupported file type")),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}
