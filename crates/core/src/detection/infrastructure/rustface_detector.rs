/// SeetaFace frontal detector through the `rustface` crate.
///
/// Upsample level `n` magnifies the frame by `2^n` per axis before the
/// search, which lets the cascade find faces smaller than its minimum window.
/// Regions are mapped back into original frame coordinates.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

const MIN_FACE_SIZE: u32 = 20;
const SCORE_THRESH: f64 = 2.0;
const PYRAMID_SCALE_FACTOR: f32 = 0.8;
const SLIDE_WINDOW_STEP: u32 = 4;

/// Highest accepted level (32x per axis).
pub const MAX_UPSAMPLE_LEVEL: u32 = 5;

pub struct RustfaceDetector {
    detector: Box<dyn rustface::Detector>,
}

impl RustfaceDetector {
    /// Load a SeetaFace model file (`seeta_fd_frontal_v1.0.bin`).
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let reader = BufReader::new(File::open(model_path)?);
        let model = rustface::read_model(reader)?;
        Ok(Self::from_model(model))
    }

    /// Build a detector around an already loaded model.
    pub fn from_model(model: rustface::Model) -> Self {
        let mut detector = rustface::create_detector_with_model(model);
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);
        Self { detector }
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        upsample_level: u32,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if frame.channels() != 1 {
            return Err(format!(
                "face detection expects a single-channel frame, got {} channels",
                frame.channels()
            )
            .into());
        }
        if upsample_level > MAX_UPSAMPLE_LEVEL {
            return Err(format!(
                "upsample level {upsample_level} exceeds maximum {MAX_UPSAMPLE_LEVEL}"
            )
            .into());
        }

        let factor = 1u32 << upsample_level;
        let image = upsampled(frame, factor)?;
        let faces = self.detector.detect(&rustface::ImageData::new(
            image.as_raw(),
            image.width(),
            image.height(),
        ));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                to_frame_coordinates(
                    bbox.x(),
                    bbox.y(),
                    bbox.width(),
                    bbox.height(),
                    factor,
                )
            })
            .collect())
    }
}

fn upsampled(frame: &Frame, factor: u32) -> Result<GrayImage, Box<dyn std::error::Error>> {
    let image = GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("frame buffer does not match its dimensions")?;
    if factor == 1 {
        return Ok(image);
    }
    let w = frame.width().checked_mul(factor).ok_or("upsampled width overflows")?;
    let h = frame.height().checked_mul(factor).ok_or("upsampled height overflows")?;
    Ok(imageops::resize(&image, w, h, FilterType::Triangle))
}

fn to_frame_coordinates(x: i32, y: i32, width: u32, height: u32, factor: u32) -> Region {
    let f = factor as i32;
    Region::new(x / f, y / f, width as i32 / f, height as i32 / f)
}
