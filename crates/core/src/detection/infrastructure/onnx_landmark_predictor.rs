/// 68-point landmark regression through ONNX Runtime via `ort`.
///
/// The face region is clipped to the frame, cropped, resized to the model's
/// input resolution and scaled to `[0, 1]`. The model returns 136 values:
/// interleaved `(x, y)` pairs normalized to the crop, which are mapped back
/// to frame pixels.
use std::path::Path;

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::shared::constants::NUM_LANDMARKS;
use crate::shared::frame::Frame;
use crate::shared::landmarks::{Landmarks, Point};
use crate::shared::region::Region;

use super::onnx_session::open_worker_session;

/// Fallback input resolution when the model's spatial dims are dynamic.
const DEFAULT_INPUT_SIZE: u32 = 112;

/// Fallback channel count when the model's channel dim is dynamic.
const DEFAULT_INPUT_CHANNELS: usize = 3;

pub struct OnnxLandmarkPredictor {
    session: ort::session::Session,
    input_size: u32,
    input_channels: usize,
}

impl OnnxLandmarkPredictor {
    /// Load a landmark ONNX model.
    ///
    /// Input shape is read from the model (NCHW).
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = open_worker_session(model_path)?;

        let dims = session.inputs().first().and_then(|input| {
            if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                if shape.len() >= 4 {
                    Some((shape[1], shape[2]))
                } else {
                    None
                }
            } else {
                None
            }
        });
        let input_channels = match dims {
            Some((c, _)) if c == 1 || c == 3 => c as usize,
            _ => DEFAULT_INPUT_CHANNELS,
        };
        let input_size = match dims {
            Some((_, h)) if h > 0 => h as u32,
            _ => DEFAULT_INPUT_SIZE,
        };

        Ok(Self {
            session,
            input_size,
            input_channels,
        })
    }
}

impl LandmarkPredictor for OnnxLandmarkPredictor {
    fn predict(
        &mut self,
        frame: &Frame,
        region: &Region,
    ) -> Result<Landmarks, Box<dyn std::error::Error>> {
        let crop = region
            .clamped(frame.width(), frame.height())
            .ok_or_else(|| format!("face region {:?} lies outside the frame", region.as_tuple()))?;

        let input = crop_tensor(frame, &crop, self.input_size, self.input_channels)?;
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("landmark model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let values = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        decode_points(values, &crop)
    }
}

/// `[1, channels, size, size]` tensor of the crop, gray replicated per channel.
fn crop_tensor(
    frame: &Frame,
    crop: &Region,
    size: u32,
    channels: usize,
) -> Result<ndarray::Array4<f32>, Box<dyn std::error::Error>> {
    let image = GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("frame buffer does not match its dimensions")?;
    let patch = imageops::crop_imm(
        &image,
        crop.x as u32,
        crop.y as u32,
        crop.width as u32,
        crop.height as u32,
    )
    .to_image();
    let resized = imageops::resize(&patch, size, size, FilterType::Triangle);

    let n = size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, channels, n, n));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let v = pixel.0[0] as f32 / 255.0;
        for c in 0..channels {
            tensor[[0, c, y as usize, x as usize]] = v;
        }
    }
    Ok(tensor)
}

/// Map crop-normalized `(x, y)` pairs to rounded frame pixels.
fn decode_points(values: &[f32], crop: &Region) -> Result<Landmarks, Box<dyn std::error::Error>> {
    if values.len() < NUM_LANDMARKS * 2 {
        return Err(format!(
            "landmark model returned {} values, expected {}",
            values.len(),
            NUM_LANDMARKS * 2
        )
        .into());
    }
    let points: Vec<Point> = values[..NUM_LANDMARKS * 2]
        .chunks_exact(2)
        .map(|xy| {
            let x = crop.x as f64 + xy[0] as f64 * crop.width as f64;
            let y = crop.y as f64 + xy[1] as f64 * crop.height as f64;
            (x.round() as i32, y.round() as i32)
        })
        .collect();
    Ok(Landmarks::try_from(points)?)
}
