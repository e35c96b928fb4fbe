use crate::preprocessing::domain::frame_preprocessor::FramePreprocessor;
use crate::preprocessing::domain::preprocess_params::PreprocessParams;
use crate::shared::frame::{Frame, RawFrame};
use crate::shared::frame_error::FrameError;

use super::filters;

/// Tile grid per axis used by local contrast equalization.
const CLAHE_GRID: usize = 16;

/// Contrast and noise conditioning for near-infrared frames.
///
/// Chain: min-max to 8 bits, gamma LUT, bilateral smoothing, CLAHE,
/// linear scale with absolute value, 3x3 morphological closing.
pub struct NirPreprocessor {
    params: PreprocessParams,
    gamma_lut: [u8; 256],
}

impl NirPreprocessor {
    pub fn new(params: PreprocessParams) -> Self {
        let gamma_lut = filters::gamma_lut(params.gamma());
        Self { params, gamma_lut }
    }

    pub fn params(&self) -> &PreprocessParams {
        &self.params
    }
}

impl FramePreprocessor for NirPreprocessor {
    fn preprocess(&self, raw: &RawFrame) -> Result<Frame, FrameError> {
        let (w, h) = (raw.width() as usize, raw.height() as usize);
        if w == 0 || h == 0 {
            return Err(FrameError::Preprocess(format!("empty frame {w}x{h}")));
        }
        let p = &self.params;

        let mut data = raw.normalize_min_max().into_data();
        filters::apply_lut(&mut data, &self.gamma_lut);
        let data = filters::bilateral(
            &data,
            w,
            h,
            p.bilateral_d(),
            p.bilateral_sigma_color(),
            p.bilateral_sigma_space(),
        );
        let mut data = filters::clahe(&data, w, h, p.contrast_clip(), CLAHE_GRID);
        filters::convert_scale_abs(&mut data, p.alpha(), p.beta());
        let data = filters::morph_close_3x3(&data, w, h);

        Ok(Frame::gray(data, raw.width(), raw.height()))
    }
}
