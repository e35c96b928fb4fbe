/// An 8-bit image buffer: contiguous samples in row-major order.
///
/// Detection and display buffers are single-channel; rendered comparison
/// images carry three (RGB) channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn gray(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(data, width, height, 1)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }
}

/// A frame as read from its source, before any rescaling.
///
/// Sensor values keep their native range (e.g. 10/12/16-bit NIR counts or
/// floating point radiance) and are stored as `f64`, single channel.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrame {
    samples: Vec<f64>,
    width: u32,
    height: u32,
}

impl RawFrame {
    pub fn new(samples: Vec<f64>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            samples.len(),
            (width as usize) * (height as usize),
            "sample count must equal width * height"
        );
        Self {
            samples,
            width,
            height,
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Min-max rescale to the full 8-bit range.
    ///
    /// Values are truncated, so the maximum maps to 255 and the midpoint of a
    /// `[0, 100]` range maps to 127. A constant frame maps to all zeros.
    /// Non-finite samples are ignored when computing the range and map to 0.
    pub fn normalize_min_max(&self) -> Frame {
        let (min, max) = self
            .samples
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        let range = max - min;

        let data = self
            .samples
            .iter()
            .map(|&v| {
                if v.is_finite() && range > 0.0 {
                    ((v - min) * 255.0 / range).clamp(0.0, 255.0) as u8
                } else {
                    0
                }
            })
            .collect();

        Frame::gray(data, self.width, self.height)
    }
}
