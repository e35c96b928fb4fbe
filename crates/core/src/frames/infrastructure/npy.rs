//! NumPy `.npy` encoding of frames and landmark sets via `npyz`.

use std::io::{self, Cursor};

use npyz::WriterBuilder;
use thiserror::Error;

use crate::shared::frame::{Frame, RawFrame};
use crate::shared::landmarks::{Landmarks, Point};

#[derive(Error, Debug)]
pub enum NpyError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Layout(String),
}

/// BGR luminance weights, matching how color NIR captures are stored.
const BGR_TO_GRAY: [f64; 3] = [0.114, 0.587, 0.299];

/// Decode a 2-D `[h, w]` or 3-D `[h, w, c]` (c = 1 or 3) numeric array into
/// a single-channel sample buffer. Three-channel data is treated as BGR.
pub fn decode_frame(bytes: &[u8]) -> Result<RawFrame, NpyError> {
    let npy = npyz::NpyFile::new(bytes)?;
    let shape = npy.shape().to_vec();
    let fortran = npy.order() == npyz::Order::Fortran;

    let (h, w, c) = match shape.as_slice() {
        [h, w] => (*h as usize, *w as usize, 1),
        [h, w, c] if *c == 1 || *c == 3 => (*h as usize, *w as usize, *c as usize),
        other => {
            return Err(NpyError::Layout(format!(
                "expected [h, w] or [h, w, 1|3] array, got shape {other:?}"
            )))
        }
    };
    if h == 0 || w == 0 {
        return Err(NpyError::Layout(format!("empty array of shape {shape:?}")));
    }

    let values = read_as_f64(npy)?;
    if values.len() != h * w * c {
        return Err(NpyError::Layout(format!(
            "array holds {} values, shape {shape:?} needs {}",
            values.len(),
            h * w * c
        )));
    }

    // Flat index of element (y, x, ch) in the stored order
    let index = |y: usize, x: usize, ch: usize| {
        if fortran {
            y + h * (x + w * ch)
        } else {
            (y * w + x) * c + ch
        }
    };

    let mut samples = Vec::with_capacity(h * w);
    for y in 0..h {
        for x in 0..w {
            let v = if c == 3 {
                (0..3).map(|ch| values[index(y, x, ch)] * BGR_TO_GRAY[ch]).sum()
            } else {
                values[index(y, x, 0)]
            };
            samples.push(v);
        }
    }
    Ok(RawFrame::new(samples, w as u32, h as u32))
}

fn read_as_f64(npy: npyz::NpyFile<&[u8]>) -> Result<Vec<f64>, NpyError> {
    let type_code = match npy.dtype() {
        npyz::DType::Plain(ts) => ts
            .to_string()
            .trim_start_matches(['<', '>', '|', '='])
            .to_string(),
        other => {
            return Err(NpyError::Layout(format!(
                "unsupported structured dtype {other:?}"
            )))
        }
    };

    fn widen<T: Into<f64>>(v: Vec<T>) -> Vec<f64> {
        v.into_iter().map(Into::into).collect()
    }

    Ok(match type_code.as_str() {
        "u1" => widen(npy.into_vec::<u8>()?),
        "u2" => widen(npy.into_vec::<u16>()?),
        "u4" => widen(npy.into_vec::<u32>()?),
        "i1" => widen(npy.into_vec::<i8>()?),
        "i2" => widen(npy.into_vec::<i16>()?),
        "i4" => widen(npy.into_vec::<i32>()?),
        "i8" => npy.into_vec::<i64>()?.into_iter().map(|v| v as f64).collect(),
        "f4" => widen(npy.into_vec::<f32>()?),
        "f8" => npy.into_vec::<f64>()?,
        other => {
            return Err(NpyError::Layout(format!("unsupported dtype '{other}'")));
        }
    })
}

/// Encode a single-channel frame as a `u8` `[h, w]` array.
pub fn encode_gray(frame: &Frame) -> io::Result<Vec<u8>> {
    if frame.channels() != 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("expected a single-channel frame, got {}", frame.channels()),
        ));
    }
    let shape = [frame.height() as u64, frame.width() as u64];
    encode(&shape, frame.data().iter().copied())
}

/// Encode landmarks as an `i32` `[68, 2]` array of `(x, y)` rows.
pub fn encode_landmarks(landmarks: &Landmarks) -> io::Result<Vec<u8>> {
    let points = landmarks.points();
    encode(&[points.len() as u64, 2], landmarks.to_flat())
}

fn encode<T, I>(shape: &[u64], values: I) -> io::Result<Vec<u8>>
where
    T: npyz::AutoSerialize,
    I: IntoIterator<Item = T>,
{
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = npyz::WriteOptions::<T>::new()
        .default_dtype()
        .shape(shape)
        .writer(&mut cursor)
        .begin_nd()?;
    writer.extend(values)?;
    writer.finish()?;
    Ok(cursor.into_inner())
}

/// Decode a `u8` `[h, w]` array written by [`encode_gray`].
pub fn decode_gray(bytes: &[u8]) -> Result<Frame, NpyError> {
    let npy = npyz::NpyFile::new(bytes)?;
    let (h, w) = match npy.shape() {
        [h, w] => (*h as u32, *w as u32),
        other => return Err(NpyError::Layout(format!("expected [h, w], got {other:?}"))),
    };
    let data = npy.into_vec::<u8>()?;
    if data.len() != (h as usize) * (w as usize) {
        return Err(NpyError::Layout("array length does not match its shape".into()));
    }
    Ok(Frame::gray(data, w, h))
}

/// Decode an `i32` `[68, 2]` array written by [`encode_landmarks`].
pub fn decode_landmarks(bytes: &[u8]) -> Result<Landmarks, NpyError> {
    let npy = npyz::NpyFile::new(bytes)?;
    if npy.shape().len() != 2 || npy.shape()[1] != 2 {
        return Err(NpyError::Layout(format!(
            "expected [n, 2] landmark array, got {:?}",
            npy.shape()
        )));
    }
    let flat = npy.into_vec::<i32>()?;
    let points: Vec<Point> = flat.chunks_exact(2).map(|xy| (xy[0], xy[1])).collect();
    Landmarks::try_from(points).map_err(|e| NpyError::Layout(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn npy_bytes<T: npyz::AutoSerialize>(shape: &[u64], values: Vec<T>) -> Vec<u8> {
        encode(shape, values).unwrap()
    }

    #[test]
    fn test_decode_u16_2d() {
        let bytes = npy_bytes(&[2, 3], vec![0u16, 1, 2, 3, 4, 4095]);
        let raw = decode_frame(&bytes).unwrap();
        assert_eq!((raw.width(), raw.height()), (3, 2));
        assert_relative_eq!(raw.samples()[5], 4095.0);
    }

    #[test]
    fn test_decode_f32_and_i8() {
        let raw = decode_frame(&npy_bytes(&[1, 2], vec![0.5f32, -1.5])).unwrap();
        assert_eq!(raw.samples(), &[0.5, -1.5]);
        let raw = decode_frame(&npy_bytes(&[1, 2], vec![-3i8, 7])).unwrap();
        assert_eq!(raw.samples(), &[-3.0, 7.0]);
    }

    #[test]
    fn test_decode_single_channel_3d() {
        let raw = decode_frame(&npy_bytes(&[2, 2, 1], vec![1u8, 2, 3, 4])).unwrap();
        assert_eq!(raw.samples(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_decode_bgr_to_gray() {
        // One pixel, pure red in BGR order
        let raw = decode_frame(&npy_bytes(&[1, 1, 3], vec![0u8, 0, 100])).unwrap();
        assert_relative_eq!(raw.samples()[0], 29.9, epsilon = 1e-9);
    }

    #[test]
    fn test_decode_fortran_order() {
        // Column-major storage of [[1, 2, 3], [4, 5, 6]]
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = npyz::WriteOptions::<u8>::new()
            .default_dtype()
            .shape(&[2, 3])
            .order(npyz::Order::Fortran)
            .writer(&mut cursor)
            .begin_nd()
            .unwrap();
        writer.extend(vec![1u8, 4, 2, 5, 3, 6]).unwrap();
        writer.finish().unwrap();

        let raw = decode_frame(&cursor.into_inner()).unwrap();
        assert_eq!(raw.samples(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert!(matches!(
            decode_frame(&npy_bytes(&[4], vec![1u8, 2, 3, 4])),
            Err(NpyError::Layout(_))
        ));
        assert!(matches!(
            decode_frame(&npy_bytes(&[1, 2, 2], vec![1u8, 2, 3, 4])),
            Err(NpyError::Layout(_))
        ));
        assert!(matches!(
            decode_frame(&npy_bytes(&[0, 5], Vec::<u8>::new())),
            Err(NpyError::Layout(_))
        ));
    }

    #[test]
    fn test_decode_garbage_is_io_error() {
        assert!(matches!(
            decode_frame(b"definitely not numpy"),
            Err(NpyError::Io(_))
        ));
    }

    #[test]
    fn test_gray_roundtrip() {
        let frame = Frame::gray(vec![0, 10, 20, 30, 40, 255], 3, 2);
        let back = decode_gray(&encode_gray(&frame).unwrap()).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_encode_gray_rejects_rgb() {
        let frame = Frame::new(vec![0; 12], 2, 2, 3);
        assert!(encode_gray(&frame).is_err());
    }

    #[test]
    fn test_landmarks_array_layout() {
        let bytes = encode_landmarks(&Landmarks::template()).unwrap();
        let npy = npyz::NpyFile::new(&bytes[..]).unwrap();
        assert_eq!(npy.shape(), &[68, 2]);
        let flat = npy.into_vec::<i32>().unwrap();
        assert_eq!(&flat[..2], &[220, 188]);

        assert_eq!(decode_landmarks(&bytes).unwrap(), Landmarks::template());
    }
}
