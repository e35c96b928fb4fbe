use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::detection::domain::capabilities::{Capabilities, CapabilityError, CapabilityFactory};

use super::onnx_landmark_predictor::OnnxLandmarkPredictor;
use super::rustface_detector::RustfaceDetector;

/// Builds a rustface detector and an ONNX landmark predictor per worker.
///
/// The SeetaFace model file is read once up front; each worker parses its own
/// copy so detectors share nothing.
pub struct ModelCapabilityFactory {
    face_model: Vec<u8>,
    landmark_model: PathBuf,
}

impl ModelCapabilityFactory {
    pub fn new(face_model: &Path, landmark_model: &Path) -> Result<Self, CapabilityError> {
        let face_model = std::fs::read(face_model)
            .map_err(|e| format!("cannot read face model {}: {e}", face_model.display()))?;
        if !landmark_model.is_file() {
            return Err(format!("landmark model not found: {}", landmark_model.display()).into());
        }
        Ok(Self {
            face_model,
            landmark_model: landmark_model.to_path_buf(),
        })
    }
}

impl CapabilityFactory for ModelCapabilityFactory {
    fn create(&self) -> Result<Capabilities, CapabilityError> {
        let model = rustface::read_model(Cursor::new(&self.face_model))
            .map_err(|e| format!("invalid face model: {e}"))?;
        let predictor = OnnxLandmarkPredictor::new(&self.landmark_model)
            .map_err(|e| format!("cannot load landmark model: {e}"))?;
        Ok(Capabilities {
            detector: Box::new(RustfaceDetector::from_model(model)),
            predictor: Box::new(predictor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_face_model_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let landmark = tmp.path().join("lm.onnx");
        std::fs::write(&landmark, b"onnx").unwrap();

        let err = ModelCapabilityFactory::new(&tmp.path().join("absent.bin"), &landmark)
            .err()
            .unwrap();
        assert!(err.to_string().contains("cannot read face model"));
    }

    #[test]
    fn test_missing_landmark_model_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let face = tmp.path().join("seeta.bin");
        std::fs::write(&face, b"seeta").unwrap();

        let err = ModelCapabilityFactory::new(&face, &tmp.path().join("absent.onnx"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("landmark model not found"));
    }

    #[test]
    fn test_empty_face_model_fails_at_worker_init() {
        let tmp = TempDir::new().unwrap();
        let face = tmp.path().join("seeta.bin");
        let landmark = tmp.path().join("lm.onnx");
        std::fs::write(&face, b"").unwrap();
        std::fs::write(&landmark, b"onnx").unwrap();

        let factory = ModelCapabilityFactory::new(&face, &landmark).unwrap();
        assert!(factory.create().is_err());
    }
}
