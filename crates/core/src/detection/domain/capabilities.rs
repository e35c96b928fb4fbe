use super::face_detector::FaceDetector;
use super::landmark_predictor::LandmarkPredictor;

pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

/// The detection backends one worker owns for its whole lifetime.
pub struct Capabilities {
    pub detector: Box<dyn FaceDetector>,
    pub predictor: Box<dyn LandmarkPredictor>,
}

/// Builds a fresh, unshared set of capabilities.
///
/// Called once on each worker thread; the backends it returns never leave
/// that thread.
pub trait CapabilityFactory: Send + Sync {
    fn create(&self) -> Result<Capabilities, CapabilityError>;
}
