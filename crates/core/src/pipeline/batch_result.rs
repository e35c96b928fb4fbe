use crate::detection::domain::detection_outcome::DetectionAttempt;
use crate::shared::landmarks::Landmarks;
use crate::shared::region::Region;

/// What one frame produced, as seen by the orchestrator.
///
/// `detected` is derived from the presence of landmarks, so a frame whose
/// face was found but whose points could not be predicted is a failure.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchResult {
    identifier: String,
    message: String,
    chosen_level: Option<u32>,
    attempts: Vec<DetectionAttempt>,
    landmarks: Option<Landmarks>,
    bounding_box: Option<Region>,
    elapsed_ms: f64,
}

impl BatchResult {
    pub fn success(
        identifier: impl Into<String>,
        chosen_level: u32,
        attempts: Vec<DetectionAttempt>,
        landmarks: Landmarks,
        bounding_box: Region,
    ) -> Self {
        let identifier = identifier.into();
        Self {
            message: format!("success: {identifier}"),
            identifier,
            chosen_level: Some(chosen_level),
            attempts,
            landmarks: Some(landmarks),
            bounding_box: Some(bounding_box),
            elapsed_ms: 0.0,
        }
    }

    pub fn failure(
        identifier: impl Into<String>,
        message: impl Into<String>,
        attempts: Vec<DetectionAttempt>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            message: message.into(),
            chosen_level: None,
            attempts,
            landmarks: None,
            bounding_box: None,
            elapsed_ms: 0.0,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn detected(&self) -> bool {
        self.landmarks.is_some()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn chosen_level(&self) -> Option<u32> {
        self.chosen_level
    }

    pub fn attempts(&self) -> &[DetectionAttempt] {
        &self.attempts
    }

    pub fn landmarks(&self) -> Option<&Landmarks> {
        self.landmarks.as_ref()
    }

    pub fn bounding_box(&self) -> Option<Region> {
        self.bounding_box
    }

    /// Wall-clock time spent on the frame; observability only.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: f64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }
}
