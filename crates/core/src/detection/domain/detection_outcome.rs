use std::fmt;

use crate::shared::landmarks::Landmarks;
use crate::shared::region::Region;

/// Result of one face-region search at a single upsample level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    NoFace,
    Error(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionAttempt {
    pub upsample_level: u32,
    pub outcome: AttemptOutcome,
}

impl fmt::Display for DetectionAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Success => write!(f, "upsample {}: success", self.upsample_level),
            AttemptOutcome::NoFace => write!(f, "upsample {}: no face", self.upsample_level),
            AttemptOutcome::Error(msg) => {
                write!(f, "upsample {}: error: {msg}", self.upsample_level)
            }
        }
    }
}

/// A located face: the level it was found at, its 68 points and the adjusted
/// region the points were predicted in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detection {
    pub level: u32,
    pub landmarks: Landmarks,
    pub bounding_box: Region,
}

/// Everything the escalator learned about one frame.
///
/// Chosen level, landmarks and bounding box exist together or not at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionOutcome {
    attempts: Vec<DetectionAttempt>,
    detection: Option<Detection>,
    prediction_error: Option<String>,
}

impl DetectionOutcome {
    pub fn detected(attempts: Vec<DetectionAttempt>, detection: Detection) -> Self {
        Self {
            attempts,
            detection: Some(detection),
            prediction_error: None,
        }
    }

    /// No level produced a face region.
    pub fn not_found(attempts: Vec<DetectionAttempt>) -> Self {
        Self {
            attempts,
            detection: None,
            prediction_error: None,
        }
    }

    /// A region was locked in but point prediction failed; the frame counts
    /// as not detected.
    pub fn prediction_failed(attempts: Vec<DetectionAttempt>, error: String) -> Self {
        Self {
            attempts,
            detection: None,
            prediction_error: Some(error),
        }
    }

    pub fn attempts(&self) -> &[DetectionAttempt] {
        &self.attempts
    }

    pub fn detection(&self) -> Option<&Detection> {
        self.detection.as_ref()
    }

    pub fn into_detection(self) -> Option<Detection> {
        self.detection
    }

    pub fn chosen_level(&self) -> Option<u32> {
        self.detection.as_ref().map(|d| d.level)
    }

    pub fn landmarks(&self) -> Option<&Landmarks> {
        self.detection.as_ref().map(|d| &d.landmarks)
    }

    pub fn bounding_box(&self) -> Option<Region> {
        self.detection.as_ref().map(|d| d.bounding_box)
    }

    pub fn prediction_error(&self) -> Option<&str> {
        self.prediction_error.as_deref()
    }

    pub fn is_detected(&self) -> bool {
        self.detection.is_some()
    }

    /// Human-readable reason for a missing detection.
    pub fn failure_reason(&self) -> Option<String> {
        if self.detection.is_some() {
            return None;
        }
        Some(match &self.prediction_error {
            Some(err) => format!("landmark prediction failed: {err}"),
            None => "face not detected".to_string(),
        })
    }
}
