use thiserror::Error;

use crate::shared::frame::Frame;

use super::capabilities::Capabilities;
use super::detection_outcome::{AttemptOutcome, Detection, DetectionAttempt, DetectionOutcome};
use super::escalation_policy::EscalationPolicy;
use super::face_detector::FaceDetector;
use super::landmark_predictor::LandmarkPredictor;

#[derive(Error, Debug, PartialEq)]
#[error("box scale factors must be positive and finite, got ({0}, {1})")]
pub struct BoxScaleError(pub f64, pub f64);

/// Independent horizontal/vertical factors applied to a detected region
/// before landmark prediction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxScale {
    x: f64,
    y: f64,
}

impl BoxScale {
    pub fn new(x: f64, y: f64) -> Result<Self, BoxScaleError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(x) || !valid(y) {
            return Err(BoxScaleError(x, y));
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

impl Default for BoxScale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

/// Multi-scale face search followed by landmark prediction.
///
/// Levels are tried in policy order. The first level returning any region
/// wins: its first candidate is kept and no further level is evaluated. A
/// detector error only fails that level. A predictor error fails the frame.
pub struct DetectionEscalator {
    detector: Box<dyn FaceDetector>,
    predictor: Box<dyn LandmarkPredictor>,
    box_scale: BoxScale,
}

impl DetectionEscalator {
    pub fn new(capabilities: Capabilities, box_scale: BoxScale) -> Self {
        Self {
            detector: capabilities.detector,
            predictor: capabilities.predictor,
            box_scale,
        }
    }

    pub fn detect(&mut self, frame: &Frame, policy: &EscalationPolicy) -> DetectionOutcome {
        let mut attempts = Vec::with_capacity(policy.levels().len());
        let mut locked = None;

        for &level in policy.levels() {
            let outcome = match self.detector.detect(frame, level) {
                Ok(regions) => match regions.into_iter().next() {
                    Some(region) => {
                        locked = Some((level, region));
                        AttemptOutcome::Success
                    }
                    None => AttemptOutcome::NoFace,
                },
                Err(e) => {
                    log::debug!("Face detection failed at upsample {level}: {e}");
                    AttemptOutcome::Error(e.to_string())
                }
            };
            attempts.push(DetectionAttempt {
                upsample_level: level,
                outcome,
            });
            if locked.is_some() {
                break;
            }
        }

        let Some((level, region)) = locked else {
            return DetectionOutcome::not_found(attempts);
        };

        let adjusted = region.scaled(self.box_scale.x, self.box_scale.y);
        match self.predictor.predict(frame, &adjusted) {
            Ok(landmarks) => DetectionOutcome::detected(
                attempts,
                Detection {
                    level,
                    landmarks,
                    bounding_box: adjusted,
                },
            ),
            Err(e) => DetectionOutcome::prediction_failed(attempts, e.to_string()),
        }
    }
}
