use std::path::Path;

use crate::detection::domain::detection_escalator::DetectionEscalator;
use crate::detection::domain::escalation_policy::EscalationPolicy;
use crate::frames::domain::frame_reader::FrameReader;
use crate::preprocessing::domain::frame_preprocessor::FramePreprocessor;
use crate::shared::frame::RawFrame;
use crate::shared::frame_error::FrameError;
use crate::shared::landmarks::Landmarks;
use crate::shared::region::Region;

/// Landmarks for one frame; the template when no face was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferenceResult {
    pub landmarks: Landmarks,
    pub detected: bool,
    pub bounding_box: Option<Region>,
}

/// Single-frame landmark detection without persisting anything.
pub struct LandmarkInference {
    reader: Box<dyn FrameReader>,
    preprocessor: Box<dyn FramePreprocessor>,
    escalator: DetectionEscalator,
    policy: EscalationPolicy,
}

impl LandmarkInference {
    pub fn new(
        reader: Box<dyn FrameReader>,
        preprocessor: Box<dyn FramePreprocessor>,
        escalator: DetectionEscalator,
        policy: EscalationPolicy,
    ) -> Self {
        Self {
            reader,
            preprocessor,
            escalator,
            policy,
        }
    }

    pub fn landmarks_from_path(&mut self, path: &Path) -> Result<InferenceResult, FrameError> {
        let raw = self.reader.read(path)?;
        self.landmarks_from_frame(&raw)
    }

    pub fn landmarks_from_frame(&mut self, raw: &RawFrame) -> Result<InferenceResult, FrameError> {
        let processed = self.preprocessor.preprocess(raw)?;
        let outcome = self.escalator.detect(&processed, &self.policy);
        if let Some(reason) = outcome.failure_reason() {
            log::debug!("No landmarks: {reason}");
        }
        Ok(match outcome.into_detection() {
            Some(d) => InferenceResult {
                landmarks: d.landmarks,
                detected: true,
                bounding_box: Some(d.bounding_box),
            },
            None => InferenceResult {
                landmarks: Landmarks::template(),
                detected: false,
                bounding_box: None,
            },
        })
    }
}
