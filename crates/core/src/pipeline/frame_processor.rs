use std::sync::Arc;
use std::time::Instant;

use crate::detection::domain::detection_escalator::DetectionEscalator;
use crate::detection::domain::detection_outcome::{
    AttemptOutcome, DetectionAttempt, DetectionOutcome,
};
use crate::detection::domain::escalation_policy::EscalationPolicy;
use crate::frames::domain::artifact_store::ArtifactStore;
use crate::frames::domain::frame_reader::FrameReader;
use crate::frames::domain::frame_source::FrameSource;
use crate::frames::domain::output_layout::{ArtifactTag, OutputLayout};
use crate::preprocessing::domain::frame_preprocessor::FramePreprocessor;
use crate::rendering::domain::comparison_renderer::ComparisonRenderer;
use crate::shared::frame::Frame;
use crate::shared::frame_error::FrameError;
use crate::shared::landmarks::Landmarks;
use crate::shared::region::Region;

use super::batch_result::BatchResult;
use super::error_log::ErrorLog;

/// Stateless collaborators shared by every worker of a run.
pub struct FrameServices {
    pub reader: Box<dyn FrameReader>,
    pub preprocessor: Box<dyn FramePreprocessor>,
    pub store: Box<dyn ArtifactStore>,
    pub renderer: Box<dyn ComparisonRenderer>,
    pub error_log: ErrorLog,
}

/// Takes one frame from file to persisted artifacts.
///
/// Each worker owns one processor and with it one escalator, so detection
/// backends are never shared between threads.
pub struct FrameProcessor {
    services: Arc<FrameServices>,
    escalator: DetectionEscalator,
}

impl FrameProcessor {
    pub fn new(services: Arc<FrameServices>, escalator: DetectionEscalator) -> Self {
        Self {
            services,
            escalator,
        }
    }

    /// Never fails: every error becomes a failed result whose message is
    /// also appended to the error log.
    pub fn process(
        &mut self,
        source: &FrameSource,
        layout: &OutputLayout,
        policy: &EscalationPolicy,
    ) -> BatchResult {
        let start = Instant::now();
        let result = self.run(source, layout, policy);
        result.with_elapsed_ms(start.elapsed().as_secs_f64() * 1000.0)
    }

    fn run(
        &mut self,
        source: &FrameSource,
        layout: &OutputLayout,
        policy: &EscalationPolicy,
    ) -> BatchResult {
        let id = source.id();

        let (normalized, processed) = match self.load(source) {
            Ok(buffers) => buffers,
            Err(e) => return self.fail(id, e.to_string(), Vec::new()),
        };

        let outcome = self.escalator.detect(&processed, policy);
        self.record_detection_errors(id, &outcome);

        let detected = outcome.is_detected();
        let reason = outcome.failure_reason();
        let attempts = outcome.attempts().to_vec();
        let detection = outcome.into_detection();

        let tag = ArtifactTag::for_detection(detected);
        let template = Landmarks::template();
        let (landmarks, bounding_box) = match &detection {
            Some(d) => (&d.landmarks, Some(d.bounding_box)),
            None => (&template, None),
        };

        if let Err(e) = self.persist(
            layout,
            id,
            tag,
            &normalized,
            &processed,
            landmarks,
            bounding_box,
        ) {
            return self.fail(id, e.to_string(), attempts);
        }

        match detection {
            Some(d) => BatchResult::success(id, d.level, attempts, d.landmarks, d.bounding_box),
            None => BatchResult::failure(
                id,
                reason.unwrap_or_else(|| "face not detected".to_string()),
                attempts,
            ),
        }
    }

    fn load(&self, source: &FrameSource) -> Result<(Frame, Frame), FrameError> {
        let raw = self.services.reader.read(source.path())?;
        let normalized = raw.normalize_min_max();
        let processed = self.services.preprocessor.preprocess(&raw)?;
        Ok((normalized, processed))
    }

    #[allow(clippy::too_many_arguments)]
    fn persist(
        &self,
        layout: &OutputLayout,
        id: &str,
        tag: ArtifactTag,
        normalized: &Frame,
        processed: &Frame,
        landmarks: &Landmarks,
        bounding_box: Option<Region>,
    ) -> Result<(), FrameError> {
        let store = &self.services.store;
        store.save_normalized(layout, id, tag, normalized)?;
        store.save_processed(layout, id, tag, processed)?;
        store.save_landmarks(layout, id, tag, landmarks)?;
        let comparison = self
            .services
            .renderer
            .render(normalized, processed, landmarks, bounding_box)?;
        store.save_comparison(layout, id, tag, &comparison)
    }

    fn record_detection_errors(&self, id: &str, outcome: &DetectionOutcome) {
        for attempt in outcome.attempts() {
            if let AttemptOutcome::Error(msg) = &attempt.outcome {
                self.services.error_log.record(&format!(
                    "{id}: face detection error at upsample {}: {msg}",
                    attempt.upsample_level
                ));
            }
        }
        if let Some(err) = outcome.prediction_error() {
            self.services
                .error_log
                .record(&format!("{id}: landmark prediction error: {err}"));
        }
    }

    fn fail(&self, id: &str, message: String, attempts: Vec<DetectionAttempt>) -> BatchResult {
        self.services.error_log.record(&format!("{id}: {message}"));
        BatchResult::failure(id, message, attempts)
    }
}
