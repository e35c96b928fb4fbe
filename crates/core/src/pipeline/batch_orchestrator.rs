use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::detection::domain::capabilities::{CapabilityError, CapabilityFactory};
use crate::detection::domain::detection_escalator::{BoxScale, DetectionEscalator};
use crate::detection::domain::escalation_policy::EscalationPolicy;
use crate::frames::domain::frame_catalog::FrameCatalog;
use crate::frames::domain::frame_source::FrameSource;
use crate::frames::domain::output_layout::{ArtifactTag, OutputLayout};
use crate::shared::frame_error::FrameError;
use crate::shared::landmarks::Landmarks;

use super::batch_executor::{BatchExecutor, DispatchError};
use super::batch_logger::BatchLogger;
use super::batch_result::BatchResult;
use super::frame_processor::{FrameProcessor, FrameServices};
use super::ledger::{self, LedgerRow};
use super::run_state::RunState;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("no frame files found in {}", .0.display())]
    EmptyInput(PathBuf),
    #[error("cannot list {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot create output directory {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write ledger {}: {source}", .path.display())]
    Ledger {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What a finished batch produced and where.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub output_dir: PathBuf,
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub result_ledger: PathBuf,
    /// Written only when at least one frame failed.
    pub not_detected_ledger: Option<PathBuf>,
}

impl BatchSummary {
    pub fn all_detected(&self) -> bool {
        self.failures == 0
    }
}

/// Runs every frame of an input directory through a worker pool and folds
/// the results, in completion order, into fallback landmarks and ledgers.
pub struct BatchOrchestrator {
    catalog: Box<dyn FrameCatalog>,
    executor: Box<dyn BatchExecutor>,
    services: Arc<FrameServices>,
    capabilities: Arc<dyn CapabilityFactory>,
    box_scale: BoxScale,
    output_root: PathBuf,
    logger: Box<dyn BatchLogger>,
}

impl BatchOrchestrator {
    pub fn new(
        catalog: Box<dyn FrameCatalog>,
        executor: Box<dyn BatchExecutor>,
        services: Arc<FrameServices>,
        capabilities: Arc<dyn CapabilityFactory>,
        box_scale: BoxScale,
        output_root: impl Into<PathBuf>,
        logger: Box<dyn BatchLogger>,
    ) -> Self {
        Self {
            catalog,
            executor,
            services,
            capabilities,
            box_scale,
            output_root: output_root.into(),
            logger,
        }
    }

    pub fn run(
        &mut self,
        input_dir: &Path,
        policy: &EscalationPolicy,
    ) -> Result<BatchSummary, BatchError> {
        let sources = self
            .catalog
            .list(input_dir)
            .map_err(|source| BatchError::Input {
                path: input_dir.to_path_buf(),
                source,
            })?;
        if sources.is_empty() {
            let err = BatchError::EmptyInput(input_dir.to_path_buf());
            log::error!("{err}");
            return Err(err);
        }

        let layout = OutputLayout::for_input(&self.output_root, input_dir);
        layout.create_dirs().map_err(|source| BatchError::Output {
            path: layout.base().to_path_buf(),
            source,
        })?;

        let total = sources.len();
        self.logger.info(&format!(
            "Processing {total} frames from {} (upsample levels {:?})",
            input_dir.display(),
            policy.levels()
        ));

        let mut state = RunState::new();
        let mut rows = Vec::with_capacity(total);

        let services = &self.services;
        let capabilities = &self.capabilities;
        let box_scale = self.box_scale;
        let make_processor = || -> Result<FrameProcessor, CapabilityError> {
            let escalator = DetectionEscalator::new(capabilities.create()?, box_scale);
            Ok(FrameProcessor::new(Arc::clone(services), escalator))
        };
        let job = |processor: &mut FrameProcessor, source: &FrameSource| {
            processor.process(source, &layout, policy)
        };

        let logger = &mut self.logger;
        self.executor.execute(
            &sources,
            &make_processor,
            &job,
            &mut |source: &FrameSource, outcome: Result<BatchResult, DispatchError>| {
                let result = match outcome {
                    Ok(result) => result,
                    Err(e) => {
                        let message = format!("processing aborted: {e}");
                        services
                            .error_log
                            .record(&format!("{}: {message}", source.id()));
                        BatchResult::failure(source.id(), message, Vec::new())
                    }
                };
                consume(services, &layout, &mut state, &mut **logger, &result);
                rows.push(LedgerRow::from(&result));
                logger.progress(state.completed(), total, state.success_count());
            },
        );

        let result_ledger = layout.result_ledger_path();
        ledger::write_results(&result_ledger, &rows).map_err(|source| BatchError::Ledger {
            path: result_ledger.clone(),
            source,
        })?;

        let not_detected_ledger = if state.failure_count() > 0 {
            let path = layout.not_detected_ledger_path();
            ledger::write_not_detected(&path, state.not_detected()).map_err(|source| {
                BatchError::Ledger {
                    path: path.clone(),
                    source,
                }
            })?;
            self.logger.info(&format!(
                "{} frames without a detected face listed in {}",
                state.failure_count(),
                path.display()
            ));
            Some(path)
        } else {
            self.logger.info("Face detected in every frame");
            None
        };
        self.logger.summary();

        Ok(BatchSummary {
            output_dir: layout.base().to_path_buf(),
            total,
            successes: state.success_count(),
            failures: state.failure_count(),
            result_ledger,
            not_detected_ledger,
        })
    }
}

/// Fold one completed result into the run state, substituting the last
/// known good landmarks into a failed frame's artifacts.
fn consume(
    services: &FrameServices,
    layout: &OutputLayout,
    state: &mut RunState,
    logger: &mut dyn BatchLogger,
    result: &BatchResult,
) {
    let id = result.identifier();
    if result.detected() {
        log::info!("success: {id}");
    } else {
        log::warn!("failure: {id} - {}", result.message());
    }
    logger.timing("frame", result.elapsed_ms());
    if let Some(level) = result.chosen_level() {
        logger.metric("chosen_level", f64::from(level));
    }

    if let Some(substitute) = state.record(result) {
        let start = Instant::now();
        if let Err(e) = apply_substitute(services, layout, id, &substitute) {
            services
                .error_log
                .record(&format!("{id}: could not apply fallback landmarks: {e}"));
        }
        logger.timing("substitute", start.elapsed().as_secs_f64() * 1000.0);
    }
}

fn apply_substitute(
    services: &FrameServices,
    layout: &OutputLayout,
    id: &str,
    substitute: &Landmarks,
) -> Result<(), FrameError> {
    let tag = ArtifactTag::Failed;
    services.store.save_landmarks(layout, id, tag, substitute)?;
    // Frames aborted before loading have no buffers to draw on
    if !layout.normalized_path(id, tag).is_file() {
        log::debug!("{id}: no buffers written, comparison not rendered");
        return Ok(());
    }
    let normalized = services.store.load_normalized(layout, id, tag)?;
    let processed = services.store.load_processed(layout, id, tag)?;
    let comparison = services
        .renderer
        .render(&normalized, &processed, substitute, None)?;
    services.store.save_comparison(layout, id, tag, &comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::infrastructure::directory_frame_catalog::DirectoryFrameCatalog;
    use crate::frames::infrastructure::npy;
    use crate::pipeline::batch_logger::NullBatchLogger;
    use crate::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
    use crate::pipeline::test_support::{
        frame_file, services_in, shifted_frame_file, StubFactory, CRASH_MARK, FACE_MARK,
        NO_FACE_MARK,
    };
    use std::fs;
    use tempfile::TempDir;

    fn orchestrator(tmp: &TempDir, workers: usize, factory: StubFactory) -> BatchOrchestrator {
        BatchOrchestrator::new(
            Box::new(DirectoryFrameCatalog::new()),
            Box::new(ThreadedBatchExecutor::new(workers)),
            Arc::new(services_in(tmp.path())),
            Arc::new(factory),
            BoxScale::default(),
            tmp.path().join("out"),
            Box::new(NullBatchLogger),
        )
    }

    fn landmarks_at(path: PathBuf) -> Landmarks {
        npy::decode_landmarks(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("in")).unwrap();
        let factory = Arc::new(StubFactory::default());
        let mut orch = BatchOrchestrator::new(
            Box::new(DirectoryFrameCatalog::new()),
            Box::new(ThreadedBatchExecutor::new(2)),
            Arc::new(services_in(tmp.path())),
            factory.clone(),
            BoxScale::default(),
            tmp.path().join("out"),
            Box::new(NullBatchLogger),
        );

        let err = orch
            .run(&tmp.path().join("in"), &EscalationPolicy::normal())
            .unwrap_err();

        assert!(matches!(err, BatchError::EmptyInput(_)));
        assert!(!tmp.path().join("out").exists());
        assert_eq!(factory.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_input_dir_is_input_error() {
        let tmp = TempDir::new().unwrap();
        let err = orchestrator(&tmp, 1, StubFactory::default())
            .run(&tmp.path().join("absent"), &EscalationPolicy::normal())
            .unwrap_err();
        assert!(matches!(err, BatchError::Input { .. }));
    }

    #[test]
    fn test_substitutes_follow_completion_order() {
        let tmp = TempDir::new().unwrap();
        // One worker completes frames in sorted name order
        shifted_frame_file(tmp.path(), "in", "a", FACE_MARK, 200);
        frame_file(tmp.path(), "in", "b", NO_FACE_MARK);
        shifted_frame_file(tmp.path(), "in", "c", FACE_MARK, 600);
        frame_file(tmp.path(), "in", "d", NO_FACE_MARK);

        let summary = orchestrator(&tmp, 1, StubFactory::default())
            .run(&tmp.path().join("in"), &EscalationPolicy::normal())
            .unwrap();
        let layout = OutputLayout::new(&summary.output_dir);

        let a = landmarks_at(layout.landmarks_path("a", ArtifactTag::Detected));
        let c = landmarks_at(layout.landmarks_path("c", ArtifactTag::Detected));
        assert_ne!(a, c);
        assert_eq!(landmarks_at(layout.landmarks_path("b", ArtifactTag::Failed)), a);
        assert_eq!(landmarks_at(layout.landmarks_path("d", ArtifactTag::Failed)), c);
        assert_eq!((summary.successes, summary.failures), (2, 2));
    }

    #[test]
    fn test_failed_comparison_is_redrawn_with_substitute() {
        let tmp = TempDir::new().unwrap();
        // a's points all land on (1, 1); the template lies outside an 8x8 frame
        frame_file(tmp.path(), "in", "a", FACE_MARK);
        frame_file(tmp.path(), "in", "b", NO_FACE_MARK);

        let summary = orchestrator(&tmp, 1, StubFactory::default())
            .run(&tmp.path().join("in"), &EscalationPolicy::normal())
            .unwrap();
        let layout = OutputLayout::new(&summary.output_dir);

        let img = image::open(layout.comparison_path("b", ArtifactTag::Failed))
            .unwrap()
            .to_rgb8();
        assert_eq!((img.width(), img.height()), (24, 8));
        let red: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == [255, 0, 0])
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(red.len(), 9);
        // Third panel starts at x = 16
        assert!(red.iter().all(|&(x, y)| (16..=18).contains(&x) && y <= 2));
        assert_eq!(img.get_pixel(17, 1).0, [255, 0, 0]);
    }

    #[test]
    fn test_failure_before_any_success_keeps_template() {
        let tmp = TempDir::new().unwrap();
        frame_file(tmp.path(), "in", "a", NO_FACE_MARK);
        frame_file(tmp.path(), "in", "b", FACE_MARK);

        let summary = orchestrator(&tmp, 1, StubFactory::default())
            .run(&tmp.path().join("in"), &EscalationPolicy::normal())
            .unwrap();
        let layout = OutputLayout::new(&summary.output_dir);

        assert_eq!(
            landmarks_at(layout.landmarks_path("a", ArtifactTag::Failed)),
            Landmarks::template()
        );
    }

    #[test]
    fn test_ledgers_record_one_row_per_frame() {
        let tmp = TempDir::new().unwrap();
        frame_file(tmp.path(), "in", "ok", FACE_MARK);
        frame_file(tmp.path(), "in", "miss", NO_FACE_MARK);

        let summary = orchestrator(&tmp, 2, StubFactory::default())
            .run(&tmp.path().join("in"), &EscalationPolicy::normal())
            .unwrap();

        assert_eq!(summary.output_dir, tmp.path().join("out/in"));
        let rows =
            ledger::parse_results(&fs::read_to_string(&summary.result_ledger).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        let ok = rows.iter().find(|r| r.identifier == "ok").unwrap();
        assert!(ok.detected);
        assert_eq!(ok.chosen_level, Some(0));
        let miss = rows.iter().find(|r| r.identifier == "miss").unwrap();
        assert!(!miss.detected);
        assert_eq!(miss.chosen_level, None);

        let not_detected =
            fs::read_to_string(summary.not_detected_ledger.as_ref().unwrap()).unwrap();
        assert_eq!(not_detected, "miss_ng.npy - face not detected\n");
    }

    #[test]
    fn test_all_detected_writes_no_not_detected_ledger() {
        let tmp = TempDir::new().unwrap();
        frame_file(tmp.path(), "in", "a", FACE_MARK);
        frame_file(tmp.path(), "in", "b", FACE_MARK);

        let summary = orchestrator(&tmp, 2, StubFactory::default())
            .run(&tmp.path().join("in"), &EscalationPolicy::normal())
            .unwrap();

        assert!(summary.all_detected());
        assert!(summary.not_detected_ledger.is_none());
        assert!(!tmp.path().join("out/in/not_detected.txt").exists());
        assert!(summary.result_ledger.is_file());
    }

    #[test]
    fn test_worker_crash_becomes_failure_and_batch_finishes() {
        let tmp = TempDir::new().unwrap();
        frame_file(tmp.path(), "in", "a", FACE_MARK);
        frame_file(tmp.path(), "in", "b", CRASH_MARK);
        frame_file(tmp.path(), "in", "c", FACE_MARK);

        let summary = orchestrator(&tmp, 1, StubFactory::default())
            .run(&tmp.path().join("in"), &EscalationPolicy::normal())
            .unwrap();

        assert_eq!((summary.successes, summary.failures), (2, 1));
        let not_detected =
            fs::read_to_string(summary.not_detected_ledger.as_ref().unwrap()).unwrap();
        assert!(not_detected.starts_with("b_ng.npy - processing aborted: worker panicked"));
        let log = fs::read_to_string(tmp.path().join("error_log.txt")).unwrap();
        assert!(log.contains("b: processing aborted"));
        assert!(!log.contains("could not apply fallback"));
        let layout = OutputLayout::new(&summary.output_dir);
        assert!(layout.landmarks_path("b", ArtifactTag::Failed).is_file());
        assert!(!layout.comparison_path("b", ArtifactTag::Failed).exists());
    }

    #[test]
    fn test_unavailable_models_fail_every_frame() {
        let tmp = TempDir::new().unwrap();
        frame_file(tmp.path(), "in", "a", FACE_MARK);
        frame_file(tmp.path(), "in", "b", FACE_MARK);

        let summary = orchestrator(&tmp, 2, StubFactory::failing_always())
            .run(&tmp.path().join("in"), &EscalationPolicy::normal())
            .unwrap();

        assert_eq!((summary.successes, summary.failures), (0, 2));
        assert!(summary.result_ledger.is_file());
    }
}
