use thiserror::Error;

use crate::detection::domain::capabilities::CapabilityError;
use crate::frames::domain::frame_source::FrameSource;

use super::batch_result::BatchResult;
use super::frame_processor::FrameProcessor;

/// A frame whose result could not be retrieved from the pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
    #[error("no worker available: {0}")]
    NoWorker(String),
}

/// Builds the processor a worker uses for its whole lifetime.
pub type ProcessorFactory<'a> = dyn Fn() -> Result<FrameProcessor, CapabilityError> + Sync + 'a;

/// Runs one frame on a worker's processor.
pub type FrameJob<'a> = dyn Fn(&mut FrameProcessor, &FrameSource) -> BatchResult + Sync + 'a;

/// Receives every frame's outcome exactly once, on the calling thread, in
/// completion order.
pub type CompletionHandler<'a> = dyn FnMut(&FrameSource, Result<BatchResult, DispatchError>) + 'a;

/// Abstracts how frames are fanned out to workers.
///
/// Implementations must call `on_complete` once per source, even when a
/// worker dies, and only from the thread that called `execute`.
pub trait BatchExecutor: Send {
    fn execute(
        &self,
        sources: &[FrameSource],
        make_processor: &ProcessorFactory<'_>,
        job: &FrameJob<'_>,
        on_complete: &mut CompletionHandler<'_>,
    );
}
