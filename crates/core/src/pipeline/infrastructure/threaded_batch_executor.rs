use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crossbeam_channel::{Receiver, Sender};

use crate::frames::domain::frame_source::FrameSource;
use crate::pipeline::batch_executor::{
    BatchExecutor, CompletionHandler, DispatchError, FrameJob, ProcessorFactory,
};
use crate::pipeline::batch_result::BatchResult;
use crate::pipeline::frame_processor::FrameProcessor;
use crate::shared::constants::RESERVED_CORES;

/// Pool size for a machine with `available` hardware threads.
pub fn worker_count(available: usize) -> usize {
    available.saturating_sub(RESERVED_CORES).max(1)
}

enum WorkerEvent {
    Completed(usize, Result<BatchResult, DispatchError>),
    InitFailed(String),
}

/// Fixed pool of scoped worker threads pulling frame indices from a shared
/// queue.
///
/// Each worker builds its own processor before taking work. A panic while
/// processing a frame is reported for that frame and the worker rebuilds its
/// processor before continuing. Frames left over when every worker has
/// exited are reported as `NoWorker`.
pub struct ThreadedBatchExecutor {
    workers: usize,
}

impl ThreadedBatchExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Size the pool from the machine's available parallelism.
    pub fn for_this_machine() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(worker_count(available))
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadedBatchExecutor {
    fn default() -> Self {
        Self::for_this_machine()
    }
}

impl BatchExecutor for ThreadedBatchExecutor {
    fn execute(
        &self,
        sources: &[FrameSource],
        make_processor: &ProcessorFactory<'_>,
        job: &FrameJob<'_>,
        on_complete: &mut CompletionHandler<'_>,
    ) {
        if sources.is_empty() {
            return;
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        for i in 0..sources.len() {
            // The receiver is alive in this scope, so send cannot fail
            let _ = job_tx.send(i);
        }
        drop(job_tx);

        let (event_tx, event_rx) = crossbeam_channel::unbounded::<WorkerEvent>();
        let mut reported = vec![false; sources.len()];
        let mut last_init_error = None;

        std::thread::scope(|scope| {
            for w in 0..self.workers.min(sources.len()) {
                let job_rx = job_rx.clone();
                let event_tx = event_tx.clone();
                let spawned = std::thread::Builder::new()
                    .name(format!("nirmark-worker-{w}"))
                    .spawn_scoped(scope, move || {
                        worker_loop(w, sources, make_processor, job, job_rx, event_tx)
                    });
                if let Err(e) = spawned {
                    log::error!("Could not start worker {w}: {e}");
                }
            }
            drop(event_tx);

            for event in event_rx {
                match event {
                    WorkerEvent::Completed(i, outcome) => {
                        reported[i] = true;
                        on_complete(&sources[i], outcome);
                    }
                    WorkerEvent::InitFailed(msg) => {
                        log::error!("Worker failed to initialize: {msg}");
                        last_init_error = Some(msg);
                    }
                }
            }
        });

        let reason = last_init_error.unwrap_or_else(|| "worker pool exited early".to_string());
        for (source, _) in sources.iter().zip(&reported).filter(|(_, done)| !**done) {
            on_complete(source, Err(DispatchError::NoWorker(reason.clone())));
        }
    }
}

fn worker_loop(
    worker: usize,
    sources: &[FrameSource],
    make_processor: &ProcessorFactory<'_>,
    job: &FrameJob<'_>,
    job_rx: Receiver<usize>,
    event_tx: Sender<WorkerEvent>,
) {
    let mut processor = match build_processor(make_processor) {
        Ok(p) => p,
        Err(msg) => {
            let _ = event_tx.send(WorkerEvent::InitFailed(msg));
            return;
        }
    };
    log::debug!("Worker {worker} ready");

    for i in job_rx {
        let outcome = catch_unwind(AssertUnwindSafe(|| job(&mut processor, &sources[i])))
            .map_err(|payload| {
                let msg = panic_message(payload.as_ref());
                log::error!("Worker {worker} panicked on {}: {msg}", sources[i].id());
                DispatchError::WorkerPanicked(msg)
            });
        let panicked = outcome.is_err();
        if event_tx.send(WorkerEvent::Completed(i, outcome)).is_err() {
            return;
        }

        if panicked {
            match build_processor(make_processor) {
                Ok(p) => processor = p,
                Err(msg) => {
                    let _ = event_tx.send(WorkerEvent::InitFailed(msg));
                    return;
                }
            }
        }
    }
}

fn build_processor(make_processor: &ProcessorFactory<'_>) -> Result<FrameProcessor, String> {
    match catch_unwind(AssertUnwindSafe(make_processor)) {
        Ok(Ok(processor)) => Ok(processor),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
