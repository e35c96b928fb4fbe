use std::collections::HashMap;
use std::time::Instant;

/// Observer for batch progress and per-stage cost.
///
/// The orchestrator reports through this trait only; nothing it records
/// feeds back into detection.
pub trait BatchLogger: Send {
    /// Called after each completed frame with the running counts.
    fn progress(&mut self, done: usize, total: usize, successes: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. the upsample level a face locked at).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-batch report. Default: no-op.
    fn summary(&self) {}
}

/// Discards every event.
pub struct NullBatchLogger;

impl BatchLogger for NullBatchLogger {
    fn progress(&mut self, _done: usize, _total: usize, _successes: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs throttled progress lines with the running success ratio and keeps
/// enough data for an end-of-batch timing summary.
pub struct StdoutBatchLogger {
    throttle: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    done: usize,
    successes: usize,
}

impl StdoutBatchLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            done: 0,
            successes: 0,
        }
    }

    /// Formatted summary, or `None` before any frame completed.
    pub fn summary_string(&self) -> Option<String> {
        if self.done == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Batch summary ({} frames, {} detected, {:.1}%, {:.1}s total):",
            self.done,
            self.successes,
            success_ratio(self.successes, self.done) * 100.0,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:7.1}ms  total {total_ms:8.0}ms"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            lines.push(format!("  {name}: avg {:.2}", mean(&self.metrics[name])));
        }

        if elapsed_ms > 0.0 {
            let rate = self.done as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.2} frames/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl Default for StdoutBatchLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn success_ratio(successes: usize, done: usize) -> f64 {
    if done == 0 {
        0.0
    } else {
        successes as f64 / done as f64
    }
}

impl BatchLogger for StdoutBatchLogger {
    fn progress(&mut self, done: usize, total: usize, successes: usize) {
        self.done = done;
        self.successes = successes;
        if total > 0 && (done % self.throttle == 0 || done == total) {
            let ratio = success_ratio(successes, done) * 100.0;
            log::info!("Progress: {done}/{total} frames, {successes} detected ({ratio:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
