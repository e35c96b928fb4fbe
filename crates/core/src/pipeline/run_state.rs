use crate::shared::landmarks::Landmarks;

use super::batch_result::BatchResult;

/// One line of the not-detected ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotDetected {
    pub identifier: String,
    pub reason: String,
}

/// Fallback and counting state of one batch.
///
/// Owned by the result-consumption loop and updated once per completed
/// frame, in completion order.
#[derive(Debug, Default)]
pub struct RunState {
    last_known_good: Option<Landmarks>,
    success_count: usize,
    failure_count: usize,
    not_detected: Vec<NotDetected>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed result in.
    ///
    /// For a failure, returns the landmarks of the most recently completed
    /// success to substitute for it, if there has been one.
    pub fn record(&mut self, result: &BatchResult) -> Option<Landmarks> {
        match result.landmarks() {
            Some(landmarks) => {
                self.last_known_good = Some(landmarks.clone());
                self.success_count += 1;
                None
            }
            None => {
                self.failure_count += 1;
                self.not_detected.push(NotDetected {
                    identifier: result.identifier().to_string(),
                    reason: result.message().to_string(),
                });
                self.last_known_good.clone()
            }
        }
    }

    pub fn last_known_good(&self) -> Option<&Landmarks> {
        self.last_known_good.as_ref()
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    pub fn completed(&self) -> usize {
        self.success_count + self.failure_count
    }

    pub fn not_detected(&self) -> &[NotDetected] {
        &self.not_detected
    }
}
