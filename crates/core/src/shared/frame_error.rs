use std::path::PathBuf;

use thiserror::Error;

/// Failure of one frame's load, preprocessing, rendering or persistence.
///
/// Never aborts a batch; the frame is recorded as failed with this text.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
    #[error("unsupported frame layout in {}: {reason}", .path.display())]
    Layout { path: PathBuf, reason: String },
    #[error("preprocessing failed: {0}")]
    Preprocess(String),
    #[error("failed to render comparison: {0}")]
    Render(String),
    #[error("failed to persist {}: {reason}", .path.display())]
    Persist { path: PathBuf, reason: String },
}

impl FrameError {
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn layout(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Layout {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn persist(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persist {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
