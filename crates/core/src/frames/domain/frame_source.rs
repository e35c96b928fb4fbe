use std::path::{Path, PathBuf};

/// One input frame file and the identifier its artifacts are named after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSource {
    id: String,
    path: PathBuf,
}

impl FrameSource {
    /// The identifier is the file name without its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { id, path }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
