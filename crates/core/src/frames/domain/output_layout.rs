use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::{FAILURE_SUFFIX, NOT_DETECTED_LEDGER_NAME, RESULT_LEDGER_NAME};

/// Whether an artifact belongs to a detected frame or a failed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactTag {
    Detected,
    Failed,
}

impl ArtifactTag {
    pub fn for_detection(detected: bool) -> Self {
        if detected {
            Self::Detected
        } else {
            Self::Failed
        }
    }

    /// Appended to every artifact file stem.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Detected => "",
            Self::Failed => FAILURE_SUFFIX,
        }
    }
}

/// Output tree for one input directory:
///
/// ```text
/// <output_root>/<input_dir_name>/
///   orignorm/<id>_orignorm[_ng].npy
///   processed/<id>_processed[_ng].npy
///   landmarks/<id>_landmarks[_ng].npy
///   comparisons/<id>_comparison[_ng].png
///   detection_results.txt
///   not_detected.txt
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    base: PathBuf,
}

impl OutputLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn for_input(output_root: &Path, input_dir: &Path) -> Self {
        Self::new(output_root.join(input_dir_name(input_dir)))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn orignorm_dir(&self) -> PathBuf {
        self.base.join("orignorm")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.base.join("processed")
    }

    pub fn landmarks_dir(&self) -> PathBuf {
        self.base.join("landmarks")
    }

    pub fn comparisons_dir(&self) -> PathBuf {
        self.base.join("comparisons")
    }

    pub fn normalized_path(&self, id: &str, tag: ArtifactTag) -> PathBuf {
        self.orignorm_dir()
            .join(format!("{id}_orignorm{}.npy", tag.suffix()))
    }

    pub fn processed_path(&self, id: &str, tag: ArtifactTag) -> PathBuf {
        self.processed_dir()
            .join(format!("{id}_processed{}.npy", tag.suffix()))
    }

    pub fn landmarks_path(&self, id: &str, tag: ArtifactTag) -> PathBuf {
        self.landmarks_dir()
            .join(format!("{id}_landmarks{}.npy", tag.suffix()))
    }

    pub fn comparison_path(&self, id: &str, tag: ArtifactTag) -> PathBuf {
        self.comparisons_dir()
            .join(format!("{id}_comparison{}.png", tag.suffix()))
    }

    pub fn result_ledger_path(&self) -> PathBuf {
        self.base.join(RESULT_LEDGER_NAME)
    }

    pub fn not_detected_ledger_path(&self) -> PathBuf {
        self.base.join(NOT_DETECTED_LEDGER_NAME)
    }

    pub fn create_dirs(&self) -> std::io::Result<()> {
        for dir in [
            self.orignorm_dir(),
            self.processed_dir(),
            self.landmarks_dir(),
            self.comparisons_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Last path component of the input directory, resolving `.` and `..`.
fn input_dir_name(input_dir: &Path) -> String {
    let named = |p: &Path| p.file_name().map(|n| n.to_string_lossy().into_owned());
    named(input_dir)
        .or_else(|| input_dir.canonicalize().ok().as_deref().and_then(named))
        .unwrap_or_else(|| "input".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::detected(ArtifactTag::Detected, "/out/sess/landmarks/f01_landmarks.npy")]
    #[case::failed(ArtifactTag::Failed, "/out/sess/landmarks/f01_landmarks_ng.npy")]
    fn test_landmarks_path_suffix(#[case] tag: ArtifactTag, #[case] expected: &str) {
        let layout = OutputLayout::for_input(Path::new("/out"), Path::new("/data/sess"));
        assert_eq!(layout.landmarks_path("f01", tag), PathBuf::from(expected));
    }

    #[test]
    fn test_all_artifact_paths() {
        let layout = OutputLayout::new("/out/sess");
        let tag = ArtifactTag::Failed;
        assert_eq!(
            layout.normalized_path("a", tag),
            PathBuf::from("/out/sess/orignorm/a_orignorm_ng.npy")
        );
        assert_eq!(
            layout.processed_path("a", tag),
            PathBuf::from("/out/sess/processed/a_processed_ng.npy")
        );
        assert_eq!(
            layout.comparison_path("a", ArtifactTag::Detected),
            PathBuf::from("/out/sess/comparisons/a_comparison.png")
        );
        assert_eq!(
            layout.result_ledger_path(),
            PathBuf::from("/out/sess/detection_results.txt")
        );
        assert_eq!(
            layout.not_detected_ledger_path(),
            PathBuf::from("/out/sess/not_detected.txt")
        );
    }

    #[test]
    fn test_trailing_slash_input_uses_last_component() {
        let layout = OutputLayout::for_input(Path::new("out"), Path::new("data/sess/"));
        assert_eq!(layout.base(), Path::new("out/sess"));
    }

    #[test]
    fn test_current_dir_input_resolves_to_a_name() {
        let layout = OutputLayout::for_input(Path::new("out"), Path::new("."));
        let name = layout.base().file_name().unwrap();
        assert_ne!(name, ".");
    }

    #[test]
    fn test_create_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = OutputLayout::for_input(tmp.path(), Path::new("/data/sess"));
        layout.create_dirs().unwrap();
        assert!(layout.orignorm_dir().is_dir());
        assert!(layout.processed_dir().is_dir());
        assert!(layout.landmarks_dir().is_dir());
        assert!(layout.comparisons_dir().is_dir());
    }

    #[test]
    fn test_tag_for_detection() {
        assert_eq!(ArtifactTag::for_detection(true).suffix(), "");
        assert_eq!(ArtifactTag::for_detection(false).suffix(), "_ng");
    }
}
