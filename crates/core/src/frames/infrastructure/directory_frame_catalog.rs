use std::fs;
use std::path::Path;

use crate::frames::domain::frame_catalog::FrameCatalog;
use crate::frames::domain::frame_source::FrameSource;

use super::file_frame_reader::FileFrameReader;

/// Lists readable frame files directly inside a directory, sorted by name.
///
/// Subdirectories are not descended into.
pub struct DirectoryFrameCatalog;

impl DirectoryFrameCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectoryFrameCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCatalog for DirectoryFrameCatalog {
    fn list(&self, input_dir: &Path) -> std::io::Result<Vec<FrameSource>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(input_dir)? {
            let path = entry?.path();
            if path.is_file() && FileFrameReader::supports(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths.into_iter().map(FrameSource::from_path).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lists_supported_files_sorted() {
        let tmp = TempDir::new().unwrap();
        for name in ["c.npy", "a.npy", "b.png", "notes.txt"] {
            fs::write(tmp.path().join(name), b"").unwrap();
        }
        fs::create_dir(tmp.path().join("d.npy")).unwrap();

        let ids: Vec<String> = DirectoryFrameCatalog::new()
            .list(tmp.path())
            .unwrap()
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_directory_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(DirectoryFrameCatalog::new().list(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(DirectoryFrameCatalog::new()
            .list(&tmp.path().join("absent"))
            .is_err());
    }
}
