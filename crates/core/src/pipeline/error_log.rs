use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::shared::constants::ERROR_LOG_NAME;

const SEPARATOR: &str = "==============================";

/// Append-only error log shared by every worker of a run.
///
/// Each entry is the message followed by a separator line. Entries are
/// mirrored to `log::error!`.
pub struct ErrorLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<output_root>/error_log.txt`
    pub fn in_dir(output_root: &Path) -> Self {
        Self::new(output_root.join(ERROR_LOG_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, message: &str) {
        log::error!("{message}");
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = self.append(message) {
            log::warn!("Could not write {}: {e}", self.path.display());
        }
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{message}")?;
        writeln!(file, "{SEPARATOR}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_entries_are_appended_with_separator() {
        let tmp = TempDir::new().unwrap();
        let log = ErrorLog::in_dir(tmp.path());
        log.record("first");
        log.record("second");

        let text = std::fs::read_to_string(tmp.path().join("error_log.txt")).unwrap();
        assert_eq!(text, format!("first\n{SEPARATOR}\nsecond\n{SEPARATOR}\n"));
    }

    #[test]
    fn test_missing_parent_is_created() {
        let tmp = TempDir::new().unwrap();
        let log = ErrorLog::in_dir(&tmp.path().join("out/nested"));
        log.record("boom");
        assert!(log.path().is_file());
    }

    #[test]
    fn test_concurrent_writers_do_not_interleave() {
        let tmp = TempDir::new().unwrap();
        let log = Arc::new(ErrorLog::in_dir(tmp.path()));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        log.record(&format!("worker {i} entry {j}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 200);
        for pair in lines.chunks(2) {
            assert!(pair[0].starts_with("worker "));
            assert_eq!(pair[1], SEPARATOR);
        }
    }

    #[test]
    fn test_unwritable_path_does_not_panic() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("error_log.txt")).unwrap();
        ErrorLog::in_dir(tmp.path()).record("lost");
    }
}
