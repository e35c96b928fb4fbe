use std::path::Path;

use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::Session;

/// Open an ONNX model for use by a single worker thread.
///
/// Sessions are never shared between workers, so intra-op parallelism is
/// pinned to one thread and the pool provides the parallelism.
pub fn open_worker_session(model_path: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    if !model_path.is_file() {
        return Err(format!("model file not found: {}", model_path.display()).into());
    }
    let session = Session::builder()?
        .with_intra_threads(1)?
        .with_inter_threads(1)?
        .with_execution_providers(platform_execution_providers())?
        .commit_from_file(model_path)?;
    Ok(session)
}

/// Hardware providers tried before the CPU default on this platform.
fn platform_execution_providers() -> Vec<ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_reported_with_path() {
        let err = open_worker_session(Path::new("/nonexistent/model.onnx")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/model.onnx"));
    }
}
