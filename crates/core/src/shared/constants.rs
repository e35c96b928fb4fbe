pub const FACE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const FACE_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

/// Number of points produced by the landmark predictor.
pub const NUM_LANDMARKS: usize = 68;

/// Host parallelism units kept free for the dispatching process and the OS.
pub const RESERVED_CORES: usize = 2;

pub const NPY_EXTENSION: &str = "npy";
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "bmp", "jpg", "jpeg"];

/// Suffix appended to artifact names of frames without a detection.
pub const FAILURE_SUFFIX: &str = "_ng";

pub const RESULT_LEDGER_NAME: &str = "detection_results.txt";
pub const NOT_DETECTED_LEDGER_NAME: &str = "not_detected.txt";
pub const ERROR_LOG_NAME: &str = "error_log.txt";
pub const DEFAULT_OUTPUT_DIR: &str = "processed_data";
