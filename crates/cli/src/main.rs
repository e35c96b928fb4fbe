use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use nirmark_core::detection::domain::capabilities::CapabilityFactory;
use nirmark_core::detection::domain::detection_escalator::BoxScale;
use nirmark_core::detection::domain::escalation_policy::EscalationPolicy;
use nirmark_core::detection::infrastructure::model_capabilities::ModelCapabilityFactory;
use nirmark_core::detection::infrastructure::model_resolver;
use nirmark_core::frames::domain::output_layout::OutputLayout;
use nirmark_core::frames::infrastructure::directory_frame_catalog::DirectoryFrameCatalog;
use nirmark_core::frames::infrastructure::file_frame_reader::FileFrameReader;
use nirmark_core::frames::infrastructure::npy_artifact_store::NpyArtifactStore;
use nirmark_core::pipeline::batch_logger::StdoutBatchLogger;
use nirmark_core::pipeline::batch_orchestrator::{BatchError, BatchOrchestrator, BatchSummary};
use nirmark_core::pipeline::error_log::ErrorLog;
use nirmark_core::pipeline::frame_processor::FrameServices;
use nirmark_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use nirmark_core::preprocessing::domain::preprocess_params::PreprocessParams;
use nirmark_core::preprocessing::infrastructure::nir_preprocessor::NirPreprocessor;
use nirmark_core::rendering::infrastructure::panel_comparison_renderer::PanelComparisonRenderer;
use nirmark_core::shared::constants::{DEFAULT_OUTPUT_DIR, FACE_MODEL_NAME};

/// Batch 68-point facial landmark detection for near-infrared frames.
#[derive(Parser, Debug)]
#[command(name = "nirmark")]
struct Cli {
    /// Input directories, processed one after another.
    #[arg(long, num_args = 1.., conflicts_with = "list")]
    dirs: Vec<PathBuf>,

    /// Text file listing input directories, one per line.
    #[arg(long)]
    list: Option<PathBuf>,

    /// Escalation preset: normal (upsample 0-3) or high (upsample 0-4).
    #[arg(long, default_value = "normal")]
    mode: String,

    /// Explicit upsample levels (comma-separated); overrides --mode.
    #[arg(long, value_delimiter = ',')]
    levels: Option<Vec<u32>>,

    /// Root directory for all outputs.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// SeetaFace detection model; downloaded to the user cache when omitted.
    #[arg(long)]
    face_model: Option<PathBuf>,

    /// ONNX 68-point landmark regression model.
    #[arg(long)]
    landmark_model: PathBuf,

    /// JSON file with preprocessing parameters.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Horizontal scale applied to the detected face box.
    #[arg(long, default_value = "1.0")]
    box_scale_x: f64,

    /// Vertical scale applied to the detected face box.
    #[arg(long, default_value = "1.0")]
    box_scale_y: f64,

    /// Worker threads (default: available cores minus two, at least one).
    #[arg(long)]
    workers: Option<usize>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let policy = build_policy(&cli)?;
    let box_scale = BoxScale::new(cli.box_scale_x, cli.box_scale_y)?;
    let params = match &cli.params {
        Some(path) => PreprocessParams::from_json_file(path)?,
        None => PreprocessParams::default(),
    };
    let input_dirs = input_dirs(&cli)?;

    let capabilities = build_capabilities(&cli)?;
    let services = Arc::new(FrameServices {
        reader: Box::new(FileFrameReader::new()),
        preprocessor: Box::new(NirPreprocessor::new(params)),
        store: Box::new(NpyArtifactStore::new()),
        renderer: Box::new(PanelComparisonRenderer::new()),
        error_log: ErrorLog::in_dir(&cli.output),
    });

    for dir in &input_dirs {
        if !dir.is_dir() {
            log::warn!("Skipping {}: not a directory", dir.display());
            continue;
        }

        let executor = match cli.workers {
            Some(n) => ThreadedBatchExecutor::new(n),
            None => ThreadedBatchExecutor::for_this_machine(),
        };
        log::info!("Using {} worker threads", executor.workers());

        let mut orchestrator = BatchOrchestrator::new(
            Box::new(DirectoryFrameCatalog::new()),
            Box::new(executor),
            Arc::clone(&services),
            Arc::clone(&capabilities),
            box_scale,
            &cli.output,
            Box::new(StdoutBatchLogger::default()),
        );

        match orchestrator.run(dir, &policy) {
            Ok(summary) => report(&summary),
            Err(BatchError::EmptyInput(path)) => {
                eprintln!("No frame files in {}; skipping", path.display());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn build_policy(cli: &Cli) -> Result<EscalationPolicy, Box<dyn std::error::Error>> {
    Ok(match &cli.levels {
        Some(levels) => EscalationPolicy::new(levels.clone())?,
        None => cli.mode.parse()?,
    })
}

fn input_dirs(cli: &Cli) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if let Some(list) = &cli.list {
        let text = std::fs::read_to_string(list)
            .map_err(|e| format!("Cannot read directory list {}: {e}", list.display()))?;
        let dirs = parse_dir_list(&text);
        if dirs.is_empty() {
            return Err(format!("Directory list {} is empty", list.display()).into());
        }
        return Ok(dirs);
    }
    if cli.dirs.is_empty() {
        return Ok(vec![PathBuf::from(".")]);
    }
    Ok(cli.dirs.clone())
}

fn parse_dir_list(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn build_capabilities(cli: &Cli) -> Result<Arc<dyn CapabilityFactory>, Box<dyn std::error::Error>> {
    if cli.face_model.is_none() {
        log::info!("Resolving model: {FACE_MODEL_NAME}");
    }
    let face_model = model_resolver::resolve_face_model(
        cli.face_model.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    let factory = ModelCapabilityFactory::new(&face_model, &cli.landmark_model)
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    // Fail before any directory is touched if the models cannot be loaded
    factory.create().map_err(|e| e as Box<dyn std::error::Error>)?;
    Ok(Arc::new(factory))
}

fn report(summary: &BatchSummary) {
    if summary.all_detected() {
        println!("\nFace detected in all {} frames.", summary.total);
    } else if let Some(path) = &summary.not_detected_ledger {
        println!(
            "\n{} of {} frames without a detected face, listed in {}",
            summary.failures,
            summary.total,
            path.display()
        );
    }

    let layout = OutputLayout::new(&summary.output_dir);
    println!("\nResults saved to:");
    for dir in [
        layout.orignorm_dir(),
        layout.processed_dir(),
        layout.landmarks_dir(),
        layout.comparisons_dir(),
    ] {
        println!("  {}", dir.display());
    }
    println!("  {}", summary.result_ledger.display());
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
