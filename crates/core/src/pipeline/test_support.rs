//! Model-free stand-ins for the detection backends, driven by a marker
//! value in the first sample of each frame file.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use npyz::WriterBuilder;

use crate::detection::domain::capabilities::{Capabilities, CapabilityError, CapabilityFactory};
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::frames::domain::frame_source::FrameSource;
use crate::frames::infrastructure::file_frame_reader::FileFrameReader;
use crate::frames::infrastructure::npy_artifact_store::NpyArtifactStore;
use crate::preprocessing::domain::frame_preprocessor::FramePreprocessor;
use crate::rendering::infrastructure::panel_comparison_renderer::PanelComparisonRenderer;
use crate::shared::frame::{Frame, RawFrame};
use crate::shared::frame_error::FrameError;
use crate::shared::landmarks::Landmarks;
use crate::shared::region::Region;

use super::error_log::ErrorLog;
use super::frame_processor::FrameServices;

const SIDE: u32 = 8;
const MAX_SAMPLE: u16 = 1000;

/// Raw first-sample values; after min-max they become 255, 0 and 127.
pub const FACE_MARK: u16 = MAX_SAMPLE;
pub const NO_FACE_MARK: u16 = 0;
pub const CRASH_MARK: u16 = 500;

pub const FACE_REGION: Region = Region {
    x: 0,
    y: 0,
    width: 4,
    height: 4,
};

/// Write `<dir>/<sub>/<id>.npy`, an 8x8 u16 frame whose first sample is
/// `mark` and whose second sample is `shift` (moves the found face).
pub fn shifted_frame_file(dir: &Path, sub: &str, id: &str, mark: u16, shift: u16) -> FrameSource {
    let mut samples = vec![0u16; (SIDE * SIDE) as usize];
    samples[0] = mark;
    samples[1] = shift;
    samples[(SIDE * SIDE) as usize - 1] = MAX_SAMPLE;

    let mut buf = std::io::Cursor::new(Vec::new());
    let mut writer = npyz::WriteOptions::<u16>::new()
        .default_dtype()
        .shape(&[SIDE as u64, SIDE as u64])
        .writer(&mut buf)
        .begin_nd()
        .unwrap();
    writer.extend(samples).unwrap();
    writer.finish().unwrap();

    let folder = dir.join(sub);
    std::fs::create_dir_all(&folder).unwrap();
    let path = folder.join(format!("{id}.npy"));
    std::fs::write(&path, buf.into_inner()).unwrap();
    FrameSource::from_path(path)
}

pub fn frame_file(dir: &Path, sub: &str, id: &str, mark: u16) -> FrameSource {
    shifted_frame_file(dir, sub, id, mark, 0)
}

/// Detection buffer is the min-max normalized frame.
pub struct NormalizingPreprocessor;

impl FramePreprocessor for NormalizingPreprocessor {
    fn preprocess(&self, raw: &RawFrame) -> Result<Frame, FrameError> {
        Ok(raw.normalize_min_max())
    }
}

pub fn services_in(root: &Path) -> FrameServices {
    FrameServices {
        reader: Box::new(FileFrameReader::new()),
        preprocessor: Box::new(NormalizingPreprocessor),
        store: Box::new(NpyArtifactStore::new()),
        renderer: Box::new(PanelComparisonRenderer::new()),
        error_log: ErrorLog::in_dir(root),
    }
}

/// 255 finds a face, 0 finds none, anything else panics.
pub struct MarkerDetector;

impl FaceDetector for MarkerDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        _upsample_level: u32,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        match frame.data()[0] {
            255 => Ok(vec![Region {
                x: i32::from(frame.data()[1]),
                ..FACE_REGION
            }]),
            0 => Ok(Vec::new()),
            _ => panic!("detector crashed"),
        }
    }
}

/// Every point at the region's top-left corner plus one.
pub struct CornerPredictor;

impl LandmarkPredictor for CornerPredictor {
    fn predict(
        &mut self,
        _frame: &Frame,
        region: &Region,
    ) -> Result<Landmarks, Box<dyn std::error::Error>> {
        Ok(Landmarks::new([(region.x + 1, region.y + 1); 68]))
    }
}

pub fn stub_capabilities() -> Capabilities {
    Capabilities {
        detector: Box::new(MarkerDetector),
        predictor: Box::new(CornerPredictor),
    }
}

/// Hands out stub capabilities, failing the calls whose index is listed.
#[derive(Default)]
pub struct StubFactory {
    pub fail_calls: Vec<usize>,
    pub calls: AtomicUsize,
}

impl StubFactory {
    pub fn failing_always() -> Self {
        Self {
            fail_calls: (0..64).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl CapabilityFactory for StubFactory {
    fn create(&self) -> Result<Capabilities, CapabilityError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_calls.contains(&call) {
            return Err("model unavailable".into());
        }
        Ok(stub_capabilities())
    }
}
