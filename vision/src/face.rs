use async_trait::async_trait;
use image::imageops::FilterType;
use presence::{DetectError, DetectOptions, FaceDetector, Frame};
use image::GrayImage;
use rustface::{create_detector_with_model, read_model, ImageData, Model};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{error, info};

/// Tuning for the SeetaFace cascade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RustfaceSettings {
    pub min_face_size: u32,
    /// Multiplier mapping a 0..1 confidence onto rustface's raw score range.
    pub score_scale: f64,
    pub pyramid_scale_factor: f32,
    pub window_step: u32,
}

impl Default for RustfaceSettings {
    fn default() -> Self {
        Self {
            min_face_size: 40,
            score_scale: 4.0,
            pyramid_scale_factor: 0.8,
            window_step: 4,
        }
    }
}

/// [`FaceDetector`] backed by a SeetaFace frontal model.
///
/// The model is read and parsed once, on a blocking task, when the detector
/// is created; [`FaceDetector::ready`] stays false until it has loaded.
pub struct RustfaceDetector {
    model: Arc<OnceLock<Arc<Model>>>,
    settings: RustfaceSettings,
}

impl RustfaceDetector {
    /// Start loading the model at `path` in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(path: impl Into<PathBuf>, settings: RustfaceSettings) -> Self {
        let model = Arc::new(OnceLock::new());
        let slot = model.clone();
        let path = path.into();
        tokio::task::spawn_blocking(move || match read_model_file(&path) {
            Ok(model) => {
                info!(path = %path.display(), "face model loaded");
                let _ = slot.set(Arc::new(model));
            }
            Err(e) => error!(path = %path.display(), error = %e, "failed to load face model"),
        });
        Self { model, settings }
    }

    /// Use an in-memory model.
    pub fn from_bytes(bytes: Vec<u8>, settings: RustfaceSettings) -> Result<Self, DetectError> {
        let model = OnceLock::new();
        let _ = model.set(Arc::new(parse_model(&bytes)?));
        Ok(Self {
            model: Arc::new(model),
            settings,
        })
    }
}

fn read_model_file(path: &Path) -> Result<Model, DetectError> {
    let bytes = std::fs::read(path).map_err(|e| DetectError::Failed(e.to_string()))?;
    parse_model(&bytes)
}

fn parse_model(bytes: &[u8]) -> Result<Model, DetectError> {
    read_model(Cursor::new(bytes))
        .map_err(|e| DetectError::Failed(format!("invalid face model: {e:?}")))
}

/// Count faces in an encoded image.
///
/// The image is scaled so its longer side is `options.min_input_size` and
/// converted to grayscale before detection.
pub fn count_faces(
    model: &[u8],
    image: &[u8],
    options: &DetectOptions,
    settings: &RustfaceSettings,
) -> Result<usize, DetectError> {
    let gray = prepare_frame(image, options)?;
    let model = parse_model(model)?;
    Ok(detect_in(model, &gray, options, settings))
}

fn prepare_frame(image: &[u8], options: &DetectOptions) -> Result<GrayImage, DetectError> {
    let img = image::load_from_memory(image).map_err(|e| DetectError::Decode(e.to_string()))?;
    let size = options.min_input_size;
    Ok(img.resize(size, size, FilterType::Triangle).to_luma8())
}

/// The rustface detector consumes its model, so each call gets its own copy.
fn detect_in(
    model: Model,
    gray: &GrayImage,
    options: &DetectOptions,
    settings: &RustfaceSettings,
) -> usize {
    let (w, h) = gray.dimensions();
    let mut det = create_detector_with_model(model);
    det.set_min_face_size(settings.min_face_size);
    det.set_score_thresh(f64::from(options.score_threshold) * settings.score_scale);
    det.set_pyramid_scale_factor(settings.pyramid_scale_factor);
    det.set_slide_window_step(settings.window_step, settings.window_step);

    let mut data = ImageData::new(gray, w, h);
    det.detect(&mut data).len()
}

#[async_trait]
impl FaceDetector for RustfaceDetector {
    fn ready(&self) -> bool {
        self.model.get().is_some()
    }

    async fn detect(&self, frame: &Frame, options: &DetectOptions) -> Result<usize, DetectError> {
        let model = self.model.get().cloned().ok_or(DetectError::NotReady)?;
        let bytes = frame.bytes.clone();
        let options = *options;
        let settings = self.settings;
        tokio::task::spawn_blocking(move || {
            let gray = prepare_frame(&bytes, &options)?;
            Ok(detect_in(Model::clone(&model), &gray, &options, &settings))
        })
        .await
        .map_err(|e| DetectError::Failed(e.to_string()))?
    }
}
