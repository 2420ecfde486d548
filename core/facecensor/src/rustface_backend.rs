use std::io::Read;

use image::RgbImage;

use crate::error::CensorError;
use crate::face_detector::{FaceDetector, FaceLocation};

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// SeetaFace only locates faces, so eyes-mode detection through this backend
/// fails with [`CensorError::LandmarksUnavailable`].
pub struct RustfaceDetector {
    model: rustface::Model,
    min_face_size: u32,
    score_thresh: f64,
}

impl RustfaceDetector {
    /// Load a SeetaFace frontal model (e.g. `seeta_fd_frontal_v1.0.bin`).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CensorError> {
        let model = rustface::read_model(reader).map_err(|e| {
            CensorError::DetectionFailed(format!("failed to load SeetaFace model: {e:?}"))
        })?;
        Ok(Self {
            model,
            min_face_size: 20,
            score_thresh: 2.0,
        })
    }

    /// Load a SeetaFace model from bytes already in memory.
    pub fn from_model_bytes(bytes: &[u8]) -> Result<Self, CensorError> {
        Self::from_reader(std::io::Cursor::new(bytes))
    }

    /// Smallest face edge, in pixels, the engine searches for (default: 20).
    pub fn min_face_size(mut self, size: u32) -> Self {
        self.min_face_size = size;
        self
    }

    /// Minimum classifier score to accept a face (default: 2.0).
    pub fn score_thresh(mut self, thresh: f64) -> Self {
        self.score_thresh = thresh;
        self
    }
}

impl FaceDetector for RustfaceDetector {
    fn face_locations(&self, image: &RgbImage) -> Result<Vec<FaceLocation>, CensorError> {
        let gray = image::imageops::grayscale(image);
        let (width, height) = gray.dimensions();

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_thresh);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                let (left, top) = (bbox.x(), bbox.y());
                FaceLocation {
                    top,
                    right: left.saturating_add(bbox.width() as i32),
                    bottom: top.saturating_add(bbox.height() as i32),
                    left,
                }
            })
            .collect())
    }
}
