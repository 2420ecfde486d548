use thiserror::Error;

use crate::face_detector::LandmarkFeature;

#[derive(Debug, Error)]
pub enum CensorError {
    #[error("expected an RGB image with shape (H, W, 3), got {0}")]
    InvalidImageShape(String),

    #[error("unsupported censor mode: {0:?}")]
    UnsupportedCensorMode(String),

    #[error("unsupported subject: {0:?}")]
    UnsupportedSubject(String),

    #[error("detector returned {faces} face boxes but {landmark_sets} landmark sets")]
    LandmarkCountMismatch { faces: usize, landmark_sets: usize },

    #[error("face {face} has no {feature} landmarks")]
    MissingLandmarks { face: usize, feature: LandmarkFeature },

    #[error("face detector does not provide facial landmarks")]
    LandmarksUnavailable,

    #[error("face detection failed: {0}")]
    DetectionFailed(String),

    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("pixelate block count must be > 0")]
    InvalidPixelateBlocks,

    #[error("blur scale must be in (0, 1], got {0}")]
    InvalidBlurScale(f32),

    #[error("invalid settings: {0}")]
    Config(String),
}
