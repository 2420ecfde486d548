use std::collections::BTreeMap;
use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::CensorError;

/// Bounding box of a detected face, in `(top, right, bottom, left)` order.
///
/// Edges are in pixels; `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceLocation {
    /// Y coordinate of the top edge.
    pub top: i32,
    /// X coordinate of the right edge.
    pub right: i32,
    /// Y coordinate of the bottom edge.
    pub bottom: i32,
    /// X coordinate of the left edge.
    pub left: i32,
}

impl FaceLocation {
    /// Centroid of the box in floating-point pixels.
    pub fn centroid(&self) -> (f64, f64) {
        (
            (f64::from(self.left) + f64::from(self.right)) / 2.0,
            (f64::from(self.top) + f64::from(self.bottom)) / 2.0,
        )
    }
}

impl From<(i32, i32, i32, i32)> for FaceLocation {
    fn from((top, right, bottom, left): (i32, i32, i32, i32)) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Named point cluster of a facial landmark set.
///
/// Names follow the 68-point dlib layout grouped by feature.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkFeature {
    Chin,
    LeftEyebrow,
    RightEyebrow,
    NoseBridge,
    NoseTip,
    LeftEye,
    RightEye,
    TopLip,
    BottomLip,
}

impl fmt::Display for LandmarkFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LandmarkFeature::Chin => "chin",
            LandmarkFeature::LeftEyebrow => "left_eyebrow",
            LandmarkFeature::RightEyebrow => "right_eyebrow",
            LandmarkFeature::NoseBridge => "nose_bridge",
            LandmarkFeature::NoseTip => "nose_tip",
            LandmarkFeature::LeftEye => "left_eye",
            LandmarkFeature::RightEye => "right_eye",
            LandmarkFeature::TopLip => "top_lip",
            LandmarkFeature::BottomLip => "bottom_lip",
        };
        f.write_str(name)
    }
}

/// A single landmark point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// Landmark point clusters of one face.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceLandmarks {
    clusters: BTreeMap<LandmarkFeature, Vec<LandmarkPoint>>,
}

impl FaceLandmarks {
    /// Create an empty landmark set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cluster, replacing any previous cluster for `feature`.
    pub fn with_cluster(
        mut self,
        feature: LandmarkFeature,
        points: impl IntoIterator<Item = (i32, i32)>,
    ) -> Self {
        self.insert(feature, points);
        self
    }

    /// Insert a cluster, replacing any previous cluster for `feature`.
    pub fn insert(
        &mut self,
        feature: LandmarkFeature,
        points: impl IntoIterator<Item = (i32, i32)>,
    ) {
        let points = points
            .into_iter()
            .map(|(x, y)| LandmarkPoint { x, y })
            .collect();
        self.clusters.insert(feature, points);
    }

    /// Points of `feature`, if the backend reported them.
    pub fn cluster(&self, feature: LandmarkFeature) -> Option<&[LandmarkPoint]> {
        self.clusters.get(&feature).map(Vec::as_slice)
    }

    /// Mean of every point in every cluster, or `None` for an empty set.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
        for point in self.clusters.values().flatten() {
            sum_x += f64::from(point.x);
            sum_y += f64::from(point.y);
            count += 1;
        }
        (count > 0).then(|| (sum_x / count as f64, sum_y / count as f64))
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to wire in a landmark engine (dlib, ONNX, etc.)
/// and pass it to [`crate::Detector::new`]. Both calls are expected to
/// report the same faces for the same image.
pub trait FaceDetector: Send + Sync {
    /// Detect face boxes in an RGB image.
    fn face_locations(&self, image: &RgbImage) -> Result<Vec<FaceLocation>, CensorError>;

    /// Detect per-face landmark clusters in an RGB image.
    ///
    /// Backends that only locate faces keep the default, which fails with
    /// [`CensorError::LandmarksUnavailable`].
    fn face_landmarks(&self, _image: &RgbImage) -> Result<Vec<FaceLandmarks>, CensorError> {
        Err(CensorError::LandmarksUnavailable)
    }
}

impl<T: FaceDetector + ?Sized> FaceDetector for Box<T> {
    fn face_locations(&self, image: &RgbImage) -> Result<Vec<FaceLocation>, CensorError> {
        (**self).face_locations(image)
    }

    fn face_landmarks(&self, image: &RgbImage) -> Result<Vec<FaceLandmarks>, CensorError> {
        (**self).face_landmarks(image)
    }
}

impl<T: FaceDetector + ?Sized> FaceDetector for &T {
    fn face_locations(&self, image: &RgbImage) -> Result<Vec<FaceLocation>, CensorError> {
        (**self).face_locations(image)
    }

    fn face_landmarks(&self, image: &RgbImage) -> Result<Vec<FaceLandmarks>, CensorError> {
        (**self).face_landmarks(image)
    }
}
