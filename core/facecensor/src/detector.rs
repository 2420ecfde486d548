use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use log::Log;
use serde::{Deserialize, Serialize};

use crate::config::DetectorSettings;
use crate::error::CensorError;
use crate::face_detector::{
    FaceDetector, FaceLandmarks, FaceLocation, LandmarkFeature, LandmarkPoint,
};
use crate::raster::{rgb_from_raster, Raster};
use crate::region::{Region, RegionKind};
use crate::telemetry::{Telemetry, DETECTOR_TARGET};

/// What kind of region to look for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Subject {
    /// One region per face.
    #[default]
    Face,
    /// Two regions per face: left eye, then right eye.
    Eyes,
}

impl Subject {
    /// Match a subject name, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for anything that is not `face`/`faces`/`eye`/`eyes`.
    pub fn recognize(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "face" | "faces" => Some(Subject::Face),
            "eye" | "eyes" => Some(Subject::Eyes),
            _ => None,
        }
    }

    /// Normalize a subject name under `policy`.
    ///
    /// An empty name always means [`Subject::Face`].
    pub fn parse(name: &str, policy: SubjectPolicy) -> Result<Self, CensorError> {
        if name.trim().is_empty() {
            return Ok(Subject::Face);
        }
        match (Self::recognize(name), policy) {
            (Some(subject), _) => Ok(subject),
            (None, SubjectPolicy::Permissive) => Ok(Subject::Face),
            (None, SubjectPolicy::Strict) => Err(CensorError::UnsupportedSubject(name.to_string())),
        }
    }
}

impl FromStr for Subject {
    type Err = CensorError;

    /// Strict parse: unknown names are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, SubjectPolicy::Strict)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Subject::Face => "face",
            Subject::Eyes => "eyes",
        })
    }
}

/// Handling of subject names that match no known subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectPolicy {
    /// Fall back to face detection and log a warning.
    #[default]
    Permissive,
    /// Fail with [`CensorError::UnsupportedSubject`].
    Strict,
}

/// How face boxes are matched with landmark sets in eyes mode.
///
/// Both strategies require the backend to report as many landmark sets as
/// face boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkPairing {
    /// The n-th face box belongs to the n-th landmark set.
    #[default]
    IndexAligned,
    /// Each face box, in order, takes the unclaimed landmark set whose
    /// centroid is closest to the box centroid.
    NearestCentroid,
}

/// Turns face-detector output into centroid-addressed [`Region`]s.
pub struct Detector<'a, D: FaceDetector> {
    backend: D,
    settings: DetectorSettings,
    telemetry: Telemetry<'a>,
}

impl<D: FaceDetector> Detector<'static, D> {
    /// Wrap `backend`, logging through the global `log` facade.
    pub fn new(backend: D) -> Self {
        Self {
            backend,
            settings: DetectorSettings::default(),
            telemetry: Telemetry::global(DETECTOR_TARGET),
        }
    }
}

impl<'a, D: FaceDetector> Detector<'a, D> {
    /// Send diagnostics to `logger` instead of the global logger.
    pub fn logger<'b>(self, logger: &'b dyn Log) -> Detector<'b, D> {
        Detector {
            backend: self.backend,
            settings: self.settings,
            telemetry: Telemetry::new(logger, DETECTOR_TARGET),
        }
    }

    /// Replace all settings at once.
    pub fn with_settings(mut self, settings: DetectorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the unknown-subject policy (default: `SubjectPolicy::Permissive`).
    pub fn subject_policy(mut self, policy: SubjectPolicy) -> Self {
        self.settings.subject_policy = policy;
        self
    }

    /// Set the face/landmark pairing (default: `LandmarkPairing::IndexAligned`).
    pub fn landmark_pairing(mut self, pairing: LandmarkPairing) -> Self {
        self.settings.landmark_pairing = pairing;
        self
    }

    /// Active settings.
    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &D {
        &self.backend
    }

    /// Detect regions of `subject` in `image`.
    ///
    /// Regions come back in backend order; nothing is sorted or de-duplicated.
    pub fn detect(&self, image: &RgbImage, subject: &str) -> Result<Vec<Region>, CensorError> {
        let parsed = Subject::parse(subject, self.settings.subject_policy)?;
        if Subject::recognize(subject).is_none() && !subject.trim().is_empty() {
            self.telemetry.warn(format_args!(
                "unrecognized subject {subject:?}, falling back to {parsed}"
            ));
        }
        self.detect_subject(image, parsed)
    }

    /// Detect regions of an already-normalized subject.
    pub fn detect_subject(
        &self,
        image: &RgbImage,
        subject: Subject,
    ) -> Result<Vec<Region>, CensorError> {
        let _timing = self.telemetry.timing(format!("detect {subject}"));
        let regions = match subject {
            Subject::Face => self.detect_faces(image)?,
            Subject::Eyes => self.detect_eyes(image)?,
        };
        self.telemetry.debug(format_args!(
            "{} region(s) for subject {subject} in {}x{} image",
            regions.len(),
            image.width(),
            image.height()
        ));
        Ok(regions)
    }

    /// Validate a raw `[height, width, 3]` raster, then detect.
    pub fn detect_raster(
        &self,
        shape: &[usize],
        data: Raster<'_>,
        subject: &str,
    ) -> Result<Vec<Region>, CensorError> {
        if !matches!(data, Raster::U8(_)) {
            self.telemetry
                .debug(format_args!("coercing non-u8 raster {shape:?} to u8"));
        }
        let image = rgb_from_raster(shape, data)?;
        self.detect(&image, subject)
    }

    fn detect_faces(&self, image: &RgbImage) -> Result<Vec<Region>, CensorError> {
        let locations = self.backend.face_locations(image)?;
        Ok(locations
            .iter()
            .map(|loc| Region::from_edges(RegionKind::Face, loc.left, loc.top, loc.right, loc.bottom))
            .collect())
    }

    fn detect_eyes(&self, image: &RgbImage) -> Result<Vec<Region>, CensorError> {
        let locations = self.backend.face_locations(image)?;
        let landmarks = self.backend.face_landmarks(image)?;

        if locations.len() != landmarks.len() {
            return Err(CensorError::LandmarkCountMismatch {
                faces: locations.len(),
                landmark_sets: landmarks.len(),
            });
        }

        let order: Vec<usize> = match self.settings.landmark_pairing {
            LandmarkPairing::IndexAligned => (0..landmarks.len()).collect(),
            LandmarkPairing::NearestCentroid => pair_by_centroid(&locations, &landmarks),
        };

        let mut regions = Vec::with_capacity(order.len() * 2);
        for (face, &set) in order.iter().enumerate() {
            let marks = &landmarks[set];
            for feature in [LandmarkFeature::LeftEye, LandmarkFeature::RightEye] {
                let points = marks
                    .cluster(feature)
                    .filter(|points| !points.is_empty())
                    .ok_or(CensorError::MissingLandmarks { face, feature })?;
                regions.push(cluster_region(points));
            }
        }
        Ok(regions)
    }
}

impl<D: FaceDetector + fmt::Debug> fmt::Debug for Detector<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector")
            .field("backend", &self.backend)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Detect regions of `subject` with a one-off [`Detector`] around `backend`.
pub fn detect<D: FaceDetector>(
    backend: D,
    image: &RgbImage,
    subject: &str,
) -> Result<Vec<Region>, CensorError> {
    Detector::new(backend).detect(image, subject)
}

/// Tight bounding box of a non-empty point cluster, as an eye region.
fn cluster_region(points: &[LandmarkPoint]) -> Region {
    let (mut left, mut top) = (i32::MAX, i32::MAX);
    let (mut right, mut bottom) = (i32::MIN, i32::MIN);
    for p in points {
        left = left.min(p.x);
        right = right.max(p.x);
        top = top.min(p.y);
        bottom = bottom.max(p.y);
    }
    Region::from_edges(RegionKind::Eye, left, top, right, bottom)
}

/// For each face (in order), index of the closest unclaimed landmark set.
///
/// Landmark sets without points rank last. Ties go to the lower index.
fn pair_by_centroid(locations: &[FaceLocation], landmarks: &[FaceLandmarks]) -> Vec<usize> {
    let centroids: Vec<Option<(f64, f64)>> = landmarks.iter().map(FaceLandmarks::centroid).collect();
    let mut claimed = vec![false; landmarks.len()];
    let mut order = Vec::with_capacity(locations.len());

    for location in locations {
        let (fx, fy) = location.centroid();
        let mut best: Option<(usize, f64)> = None;
        for (index, centroid) in centroids.iter().enumerate() {
            if claimed[index] {
                continue;
            }
            let distance = match centroid {
                Some((cx, cy)) => (cx - fx).powi(2) + (cy - fy).powi(2),
                None => f64::INFINITY,
            };
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        // Counts were checked equal, so an unclaimed set always remains.
        if let Some((index, _)) = best {
            claimed[index] = true;
            order.push(index);
        }
    }
    order
}
