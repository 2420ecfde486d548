//! Find faces or eyes in an RGB image and obscure them with pixelation,
//! blurring, or a solid black bar.
//!
//! Detection and censoring are separate steps joined by [`Region`], a
//! labeled rectangle addressed by its CENTER point (not its top-left corner).
//!
//! # Example
//!
//! ```no_run
//! use facecensor::{censor, Detector, FaceDetector};
//!
//! # fn backend() -> Box<dyn FaceDetector> { unimplemented!() }
//! let image = facecensor::decode_rgb(&std::fs::read("photo.jpg").unwrap()).unwrap();
//! let regions = Detector::new(backend()).detect(&image, "faces").unwrap();
//! let censored = censor(&image, &regions, "pixelate").unwrap();
//! println!("{} region(s) censored", regions.len());
//! # let _ = censored;
//! ```
#![warn(missing_docs)]

mod censor;
/// Serializable detector and censor settings.
pub mod config;
mod detector;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
/// Preview rendering of detected regions.
pub mod overlay;
/// Conversion of external rasters into RGB8 images.
pub mod raster;
mod region;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;
pub mod telemetry;

/// Region censoring modes, builder, and one-shot entry point.
pub use censor::{censor, CensorMode, RegionCensor};
/// Settings structs for the detector and censor engine.
pub use config::{CensorSettings, DetectorSettings};
/// Region detection with subject normalization and landmark pairing.
pub use detector::{detect, Detector, LandmarkPairing, Subject, SubjectPolicy};
/// Error type returned by facecensor operations.
pub use error::CensorError;
/// Face detection trait and its geometry types.
pub use face_detector::{FaceDetector, FaceLandmarks, FaceLocation, LandmarkFeature};
/// Detection preview rendering.
pub use overlay::draw_regions;
/// Raster conversion helpers.
pub use raster::{decode_rgb, rgb_from_dynamic, rgb_from_raster, Raster};
/// Centroid-addressed region and its clamped footprint.
pub use region::{Footprint, Region, RegionKind};
#[cfg(feature = "rustface")]
/// Built-in detector backed by a SeetaFace model.
pub use rustface_backend::RustfaceDetector;
