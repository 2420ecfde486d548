//! Serializable settings for the detector and the censor engine.
//!
//! Both structs deserialize with `#[serde(default)]`, so a settings file only
//! needs the keys it overrides. Builder methods on [`crate::Detector`] and
//! [`crate::RegionCensor`] can override individual values afterwards.

use serde::{Deserialize, Serialize};

use crate::detector::{LandmarkPairing, SubjectPolicy};
use crate::error::CensorError;

/// Default number of mosaic blocks per axis for pixelation.
pub const DEFAULT_PIXELATE_BLOCKS: u32 = 10;

/// Default Gaussian sigma as a fraction of the footprint's shorter side.
pub const DEFAULT_BLUR_SCALE: f32 = 0.15;

/// Largest accepted blur scale: sigma equal to the footprint's shorter side.
pub const MAX_BLUR_SCALE: f32 = 1.0;

/// Tuning for the censor transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensorSettings {
    /// Mosaic blocks per axis in `pixelate` mode.
    pub pixelate_blocks: u32,
    /// Gaussian sigma relative to `min(width, height)` of the footprint in `blur` mode.
    pub blur_scale: f32,
}

impl Default for CensorSettings {
    fn default() -> Self {
        Self {
            pixelate_blocks: DEFAULT_PIXELATE_BLOCKS,
            blur_scale: DEFAULT_BLUR_SCALE,
        }
    }
}

impl CensorSettings {
    /// Parse settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CensorError> {
        serde_json::from_str(json).map_err(|e| CensorError::Config(e.to_string()))
    }

    /// Reject values no transform can work with.
    pub fn validate(&self) -> Result<(), CensorError> {
        if self.pixelate_blocks == 0 {
            return Err(CensorError::InvalidPixelateBlocks);
        }
        if !(self.blur_scale > 0.0 && self.blur_scale <= MAX_BLUR_SCALE) {
            return Err(CensorError::InvalidBlurScale(self.blur_scale));
        }
        Ok(())
    }
}

/// Tuning for subject handling and face/landmark pairing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// What to do with subject strings that match no known subject.
    pub subject_policy: SubjectPolicy,
    /// How face boxes are matched with landmark sets in eyes mode.
    pub landmark_pairing: LandmarkPairing,
}

impl DetectorSettings {
    /// Parse settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CensorError> {
        serde_json::from_str(json).map_err(|e| CensorError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn censor_defaults() {
        let settings = CensorSettings::default();
        assert_eq!(settings.pixelate_blocks, 10);
        assert!((settings.blur_scale - 0.15).abs() < f32::EPSILON);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = CensorSettings::from_json_str(r#"{ "pixelate_blocks": 4 }"#).unwrap();
        assert_eq!(settings.pixelate_blocks, 4);
        assert!((settings.blur_scale - DEFAULT_BLUR_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_blocks_rejected() {
        let settings = CensorSettings {
            pixelate_blocks: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CensorError::InvalidPixelateBlocks)
        ));
    }

    #[test]
    fn bad_blur_scale_rejected() {
        for scale in [0.0, -1.0, 1.01, 1000.0, f32::NAN, f32::INFINITY] {
            let settings = CensorSettings {
                blur_scale: scale,
                ..Default::default()
            };
            assert!(
                matches!(settings.validate(), Err(CensorError::InvalidBlurScale(_))),
                "scale {scale} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(
            CensorSettings::from_json_str("{ not json"),
            Err(CensorError::Config(_))
        ));
    }

    #[test]
    fn detector_settings_from_json() {
        let settings = DetectorSettings::from_json_str(
            r#"{ "subject_policy": "strict", "landmark_pairing": "nearest_centroid" }"#,
        )
        .unwrap();
        assert_eq!(settings.subject_policy, SubjectPolicy::Strict);
        assert_eq!(settings.landmark_pairing, LandmarkPairing::NearestCentroid);

        let defaults = DetectorSettings::from_json_str("{}").unwrap();
        assert_eq!(defaults, DetectorSettings::default());
    }
}
