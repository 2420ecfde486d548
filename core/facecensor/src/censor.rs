use std::fmt;
use std::str::FromStr;

use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::rect::Rect;
use log::Log;

use crate::config::CensorSettings;
use crate::error::CensorError;
use crate::region::{Footprint, Region};
use crate::telemetry::{Telemetry, CENSOR_TARGET};

/// Fill color of `black_bar` mode.
const BAR_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Pixel transform applied to each region's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CensorMode {
    /// Mosaic: each block of the footprint takes its mean color.
    Pixelate,
    /// Opaque black fill.
    BlackBar,
    /// Gaussian blur confined to the footprint.
    Blur,
}

impl CensorMode {
    /// Wire name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            CensorMode::Pixelate => "pixelate",
            CensorMode::BlackBar => "black_bar",
            CensorMode::Blur => "blur",
        }
    }
}

impl FromStr for CensorMode {
    type Err = CensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pixelate" => Ok(CensorMode::Pixelate),
            "black_bar" => Ok(CensorMode::BlackBar),
            "blur" => Ok(CensorMode::Blur),
            _ => Err(CensorError::UnsupportedCensorMode(s.to_string())),
        }
    }
}

impl fmt::Display for CensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for obscuring regions of an image.
///
/// The input image is never modified; [`RegionCensor::apply`] returns a new
/// buffer. Every region reads from the original pixels, and where regions
/// overlap the later one wins.
pub struct RegionCensor<'a> {
    mode: CensorMode,
    settings: CensorSettings,
    telemetry: Telemetry<'a>,
}

impl RegionCensor<'static> {
    /// Create a censor for `mode` with default settings.
    pub fn new(mode: CensorMode) -> Self {
        Self {
            mode,
            settings: CensorSettings::default(),
            telemetry: Telemetry::global(CENSOR_TARGET),
        }
    }
}

impl<'a> RegionCensor<'a> {
    /// Send diagnostics to `logger` instead of the global logger.
    pub fn logger<'b>(self, logger: &'b dyn Log) -> RegionCensor<'b> {
        RegionCensor {
            mode: self.mode,
            settings: self.settings,
            telemetry: Telemetry::new(logger, CENSOR_TARGET),
        }
    }

    /// Replace all settings at once.
    pub fn with_settings(mut self, settings: CensorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the number of mosaic blocks per axis (default: 10).
    pub fn pixelate_blocks(mut self, blocks: u32) -> Self {
        self.settings.pixelate_blocks = blocks;
        self
    }

    /// Set the blur strength as a fraction of the footprint's shorter side
    /// (default: 0.15, at most 1.0). Sigma never drops below one pixel.
    pub fn blur_scale(mut self, scale: f32) -> Self {
        self.settings.blur_scale = scale;
        self
    }

    /// The configured mode.
    pub fn mode(&self) -> CensorMode {
        self.mode
    }

    /// Active settings.
    pub fn settings(&self) -> &CensorSettings {
        &self.settings
    }

    /// Obscure every region of `regions` in a copy of `image`.
    ///
    /// Settings are validated before anything is allocated. Regions whose
    /// clamped footprint is empty are skipped.
    pub fn apply(&self, image: &RgbImage, regions: &[Region]) -> Result<RgbImage, CensorError> {
        self.settings.validate()?;

        let _timing = self.telemetry.timing(format!("censor {}", self.mode));
        let (width, height) = image.dimensions();
        let mut output = image.clone();
        let mut applied = 0usize;

        for region in regions {
            let Some(footprint) = region.footprint(width, height) else {
                self.telemetry
                    .trace(format_args!("skipping empty footprint for {region:?}"));
                continue;
            };
            match self.mode {
                CensorMode::BlackBar => black_bar(&mut output, footprint),
                CensorMode::Pixelate => {
                    pixelate(image, &mut output, footprint, self.settings.pixelate_blocks)
                }
                CensorMode::Blur => blur(image, &mut output, footprint, self.settings.blur_scale),
            }
            applied += 1;
        }

        self.telemetry.debug(format_args!(
            "{} applied to {applied} of {} region(s)",
            self.mode,
            regions.len()
        ));
        Ok(output)
    }
}

impl fmt::Debug for RegionCensor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionCensor")
            .field("mode", &self.mode)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Obscure `regions` of `image` with the mode named by `mode`.
///
/// `mode` is parsed before any work happens; an unknown name fails with
/// [`CensorError::UnsupportedCensorMode`].
pub fn censor(image: &RgbImage, regions: &[Region], mode: &str) -> Result<RgbImage, CensorError> {
    let mode: CensorMode = mode.parse()?;
    RegionCensor::new(mode).apply(image, regions)
}

fn black_bar(output: &mut RgbImage, fp: Footprint) {
    // Footprints are bounded by the image, whose sides fit in i32 for any
    // allocatable buffer.
    let rect = Rect::at(fp.left as i32, fp.top as i32).of_size(fp.width(), fp.height());
    draw_filled_rect_mut(output, rect, BAR_COLOR);
}

/// Copy of the source pixels under `fp`.
fn patch(source: &RgbImage, fp: Footprint) -> RgbImage {
    imageops::crop_imm(source, fp.left, fp.top, fp.width(), fp.height()).to_image()
}

fn pixelate(source: &RgbImage, output: &mut RgbImage, fp: Footprint, blocks: u32) {
    let mut tile = patch(source, fp);
    let (w, h) = tile.dimensions();
    let block_w = w.div_ceil(blocks).max(1);
    let block_h = h.div_ceil(blocks).max(1);

    for by in (0..h).step_by(block_h as usize) {
        let y_end = (by + block_h).min(h);
        for bx in (0..w).step_by(block_w as usize) {
            let x_end = (bx + block_w).min(w);

            let mut sum = [0u64; 3];
            for y in by..y_end {
                for x in bx..x_end {
                    let Rgb(px) = *tile.get_pixel(x, y);
                    for (acc, v) in sum.iter_mut().zip(px) {
                        *acc += u64::from(v);
                    }
                }
            }

            let count = u64::from(x_end - bx) * u64::from(y_end - by);
            let mean = Rgb(sum.map(|s| ((s + count / 2) / count) as u8));
            for y in by..y_end {
                for x in bx..x_end {
                    tile.put_pixel(x, y, mean);
                }
            }
        }
    }

    imageops::replace(output, &tile, i64::from(fp.left), i64::from(fp.top));
}

/// Gaussian blur over a copy of the footprint, so samples past its edge
/// repeat the edge pixel (clamp-to-edge) and never read the rest of the image.
fn blur(source: &RgbImage, output: &mut RgbImage, fp: Footprint, scale: f32) {
    let tile = patch(source, fp);
    let (w, h) = tile.dimensions();
    // Past the longer side every pixel already sees the whole tile.
    let sigma = (scale * w.min(h) as f32).clamp(1.0, w.max(h) as f32);
    let blurred = gaussian_blur_f32(&tile, sigma);
    imageops::replace(output, &blurred, i64::from(fp.left), i64::from(fp.top));
}
