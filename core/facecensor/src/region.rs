use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic label attached to a detected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RegionKind {
    /// A whole face.
    Face,
    /// A single eye.
    Eye,
}

impl RegionKind {
    /// Wire name of the kind (`"face"` or `"eye"`).
    pub fn as_str(self) -> &'static str {
        match self {
            RegionKind::Face => "face",
            RegionKind::Eye => "eye",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled rectangle in image-pixel space, addressed by its centroid.
///
/// `center_x` / `center_y` are the CENTER of the box, not its top-left corner.
/// Serializes to the wire shape `{ "type", "x", "y", "w", "h" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// What the region contains.
    #[serde(rename = "type")]
    pub kind: RegionKind,
    /// Centroid X coordinate (pixels).
    #[serde(rename = "x")]
    pub center_x: i32,
    /// Centroid Y coordinate (pixels).
    #[serde(rename = "y")]
    pub center_y: i32,
    /// Width of the box (pixels).
    #[serde(rename = "w")]
    pub width: u32,
    /// Height of the box (pixels).
    #[serde(rename = "h")]
    pub height: u32,
}

impl Region {
    /// Build a region from an axis-aligned box given by its edges.
    ///
    /// `width = right - left`, `height = bottom - top`, and the centroid is
    /// `left + width / 2` (resp. `top + height / 2`), rounded half away from
    /// zero. Inverted edges collapse to a zero extent.
    pub fn from_edges(kind: RegionKind, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let width = (i64::from(right) - i64::from(left)).max(0);
        let height = (i64::from(bottom) - i64::from(top)).max(0);
        Self {
            kind,
            center_x: centroid(left, width),
            center_y: centroid(top, height),
            width: saturate_u32(width),
            height: saturate_u32(height),
        }
    }

    /// Left edge reconstructed from the centroid: `center_x - width / 2`.
    pub fn left(&self) -> i64 {
        i64::from(self.center_x) - i64::from(self.width / 2)
    }

    /// Top edge reconstructed from the centroid: `center_y - height / 2`.
    pub fn top(&self) -> i64 {
        i64::from(self.center_y) - i64::from(self.height / 2)
    }

    /// Exclusive right edge: `left + width`.
    pub fn right(&self) -> i64 {
        self.left() + i64::from(self.width)
    }

    /// Exclusive bottom edge: `top + height`.
    pub fn bottom(&self) -> i64 {
        self.top() + i64::from(self.height)
    }

    /// Returns `true` when the region covers no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamp the region to an image of `image_width` × `image_height` pixels.
    ///
    /// Returns `None` when nothing of the region remains inside the image.
    pub fn footprint(&self, image_width: u32, image_height: u32) -> Option<Footprint> {
        let left = self.left().clamp(0, i64::from(image_width));
        let right = self.right().clamp(0, i64::from(image_width));
        let top = self.top().clamp(0, i64::from(image_height));
        let bottom = self.bottom().clamp(0, i64::from(image_height));

        if right <= left || bottom <= top {
            return None;
        }

        // Every value was clamped into [0, u32::MAX].
        Some(Footprint {
            left: left as u32,
            top: top as u32,
            right: right as u32,
            bottom: bottom as u32,
        })
    }
}

/// Half-open pixel rectangle `[left, right) × [top, bottom)` inside an image.
///
/// Always non-empty and within the image it was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footprint {
    /// First column covered.
    pub left: u32,
    /// First row covered.
    pub top: u32,
    /// One past the last column covered.
    pub right: u32,
    /// One past the last row covered.
    pub bottom: u32,
}

impl Footprint {
    /// Number of columns covered.
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Number of rows covered.
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Whether pixel `(x, y)` lies inside the footprint.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.left..self.right).contains(&x) && (self.top..self.bottom).contains(&y)
    }
}

fn centroid(start: i32, extent: i64) -> i32 {
    let center = (f64::from(start) + extent as f64 / 2.0).round();
    center.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

fn saturate_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}
