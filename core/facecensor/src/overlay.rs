//! Preview rendering of detections.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::region::{Footprint, Region};

/// Outline color used for previews.
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in pixels.
pub const OUTLINE_WIDTH: u32 = 3;

/// Draw each region's clamped footprint as a green outline on a copy of `image`.
///
/// The outline is drawn inward from the footprint edge so it never leaves the
/// region. Regions with an empty footprint are skipped.
pub fn draw_regions(image: &RgbImage, regions: &[Region]) -> RgbImage {
    let mut canvas = image.clone();
    let (width, height) = canvas.dimensions();

    for footprint in regions.iter().filter_map(|r| r.footprint(width, height)) {
        for inset in 0..OUTLINE_WIDTH {
            let Some(rect) = inset_rect(footprint, inset) else {
                break;
            };
            draw_hollow_rect_mut(&mut canvas, rect, OUTLINE_COLOR);
        }
    }

    canvas
}

fn inset_rect(fp: Footprint, inset: u32) -> Option<Rect> {
    let w = fp.width().checked_sub(2 * inset).filter(|&w| w > 0)?;
    let h = fp.height().checked_sub(2 * inset).filter(|&h| h > 0)?;
    Some(Rect::at((fp.left + inset) as i32, (fp.top + inset) as i32).of_size(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionKind;

    fn region(x: i32, y: i32, w: u32, h: u32) -> Region {
        Region {
            kind: RegionKind::Eye,
            center_x: x,
            center_y: y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn outline_follows_centroid_geometry() {
        let img = RgbImage::from_pixel(50, 50, Rgb([10, 10, 10]));
        let out = draw_regions(&img, &[region(25, 25, 20, 20)]);

        // Footprint [15, 35): outer ring and the two rings inside it.
        for offset in 0..3 {
            assert_eq!(out.get_pixel(15 + offset, 25), &OUTLINE_COLOR);
            assert_eq!(out.get_pixel(34 - offset, 25), &OUTLINE_COLOR);
        }
        assert_eq!(out.get_pixel(18, 25).0, [10, 10, 10]);
        assert_eq!(out.get_pixel(25, 25).0, [10, 10, 10]);
        assert_eq!(out.get_pixel(14, 25).0, [10, 10, 10]);
    }

    #[test]
    fn tiny_region_is_filled_without_overflow() {
        let img = RgbImage::new(10, 10);
        let out = draw_regions(&img, &[region(5, 5, 2, 2)]);
        assert_eq!(out.get_pixel(4, 4), &OUTLINE_COLOR);
        assert_eq!(out.get_pixel(5, 5), &OUTLINE_COLOR);
        assert_eq!(out.get_pixel(6, 6).0, [0, 0, 0]);
    }

    #[test]
    fn offscreen_region_leaves_image_alone() {
        let img = RgbImage::new(10, 10);
        let out = draw_regions(&img, &[region(-20, -20, 4, 4)]);
        assert_eq!(out, img);
    }
}
