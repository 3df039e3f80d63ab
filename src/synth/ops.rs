//! Per-pixel image algebra for the sample synthesizer: illumination
//! adjustment, rotation with border reflection, background synthesis,
//! foreground thresholding, and mask-weighted compositing.

use image::{Rgb, RgbImage};
use ndarray::Array2;

/// BT.601 luma weights, matching the grayscale conversion the rest of the
/// training pipeline uses.
fn luma(pixel: &Rgb<u8>) -> f32 {
    0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32
}

/// Applies `out = clamp(alpha * in + beta, 0, 255)` to every channel.
/// Values saturate at the ends of the 8-bit range, they never wrap.
pub fn adjust_illumination(image: &RgbImage, alpha: f32, beta: f32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = (alpha * *channel as f32 + beta).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// A solid plate of one color with the given dimensions.
pub fn solid_background(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// Classifies every pixel whose grayscale intensity falls below `threshold`
/// as foreground, producing a binary weight field over the image: 1.0 on the
/// subject, 0.0 on the near-white background.
pub fn foreground_mask(image: &RgbImage, threshold: u8) -> Array2<f32> {
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        if luma(image.get_pixel(x as u32, y as u32)) < threshold as f32 {
            1.0
        } else {
            0.0
        }
    })
}

/// Per-pixel convex blend of foreground and background weighted by the mask:
/// `out = mask * fg + (1 - mask) * bg`, rounded back to 8-bit.
///
/// All three inputs must share the same dimensions.
pub fn composite(foreground: &RgbImage, mask: &Array2<f32>, background: &RgbImage) -> RgbImage {
    assert_eq!(foreground.dimensions(), background.dimensions());
    assert_eq!(
        (mask.dim().1, mask.dim().0),
        (foreground.width() as usize, foreground.height() as usize)
    );

    let (width, height) = foreground.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let weight = mask[[y as usize, x as usize]];
        let fg = foreground.get_pixel(x, y);
        let bg = background.get_pixel(x, y);
        let mut blended = [0u8; 3];
        for channel in 0..3 {
            let value = weight * fg[channel] as f32 + (1.0 - weight) * bg[channel] as f32;
            blended[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(blended)
    })
}

/// Inverse mapping from output pixels to source coordinates for a rotation
/// about the image center.
struct Rotation {
    cos: f32,
    sin: f32,
    cx: f32,
    cy: f32,
}

impl Rotation {
    fn new(width: u32, height: u32, angle_degrees: f32) -> Self {
        let radians = angle_degrees.to_radians();
        Self {
            cos: radians.cos(),
            sin: radians.sin(),
            cx: width as f32 / 2.0,
            cy: height as f32 / 2.0,
        }
    }

    fn source(&self, x: u32, y: u32) -> (f32, f32) {
        let dx = x as f32 - self.cx;
        let dy = y as f32 - self.cy;
        (
            self.cx + dx * self.cos + dy * self.sin,
            self.cy - dx * self.sin + dy * self.cos,
        )
    }
}

/// Mirrors an out-of-range index back into `[0, len)`, duplicating the edge
/// sample the way OpenCV's `BORDER_REFLECT` does: `cba|abc|cba`.
fn reflect(index: i64, len: u32) -> u32 {
    let len = len as i64;
    let mut i = index;
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= len {
            i = 2 * len - 1 - i;
        } else {
            return i as u32;
        }
    }
}

/// Bilinear taps for a fractional source coordinate: the four neighbor
/// indices (already reflected in-bounds) and the interpolation fractions.
fn bilinear_taps(sx: f32, sy: f32, width: u32, height: u32) -> ([u32; 2], [u32; 2], f32, f32) {
    let x0 = sx.floor() as i64;
    let y0 = sy.floor() as i64;
    let fx = sx - sx.floor();
    let fy = sy - sy.floor();
    let xs = [reflect(x0, width), reflect(x0 + 1, width)];
    let ys = [reflect(y0, height), reflect(y0 + 1, height)];
    (xs, ys, fx, fy)
}

/// Rotates an RGB image about its center, filling out-of-canvas samples by
/// border reflection so rotated content never gains hard dark edges.
pub fn rotate_image(image: &RgbImage, angle_degrees: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let rotation = Rotation::new(width, height, angle_degrees);

    RgbImage::from_fn(width, height, |x, y| {
        let (sx, sy) = rotation.source(x, y);
        let (xs, ys, fx, fy) = bilinear_taps(sx, sy, width, height);

        let mut out = [0u8; 3];
        for channel in 0..3 {
            let v00 = image.get_pixel(xs[0], ys[0])[channel] as f32;
            let v10 = image.get_pixel(xs[1], ys[0])[channel] as f32;
            let v01 = image.get_pixel(xs[0], ys[1])[channel] as f32;
            let v11 = image.get_pixel(xs[1], ys[1])[channel] as f32;
            let value = v00 * (1.0 - fx) * (1.0 - fy)
                + v10 * fx * (1.0 - fy)
                + v01 * (1.0 - fx) * fy
                + v11 * fx * fy;
            out[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}

/// Rotates a mask with the same geometry as [`rotate_image`]. Interpolation
/// may introduce intermediate weights along foreground edges; values stay
/// within [0, 1] since the blend is convex.
pub fn rotate_mask(mask: &Array2<f32>, angle_degrees: f32) -> Array2<f32> {
    let (rows, cols) = mask.dim();
    let (width, height) = (cols as u32, rows as u32);
    let rotation = Rotation::new(width, height, angle_degrees);

    Array2::from_shape_fn((rows, cols), |(y, x)| {
        let (sx, sy) = rotation.source(x as u32, y as u32);
        let (xs, ys, fx, fy) = bilinear_taps(sx, sy, width, height);

        let v00 = mask[[ys[0] as usize, xs[0] as usize]];
        let v10 = mask[[ys[0] as usize, xs[1] as usize]];
        let v01 = mask[[ys[1] as usize, xs[0] as usize]];
        let v11 = mask[[ys[1] as usize, xs[1] as usize]];
        v00 * (1.0 - fx) * (1.0 - fy)
            + v10 * fx * (1.0 - fy)
            + v01 * (1.0 - fx) * fy
            + v11 * fx * fy
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128])
        })
    }

    #[test]
    fn illumination_clips_instead_of_wrapping() {
        let image = RgbImage::from_pixel(4, 4, Rgb([250, 250, 250]));
        let adjusted = adjust_illumination(&image, 1.3, 20.0);
        assert_eq!(adjusted.get_pixel(0, 0), &Rgb([255, 255, 255]));

        let dark = RgbImage::from_pixel(4, 4, Rgb([5, 5, 5]));
        let adjusted = adjust_illumination(&dark, 1.0, -20.0);
        assert_eq!(adjusted.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn illumination_identity() {
        let image = gradient_image(16, 16);
        assert_eq!(adjust_illumination(&image, 1.0, 0.0), image);
    }

    #[test]
    fn all_white_image_yields_empty_mask() {
        let image = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        let mask = foreground_mask(&image, 250);
        assert!(mask.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn dark_pixels_are_foreground() {
        let mut image = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        image.put_pixel(3, 4, Rgb([0, 0, 0]));
        let mask = foreground_mask(&image, 250);
        assert_eq!(mask[[4, 3]], 1.0);
        assert_eq!(mask.sum(), 1.0);
    }

    #[test]
    fn composite_is_a_convex_combination() {
        let fg = gradient_image(8, 8);
        let bg = RgbImage::from_pixel(8, 8, Rgb([10, 200, 30]));

        let all_fg = Array2::from_elem((8, 8), 1.0);
        assert_eq!(composite(&fg, &all_fg, &bg), fg);

        let all_bg = Array2::from_elem((8, 8), 0.0);
        assert_eq!(composite(&fg, &all_bg, &bg), bg);
    }

    #[test]
    fn composite_blends_midpoint() {
        let fg = RgbImage::from_pixel(2, 2, Rgb([200, 0, 100]));
        let bg = RgbImage::from_pixel(2, 2, Rgb([0, 100, 100]));
        let mask = Array2::from_elem((2, 2), 0.5);
        assert_eq!(composite(&fg, &mask, &bg).get_pixel(0, 0), &Rgb([100, 50, 100]));
    }

    #[test]
    fn zero_rotation_is_identity() {
        let image = gradient_image(20, 15);
        assert_eq!(rotate_image(&image, 0.0), image);

        let mask = foreground_mask(&image, 250);
        assert_eq!(rotate_mask(&mask, 0.0), mask);
    }

    #[test]
    fn rotation_preserves_dimensions() {
        let image = gradient_image(33, 21);
        let rotated = rotate_image(&image, 17.5);
        assert_eq!(rotated.dimensions(), image.dimensions());
    }

    #[test]
    fn rotated_mask_stays_within_unit_interval() {
        let mut image = RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]));
        for y in 15..25 {
            for x in 15..25 {
                image.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let mask = foreground_mask(&image, 250);
        let rotated = rotate_mask(&mask, 33.0);
        assert!(rotated.iter().all(|&w| (0.0..=1.0).contains(&w)));
    }

    #[test]
    fn reflect_mirrors_edges() {
        assert_eq!(reflect(0, 5), 0);
        assert_eq!(reflect(4, 5), 4);
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-2, 5), 1);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(6, 5), 3);
        // far out-of-range indices fold back as well
        assert_eq!(reflect(-11, 5), 0);
        assert_eq!(reflect(14, 5), 4);
    }
}
