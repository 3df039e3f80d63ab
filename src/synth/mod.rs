//! Synthetic sample generation: turns one source image with a near-white
//! background into N augmented variants with randomized illumination,
//! rotation, and a freshly colored background plate.

pub mod ops;

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use ndarray::Array2;

use crate::params::ParamSource;
use crate::{Error, Result};

/// A foreground image and its weight mask, kept pixel-aligned: geometric
/// transforms are only available on the pair as a whole, so the two halves
/// can never receive different geometry.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    foreground: RgbImage,
    mask: Array2<f32>,
}

impl AlignedPair {
    /// Isolates the subject of `image` by grayscale thresholding: pixels
    /// with intensity below `threshold` are foreground. Runs once per
    /// source image, before any per-variant transform.
    pub fn extract(image: &RgbImage, threshold: u8) -> Self {
        Self {
            foreground: image.clone(),
            mask: ops::foreground_mask(image, threshold),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.foreground.dimensions()
    }

    pub fn foreground(&self) -> &RgbImage {
        &self.foreground
    }

    pub fn mask(&self) -> &Array2<f32> {
        &self.mask
    }

    /// Applies brightness/contrast to the foreground. The mask is a weight
    /// field, not pixel data, and is left untouched.
    pub fn adjust_illumination(&self, alpha: f32, beta: f32) -> Self {
        Self {
            foreground: ops::adjust_illumination(&self.foreground, alpha, beta),
            mask: self.mask.clone(),
        }
    }

    /// Rotates foreground and mask about the center with identical geometry
    /// so they remain aligned.
    pub fn rotate(&self, angle_degrees: f32) -> Self {
        Self {
            foreground: ops::rotate_image(&self.foreground, angle_degrees),
            mask: ops::rotate_mask(&self.mask, angle_degrees),
        }
    }

    /// Blends the foreground over `background` weighted by the mask.
    pub fn composite_onto(&self, background: &RgbImage) -> RgbImage {
        ops::composite(&self.foreground, &self.mask, background)
    }
}

/// Settings for [`generate_variants`].
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Number of variants to write.
    pub count: usize,
    /// Grayscale intensity below which a pixel counts as foreground.
    pub threshold: u8,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            count: 3,
            threshold: 250,
        }
    }
}

/// Generates `config.count` augmented variants of the image at `source` and
/// writes them to `output_dir` as `variation_0.png`, `variation_1.png`, …
///
/// The foreground/mask pair is extracted once; each iteration then samples
/// fresh parameters, adjusts illumination, rotates the pair, synthesizes a
/// solid random background, and composites. Returns the written paths in
/// order. Aborts on the first I/O or encode failure; a missing or
/// undecodable source fails before the output directory is created.
pub fn generate_variants(
    source: &Path,
    output_dir: &Path,
    config: &SynthConfig,
    params: &mut dyn ParamSource,
) -> Result<Vec<PathBuf>> {
    if !source.is_file() {
        return Err(Error::SourceNotFound(source.to_path_buf()));
    }
    let image = image::open(source)?.to_rgb8();
    let (width, height) = image.dimensions();
    log::info!(
        "loaded {:?} ({}x{}), generating {} variants",
        source,
        width,
        height,
        config.count
    );

    let pair = AlignedPair::extract(&image, config.threshold);

    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let p = params.next_params();
        log::debug!(
            "variant {}: alpha={:.3} beta={:+.1} angle={:+.1} background={:?}",
            i,
            p.alpha,
            p.beta,
            p.angle,
            p.background
        );

        let transformed = pair.adjust_illumination(p.alpha, p.beta).rotate(p.angle);
        let background = ops::solid_background(width, height, p.background);
        let variant = transformed.composite_onto(&background);

        let path = output_dir.join(format!("variation_{}.png", i));
        variant.save(&path)?;
        log::info!("saved variant to {:?}", path);
        written.push(path);
    }

    Ok(written)
}
