//! Tooling for assembling Haar-cascade object-detection training data:
//! gathering sample images from an image search engine, renumbering datasets
//! into a sequential layout, and synthesizing augmented training samples
//! (illumination jitter, rotation, background replacement) from a single
//! clean source image.

pub mod crawl;
pub mod params;
pub mod sequence;
pub mod synth;

mod error;

pub use error::{Error, Result};
