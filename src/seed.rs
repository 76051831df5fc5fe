use std::path::Path;
use std::sync::Arc;

use crate::error::{EvolveError, Result};
use crate::render::premultiply;

/// the target raster, held premultiplied so it compares byte-for-byte with
/// what [`crate::render::CpuRenderer`] produces. converted once, then shared.
#[derive(Clone, Debug)]
pub struct SeedImage {
    width: u32,
    height: u32,
    bytes: Arc<[u8]>,
}

impl SeedImage {
    /// from straight (un-premultiplied) RGBA8
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        check_len(width, height, rgba.len())?;
        Ok(Self { width, height, bytes: Arc::from(premultiply(&rgba)) })
    }

    /// decode an image file at its native size
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        profiling::scope!("SeedImage::open");
        let rgba8 = image::open(path)?.to_rgba8();
        let (w, h) = rgba8.dimensions();
        Self::from_rgba(w, h, rgba8.into_raw())
    }

    /// decode an image file and resample it to the canvas size
    pub fn open_resized(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self> {
        profiling::scope!("SeedImage::open_resized");
        let rgba8 = image::open(path)?.to_rgba8();
        let rgba8 = if rgba8.dimensions() == (width, height) {
            rgba8
        } else {
            image::imageops::resize(&rgba8, width, height, image::imageops::FilterType::CatmullRom)
        };
        Self::from_rgba(width, height, rgba8.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn check_len(width: u32, height: u32, actual: usize) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    if actual != expected {
        return Err(EvolveError::Format { expected, actual, unit: "bytes" });
    }
    Ok(())
}
