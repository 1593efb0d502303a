// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Decoding and encoding of image files

use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Luma};
use std::path::Path;
use tracing::trace;

use crate::{Result, SiftError};

/// An image as read from disk, with the format it was stored in
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    /// Luma view used for metric computation.
    ///
    /// Rec. 601 weights in 14-bit fixed point, rounded to nearest, so a
    /// colour pixel maps to the same gray level OpenCV's `BGR2GRAY` gives.
    /// Gray input passes through unchanged since the weights sum to one.
    pub fn to_gray(&self) -> GrayImage {
        let rgb = self.image.to_rgb8();
        GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let [r, g, b] = rgb.get_pixel(x, y).0;
            Luma([rec601_luma(r, g, b)])
        })
    }
}

const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

fn rec601_luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B;
    // max is 255 << 14, so the shifted value fits in u8
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Codec boundary used by the sort pipeline
pub trait ImageIo: Send + Sync {
    /// Read and decode the file at `path`
    fn decode(&self, path: &Path) -> Result<DecodedImage>;

    /// Write `image` to `path`, replacing any existing file
    fn encode(&self, image: &DecodedImage, path: &Path) -> Result<()>;
}

/// `ImageIo` backed by the `image` crate.
///
/// The format is sniffed from the file contents, so a mislabelled extension
/// still decodes, and output is written back in the same format.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateIo;

impl ImageCrateIo {
    pub fn new() -> Self {
        Self
    }
}

impl ImageIo for ImageCrateIo {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let decode_err = |source: image::ImageError| SiftError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let reader = ImageReader::open(path)
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?;

        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(decode_err)?,
        };

        let image = reader.decode().map_err(decode_err)?;
        trace!("Decoded {:?} as {:?} ({}x{})", path, format, image.width(), image.height());

        Ok(DecodedImage { image, format })
    }

    fn encode(&self, image: &DecodedImage, path: &Path) -> Result<()> {
        image
            .image
            .save_with_format(path, image.format)
            .map_err(|source| SiftError::Encode {
                path: path.to_path_buf(),
                source,
            })
    }
}
