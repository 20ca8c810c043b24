mod binarize;
mod extract;
mod finder;
mod symbol;
mod utils;

use image::{GrayImage, RgbImage};
use tracing::debug;

use crate::common::error::{QRError, QRResult};
use binarize::Image;

// Decoder entry points
//------------------------------------------------------------------------------

/// Brightness offsets tried in turn when recognition fails outright.
const BRIGHTNESS_OFFSETS: [i32; 3] = [0, 5, -5];

/// Decodes the QR symbol in a raw pixel buffer. The layout is inferred
/// from the buffer size: `w*h` grayscale, `3*w*h` RGB or `4*w*h` RGBA,
/// row-major from the top left.
pub fn decode(width: u32, height: u32, bytes: &[u8]) -> QRResult<String> {
    let img = Image::new(width, height, bytes)?;

    let mut last = QRError::FinderNotFound;
    for offset in BRIGHTNESS_OFFSETS {
        match recognize(&img, offset) {
            Ok(text) => return Ok(text),
            Err(e @ (QRError::InvalidArgument | QRError::ImageTooSmall)) => return Err(e),
            Err(e) => {
                debug!(offset, error = %e, "recognition attempt failed");
                last = e;
            }
        }
    }
    Err(last)
}

fn recognize(img: &Image, offset: i32) -> QRResult<String> {
    debug!(w = img.width(), h = img.height(), offset, "binarizing");
    let bmp = binarize::binarize(img, offset)?;

    debug!("scanning for finder patterns");
    let finders = finder::detect(&bmp)?;

    debug!("locating and sampling symbol");
    let grid = symbol::locate(&bmp, &finders)?;

    debug!(size = grid.width(), "extracting payload");
    extract::extract(&grid)
}

/// Convenience front end over [`decode`] for `image` crate buffers.
pub struct QRReader;

impl QRReader {
    /// Reads a QR symbol from a grayscale image.
    pub fn read(img: &GrayImage) -> QRResult<String> {
        decode(img.width(), img.height(), img.as_raw())
    }

    /// Reads a QR symbol from an RGB image.
    pub fn read_rgb(img: &RgbImage) -> QRResult<String> {
        decode(img.width(), img.height(), img.as_raw())
    }
}
