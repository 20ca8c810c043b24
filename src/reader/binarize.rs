use crate::common::bitmap::{Bitmap, Module};
use crate::common::error::{QRError, QRResult};

// Raw pixel buffer
//------------------------------------------------------------------------------

/// Borrowed pixel data. The channel count is inferred from the buffer size:
/// 1 (luma), 3 (RGB) or 4 (RGBA), row-major with the origin at the top
/// left.
#[derive(Debug, Clone, Copy)]
pub struct Image<'a> {
    w: usize,
    h: usize,
    bytes: &'a [u8],
    channels: usize,
}

impl<'a> Image<'a> {
    pub fn new(w: u32, h: u32, bytes: &'a [u8]) -> QRResult<Self> {
        let (w, h) = (w as usize, h as usize);
        if w == 0 || h == 0 || bytes.is_empty() {
            return Err(QRError::InvalidArgument);
        }
        let pixels = w * h;
        let channels = match bytes.len() {
            l if l == pixels => 1,
            l if l == 3 * pixels => 3,
            l if l == 4 * pixels => 4,
            _ => return Err(QRError::InvalidArgument),
        };
        Ok(Self { w, h, bytes, channels })
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// Luma of the `idx`-th pixel: `(R + 2G + B) / 4` clamped to a byte.
    /// Grayscale input is taken as precomputed luma.
    fn luma(&self, idx: usize) -> u8 {
        if self.channels == 1 {
            return self.bytes[idx];
        }
        let off = idx * self.channels;
        let (r, g, b) =
            (self.bytes[off] as u32, self.bytes[off + 1] as u32, self.bytes[off + 2] as u32);
        ((r + 2 * g + b) / 4).min(255) as u8
    }
}

// Adaptive binarizer
//------------------------------------------------------------------------------

const BLOCK: usize = 8;

// Below this contrast a block is considered uniform
const MIN_DYNAMIC_RANGE: u8 = 24;

/// Binarizes with a per-block adaptive threshold: 8x8 blocks each get a
/// threshold from their own statistics, and every pixel is classified
/// against the mean threshold of the surrounding 5x5 blocks. `offset`
/// shifts all thresholds, which recovers images with skewed brightness.
pub fn binarize(img: &Image, offset: i32) -> QRResult<Bitmap> {
    let (w, h) = (img.width(), img.height());
    if w < 5 * BLOCK || h < 5 * BLOCK {
        return Err(QRError::ImageTooSmall);
    }

    let luma: Vec<u8> = (0..w * h).map(|i| img.luma(i)).collect();
    let bw = w.div_ceil(BLOCK);
    let bh = h.div_ceil(BLOCK);

    // Per-block threshold from min/max/sum. Uniform blocks take half their
    // minimum, or the blend of the neighbors above and left when those saw
    // darker pixels.
    let mut thresholds = vec![0u32; bw * bh];
    for by in 0..bh {
        for bx in 0..bw {
            let (x0, y0) = (bx * BLOCK, by * BLOCK);
            let (x1, y1) = ((x0 + BLOCK).min(w), (y0 + BLOCK).min(h));

            let (mut mn, mut mx, mut sum) = (u8::MAX, u8::MIN, 0u32);
            for y in y0..y1 {
                for x in x0..x1 {
                    let v = luma[y * w + x];
                    mn = mn.min(v);
                    mx = mx.max(v);
                    sum += v as u32;
                }
            }

            let threshold = if mx - mn > MIN_DYNAMIC_RANGE {
                sum / (BLOCK * BLOCK) as u32
            } else {
                let mut threshold = mn as u32 / 2;
                if bx > 0 && by > 0 {
                    let above = thresholds[(by - 1) * bw + bx];
                    let left = thresholds[by * bw + bx - 1];
                    let above_left = thresholds[(by - 1) * bw + bx - 1];
                    let prev = (above + 2 * left + above_left) / 4;
                    if (mn as u32) < prev {
                        threshold = prev;
                    }
                }
                threshold
            };
            thresholds[by * bw + bx] = threshold;
        }
    }

    // Classify each pixel against the mean of the 5x5 threshold window
    // centered on its block, clamped inward at the borders.
    let mut out = Bitmap::new(w, h);
    for by in 0..bh {
        let cy = by.clamp(2, bh - 3);
        for bx in 0..bw {
            let cx = bx.clamp(2, bw - 3);

            let mut sum = 0u32;
            for ny in cy - 2..=cy + 2 {
                for nx in cx - 2..=cx + 2 {
                    sum += thresholds[ny * bw + nx];
                }
            }
            let mean = (sum / 25) as i32 + offset;

            for y in by * BLOCK..(by * BLOCK + BLOCK).min(h) {
                for x in bx * BLOCK..(bx * BLOCK + BLOCK).min(w) {
                    let module =
                        if (luma[y * w + x] as i32) <= mean { Module::Dark } else { Module::Light };
                    out.set(x as i32, y as i32, module);
                }
            }
        }
    }
    Ok(out)
}
