use super::finder::{self, Pattern};
use super::utils::geometry::{BresenhamLine, Point};
use super::utils::homography::PerspectiveTransform;
use crate::common::bitmap::{Bitmap, Module};
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::Version;

// Symbol location and sampling
//------------------------------------------------------------------------------

/// Widening alignment search windows, in module sizes.
const ALLOWANCE_FACTORS: [f64; 3] = [4.0, 8.0, 16.0];

/// Estimates the symbol geometry from the finder triple, locates the
/// bottom-right anchor, and samples the rectified `N x N` module grid.
pub fn locate(bmp: &Bitmap, finders: &[Pattern; 3]) -> QRResult<Bitmap> {
    let [tl, tr, bl] = finders.map(|p| p.center());

    let module_size = calculate_module_size(bmp, tl, tr, bl);
    if !(module_size >= 1.0) {
        return Err(QRError::Decode);
    }

    let size = estimate_size(tl, tr, bl, module_size);
    if size < 21 {
        return Err(QRError::Decode);
    }
    let ver = Version::from_width(size as usize).map_err(|_| QRError::Decode)?;

    // Parallelogram estimate of the bottom-right corner
    let corner = tr - tl + bl;

    let mut alignment = None;
    if *ver >= 2 {
        let modules_between = (size - 7) as f64;
        let correction = 1.0 - 3.0 / modules_between;
        let estimate = Point::new(
            tl.x + correction * (corner.x - tl.x),
            tl.y + correction * (corner.y - tl.y),
        );
        for allowance in ALLOWANCE_FACTORS {
            if let Some(p) = finder::find_alignment(bmp, estimate, module_size, allowance) {
                alignment = Some(p);
                break;
            }
        }
    }

    let dim = size as f64;
    let (br_module, br_pixel) = match alignment {
        Some(p) => (Point::new(dim - 6.5, dim - 6.5), p),
        None => (Point::new(dim - 3.5, dim - 3.5), corner),
    };
    let from = [
        Point::new(3.5, 3.5),
        Point::new(dim - 3.5, 3.5),
        br_module,
        Point::new(3.5, dim - 3.5),
    ];
    let to = [tl, tr, br_pixel, bl];
    let transform = PerspectiveTransform::quadrilateral_to_quadrilateral(from, to);

    Ok(sample_grid(bmp, &transform, size as usize))
}

/// Reads each output cell by mapping its center through the homography,
/// truncating to pixel coordinates and clamping to the image.
fn sample_grid(bmp: &Bitmap, transform: &PerspectiveTransform, size: usize) -> Bitmap {
    let w = bmp.width() as i32;
    let h = bmp.height() as i32;
    let mut out = Bitmap::new(size, size);
    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let p = transform.transform(x as f64 + 0.5, y as f64 + 0.5);
            let (px, py) = p.trunc();
            let module = match bmp.get(px.clamp(0, w - 1), py.clamp(0, h - 1)) {
                Module::Dark => Module::Dark,
                _ => Module::Light,
            };
            out.set(x, y, module);
        }
    }
    out
}

// Module size estimation
//------------------------------------------------------------------------------

/// Average module size along the two finder legs. A leg that runs off the
/// image yields NaN and defers to the other.
fn calculate_module_size(bmp: &Bitmap, tl: Point, tr: Point, bl: Point) -> f64 {
    let horizontal = module_size_one_way(bmp, tl, tr);
    let vertical = module_size_one_way(bmp, tl, bl);
    if horizontal.is_nan() {
        return vertical;
    }
    if vertical.is_nan() {
        return horizontal;
    }
    (horizontal + vertical) / 2.0
}

fn module_size_one_way(bmp: &Bitmap, from: Point, to: Point) -> f64 {
    let there = black_white_black_run_both_ways(bmp, from, to);
    let back = black_white_black_run_both_ways(bmp, to, from);
    if there.is_nan() {
        return back / 7.0;
    }
    if back.is_nan() {
        return there / 7.0;
    }
    // Each measure spans a full 7-module finder bar
    (there + back) / 14.0
}

/// Measures the black-white-black crossing through `from` along the line
/// to `to`, continued past `from` in the opposite direction to the image
/// edge. The result is the length of a full finder bar on that line.
fn black_white_black_run_both_ways(bmp: &Bitmap, from: Point, to: Point) -> f64 {
    let result = black_white_black_run(bmp, from, to);

    // Mirror the target through `from`, clipped to the image
    let w = bmp.width() as f64;
    let h = bmp.height() as f64;
    let mut scale = 1.0;
    let mut other_x = from.x - (to.x - from.x);
    if other_x < 0.0 {
        scale = from.x / (from.x - other_x);
        other_x = 0.0;
    } else if other_x >= w {
        scale = (w - 1.0 - from.x) / (other_x - from.x);
        other_x = w - 1.0;
    }
    let mut other_y = from.y - (to.y - from.y) * scale;
    scale = 1.0;
    if other_y < 0.0 {
        scale = from.y / (from.y - other_y);
        other_y = 0.0;
    } else if other_y >= h {
        scale = (h - 1.0 - from.y) / (other_y - from.y);
        other_y = h - 1.0;
    }
    let other_x = from.x + (other_x - from.x) * scale;

    // The center pixel is counted twice
    result + black_white_black_run(bmp, from, Point::new(other_x, other_y)) - 1.0
}

/// Walks from `from` toward `to` counting dark-light-dark transitions,
/// returning the distance covered when the second dark run ends, or NaN
/// when the pattern is incomplete.
fn black_white_black_run(bmp: &Bitmap, from: Point, to: Point) -> f64 {
    let start = from.trunc();
    let end = to.trunc();
    let mut state = 0u8;
    let mut last = start;

    for (x, y) in BresenhamLine::new(start, end) {
        if !bmp.in_bounds(x, y) {
            break;
        }
        last = (x, y);
        let dark = bmp.get(x, y) == Module::Dark;
        // In the white stretch a dark pixel advances, in a dark stretch a
        // light pixel does
        if (state == 1) == dark {
            if state == 2 {
                return Point::new(x as f64, y as f64).dist(from);
            }
            state += 1;
        }
    }
    if state == 2 {
        return Point::new(last.0 as f64, last.1 as f64).dist(from);
    }
    f64::NAN
}

// Size estimation
//------------------------------------------------------------------------------

/// Symbol side length in modules from the finder spacing, snapped to the
/// nearest valid size (1 mod 4).
fn estimate_size(tl: Point, tr: Point, bl: Point, module_size: f64) -> i32 {
    let top = (tl.dist(tr) / module_size).round() as i32;
    let left = (tl.dist(bl) / module_size).round() as i32;
    let mut size = (top + left) / 2 + 7;
    match size % 4 {
        0 => size += 1,
        2 => size -= 1,
        3 => size -= 2,
        _ => {}
    }
    size
}
