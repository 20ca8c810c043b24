use crate::common::bitmap::{Bitmap, Module};
use crate::common::metadata::{
    format_info, format_info_coords_side, version_info_coords_bl, version_info_coords_tr, ECLevel,
    MaskPattern, Version, FORMAT_INFO_COORDS_MAIN,
};

// Function pattern template
//------------------------------------------------------------------------------

/// Draws every function module of a symbol: finder patterns with their
/// separators, alignment patterns, timing patterns, format and version
/// fields and the dark module. Data cells stay `Unknown`, which is how the
/// decoder tells them apart during the zigzag walk.
pub fn template(ver: Version, ecl: ECLevel, mask: MaskPattern) -> Bitmap {
    let size = ver.width() as i32;
    let mut t = Bitmap::new(size as usize, size as usize);

    draw_finder_at(&mut t, 0, 0);
    draw_finder_at(&mut t, size - 7, 0);
    draw_finder_at(&mut t, 0, size - 7);

    // Separators
    t.h_line(0, 7, 8, Module::Light);
    t.v_line(7, 0, 8, Module::Light);
    t.h_line(size - 8, 7, 8, Module::Light);
    t.v_line(size - 8, 0, 8, Module::Light);
    t.h_line(0, size - 8, 8, Module::Light);
    t.v_line(7, size - 8, 8, Module::Light);

    // Timing patterns
    let stride = (size - 16) as usize;
    let alternating = |x: i32, y: i32| {
        if (x + y) % 2 == 0 {
            Module::Dark
        } else {
            Module::Light
        }
    };
    t.h_line_with(8, 6, stride, alternating);
    t.v_line_with(6, 8, stride, alternating);

    draw_alignment_patterns(&mut t, ver);

    // Format info, both copies
    let bits = format_info(ecl, mask);
    for (i, &(x, y)) in FORMAT_INFO_COORDS_MAIN.iter().enumerate() {
        t.set(x, y, module_for(bits >> (14 - i) & 1));
    }
    for (i, &(x, y)) in format_info_coords_side(size).iter().enumerate() {
        t.set(x, y, module_for(bits >> (14 - i) & 1));
    }

    // Version info, both copies, for v7 and up
    if *ver >= 7 {
        let bits = ver.version_info();
        for coords in [version_info_coords_tr(size), version_info_coords_bl(size)] {
            for (k, &(x, y)) in coords.iter().enumerate() {
                t.set(x, y, module_for(bits >> k & 1));
            }
        }
    }

    // Dark module
    t.set(8, size - 8, Module::Dark);

    t
}

fn module_for(bit: u32) -> Module {
    if bit == 1 {
        Module::Dark
    } else {
        Module::Light
    }
}

fn draw_finder_at(t: &mut Bitmap, x: i32, y: i32) {
    t.rect(x, y, 7, 7, Module::Dark);
    t.rect(x + 1, y + 1, 5, 5, Module::Light);
    t.rect(x + 2, y + 2, 3, 3, Module::Dark);
}

fn draw_alignment_patterns(t: &mut Bitmap, ver: Version) {
    let positions = ver.alignment_positions();
    let last = ver.width() as i32 - 7;
    for &cy in &positions {
        for &cx in &positions {
            // The three finder corners host no alignment pattern
            if (cx == 6 && cy == 6) || (cx == 6 && cy == last) || (cx == last && cy == 6) {
                continue;
            }
            t.rect(cx - 2, cy - 2, 5, 5, Module::Dark);
            t.rect(cx - 1, cy - 1, 3, 3, Module::Light);
            t.set(cx, cy, Module::Dark);
        }
    }
}

// Zigzag walk over the encoding region
//------------------------------------------------------------------------------

/// Visits every cell in standard QR read order: two-column strips from the
/// bottom-right moving left, alternating direction, skipping the vertical
/// timing column. Callers filter for `Unknown` template cells to touch only
/// the data-bearing ones.
pub struct ZigZagIter {
    x: i32,
    y: i32,
    width: i32,
}

impl ZigZagIter {
    pub fn new(ver: Version) -> Self {
        let w = ver.width() as i32;
        Self { x: w - 1, y: w - 1, width: w }
    }
}

impl Iterator for ZigZagIter {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x < 0 {
            return None;
        }
        let res = (self.x, self.y);

        // Left of the vertical timing column the strip boundaries shift by one
        let adjusted = if self.x <= 6 { self.x + 1 } else { self.x };
        match ((self.width - adjusted) % 4, self.x) {
            (2, _) if self.y > 0 => {
                self.y -= 1;
                self.x += 1;
            }
            (0, _) if self.y < self.width - 1 => {
                self.y += 1;
                self.x += 1;
            }
            (0 | 2, 7) => self.x -= 2,
            _ => self.x -= 1,
        }
        Some(res)
    }
}

/// Calls `f(x, y, mask_bit)` for every data cell of the template in zigzag
/// order.
pub fn walk_data<F: FnMut(i32, i32, bool)>(
    tpl: &Bitmap,
    ver: Version,
    mask: MaskPattern,
    mut f: F,
) {
    let mask_fn = mask.mask_functions();
    for (x, y) in ZigZagIter::new(ver) {
        if tpl.get(x, y) == Module::Unknown {
            f(x, y, mask_fn(x, y));
        }
    }
}
