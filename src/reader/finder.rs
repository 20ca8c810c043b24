use itertools::Itertools;

use super::utils::geometry::Point;
use crate::common::bitmap::{Bitmap, Module};
use crate::common::error::{QRError, QRResult};

// Pattern
//------------------------------------------------------------------------------

/// A candidate finder or alignment pattern center. `count` is the number of
/// scan confirmations merged into this candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pattern {
    pub x: f64,
    pub y: f64,
    pub module_size: f64,
    pub count: usize,
}

impl Pattern {
    pub fn new(x: f64, y: f64, module_size: f64) -> Self {
        Self { x, y, module_size, count: 1 }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Equivalence for merging: positions within one module and module
    /// sizes within `max(1, module_size)`.
    pub fn matches(&self, x: f64, y: f64, module_size: f64) -> bool {
        if (self.y - y).abs() > module_size || (self.x - x).abs() > module_size {
            return false;
        }
        let diff = (self.module_size - module_size).abs();
        diff <= 1.0 || diff <= self.module_size
    }

    /// Count-weighted average with a fresh single-scan observation.
    pub fn merged(&self, x: f64, y: f64, module_size: f64) -> Pattern {
        let n = self.count as f64;
        Pattern {
            x: (n * self.x + x) / (n + 1.0),
            y: (n * self.y + y) / (n + 1.0),
            module_size: (n * self.module_size + module_size) / (n + 1.0),
            count: self.count + 1,
        }
    }
}

// Finder pattern search
//------------------------------------------------------------------------------

/// Variance factors for the 1:1:3:1:1 ratio check, tightest first. The
/// whole scan retries with a looser factor when no triple survives.
const VARIANCE_FACTORS: [f64; 3] = [2.0, 2.5, 3.0];

const DIAGONAL_VARIANCE_FACTOR: f64 = 1.333;

/// Ratio of confirmed finders' module sizes above which a triple is
/// rejected as inconsistent.
const MAX_MODULE_SIZE_SPREAD: f64 = 1.4;

/// Locates the three finder patterns and returns them as
/// `[top-left, top-right, bottom-left]`.
pub fn detect(bmp: &Bitmap) -> QRResult<[Pattern; 3]> {
    for variance_factor in VARIANCE_FACTORS {
        let candidates = scan(bmp, variance_factor);
        if let Some(triple) = select_triple(&candidates) {
            return Ok(triple);
        }
    }
    Err(QRError::FinderNotFound)
}

/// Accumulates alternating dark/light runs along each row, cross-checking
/// every 1:1:3:1:1 hit vertically, horizontally and diagonally. Rows are
/// skipped more aggressively once candidates start confirming.
fn scan(bmp: &Bitmap, variance_factor: f64) -> Vec<Pattern> {
    let w = bmp.width() as i32;
    let h = bmp.height() as i32;
    let mut candidates: Vec<Pattern> = Vec::new();

    let mut i_skip = (3 * h / 388).max(3);
    let mut has_skipped = false;
    let mut done = false;

    let mut y = i_skip - 1;
    while y < h && !done {
        let mut runs = [0usize; 5];
        let mut state = 0usize;

        let mut x = 0;
        while x < w {
            if bmp.get(x, y) == Module::Dark {
                if state & 1 == 1 {
                    state += 1;
                }
                runs[state] += 1;
            } else if state & 1 == 1 {
                runs[state] += 1;
            } else if state == 4 {
                if check_ratio(&runs, variance_factor).is_some()
                    && handle_possible_center(bmp, &mut candidates, &runs, x, y, variance_factor)
                {
                    i_skip = 2;
                    if has_skipped {
                        done = have_multiply_confirmed_centers(&candidates);
                        if done {
                            break;
                        }
                    } else {
                        let row_skip = find_row_skip(&candidates, &mut has_skipped);
                        if row_skip > runs[2] as i32 {
                            // Jump into the bottom finder band and restart
                            y += row_skip - runs[2] as i32 - i_skip;
                            break;
                        }
                    }
                    runs = [0; 5];
                    state = 0;
                } else {
                    shift_runs(&mut runs);
                    state = 3;
                }
            } else {
                state += 1;
                runs[state] += 1;
            }
            x += 1;
        }

        // A finder flush against the right edge completes with the row
        if !done
            && state == 4
            && check_ratio(&runs, variance_factor).is_some()
            && handle_possible_center(bmp, &mut candidates, &runs, w, y, variance_factor)
        {
            i_skip = 2;
            if has_skipped {
                done = have_multiply_confirmed_centers(&candidates);
            }
        }

        y += i_skip;
    }
    candidates
}

/// Validates the 1:1:3:1:1 ratio, returning the module size estimate. Each
/// run must be within `module / variance_factor` of its ideal length.
fn check_ratio(runs: &[usize; 5], variance_factor: f64) -> Option<f64> {
    const IDEAL: [f64; 5] = [1.0, 1.0, 3.0, 1.0, 1.0];

    let total: usize = runs.iter().sum();
    if total < 7 || runs.iter().any(|&r| r == 0) {
        return None;
    }
    let module = total as f64 / 7.0;
    let tolerance = module / variance_factor;
    runs.iter()
        .zip(IDEAL)
        .all(|(&r, ideal)| (r as f64 - ideal * module).abs() <= tolerance)
        .then_some(module)
}

fn center_from_end(runs: &[usize; 5], end: i32) -> f64 {
    end as f64 - (runs[4] + runs[3]) as f64 - runs[2] as f64 / 2.0
}

fn shift_runs(runs: &mut [usize; 5]) {
    runs[0] = runs[2];
    runs[1] = runs[3];
    runs[2] = runs[4];
    runs[3] = 1;
    runs[4] = 0;
}

/// Confirms a horizontal hit by re-scanning vertically, horizontally and
/// diagonally through the estimated center, then merges it into the
/// candidate list.
fn handle_possible_center(
    bmp: &Bitmap,
    candidates: &mut Vec<Pattern>,
    runs: &[usize; 5],
    x_end: i32,
    y: i32,
    variance_factor: f64,
) -> bool {
    let total: usize = runs.iter().sum();
    let mut center_x = center_from_end(runs, x_end);

    let center_y =
        match cross_check_vertical(bmp, center_x as i32, y, runs[2], total, variance_factor) {
            Some(cy) => cy,
            None => return false,
        };
    center_x = match cross_check_horizontal(
        bmp,
        center_x as i32,
        center_y as i32,
        runs[2],
        total,
        variance_factor,
    ) {
        Some(cx) => cx,
        None => return false,
    };
    if !cross_check_diagonal(bmp, center_x as i32, center_y as i32) {
        return false;
    }

    let module_size = total as f64 / 7.0;
    match candidates.iter_mut().find(|p| p.matches(center_x, center_y, module_size)) {
        Some(p) => *p = p.merged(center_x, center_y, module_size),
        None => candidates.push(Pattern::new(center_x, center_y, module_size)),
    }
    true
}

/// Walks the five runs outward from `(center_x, start_y)` along the
/// column. Non-center runs longer than `max_count` abort the check.
fn cross_check_vertical(
    bmp: &Bitmap,
    center_x: i32,
    start_y: i32,
    max_count: usize,
    original_total: usize,
    variance_factor: f64,
) -> Option<f64> {
    let h = bmp.height() as i32;
    let mut runs = [0usize; 5];

    let mut y = start_y;
    while y >= 0 && bmp.get(center_x, y) == Module::Dark {
        runs[2] += 1;
        y -= 1;
    }
    if y < 0 {
        return None;
    }
    while y >= 0 && bmp.get(center_x, y) == Module::Light && runs[1] <= max_count {
        runs[1] += 1;
        y -= 1;
    }
    if y < 0 || runs[1] > max_count {
        return None;
    }
    while y >= 0 && bmp.get(center_x, y) == Module::Dark && runs[0] <= max_count {
        runs[0] += 1;
        y -= 1;
    }
    if runs[0] > max_count {
        return None;
    }

    let mut y = start_y + 1;
    while y < h && bmp.get(center_x, y) == Module::Dark {
        runs[2] += 1;
        y += 1;
    }
    if y == h {
        return None;
    }
    while y < h && bmp.get(center_x, y) == Module::Light && runs[3] <= max_count {
        runs[3] += 1;
        y += 1;
    }
    if y == h || runs[3] > max_count {
        return None;
    }
    while y < h && bmp.get(center_x, y) == Module::Dark && runs[4] <= max_count {
        runs[4] += 1;
        y += 1;
    }
    if runs[4] > max_count {
        return None;
    }

    // The vertical extent must roughly agree with the horizontal one
    let total: usize = runs.iter().sum();
    if 5 * total.abs_diff(original_total) >= 2 * original_total {
        return None;
    }

    check_ratio(&runs, variance_factor)?;
    Some(y as f64 - (runs[4] + runs[3]) as f64 - runs[2] as f64 / 2.0)
}

/// The horizontal mirror of the vertical cross-check, re-centering x.
fn cross_check_horizontal(
    bmp: &Bitmap,
    center_x: i32,
    center_y: i32,
    max_count: usize,
    original_total: usize,
    variance_factor: f64,
) -> Option<f64> {
    let w = bmp.width() as i32;
    let mut runs = [0usize; 5];

    let mut x = center_x;
    while x >= 0 && bmp.get(x, center_y) == Module::Dark {
        runs[2] += 1;
        x -= 1;
    }
    if x < 0 {
        return None;
    }
    while x >= 0 && bmp.get(x, center_y) == Module::Light && runs[1] <= max_count {
        runs[1] += 1;
        x -= 1;
    }
    if x < 0 || runs[1] > max_count {
        return None;
    }
    while x >= 0 && bmp.get(x, center_y) == Module::Dark && runs[0] <= max_count {
        runs[0] += 1;
        x -= 1;
    }
    if runs[0] > max_count {
        return None;
    }

    let mut x = center_x + 1;
    while x < w && bmp.get(x, center_y) == Module::Dark {
        runs[2] += 1;
        x += 1;
    }
    if x == w {
        return None;
    }
    while x < w && bmp.get(x, center_y) == Module::Light && runs[3] <= max_count {
        runs[3] += 1;
        x += 1;
    }
    if x == w || runs[3] > max_count {
        return None;
    }
    while x < w && bmp.get(x, center_y) == Module::Dark && runs[4] <= max_count {
        runs[4] += 1;
        x += 1;
    }
    if runs[4] > max_count {
        return None;
    }

    let total: usize = runs.iter().sum();
    if 5 * total.abs_diff(original_total) >= 2 * original_total {
        return None;
    }

    check_ratio(&runs, variance_factor)?;
    Some(x as f64 - (runs[4] + runs[3]) as f64 - runs[2] as f64 / 2.0)
}

/// Checks the 1:1:3:1:1 ratio along the main diagonal with the relaxed
/// variance factor. Runs are bounded only by the image.
fn cross_check_diagonal(bmp: &Bitmap, center_x: i32, center_y: i32) -> bool {
    let w = bmp.width() as i32;
    let h = bmp.height() as i32;
    let mut runs = [0usize; 5];

    let (mut x, mut y) = (center_x, center_y);
    while x >= 0 && y >= 0 && bmp.get(x, y) == Module::Dark {
        runs[2] += 1;
        x -= 1;
        y -= 1;
    }
    while x >= 0 && y >= 0 && bmp.get(x, y) == Module::Light {
        runs[1] += 1;
        x -= 1;
        y -= 1;
    }
    while x >= 0 && y >= 0 && bmp.get(x, y) == Module::Dark {
        runs[0] += 1;
        x -= 1;
        y -= 1;
    }

    let (mut x, mut y) = (center_x + 1, center_y + 1);
    while x < w && y < h && bmp.get(x, y) == Module::Dark {
        runs[2] += 1;
        x += 1;
        y += 1;
    }
    while x < w && y < h && bmp.get(x, y) == Module::Light {
        runs[3] += 1;
        x += 1;
        y += 1;
    }
    while x < w && y < h && bmp.get(x, y) == Module::Dark {
        runs[4] += 1;
        x += 1;
        y += 1;
    }

    check_ratio(&runs, DIAGONAL_VARIANCE_FACTOR).is_some()
}

/// Once two candidates are confirmed, the band between the top finders and
/// the bottom one carries no new information and may be skipped.
fn find_row_skip(candidates: &[Pattern], has_skipped: &mut bool) -> i32 {
    if candidates.len() <= 1 {
        return 0;
    }
    let mut first: Option<&Pattern> = None;
    for p in candidates.iter().filter(|p| p.count >= 2) {
        match first {
            None => first = Some(p),
            Some(f) => {
                *has_skipped = true;
                return (((f.x - p.x).abs() - (f.y - p.y).abs()) / 2.0) as i32;
            }
        }
    }
    0
}

/// The scan may stop early when three confirmed candidates agree on module
/// size and form a plausible right triangle.
fn have_multiply_confirmed_centers(candidates: &[Pattern]) -> bool {
    let confirmed: Vec<&Pattern> = candidates.iter().filter(|p| p.count >= 2).collect();
    if confirmed.len() < 3 {
        return false;
    }

    let total_size: f64 = confirmed.iter().map(|p| p.module_size).sum();
    let average = total_size / confirmed.len() as f64;
    let deviation: f64 = confirmed.iter().map(|p| (p.module_size - average).abs()).sum();
    if deviation > 0.05 * total_size {
        return false;
    }

    // Triples formed inside data modules tend to be degenerate slivers
    confirmed.iter().tuple_combinations().any(|(a, b, c)| {
        let mut d = [
            a.center().dist_sq(b.center()),
            a.center().dist_sq(c.center()),
            b.center().dist_sq(c.center()),
        ];
        d.sort_by(f64::total_cmp);
        d[0] > 0.0 && (d[0] / d[1]).sqrt() > 0.8
    })
}

// Triple selection
//------------------------------------------------------------------------------

/// Picks the triple closest to a right isoceles triangle by squared side
/// lengths and orients it as `[top-left, top-right, bottom-left]`.
fn select_triple(candidates: &[Pattern]) -> Option<[Pattern; 3]> {
    let confirmed: Vec<Pattern> = candidates.iter().filter(|p| p.count >= 2).cloned().collect();
    let pool = if confirmed.len() >= 3 { confirmed } else { candidates.to_vec() };
    if pool.len() < 3 {
        return None;
    }

    let mut best: Option<([Pattern; 3], f64)> = None;
    for (p1, p2, p3) in pool.iter().tuple_combinations() {
        let sizes = [p1.module_size, p2.module_size, p3.module_size];
        let smallest = sizes.iter().copied().fold(f64::INFINITY, f64::min);
        let largest = sizes.iter().copied().fold(0.0, f64::max);
        if largest > smallest * MAX_MODULE_SIZE_SPREAD {
            continue;
        }

        let mut d = [
            p1.center().dist_sq(p2.center()),
            p1.center().dist_sq(p3.center()),
            p2.center().dist_sq(p3.center()),
        ];
        d.sort_by(f64::total_cmp);
        let score = (d[2] - 2.0 * d[1]).abs() + (d[2] - 2.0 * d[0]).abs();
        if best.as_ref().map_or(true, |(_, s)| score < *s) {
            best = Some(([*p1, *p2, *p3], score));
        }
    }
    best.map(|(triple, _)| orient(triple))
}

/// The vertex opposite the longest side is the top-left finder; the other
/// two are ordered so the cross product of the outgoing edges is
/// non-negative.
fn orient([a, b, c]: [Pattern; 3]) -> [Pattern; 3] {
    let d_ab = a.center().dist_sq(b.center());
    let d_ac = a.center().dist_sq(c.center());
    let d_bc = b.center().dist_sq(c.center());

    let (tl, mut tr, mut bl) = if d_bc >= d_ab && d_bc >= d_ac {
        (a, b, c)
    } else if d_ac >= d_ab {
        (b, a, c)
    } else {
        (c, a, b)
    };

    let cross = (tr.x - tl.x) * (bl.y - tl.y) - (tr.y - tl.y) * (bl.x - tl.x);
    if cross < 0.0 {
        std::mem::swap(&mut tr, &mut bl);
    }
    [tl, tr, bl]
}

// Alignment pattern search
//------------------------------------------------------------------------------

/// Searches a window of half-width `allowance * module_size` around the
/// estimated bottom-right alignment position for the dark/light/dark
/// 1:1:1 pattern, iterating rows outward from the window center. The first
/// candidate confirmed by a second row wins.
pub fn find_alignment(
    bmp: &Bitmap,
    estimate: Point,
    module_size: f64,
    allowance: f64,
) -> Option<Point> {
    let w = bmp.width() as i32;
    let h = bmp.height() as i32;
    let half = (allowance * module_size) as i32;

    let x0 = (estimate.x as i32 - half).max(0);
    let x1 = (estimate.x as i32 + half).min(w - 1);
    let y0 = (estimate.y as i32 - half).max(0);
    let y1 = (estimate.y as i32 + half).min(h - 1);
    if ((x1 - x0) as f64) < module_size * 3.0 || ((y1 - y0) as f64) < module_size * 3.0 {
        return None;
    }

    let mut candidates: Vec<Pattern> = Vec::new();
    let middle = (y0 + y1) / 2;
    for gen in 0..=(y1 - y0) {
        let y = if gen & 1 == 0 { middle + gen / 2 } else { middle - (gen + 1) / 2 };
        if y < y0 || y > y1 {
            continue;
        }

        let mut runs = [0usize; 3];
        let mut state = 0usize;
        for x in x0..=x1 {
            if bmp.get(x, y) == Module::Dark {
                if state == 1 {
                    state = 2;
                }
                runs[state] += 1;
            } else if state == 2 {
                // Second dark run complete
                if check_alignment_ratio(&runs, module_size) {
                    if let Some(found) =
                        handle_alignment_center(bmp, &mut candidates, &runs, x, y, module_size)
                    {
                        return Some(found);
                    }
                }
                runs = [runs[2], 1, 0];
                state = 1;
            } else if state == 1 || runs[0] > 0 {
                state = 1;
                runs[1] += 1;
            }
        }
        if state == 2 && check_alignment_ratio(&runs, module_size) {
            if let Some(found) =
                handle_alignment_center(bmp, &mut candidates, &runs, x1 + 1, y, module_size)
            {
                return Some(found);
            }
        }
    }

    // No second confirmation; fall back to the best single hit
    candidates.first().map(Pattern::center)
}

fn check_alignment_ratio(runs: &[usize; 3], module_size: f64) -> bool {
    let tolerance = module_size / 2.0;
    runs.iter().all(|&r| (r as f64 - module_size).abs() < tolerance)
}

fn handle_alignment_center(
    bmp: &Bitmap,
    candidates: &mut Vec<Pattern>,
    runs: &[usize; 3],
    x_end: i32,
    y: i32,
    module_size: f64,
) -> Option<Point> {
    let total: usize = runs.iter().sum();
    let center_x = x_end as f64 - runs[2] as f64 / 2.0;
    let center_y =
        cross_check_alignment(bmp, center_x as i32, y, 2 * runs[1], total, module_size)?;

    let estimate = total as f64 / 3.0;
    if let Some(p) = candidates.iter_mut().find(|p| p.matches(center_x, center_y, estimate)) {
        let merged = p.merged(center_x, center_y, estimate);
        return Some(merged.center());
    }
    candidates.push(Pattern::new(center_x, center_y, estimate));
    None
}

/// Vertical confirmation of an alignment hit: the dark run flanked by
/// light runs, all about one module, centered on the column.
fn cross_check_alignment(
    bmp: &Bitmap,
    center_x: i32,
    start_y: i32,
    max_count: usize,
    original_total: usize,
    module_size: f64,
) -> Option<f64> {
    let h = bmp.height() as i32;

    let mut center = 0usize;
    let mut y = start_y;
    while y >= 0 && bmp.get(center_x, y) == Module::Dark && center <= max_count {
        center += 1;
        y -= 1;
    }
    if y < 0 || center > max_count {
        return None;
    }
    let mut above = 0usize;
    while y >= 0 && bmp.get(center_x, y) == Module::Light && above <= max_count {
        above += 1;
        y -= 1;
    }
    if above > max_count {
        return None;
    }

    let mut y = start_y + 1;
    while y < h && bmp.get(center_x, y) == Module::Dark && center <= max_count {
        center += 1;
        y += 1;
    }
    if y == h || center > max_count {
        return None;
    }
    let mut below = 0usize;
    while y < h && bmp.get(center_x, y) == Module::Light && below <= max_count {
        below += 1;
        y += 1;
    }
    if below > max_count {
        return None;
    }

    let total = above + center + below;
    if 5 * total.abs_diff(original_total) >= 2 * original_total {
        return None;
    }
    check_alignment_ratio(&[above, center, below], module_size)
        .then_some(y as f64 - below as f64 - center as f64 / 2.0)
}

#[cfg(test)]
mod finder_tests {
    use test_case::test_case;

    use super::*;

    /// Paints a full finder pattern (dark 7x7 ring structure) with its
    /// top-left module corner at `(x, y)`, `scale` pixels per module.
    fn paint_finder(bmp: &mut Bitmap, x: i32, y: i32, scale: usize) {
        let s = scale as i32;
        bmp.rect(x, y, 7 * scale, 7 * scale, Module::Dark);
        bmp.rect(x + s, y + s, 5 * scale, 5 * scale, Module::Light);
        bmp.rect(x + 2 * s, y + 2 * s, 3 * scale, 3 * scale, Module::Dark);
    }

    fn blank(w: usize, h: usize) -> Bitmap {
        let mut bmp = Bitmap::new(w, h);
        bmp.rect(0, 0, w, h, Module::Light);
        bmp
    }

    #[test]
    fn test_check_ratio() {
        assert_eq!(check_ratio(&[10, 10, 30, 10, 10], 2.0), Some(10.0));
        assert_eq!(check_ratio(&[1, 1, 3, 1, 1], 2.0), Some(1.0));
        assert!(check_ratio(&[10, 10, 10, 10, 10], 2.0).is_none());
        assert!(check_ratio(&[0, 10, 30, 10, 10], 2.0).is_none());
        // A skewed set passes only with a looser variance
        assert!(check_ratio(&[14, 10, 30, 10, 10], 2.0).is_none());
        assert!(check_ratio(&[14, 10, 30, 10, 10], 1.333).is_some());
    }

    #[test]
    fn test_pattern_equivalence_and_merge() {
        let p = Pattern::new(100.0, 100.0, 10.0);
        assert!(p.matches(100.0, 100.0, 10.0));
        assert!(p.matches(105.0, 95.0, 10.5));
        assert!(!p.matches(115.0, 100.0, 10.0));
        assert!(!p.matches(100.0, 100.0, 25.0));

        let m = p.merged(102.0, 98.0, 12.0);
        assert_eq!(m.count, 2);
        assert_eq!(m.x, 101.0);
        assert_eq!(m.y, 99.0);
        assert_eq!(m.module_size, 11.0);

        // Weighted toward the accumulated estimate
        let m = m.merged(104.0, 102.0, 8.0);
        assert_eq!(m.count, 3);
        assert_eq!(m.x, 102.0);
        assert_eq!(m.module_size, 10.0);
    }

    #[test_case(10; "ten px per module")]
    #[test_case(4; "four px per module")]
    fn test_detect_three_finders(scale: usize) {
        // v1-sized layout with a quiet zone of 4 modules
        let size = 29 * scale;
        let mut bmp = blank(size, size);
        let q = 4 * scale as i32;
        let far = (21 - 7) * scale as i32;
        paint_finder(&mut bmp, q, q, scale);
        paint_finder(&mut bmp, q + far, q, scale);
        paint_finder(&mut bmp, q, q + far, scale);

        let [tl, tr, bl] = detect(&bmp).unwrap();
        let c = (4.0 + 3.5) * scale as f64;
        let f = c + far as f64;
        assert!((tl.x - c).abs() <= 1.0 && (tl.y - c).abs() <= 1.0, "tl {tl:?}");
        assert!((tr.x - f).abs() <= 1.0 && (tr.y - c).abs() <= 1.0, "tr {tr:?}");
        assert!((bl.x - c).abs() <= 1.0 && (bl.y - f).abs() <= 1.0, "bl {bl:?}");
        assert!((tl.module_size - scale as f64).abs() < 0.5);
    }

    #[test]
    fn test_detect_blank_image() {
        let bmp = blank(100, 100);
        assert_eq!(detect(&bmp), Err(QRError::FinderNotFound));
    }

    #[test]
    fn test_detect_two_finders_is_not_enough() {
        let mut bmp = blank(290, 290);
        paint_finder(&mut bmp, 40, 40, 10);
        paint_finder(&mut bmp, 180, 40, 10);
        assert_eq!(detect(&bmp), Err(QRError::FinderNotFound));
    }

    #[test]
    fn test_orient_assigns_roles() {
        // Rotated 90 degrees clockwise: top-left lands bottom-left
        let a = Pattern::new(50.0, 50.0, 10.0); // image top-left = symbol tr
        let b = Pattern::new(50.0, 200.0, 10.0); // image bottom-left = symbol tl
        let c = Pattern::new(200.0, 200.0, 10.0); // image bottom-right = symbol bl
        let [tl, tr, bl] = orient([a, b, c]);
        assert_eq!((tl.x, tl.y), (50.0, 200.0));
        assert_eq!((tr.x, tr.y), (50.0, 50.0));
        assert_eq!((bl.x, bl.y), (200.0, 200.0));
    }

    #[test]
    fn test_find_alignment() {
        // 5x5 alignment pattern centered at (100, 100), 10 px per module
        let mut bmp = blank(200, 200);
        bmp.rect(75, 75, 50, 50, Module::Dark);
        bmp.rect(85, 85, 30, 30, Module::Light);
        bmp.rect(95, 95, 10, 10, Module::Dark);

        let found = find_alignment(&bmp, Point::new(103.0, 98.0), 10.0, 4.0).unwrap();
        assert!((found.x - 100.0).abs() <= 1.0, "{found:?}");
        assert!((found.y - 100.0).abs() <= 1.0, "{found:?}");
    }

    #[test]
    fn test_find_alignment_widening_allowance() {
        let mut bmp = blank(300, 300);
        bmp.rect(155, 155, 50, 50, Module::Dark);
        bmp.rect(165, 165, 30, 30, Module::Light);
        bmp.rect(175, 175, 10, 10, Module::Dark);

        // The pattern sits outside the tightest window, a wider one finds it
        let estimate = Point::new(120.0, 120.0);
        assert!(find_alignment(&bmp, estimate, 10.0, 4.0).is_none());
        let found = find_alignment(&bmp, estimate, 10.0, 8.0).unwrap();
        assert!((found.x - 180.0).abs() <= 1.0 && (found.y - 180.0).abs() <= 1.0, "{found:?}");
    }

    #[test]
    fn test_find_alignment_missing() {
        let bmp = blank(200, 200);
        assert!(find_alignment(&bmp, Point::new(100.0, 100.0), 10.0, 4.0).is_none());
    }
}
