use super::geometry::Point;

// Perspective transform
//------------------------------------------------------------------------------

/// 3x3 homography mapping symbol module coordinates onto image pixels,
/// built by composing two unit-square-to-quadrilateral maps. Coefficients
/// are stored column-first; points transform as
/// `(x', y') = ((a11 x + a21 y + a31) / w, (a12 x + a22 y + a32) / w)` with
/// `w = a13 x + a23 y + a33`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveTransform {
    a11: f64,
    a21: f64,
    a31: f64,
    a12: f64,
    a22: f64,
    a32: f64,
    a13: f64,
    a23: f64,
    a33: f64,
}

impl PerspectiveTransform {
    pub fn quadrilateral_to_quadrilateral(from: [Point; 4], to: [Point; 4]) -> Self {
        Self::square_to_quadrilateral(to).times(&Self::square_to_quadrilateral(from).adjugate())
    }

    pub fn transform(&self, x: f64, y: f64) -> Point {
        let w = self.a13 * x + self.a23 * y + self.a33;
        Point {
            x: (self.a11 * x + self.a21 * y + self.a31) / w,
            y: (self.a12 * x + self.a22 * y + self.a32) / w,
        }
    }

    fn square_to_quadrilateral(p: [Point; 4]) -> Self {
        let [p0, p1, p2, p3] = p;
        let d3 = p0 - p1 + p2 - p3;
        if d3.x == 0.0 && d3.y == 0.0 {
            // Affine
            return Self {
                a11: p1.x - p0.x,
                a21: p2.x - p1.x,
                a31: p0.x,
                a12: p1.y - p0.y,
                a22: p2.y - p1.y,
                a32: p0.y,
                a13: 0.0,
                a23: 0.0,
                a33: 1.0,
            };
        }

        let d1 = p1 - p2;
        let d2 = p3 - p2;
        let den = d1.x * d2.y - d2.x * d1.y;
        let a13 = (d3.x * d2.y - d2.x * d3.y) / den;
        let a23 = (d1.x * d3.y - d3.x * d1.y) / den;
        Self {
            a11: p1.x - p0.x + a13 * p1.x,
            a21: p3.x - p0.x + a23 * p3.x,
            a31: p0.x,
            a12: p1.y - p0.y + a13 * p1.y,
            a22: p3.y - p0.y + a23 * p3.y,
            a32: p0.y,
            a13,
            a23,
            a33: 1.0,
        }
    }

    /// The inverse up to scale, which projective transforms ignore.
    fn adjugate(&self) -> Self {
        Self {
            a11: self.a22 * self.a33 - self.a23 * self.a32,
            a21: self.a23 * self.a31 - self.a21 * self.a33,
            a31: self.a21 * self.a32 - self.a22 * self.a31,
            a12: self.a13 * self.a32 - self.a12 * self.a33,
            a22: self.a11 * self.a33 - self.a13 * self.a31,
            a32: self.a12 * self.a31 - self.a11 * self.a32,
            a13: self.a12 * self.a23 - self.a13 * self.a22,
            a23: self.a13 * self.a21 - self.a11 * self.a23,
            a33: self.a11 * self.a22 - self.a12 * self.a21,
        }
    }

    fn times(&self, other: &Self) -> Self {
        Self {
            a11: self.a11 * other.a11 + self.a21 * other.a12 + self.a31 * other.a13,
            a21: self.a11 * other.a21 + self.a21 * other.a22 + self.a31 * other.a23,
            a31: self.a11 * other.a31 + self.a21 * other.a32 + self.a31 * other.a33,
            a12: self.a12 * other.a11 + self.a22 * other.a12 + self.a32 * other.a13,
            a22: self.a12 * other.a21 + self.a22 * other.a22 + self.a32 * other.a23,
            a32: self.a12 * other.a31 + self.a22 * other.a32 + self.a32 * other.a33,
            a13: self.a13 * other.a11 + self.a23 * other.a12 + self.a33 * other.a13,
            a23: self.a13 * other.a21 + self.a23 * other.a22 + self.a33 * other.a23,
            a33: self.a13 * other.a31 + self.a23 * other.a32 + self.a33 * other.a33,
        }
    }
}

#[cfg(test)]
mod homography_tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_affine_scale_and_offset() {
        // Upright symbol at 10 px per module with a 40 px quiet zone
        let from = [pt(3.5, 3.5), pt(17.5, 3.5), pt(17.5, 17.5), pt(3.5, 17.5)];
        let to = [pt(75.0, 75.0), pt(215.0, 75.0), pt(215.0, 215.0), pt(75.0, 215.0)];
        let h = PerspectiveTransform::quadrilateral_to_quadrilateral(from, to);

        let p = h.transform(0.5, 0.5);
        assert!((p.x - 45.0).abs() < 1e-9 && (p.y - 45.0).abs() < 1e-9);
        let p = h.transform(10.5, 3.5);
        assert!((p.x - 145.0).abs() < 1e-9 && (p.y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_projective_corners_map_exactly() {
        let from = [pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)];
        let to = [pt(10.0, 10.0), pt(90.0, 5.0), pt(100.0, 80.0), pt(5.0, 95.0)];
        let h = PerspectiveTransform::quadrilateral_to_quadrilateral(from, to);

        for (f, t) in from.into_iter().zip(to) {
            let p = h.transform(f.x, f.y);
            assert!((p.x - t.x).abs() < 1e-6, "{p:?} vs {t:?}");
            assert!((p.y - t.y).abs() < 1e-6, "{p:?} vs {t:?}");
        }
    }

    #[test]
    fn test_rotated_symbol() {
        // Quarter turn: module x axis maps onto image -y
        let from = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
        let to = [pt(0.0, 100.0), pt(0.0, 0.0), pt(100.0, 0.0), pt(100.0, 100.0)];
        let h = PerspectiveTransform::quadrilateral_to_quadrilateral(from, to);
        let p = h.transform(5.0, 0.0);
        assert!((p.x - 0.0).abs() < 1e-9 && (p.y - 50.0).abs() < 1e-9);
    }
}
