use crate::common::error::{QRError, QRResult};

// GF(256) with primitive polynomial 0x11d
//------------------------------------------------------------------------------

const PRIMITIVE: u32 = 0x11d;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u32 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    // alpha^255 == alpha^0
    exp[255] = 1;
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();
const EXP: [u8; 256] = TABLES.0;
const LOG: [u8; 256] = TABLES.1;

pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP[(LOG[a as usize] as usize + LOG[b as usize] as usize) % 255]
}

pub fn pow(a: u8, e: usize) -> u8 {
    if a == 0 {
        return 0;
    }
    EXP[(LOG[a as usize] as usize * e) % 255]
}

pub fn log(a: u8) -> QRResult<u8> {
    if a == 0 {
        return Err(QRError::InvalidArgument);
    }
    Ok(LOG[a as usize])
}

pub fn inv(a: u8) -> QRResult<u8> {
    if a == 0 {
        return Err(QRError::InvalidArgument);
    }
    Ok(EXP[255 - LOG[a as usize] as usize])
}

// Polynomial over GF(256), coefficient-first (index 0 holds the highest
// degree). The zero polynomial is [0].
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly(Vec<u8>);

impl Poly {
    /// Strips leading zero coefficients.
    pub fn new(coeffs: &[u8]) -> Self {
        let first = coeffs.iter().position(|&c| c != 0).unwrap_or(coeffs.len());
        if first == coeffs.len() {
            Self(vec![0])
        } else {
            Self(coeffs[first..].to_vec())
        }
    }

    pub fn zero() -> Self {
        Self(vec![0])
    }

    pub fn one() -> Self {
        Self(vec![1])
    }

    pub fn monomial(degree: usize, coeff: u8) -> Self {
        if coeff == 0 {
            return Self::zero();
        }
        let mut coeffs = vec![0; degree + 1];
        coeffs[0] = coeff;
        Self(coeffs)
    }

    pub fn is_zero(&self) -> bool {
        self.0.len() == 1 && self.0[0] == 0
    }

    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }

    pub fn lead(&self) -> u8 {
        self.0[0]
    }

    pub fn coefficient(&self, degree: usize) -> u8 {
        if degree > self.degree() {
            0
        } else {
            self.0[self.degree() - degree]
        }
    }

    pub fn add(&self, other: &Poly) -> Poly {
        let (long, short) =
            if self.0.len() >= other.0.len() { (self, other) } else { (other, self) };
        let mut res = long.0.clone();
        let off = long.0.len() - short.0.len();
        for (i, &c) in short.0.iter().enumerate() {
            res[off + i] = add(res[off + i], c);
        }
        Poly::new(&res)
    }

    pub fn mul(&self, other: &Poly) -> Poly {
        if self.is_zero() || other.is_zero() {
            return Poly::zero();
        }
        let mut res = vec![0u8; self.0.len() + other.0.len() - 1];
        for (i, &a) in self.0.iter().enumerate() {
            for (j, &b) in other.0.iter().enumerate() {
                res[i + j] ^= mul(a, b);
            }
        }
        Poly::new(&res)
    }

    pub fn mul_scalar(&self, scalar: u8) -> Poly {
        if scalar == 0 {
            return Poly::zero();
        }
        let coeffs: Vec<u8> = self.0.iter().map(|&c| mul(c, scalar)).collect();
        Poly::new(&coeffs)
    }

    /// Multiplies by `coeff * X^degree`.
    pub fn mul_monomial(&self, degree: usize, coeff: u8) -> Poly {
        if coeff == 0 || self.is_zero() {
            return Poly::zero();
        }
        let mut coeffs: Vec<u8> = self.0.iter().map(|&c| mul(c, coeff)).collect();
        coeffs.resize(coeffs.len() + degree, 0);
        Poly::new(&coeffs)
    }

    /// Horner evaluation at `x`.
    pub fn eval(&self, x: u8) -> u8 {
        let mut acc = 0u8;
        for &c in &self.0 {
            acc = mul(acc, x) ^ c;
        }
        acc
    }

    /// Remainder of `self / divisor`, returned big-endian with a fixed
    /// length of `divisor.degree()` coefficients (leading zeros kept).
    pub fn remainder(&self, divisor: &Poly) -> Vec<u8> {
        debug_assert_eq!(divisor.lead(), 1, "divisor must be monic");

        let dlen = divisor.degree();
        let mut work = self.0.clone();
        if work.len() > dlen {
            for i in 0..work.len() - dlen {
                let coef = work[i];
                if coef != 0 {
                    for (j, &d) in divisor.0.iter().enumerate().skip(1) {
                        work[i + j] ^= mul(d, coef);
                    }
                }
            }
        }

        let tail = work.len().min(dlen);
        let mut res = vec![0u8; dlen - tail];
        res.extend_from_slice(&work[work.len() - tail..]);
        res
    }

    /// Reed-Solomon generator `prod (X + alpha^i)` for `i in 0..degree`.
    pub fn divisor(degree: usize) -> Poly {
        let mut res = Poly::one();
        for i in 0..degree {
            res = res.mul(&Poly::new(&[1, pow(2, i)]));
        }
        res
    }
}

// Extended Euclidean algorithm
//------------------------------------------------------------------------------

/// Runs the extended Euclidean algorithm on `(a, b)` until the remainder
/// degree drops below `r_bound / 2`, returning the error locator sigma
/// (normalized so sigma(0) == 1) and the error evaluator omega.
pub fn euclidian(a: &Poly, b: &Poly, r_bound: usize) -> QRResult<(Poly, Poly)> {
    let (mut r_last, mut r) =
        if a.degree() < b.degree() { (b.clone(), a.clone()) } else { (a.clone(), b.clone()) };
    let mut t_last = Poly::zero();
    let mut t = Poly::one();

    while 2 * r.degree() >= r_bound {
        let r_last_last = r_last;
        let t_last_last = t_last;
        r_last = r;
        t_last = t;

        if r_last.is_zero() {
            return Err(QRError::Decode);
        }

        let mut rem = r_last_last;
        let mut q = Poly::zero();
        let lead_inv = inv(r_last.lead()).map_err(|_| QRError::Decode)?;
        while rem.degree() >= r_last.degree() && !rem.is_zero() {
            let deg_diff = rem.degree() - r_last.degree();
            let scale = mul(rem.lead(), lead_inv);
            q = q.add(&Poly::monomial(deg_diff, scale));
            rem = rem.add(&r_last.mul_monomial(deg_diff, scale));
        }
        r = rem;
        t = q.mul(&t_last).add(&t_last_last);

        if r.degree() >= r_last.degree() && !r.is_zero() {
            return Err(QRError::Decode);
        }
    }

    let sigma_at_zero = t.coefficient(0);
    if sigma_at_zero == 0 {
        return Err(QRError::Decode);
    }
    let scale = inv(sigma_at_zero).map_err(|_| QRError::Decode)?;
    Ok((t.mul_scalar(scale), r.mul_scalar(scale)))
}

#[cfg(test)]
mod galois_tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_table_anchors() {
        assert_eq!(pow(2, 0), 1);
        assert_eq!(pow(2, 1), 2);
        // 256 overflows into 0x11d
        assert_eq!(pow(2, 8), 29);
        assert_eq!(mul(2, 128), 29);
        assert_eq!(log(2).unwrap(), 1);
        assert_eq!(inv(1).unwrap(), 1);
    }

    #[test]
    fn test_inv_of_zero() {
        assert_eq!(inv(0), Err(QRError::InvalidArgument));
        assert_eq!(log(0), Err(QRError::InvalidArgument));
    }

    proptest! {
        #[test]
        fn proptest_field_closure(a in 0u8..=255, b in 0u8..=255) {
            // mul stays in the field and inverses cancel
            let _ = mul(a, b);
            if a != 0 {
                prop_assert_eq!(mul(a, inv(a).unwrap()), 1);
            }
            prop_assert_eq!(add(a, b), add(b, a));
            prop_assert_eq!(mul(a, b), mul(b, a));
        }

        #[test]
        fn proptest_poly_identity(coeffs in proptest::collection::vec(0u8..=255, 1..24)) {
            let p = Poly::new(&coeffs);
            prop_assert_eq!(p.add(&Poly::zero()), p.clone());
            prop_assert_eq!(p.mul(&Poly::one()), p.clone());
        }
    }

    #[test_case(&[1, 2, 3], 2; "cubic")]
    #[test_case(&[5], 0; "constant")]
    #[test_case(&[0, 0, 7, 1], 1; "leading zeros stripped")]
    fn test_degree(coeffs: &[u8], degree: usize) {
        assert_eq!(Poly::new(coeffs).degree(), degree);
    }

    #[test]
    fn test_coefficient_order() {
        // coefficient(d) addresses X^d, index 0 holds the highest degree
        let p = Poly::new(&[7, 0, 3]);
        assert_eq!(p.coefficient(2), 7);
        assert_eq!(p.coefficient(1), 0);
        assert_eq!(p.coefficient(0), 3);
        assert_eq!(p.coefficient(5), 0);
    }

    #[test]
    fn test_remainder_length() {
        let div = Poly::divisor(7);
        for len in 1..20 {
            let data: Vec<u8> = (1..=len as u8).collect();
            assert_eq!(Poly::new(&data).remainder(&div).len(), 7);
        }
    }

    #[test]
    fn test_eval_horner() {
        // x^2 + 1 at x = 2 is 4 ^ 1 = 5 over GF(256)
        let p = Poly::new(&[1, 0, 1]);
        assert_eq!(p.eval(2), 5);
        assert_eq!(p.eval(0), 1);
    }

    #[test]
    fn test_divisor_is_monic() {
        for d in 1..32 {
            let g = Poly::divisor(d);
            assert_eq!(g.lead(), 1);
            assert_eq!(g.degree(), d);
            // alpha^i are roots of the generator
            for i in 0..d {
                assert_eq!(g.eval(pow(2, i)), 0);
            }
        }
    }
}
