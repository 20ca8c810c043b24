pub mod galois;

use galois::{inv, log, mul, pow, Poly};

use crate::common::error::{QRError, QRResult};

// Reed-Solomon codec
//------------------------------------------------------------------------------

/// Computes `ec_len` error correction codewords for `data`: the remainder of
/// `data * X^ec_len` divided by the generator polynomial.
pub fn encode(data: &[u8], ec_len: usize) -> Vec<u8> {
    debug_assert!(ec_len > 0, "ECC length must be positive");
    Poly::new(data).mul_monomial(ec_len, 1).remainder(&Poly::divisor(ec_len))
}

/// Corrects up to `ec_len / 2` byte errors in `codeword` (data followed by
/// ECC) in place. Returns `Decode` when the errors are uncorrectable.
pub fn rectify(codeword: &mut [u8], ec_len: usize) -> QRResult<()> {
    let poly = Poly::new(codeword);

    let mut syndromes = vec![0u8; ec_len];
    let mut clean = true;
    for (i, s) in syndromes.iter_mut().enumerate() {
        *s = poly.eval(pow(2, i));
        clean &= *s == 0;
    }
    if clean {
        return Ok(());
    }

    // Syndrome polynomial S_0 + S_1*X + .., stored coefficient-first
    let synd: Vec<u8> = syndromes.iter().rev().copied().collect();
    let (sigma, omega) = galois::euclidian(&Poly::monomial(ec_len, 1), &Poly::new(&synd), ec_len)?;

    // Chien search for error locators
    let mut locators = Vec::with_capacity(sigma.degree());
    for i in 1..=255u8 {
        if sigma.eval(i) == 0 {
            locators.push(inv(i).map_err(|_| QRError::Decode)?);
        }
    }
    if locators.len() != sigma.degree() {
        return Err(QRError::Decode);
    }

    // Forney magnitudes
    let len = codeword.len();
    for (k, &xk) in locators.iter().enumerate() {
        let pos = len as isize - 1 - log(xk).map_err(|_| QRError::Decode)? as isize;
        if pos < 0 {
            return Err(QRError::Decode);
        }

        let xk_inv = inv(xk).map_err(|_| QRError::Decode)?;
        let mut denom = 1u8;
        for (j, &xj) in locators.iter().enumerate() {
            if j != k {
                denom = mul(denom, 1 ^ mul(xj, xk_inv));
            }
        }
        let magnitude = mul(omega.eval(xk_inv), inv(denom).map_err(|_| QRError::Decode)?);
        codeword[pos as usize] ^= magnitude;
    }

    // The corrected word must be a valid codeword
    let poly = Poly::new(codeword);
    for i in 0..ec_len {
        if poly.eval(pow(2, i)) != 0 {
            return Err(QRError::Decode);
        }
    }
    Ok(())
}
