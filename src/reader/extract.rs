use crate::common::bitmap::{Bitmap, Module};
use crate::common::bitstream::BitStream;
use crate::common::codec::decode_segments;
use crate::common::ec;
use crate::common::error::{QRError, QRResult};
use crate::common::interleave::deinterleave;
use crate::common::metadata::{
    format_info, format_info_coords_side, rectify_info, version_info_coords_bl,
    version_info_coords_tr, ECLevel, MaskPattern, Version, EC_LEVELS, FORMAT_ERROR_CAPACITY,
    FORMAT_INFO_COORDS_MAIN, VERSION_ERROR_CAPACITY,
};
use crate::common::template::{template, walk_data};

// Payload extraction from a rectified module grid
//------------------------------------------------------------------------------

/// Recovers format and version, regenerates the function pattern template,
/// reads and de-interleaves the codewords, corrects each block and parses
/// the segments into text.
pub fn extract(grid: &Bitmap) -> QRResult<String> {
    let provisional = Version::from_width(grid.width())?;
    let (ecl, mask) = read_format_info(grid)?;
    let ver = if *provisional >= 7 { read_version_info(grid)? } else { provisional };

    let cap = ver.capacity(ecl);
    let tpl = template(ver, ecl, mask);

    let mut codewords = Vec::with_capacity(cap.total);
    let mut acc = 0u8;
    let mut filled = 0u8;
    walk_data(&tpl, ver, mask, |x, y, mask_bit| {
        let bit = (grid.get(x, y) == Module::Dark) ^ mask_bit;
        acc = acc << 1 | bit as u8;
        filled += 1;
        if filled == 8 {
            codewords.push(acc);
            acc = 0;
            filled = 0;
        }
    });
    if codewords.len() != cap.total {
        return Err(QRError::Decode);
    }

    let mut data = Vec::with_capacity(cap.data_bits / 8);
    for mut block in deinterleave(&codewords, &cap)? {
        ec::rectify(&mut block, cap.ec_len)?;
        block.truncate(block.len() - cap.ec_len);
        data.extend(block);
    }

    let mut bits = BitStream::from_bytes(&data);
    let bytes = decode_segments(&mut bits, ver)?;
    String::from_utf8(bytes).or(Err(QRError::Decode))
}

// Format and version recovery
//------------------------------------------------------------------------------

/// Reads both format info copies. An exact match on either wins, otherwise
/// the closest of the 32 candidates within 3 bit errors.
fn read_format_info(grid: &Bitmap) -> QRResult<(ECLevel, MaskPattern)> {
    let size = grid.width() as i32;
    let main = read_bits_msb(grid, &FORMAT_INFO_COORDS_MAIN);
    let side = read_bits_msb(grid, &format_info_coords_side(size));

    let mut candidates = Vec::with_capacity(32);
    for ecl in EC_LEVELS {
        for m in 0..8 {
            candidates.push(format_info(ecl, MaskPattern::new(m)));
        }
    }

    let index = rectify_info(main, &candidates, 0)
        .or_else(|| rectify_info(side, &candidates, 0))
        .or_else(|| rectify_info(main, &candidates, FORMAT_ERROR_CAPACITY))
        .or_else(|| rectify_info(side, &candidates, FORMAT_ERROR_CAPACITY))
        .ok_or(QRError::InvalidFormatInfo)?;
    Ok((EC_LEVELS[index / 8], MaskPattern::new((index % 8) as u8)))
}

/// Reads both 18-bit version info copies for symbols sized v7 and up. The
/// recovered version must agree with the sampled grid size.
fn read_version_info(grid: &Bitmap) -> QRResult<Version> {
    let size = grid.width() as i32;
    let tr = read_bits_lsb(grid, &version_info_coords_tr(size));
    let bl = read_bits_lsb(grid, &version_info_coords_bl(size));

    let candidates: Vec<u32> =
        (7..=40).map(|v| Version::new(v).expect("version in range").version_info()).collect();

    let index = rectify_info(tr, &candidates, 0)
        .or_else(|| rectify_info(bl, &candidates, 0))
        .or_else(|| rectify_info(tr, &candidates, VERSION_ERROR_CAPACITY))
        .or_else(|| rectify_info(bl, &candidates, VERSION_ERROR_CAPACITY))
        .ok_or(QRError::InvalidVersionInfo)?;

    let ver = Version::new(index + 7)?;
    if ver.width() != grid.width() {
        return Err(QRError::InvalidVersionInfo);
    }
    Ok(ver)
}

fn read_bits_msb(grid: &Bitmap, coords: &[(i32, i32)]) -> u32 {
    coords.iter().fold(0, |acc, &(x, y)| acc << 1 | (grid.get(x, y) == Module::Dark) as u32)
}

fn read_bits_lsb(grid: &Bitmap, coords: &[(i32, i32)]) -> u32 {
    coords
        .iter()
        .enumerate()
        .fold(0, |acc, (k, &(x, y))| acc | ((grid.get(x, y) == Module::Dark) as u32) << k)
}
