use std::ops::Deref;

use crate::common::error::{QRError, QRResult};

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct Version(usize);

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Version {
    pub fn new(version: usize) -> QRResult<Self> {
        if !(1..=40).contains(&version) {
            return Err(QRError::InvalidVersionInfo);
        }
        Ok(Self(version))
    }

    /// Side length of the symbol in modules.
    pub const fn width(self) -> usize {
        self.0 * 4 + 17
    }

    pub fn from_width(width: usize) -> QRResult<Self> {
        if width < 21 || (width - 17) % 4 != 0 {
            return Err(QRError::InvalidVersionInfo);
        }
        Self::new((width - 17) / 4)
    }

    /// Size class governing character count field widths: 0 for v1-9,
    /// 1 for v10-26, 2 for v27-40.
    pub fn size_type(self) -> usize {
        (self.0 + 7) / 17
    }

    pub fn char_cnt_bits(self, mode: Mode) -> usize {
        let t = self.size_type();
        match mode {
            Mode::Numeric => [10, 12, 14][t],
            Mode::Alphanumeric => [9, 11, 13][t],
            Mode::Byte => [8, 16, 16][t],
            Mode::Kanji => [8, 10, 12][t],
            Mode::Eci => 0,
        }
    }

    /// Centers of the alignment patterns along one axis. Empty for v1.
    pub fn alignment_positions(self) -> Vec<i32> {
        if self.0 < 2 {
            return Vec::new();
        }
        let size = self.width() as i32;
        let (first, last) = (6, size - 7);
        let distance = last - first;
        let count = (distance + 27) / 28;

        let mut interval = distance / count;
        if interval % 2 == 1 {
            interval += 1;
        } else if (distance % count) * 2 >= count {
            interval += 2;
        }

        let mut positions = Vec::with_capacity(count as usize + 1);
        positions.push(first);
        for k in 1..count {
            positions.push(last - (count - k) * interval);
        }
        positions.push(last);
        positions
    }

    /// 18-bit BCH-protected version field, defined for v7 and up.
    pub fn version_info(self) -> u32 {
        debug_assert!(self.0 >= 7, "version info exists only for v7 and up");
        let v = self.0 as u32;
        let mut d = v;
        for _ in 0..12 {
            d = (d << 1) ^ ((d >> 11) * 0b1_1111_0010_0101);
        }
        (v << 12) | d
    }

    pub fn capacity(self, ec_level: ECLevel) -> Capacity {
        let v = self.0 - 1;
        let total = TOTAL_CODEWORDS[v];
        let ec_len = EC_WORDS_PER_BLOCK[ec_level as usize][v];
        let block_count = EC_BLOCK_COUNT[ec_level as usize][v];
        Capacity {
            ec_len,
            block_count,
            short_blocks: block_count - total % block_count,
            block_len: total / block_count - ec_len,
            data_bits: (total - ec_len * block_count) * 8,
            total,
        }
    }
}

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

pub static EC_LEVELS: [ECLevel; 4] = [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H];

impl ECLevel {
    /// Two-bit code carried in the format info.
    pub fn wire_code(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }
}

// Encoding mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
    Eci,
}

impl Mode {
    /// Parses a 4-bit mode indicator. The terminator (0000) is handled by
    /// the caller; anything not in the mode table is a decode error.
    pub fn from_bits(bits: u32) -> QRResult<Self> {
        match bits {
            0b0001 => Ok(Self::Numeric),
            0b0010 => Ok(Self::Alphanumeric),
            0b0100 => Ok(Self::Byte),
            0b1000 => Ok(Self::Kanji),
            0b0111 => Ok(Self::Eci),
            _ => Err(QRError::Decode),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::Numeric => 0b0001,
            Self::Alphanumeric => 0b0010,
            Self::Byte => 0b0100,
            Self::Kanji => 0b1000,
            Self::Eci => 0b0111,
        }
    }
}

// Masking pattern
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> Self {
        debug_assert!(pattern < 8, "Invalid masking pattern");
        Self(pattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(x: i32, y: i32) -> bool {
        (x + y) & 1 == 0
    }

    pub fn horizontal_lines(_: i32, y: i32) -> bool {
        y & 1 == 0
    }

    pub fn vertical_lines(x: i32, _: i32) -> bool {
        x % 3 == 0
    }

    pub fn diagonal_lines(x: i32, y: i32) -> bool {
        (x + y) % 3 == 0
    }

    pub fn large_checkerboard(x: i32, y: i32) -> bool {
        ((y >> 1) + (x / 3)) & 1 == 0
    }

    pub fn fields(x: i32, y: i32) -> bool {
        ((x * y) & 1) + ((x * y) % 3) == 0
    }

    pub fn diamonds(x: i32, y: i32) -> bool {
        (((x * y) & 1) + ((x * y) % 3)) & 1 == 0
    }

    pub fn meadow(x: i32, y: i32) -> bool {
        (((x + y) & 1) + ((x * y) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    /// The eight stateless mask predicates over `(x, y)` module coordinates.
    pub fn mask_functions(self) -> fn(i32, i32) -> bool {
        match self.0 {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Invalid masking pattern"),
        }
    }
}

// Format and version info
//------------------------------------------------------------------------------

pub const FORMAT_MASK: u32 = 0b101_0100_0001_0010;

pub const FORMAT_ERROR_CAPACITY: u32 = 3;

pub const VERSION_ERROR_CAPACITY: u32 = 3;

/// 15-bit BCH-protected format field for an EC level and mask pattern.
pub fn format_info(ec_level: ECLevel, mask: MaskPattern) -> u32 {
    let data = (ec_level.wire_code() << 3) | *mask as u32;
    let mut d = data;
    for _ in 0..10 {
        d = (d << 1) ^ ((d >> 9) * 0b101_0011_0111);
    }
    ((data << 10) | (d & 0x3ff)) ^ FORMAT_MASK
}

/// Picks the candidate closest to `info` by Hamming distance, returning its
/// index, or `None` when even the closest exceeds `err_capacity` bit errors.
pub fn rectify_info(info: u32, candidates: &[u32], err_capacity: u32) -> Option<usize> {
    let (idx, &best) = candidates.iter().enumerate().min_by_key(|(_, &n)| (info ^ n).count_ones())?;
    ((info ^ best).count_ones() <= err_capacity).then_some(idx)
}

/// Module coordinates of the format info copy around the top-left finder,
/// most significant bit first.
pub const FORMAT_INFO_COORDS_MAIN: [(i32, i32); 15] = [
    (0, 8),
    (1, 8),
    (2, 8),
    (3, 8),
    (4, 8),
    (5, 8),
    (7, 8),
    (8, 8),
    (8, 7),
    (8, 5),
    (8, 4),
    (8, 3),
    (8, 2),
    (8, 1),
    (8, 0),
];

/// Module coordinates of the second format info copy, split between the
/// bottom-left and top-right finders, most significant bit first.
pub fn format_info_coords_side(size: i32) -> [(i32, i32); 15] {
    let mut coords = [(0, 0); 15];
    for (i, c) in coords.iter_mut().take(7).enumerate() {
        *c = (8, size - 1 - i as i32);
    }
    for (i, c) in coords.iter_mut().skip(7).enumerate() {
        *c = (size - 8 + i as i32, 8);
    }
    coords
}

/// Module coordinates of bit `k` (least significant first) of the version
/// info copy left of the top-right finder.
pub fn version_info_coords_tr(size: i32) -> [(i32, i32); 18] {
    let mut coords = [(0, 0); 18];
    for (k, c) in coords.iter_mut().enumerate() {
        *c = (size - 11 + (k as i32 % 3), k as i32 / 3);
    }
    coords
}

/// Module coordinates of bit `k` of the version info copy above the
/// bottom-left finder; the transpose of the top-right copy.
pub fn version_info_coords_bl(size: i32) -> [(i32, i32); 18] {
    let mut coords = [(0, 0); 18];
    for (k, c) in coords.iter_mut().enumerate() {
        *c = (k as i32 / 3, size - 11 + (k as i32 % 3));
    }
    coords
}

// Alphanumeric charset
//------------------------------------------------------------------------------

pub static ALPHANUMERIC_CHARSET: [u8; 45] = *b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

pub fn alphanumeric_char(index: usize) -> QRResult<u8> {
    ALPHANUMERIC_CHARSET.get(index).copied().ok_or(QRError::Decode)
}

// Capacity
//------------------------------------------------------------------------------

/// Codeword layout of a version and EC level. Blocks `0..short_blocks` hold
/// `block_len` data codewords, the rest one more; every block carries
/// `ec_len` ECC codewords.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Capacity {
    pub ec_len: usize,
    pub block_count: usize,
    pub short_blocks: usize,
    pub block_len: usize,
    pub data_bits: usize,
    pub total: usize,
}

// Global constants
//------------------------------------------------------------------------------

/// Total codewords per version.
static TOTAL_CODEWORDS: [usize; 40] = [
    26, 44, 70, 100, 134, 172, 196, 242, 292, 346, 404, 466, 532, 581, 655, 733, 815, 901, 991,
    1085, 1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, 2323, 2465, 2611, 2761,
    2876, 3034, 3196, 3362, 3532, 3706,
];

/// ECC codewords per block, indexed by EC level then version.
static EC_WORDS_PER_BLOCK: [[usize; 40]; 4] = [
    [
        7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

/// Block count, indexed by EC level then version.
static EC_BLOCK_COUNT: [[usize; 40]; 4] = [
    [
        1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21, 23,
        25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];

#[cfg(test)]
mod metadata_tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_width_round_trip() {
        for v in 1..=40 {
            let ver = Version::new(v).unwrap();
            assert_eq!(*Version::from_width(ver.width()).unwrap(), v);
        }
        assert!(Version::from_width(20).is_err());
        assert!(Version::from_width(22).is_err());
        assert!(Version::from_width(181).is_err());
    }

    #[test]
    fn test_size_type() {
        assert_eq!(Version::new(1).unwrap().size_type(), 0);
        assert_eq!(Version::new(9).unwrap().size_type(), 0);
        assert_eq!(Version::new(10).unwrap().size_type(), 1);
        assert_eq!(Version::new(26).unwrap().size_type(), 1);
        assert_eq!(Version::new(27).unwrap().size_type(), 2);
        assert_eq!(Version::new(40).unwrap().size_type(), 2);
    }

    #[test_case(1, &[]; "v1")]
    #[test_case(2, &[6, 18]; "v2")]
    #[test_case(7, &[6, 22, 38]; "v7")]
    #[test_case(14, &[6, 26, 46, 66]; "v14")]
    #[test_case(21, &[6, 28, 50, 72, 94]; "v21")]
    #[test_case(32, &[6, 34, 60, 86, 112, 138]; "v32")]
    #[test_case(36, &[6, 24, 50, 76, 102, 128, 154]; "v36")]
    #[test_case(40, &[6, 30, 58, 86, 114, 142, 170]; "v40")]
    fn test_alignment_positions(version: usize, positions: &[i32]) {
        assert_eq!(Version::new(version).unwrap().alignment_positions(), positions);
    }

    #[test]
    fn test_format_info_anchor() {
        // M with mask 0 is the all-zero data word, so the field is the mask
        assert_eq!(format_info(ECLevel::M, MaskPattern::new(0)), 0x5412);
        assert_eq!(format_info(ECLevel::L, MaskPattern::new(0)), 0x77c4);
        assert_eq!(format_info(ECLevel::Q, MaskPattern::new(7)), 0x2bed);
        assert_eq!(format_info(ECLevel::H, MaskPattern::new(7)), 0x083b);
    }

    #[test]
    fn test_format_info_single_bit_recovery() {
        let mut candidates = Vec::with_capacity(32);
        for ecl in EC_LEVELS {
            for m in 0..8 {
                candidates.push(format_info(ecl, MaskPattern::new(m)));
            }
        }

        for (i, &info) in candidates.iter().enumerate() {
            assert!(info < 1u32 << 15);
            for bit in 0..15 {
                let perturbed = info ^ (1 << bit);
                assert_eq!(rectify_info(perturbed, &candidates, FORMAT_ERROR_CAPACITY), Some(i));
            }
        }
    }

    #[test]
    fn test_version_info_anchors() {
        assert_eq!(Version::new(7).unwrap().version_info(), 0x07c94);
        assert_eq!(Version::new(21).unwrap().version_info(), 0x177ec);
        assert_eq!(Version::new(40).unwrap().version_info(), 0x28c69);
    }

    #[test_case(1, ECLevel::L, Capacity { ec_len: 7, block_count: 1, short_blocks: 1, block_len: 19, data_bits: 152, total: 26 }; "v1 L")]
    #[test_case(1, ECLevel::Q, Capacity { ec_len: 13, block_count: 1, short_blocks: 1, block_len: 13, data_bits: 104, total: 26 }; "v1 Q")]
    #[test_case(5, ECLevel::Q, Capacity { ec_len: 18, block_count: 4, short_blocks: 2, block_len: 15, data_bits: 496, total: 134 }; "v5 Q with long blocks")]
    #[test_case(7, ECLevel::L, Capacity { ec_len: 20, block_count: 2, short_blocks: 2, block_len: 78, data_bits: 1248, total: 196 }; "v7 L")]
    fn test_capacity(version: usize, ecl: ECLevel, expected: Capacity) {
        assert_eq!(Version::new(version).unwrap().capacity(ecl), expected);
    }

    #[test]
    fn test_capacity_consistency() {
        // Short and long blocks plus ECC must account for every codeword
        for v in 1..=40 {
            let ver = Version::new(v).unwrap();
            for ecl in EC_LEVELS {
                let cap = ver.capacity(ecl);
                let long_blocks = cap.block_count - cap.short_blocks;
                let data = cap.short_blocks * cap.block_len + long_blocks * (cap.block_len + 1);
                assert_eq!(data * 8, cap.data_bits);
                assert_eq!(data + cap.block_count * cap.ec_len, cap.total);
            }
        }
    }

    #[test]
    fn test_alphanumeric_charset() {
        assert_eq!(alphanumeric_char(0).unwrap(), b'0');
        assert_eq!(alphanumeric_char(10).unwrap(), b'A');
        assert_eq!(alphanumeric_char(36).unwrap(), b' ');
        assert_eq!(alphanumeric_char(44).unwrap(), b':');
        assert_eq!(alphanumeric_char(45), Err(QRError::Decode));
    }

    #[test]
    fn test_mask_formulae() {
        let m0 = MaskPattern::new(0).mask_functions();
        assert!(m0(0, 0) && !m0(1, 0) && m0(1, 1));
        let m5 = MaskPattern::new(5).mask_functions();
        assert!(m5(0, 0) && m5(3, 2) && !m5(1, 1));
        let m7 = MaskPattern::new(7).mask_functions();
        assert!(m7(0, 0) && !m7(1, 0) && m7(3, 1));
    }
}
