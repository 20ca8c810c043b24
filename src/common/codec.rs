use crate::common::bitstream::BitStream;
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::{alphanumeric_char, Mode, Version};

// Segment reader
//------------------------------------------------------------------------------

/// Parses the corrected data bit stream into payload bytes, segment by
/// segment, until a terminator or fewer than 4 bits remain.
pub fn decode_segments(inp: &mut BitStream, ver: Version) -> QRResult<Vec<u8>> {
    let mut res = Vec::new();
    while inp.remaining() >= 4 {
        let mode_bits = inp.take_bits(4).ok_or(QRError::Decode)?;
        if mode_bits == 0 {
            break;
        }
        let mode = Mode::from_bits(mode_bits)?;
        let char_cnt = inp.take_bits(ver.char_cnt_bits(mode)).ok_or(QRError::Decode)? as usize;
        match mode {
            Mode::Numeric => take_numeric_data(inp, char_cnt, &mut res)?,
            Mode::Alphanumeric => take_alphanumeric_data(inp, char_cnt, &mut res)?,
            Mode::Byte => take_byte_data(inp, char_cnt, &mut res)?,
            Mode::Kanji | Mode::Eci => return Err(QRError::Decode),
        }
    }
    Ok(res)
}

fn take_numeric_data(inp: &mut BitStream, mut char_cnt: usize, out: &mut Vec<u8>) -> QRResult<()> {
    while char_cnt > 0 {
        match char_cnt {
            1 => {
                let v = inp.take_bits(4).ok_or(QRError::Decode)?;
                if v >= 10 {
                    return Err(QRError::Decode);
                }
                out.push(b'0' + v as u8);
                char_cnt -= 1;
            }
            2 => {
                let v = inp.take_bits(7).ok_or(QRError::Decode)?;
                if v >= 100 {
                    return Err(QRError::Decode);
                }
                out.push(b'0' + (v / 10) as u8);
                out.push(b'0' + (v % 10) as u8);
                char_cnt -= 2;
            }
            _ => {
                let v = inp.take_bits(10).ok_or(QRError::Decode)?;
                if v >= 1000 {
                    return Err(QRError::Decode);
                }
                out.push(b'0' + (v / 100) as u8);
                out.push(b'0' + (v / 10 % 10) as u8);
                out.push(b'0' + (v % 10) as u8);
                char_cnt -= 3;
            }
        }
    }
    Ok(())
}

fn take_alphanumeric_data(
    inp: &mut BitStream,
    mut char_cnt: usize,
    out: &mut Vec<u8>,
) -> QRResult<()> {
    while char_cnt > 1 {
        let v = inp.take_bits(11).ok_or(QRError::Decode)? as usize;
        out.push(alphanumeric_char(v / 45)?);
        out.push(alphanumeric_char(v % 45)?);
        char_cnt -= 2;
    }
    if char_cnt == 1 {
        let v = inp.take_bits(6).ok_or(QRError::Decode)? as usize;
        out.push(alphanumeric_char(v)?);
    }
    Ok(())
}

fn take_byte_data(inp: &mut BitStream, char_cnt: usize, out: &mut Vec<u8>) -> QRResult<()> {
    for _ in 0..char_cnt {
        let v = inp.take_bits(8).ok_or(QRError::Decode)?;
        out.push(v as u8);
    }
    Ok(())
}

// Symbol writer, test support
//------------------------------------------------------------------------------
