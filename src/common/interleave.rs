use crate::common::error::{QRError, QRResult};
use crate::common::metadata::Capacity;

// Codeword block interleaving
//------------------------------------------------------------------------------

/// One error correction block: data codewords followed by their ECC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub data: Vec<u8>,
    pub ecc: Vec<u8>,
}

/// Merges blocks into the transmitted codeword sequence: data columns over
/// all blocks, the extra data byte of the long blocks, then ECC columns.
pub fn interleave(blocks: &[Block], cap: &Capacity) -> Vec<u8> {
    debug_assert_eq!(blocks.len(), cap.block_count, "block count mismatch");

    let mut out = Vec::with_capacity(cap.total);
    for i in 0..cap.block_len {
        for block in blocks {
            out.push(block.data[i]);
        }
    }
    for block in &blocks[cap.short_blocks..] {
        out.push(block.data[cap.block_len]);
    }
    for i in 0..cap.ec_len {
        for block in blocks {
            out.push(block.ecc[i]);
        }
    }
    out
}

/// Splits an interleaved codeword sequence back into per-block codewords,
/// each block's data immediately followed by its ECC.
pub fn deinterleave(bytes: &[u8], cap: &Capacity) -> QRResult<Vec<Vec<u8>>> {
    if bytes.len() != cap.total {
        return Err(QRError::Decode);
    }

    let mut blocks = vec![Vec::with_capacity(cap.block_len + 1 + cap.ec_len); cap.block_count];
    let mut idx = 0;
    for _ in 0..cap.block_len {
        for block in blocks.iter_mut() {
            block.push(bytes[idx]);
            idx += 1;
        }
    }
    for block in blocks[cap.short_blocks..].iter_mut() {
        block.push(bytes[idx]);
        idx += 1;
    }
    for _ in 0..cap.ec_len {
        for block in blocks.iter_mut() {
            block.push(bytes[idx]);
            idx += 1;
        }
    }
    Ok(blocks)
}

#[cfg(test)]
mod interleave_tests {
    use super::*;
    use crate::common::ec;
    use crate::common::metadata::{ECLevel, Version};

    fn build_blocks(cap: &Capacity) -> Vec<Block> {
        let mut next = 0u8;
        (0..cap.block_count)
            .map(|i| {
                let len = cap.block_len + usize::from(i >= cap.short_blocks);
                let data: Vec<u8> = (0..len)
                    .map(|_| {
                        next = next.wrapping_add(7);
                        next
                    })
                    .collect();
                let ecc = ec::encode(&data, cap.ec_len);
                Block { data, ecc }
            })
            .collect()
    }

    #[test]
    fn test_single_block_is_identity() {
        let cap = Version::new(1).unwrap().capacity(ECLevel::L);
        let blocks = build_blocks(&cap);
        let merged = interleave(&blocks, &cap);
        let mut flat = blocks[0].data.clone();
        flat.extend(&blocks[0].ecc);
        assert_eq!(merged, flat);
    }

    #[test]
    fn test_round_trip_with_long_blocks() {
        // v5 Q has two short and two long blocks
        let cap = Version::new(5).unwrap().capacity(ECLevel::Q);
        let blocks = build_blocks(&cap);

        let merged = interleave(&blocks, &cap);
        assert_eq!(merged.len(), cap.total);

        let split = deinterleave(&merged, &cap).unwrap();
        for (block, codewords) in blocks.iter().zip(&split) {
            let mut flat = block.data.clone();
            flat.extend(&block.ecc);
            assert_eq!(&flat, codewords);
        }
    }

    #[test]
    fn test_length_mismatch() {
        let cap = Version::new(1).unwrap().capacity(ECLevel::L);
        assert_eq!(deinterleave(&[0; 25], &cap), Err(QRError::Decode));
        assert_eq!(deinterleave(&[0; 27], &cap), Err(QRError::Decode));
    }
}
