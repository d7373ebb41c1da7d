//! Hamming(7,4) single-error-correcting block code.
//!
//! Block layout is `p1 p2 d1 p3 d2 d3 d4`, so the syndrome value equals the
//! 1-based position of a single flipped bit.

pub const DATA_BITS: usize = 4;
pub const BLOCK_BITS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HammingDecoded {
    pub bits: Vec<bool>,
    /// Blocks in which one bit was flipped back.
    pub corrected_blocks: usize,
}

fn encode_block(d: [bool; 4]) -> [bool; 7] {
    let [d1, d2, d3, d4] = d;
    let p1 = d1 ^ d2 ^ d4;
    let p2 = d1 ^ d3 ^ d4;
    let p3 = d2 ^ d3 ^ d4;
    [p1, p2, d1, p3, d2, d3, d4]
}

/// Syndrome `s1 + 2 s2 + 4 s3`: 0 for a valid block, otherwise the position
/// of the bit to flip.
fn syndrome(block: &[bool; 7]) -> usize {
    let [p1, p2, d1, p3, d2, d3, d4] = *block;
    let s1 = p1 ^ d1 ^ d2 ^ d4;
    let s2 = p2 ^ d1 ^ d3 ^ d4;
    let s3 = p3 ^ d2 ^ d3 ^ d4;
    s1 as usize + 2 * s2 as usize + 4 * s3 as usize
}

/// Zero-pad to a multiple of 4 bits and encode each group into 7 bits.
pub fn encode(bits: &[bool]) -> Vec<bool> {
    let mut out = Vec::with_capacity(bits.len().div_ceil(DATA_BITS) * BLOCK_BITS);
    for chunk in bits.chunks(DATA_BITS) {
        let mut data = [false; 4];
        data[..chunk.len()].copy_from_slice(chunk);
        out.extend_from_slice(&encode_block(data));
    }
    out
}

/// Correct up to one bit per 7-bit block and return the data bits.
///
/// A trailing partial block is dropped. Two or more errors in a block are
/// miscorrected silently; this code has no way to flag them.
pub fn decode(bits: &[bool]) -> HammingDecoded {
    let mut out = Vec::with_capacity(bits.len() / BLOCK_BITS * DATA_BITS);
    let mut corrected_blocks = 0;

    for chunk in bits.chunks_exact(BLOCK_BITS) {
        let mut block = [false; 7];
        block.copy_from_slice(chunk);

        let position = syndrome(&block);
        if position != 0 {
            block[position - 1] = !block[position - 1];
            corrected_blocks += 1;
        }
        out.extend_from_slice(&[block[2], block[4], block[5], block[6]]);
    }

    if corrected_blocks > 0 {
        log::debug!("Hamming(7,4) corrected {} block(s)", corrected_blocks);
    }
    HammingDecoded {
        bits: out,
        corrected_blocks,
    }
}
