//! Error-detecting trailers: even parity, one's-complement checksum and CRC-32.

use crate::bits::bits_to_bytes;
use crate::error::{Decoded, LinkError, Result};
use crate::{CRC32_INIT, CRC32_POLY, CRC32_XOR_OUT};
use std::fmt;
use std::str::FromStr;

const CRC_BITS: usize = 32;
const CHECKSUM_BITS: usize = 8;

/// Append one bit making the total number of 1s even.
pub fn parity_encode(bits: &[bool]) -> Vec<bool> {
    let odd = bits.iter().filter(|&&b| b).count() % 2 == 1;
    let mut out = bits.to_vec();
    out.push(odd);
    out
}

/// Error when the 1s over payload and parity bit add up to an odd count.
pub fn parity_decode(bits: &[bool]) -> Decoded<Vec<bool>> {
    let Some((_, payload)) = bits.split_last() else {
        return Decoded::corrupted(Vec::new());
    };
    let odd = bits.iter().filter(|&&b| b).count() % 2 == 1;
    Decoded {
        payload: payload.to_vec(),
        error: odd,
    }
}

/// One's complement of the byte sum (mod 256). A trailing partial byte is
/// zero-padded for the sum only.
pub fn checksum(bits: &[bool]) -> u8 {
    !bits_to_bytes(bits)
        .iter()
        .fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Append the 8-bit checksum, MSB first.
pub fn checksum_encode(bits: &[bool]) -> Vec<bool> {
    let sum = checksum(bits);
    let mut out = bits.to_vec();
    out.extend((0..CHECKSUM_BITS).rev().map(|i| (sum >> i) & 1 == 1));
    out
}

/// Error when the one's complement of payload sum plus checksum is nonzero.
pub fn checksum_decode(bits: &[bool]) -> Decoded<Vec<bool>> {
    if bits.len() < CHECKSUM_BITS {
        return Decoded::corrupted(bits.to_vec());
    }
    let (payload, trailer) = bits.split_at(bits.len() - CHECKSUM_BITS);
    let received = bits_to_bytes(trailer)[0];
    let total = (!checksum(payload)).wrapping_add(received);
    Decoded {
        payload: payload.to_vec(),
        error: !total != 0,
    }
}

/// CRC-32 (IEEE 802.3 polynomial) over a bit stream, shift-register form:
/// MSB-first, no reflection, register preset to all ones, output inverted.
pub fn crc32(bits: &[bool]) -> u32 {
    let mut reg = CRC32_INIT;
    for &bit in bits {
        let feedback = (reg >> 31 == 1) ^ bit;
        reg <<= 1;
        if feedback {
            reg ^= CRC32_POLY;
        }
    }
    reg ^ CRC32_XOR_OUT
}

/// The same CRC computed as the remainder of GF(2) long division of the
/// message followed by 32 zero bits.
///
/// The preset of the register form corresponds to inverting the first 32
/// bits of that augmented message.
pub fn crc32_long_division(bits: &[bool]) -> u32 {
    let mut dividend: Vec<bool> = bits.to_vec();
    dividend.resize(bits.len() + CRC_BITS, false);
    for (i, bit) in dividend.iter_mut().take(CRC_BITS).enumerate() {
        *bit ^= (CRC32_INIT >> (31 - i)) & 1 == 1;
    }

    // Generator with its implicit x^32 term, MSB first
    let generator: Vec<bool> = std::iter::once(true)
        .chain((0..CRC_BITS).rev().map(|i| (CRC32_POLY >> i) & 1 == 1))
        .collect();

    for start in 0..bits.len() {
        if dividend[start] {
            for (d, &g) in dividend[start..=start + CRC_BITS].iter_mut().zip(&generator) {
                *d ^= g;
            }
        }
    }

    let remainder = dividend[bits.len()..]
        .iter()
        .fold(0u32, |acc, &b| (acc << 1) | b as u32);
    remainder ^ CRC32_XOR_OUT
}

/// Append the 32 CRC bits, MSB first.
pub fn crc32_encode(bits: &[bool]) -> Vec<bool> {
    let crc = crc32(bits);
    let mut out = bits.to_vec();
    out.extend((0..CRC_BITS).rev().map(|i| (crc >> i) & 1 == 1));
    out
}

/// Recompute over the payload and compare with the trailer. Frames shorter
/// than the trailer come back unchanged and flagged.
pub fn crc32_decode(bits: &[bool]) -> Decoded<Vec<bool>> {
    if bits.len() < CRC_BITS {
        return Decoded::corrupted(bits.to_vec());
    }
    let (payload, trailer) = bits.split_at(bits.len() - CRC_BITS);
    let received = trailer.iter().fold(0u32, |acc, &b| (acc << 1) | b as u32);
    Decoded {
        payload: payload.to_vec(),
        error: crc32(payload) != received,
    }
}

/// Error-detecting code applied to one transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorDetection {
    None,
    #[default]
    Parity,
    Checksum,
    Crc32,
}

impl ErrorDetection {
    pub const ALL: [ErrorDetection; 4] = [
        ErrorDetection::None,
        ErrorDetection::Parity,
        ErrorDetection::Checksum,
        ErrorDetection::Crc32,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ErrorDetection::None => "none",
            ErrorDetection::Parity => "parity",
            ErrorDetection::Checksum => "checksum",
            ErrorDetection::Crc32 => "crc32",
        }
    }

    /// Number of trailer bits this code appends.
    pub fn trailer_bits(&self) -> usize {
        match self {
            ErrorDetection::None => 0,
            ErrorDetection::Parity => 1,
            ErrorDetection::Checksum => CHECKSUM_BITS,
            ErrorDetection::Crc32 => CRC_BITS,
        }
    }

    pub fn encode(&self, bits: &[bool]) -> Vec<bool> {
        match self {
            ErrorDetection::None => bits.to_vec(),
            ErrorDetection::Parity => parity_encode(bits),
            ErrorDetection::Checksum => checksum_encode(bits),
            ErrorDetection::Crc32 => crc32_encode(bits),
        }
    }

    pub fn decode(&self, bits: &[bool]) -> Decoded<Vec<bool>> {
        match self {
            ErrorDetection::None => Decoded::clean(bits.to_vec()),
            ErrorDetection::Parity => parity_decode(bits),
            ErrorDetection::Checksum => checksum_decode(bits),
            ErrorDetection::Crc32 => crc32_decode(bits),
        }
    }
}

impl fmt::Display for ErrorDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorDetection {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ErrorDetection::None),
            "parity" | "even-parity" => Ok(ErrorDetection::Parity),
            "checksum" => Ok(ErrorDetection::Checksum),
            "crc32" | "crc-32" | "crc" => Ok(ErrorDetection::Crc32),
            _ => Err(LinkError::UnknownDetection(s.to_string())),
        }
    }
}
