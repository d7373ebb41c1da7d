//! Octet <-> bit conversion, MSB first within each octet.

/// Expand each byte into 8 bits, most significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1 == 1);
        }
    }
    bits
}

/// Pack bits into bytes, MSB first.
///
/// The input is zero-padded to a multiple of 8, so a bit count that is not
/// byte aligned gains trailing zeros that cannot be removed without knowing
/// the original length.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| if bit { byte | (1 << (7 - i)) } else { byte })
        })
        .collect()
}

pub fn text_to_bits(text: &str) -> Vec<bool> {
    bytes_to_bits(text.as_bytes())
}

/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn bits_to_text(bits: &[bool]) -> String {
    String::from_utf8_lossy(&bits_to_bytes(bits)).into_owned()
}

/// Render bits as a `0`/`1` string, e.g. for display.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Parse a `0`/`1` string. Any other character (spaces, underscores) is skipped.
pub fn parse_bits(text: &str) -> Vec<bool> {
    text.chars()
        .filter_map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}
