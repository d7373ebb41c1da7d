//! Framing disciplines: character count, byte stuffing and bit stuffing.
//!
//! Decoders never fail. A frame that does not follow its discipline is
//! recovered as far as possible and flagged through [`Decoded::error`].

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::error::{Decoded, LinkError, Result};
use crate::{BIT_FLAG, ESC_BYTE, FLAG_BYTE, MAX_COUNTED_PAYLOAD, STUFFING_RUN};
use std::fmt;
use std::str::FromStr;

/// Prepend a one-byte count covering the header and the payload.
pub fn encode_counted(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_COUNTED_PAYLOAD {
        return Err(LinkError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_COUNTED_PAYLOAD,
        });
    }

    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.push((payload.len() + 1) as u8);
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Read exactly `count - 1` payload bytes after the header.
///
/// Bytes past the counted length are discarded without raising the error
/// flag. A zero count or a frame shorter than its count is flagged.
pub fn decode_counted(frame: &[u8]) -> Decoded<Vec<u8>> {
    let Some(&count) = frame.first() else {
        return Decoded::corrupted(Vec::new());
    };
    if count == 0 {
        return Decoded::corrupted(Vec::new());
    }

    let body = &frame[1..];
    let wanted = count as usize - 1;
    if wanted > body.len() {
        return Decoded::corrupted(body.to_vec());
    }
    Decoded::clean(body[..wanted].to_vec())
}

/// Split a payload of any length into consecutive counted frames.
pub fn encode_counted_frames(payload: &[u8]) -> Vec<u8> {
    if payload.is_empty() {
        return vec![1];
    }

    let mut stream = Vec::with_capacity(payload.len() + payload.len() / MAX_COUNTED_PAYLOAD + 1);
    for chunk in payload.chunks(MAX_COUNTED_PAYLOAD) {
        stream.push((chunk.len() + 1) as u8);
        stream.extend_from_slice(chunk);
    }
    stream
}

/// Walk a stream of counted frames and concatenate their payloads.
///
/// Only a full frame (count 255) is followed by another one. The first frame
/// with a smaller count ends the stream and anything after it is discarded
/// the way [`decode_counted`] does. Stops at a zero count or a truncated
/// frame, keeping what was read.
pub fn decode_counted_frames(stream: &[u8]) -> Decoded<Vec<u8>> {
    let full_frame = MAX_COUNTED_PAYLOAD + 1;
    let mut payload = Vec::with_capacity(stream.len());
    let mut pos = 0;
    loop {
        let frame = decode_counted(&stream[pos..]);
        payload.extend_from_slice(&frame.payload);
        if frame.error {
            log::warn!("Counted frame at byte {} is malformed", pos);
            return Decoded::corrupted(payload);
        }

        let count = stream[pos] as usize;
        pos += count;
        if count < full_frame || pos == stream.len() {
            break;
        }
    }

    if pos < stream.len() {
        log::debug!("Discarding {} bytes after the last counted frame", stream.len() - pos);
    }
    Decoded::clean(payload)
}

/// Wrap with FLAG bytes, escaping FLAG and ESC inside the payload.
pub fn byte_stuff(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.push(FLAG_BYTE);
    for &byte in payload {
        if byte == FLAG_BYTE || byte == ESC_BYTE {
            frame.push(ESC_BYTE);
        }
        frame.push(byte);
    }
    frame.push(FLAG_BYTE);
    frame
}

/// Strip the boundary FLAGs and undo escaping.
///
/// Missing boundary FLAGs, a dangling ESC and an unescaped FLAG inside the
/// body are flagged; the offending byte is dropped.
pub fn byte_unstuff(frame: &[u8]) -> Decoded<Vec<u8>> {
    if frame.len() < 2 {
        return Decoded::corrupted(Vec::new());
    }

    let mut malformed = frame[0] != FLAG_BYTE || frame[frame.len() - 1] != FLAG_BYTE;
    let body = &frame[1..frame.len() - 1];

    let mut payload = Vec::with_capacity(body.len());
    let mut bytes = body.iter();
    while let Some(&byte) = bytes.next() {
        match byte {
            ESC_BYTE => match bytes.next() {
                Some(&literal) => payload.push(literal),
                None => malformed = true,
            },
            FLAG_BYTE => malformed = true,
            _ => payload.push(byte),
        }
    }

    if malformed {
        log::warn!("Byte-stuffed frame is malformed");
    }
    Decoded {
        payload,
        error: malformed,
    }
}

/// Wrap with the 01111110 flag, inserting a 0 after every run of five 1s.
pub fn bit_stuff(payload: &[bool]) -> Vec<bool> {
    let mut frame = Vec::with_capacity(payload.len() + payload.len() / STUFFING_RUN + 16);
    frame.extend_from_slice(&BIT_FLAG);

    let mut ones = 0;
    for &bit in payload {
        frame.push(bit);
        if bit {
            ones += 1;
            if ones == STUFFING_RUN {
                frame.push(false);
                ones = 0;
            }
        } else {
            ones = 0;
        }
    }

    frame.extend_from_slice(&BIT_FLAG);
    frame
}

/// Strip the two boundary flags and drop the 0 that follows each run of five 1s.
///
/// A 1 where a stuffed 0 was expected is kept and flagged, as are boundary
/// flags that do not match the pattern.
pub fn bit_unstuff(frame: &[bool]) -> Decoded<Vec<bool>> {
    let flag_len = BIT_FLAG.len();
    if frame.len() < 2 * flag_len {
        return Decoded::corrupted(Vec::new());
    }

    let mut malformed =
        frame[..flag_len] != BIT_FLAG || frame[frame.len() - flag_len..] != BIT_FLAG;
    let body = &frame[flag_len..frame.len() - flag_len];

    let mut payload = Vec::with_capacity(body.len());
    let mut ones = 0;
    let mut i = 0;
    while i < body.len() {
        let bit = body[i];
        payload.push(bit);
        i += 1;

        ones = if bit { ones + 1 } else { 0 };
        if ones == STUFFING_RUN {
            match body.get(i) {
                Some(false) => i += 1,
                Some(true) => malformed = true,
                None => {}
            }
            ones = 0;
        }
    }

    if malformed {
        log::warn!("Bit-stuffed frame is malformed");
    }
    Decoded {
        payload,
        error: malformed,
    }
}

/// Framing discipline applied to the bit stream of one transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    #[default]
    None,
    CharacterCount,
    ByteStuffing,
    BitStuffing,
}

impl Framing {
    pub const ALL: [Framing; 4] = [
        Framing::None,
        Framing::CharacterCount,
        Framing::ByteStuffing,
        Framing::BitStuffing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Framing::None => "none",
            Framing::CharacterCount => "count",
            Framing::ByteStuffing => "byte-stuffing",
            Framing::BitStuffing => "bit-stuffing",
        }
    }

    /// Byte-oriented disciplines pack the bits first, zero-padding to a whole byte.
    pub fn encode(&self, bits: &[bool]) -> Vec<bool> {
        match self {
            Framing::None => bits.to_vec(),
            Framing::CharacterCount => bytes_to_bits(&encode_counted_frames(&bits_to_bytes(bits))),
            Framing::ByteStuffing => bytes_to_bits(&byte_stuff(&bits_to_bytes(bits))),
            Framing::BitStuffing => bit_stuff(bits),
        }
    }

    pub fn decode(&self, bits: &[bool]) -> Decoded<Vec<bool>> {
        match self {
            Framing::None => Decoded::clean(bits.to_vec()),
            Framing::CharacterCount => {
                decode_counted_frames(&bits_to_bytes(bits)).map(|bytes| bytes_to_bits(&bytes))
            }
            Framing::ByteStuffing => {
                byte_unstuff(&bits_to_bytes(bits)).map(|bytes| bytes_to_bits(&bytes))
            }
            Framing::BitStuffing => bit_unstuff(bits),
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Framing {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Framing::None),
            "count" | "character-count" | "counting" => Ok(Framing::CharacterCount),
            "byte-stuffing" | "bytes" => Ok(Framing::ByteStuffing),
            "bit-stuffing" | "bits" => Ok(Framing::BitStuffing),
            _ => Err(LinkError::UnknownFraming(s.to_string())),
        }
    }
}
