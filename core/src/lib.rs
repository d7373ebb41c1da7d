//! Physical and link layer simulator
//!
//! Line codes and carrier modulations over an AWGN channel, framing, and
//! error control (parity, checksum, CRC-32, Hamming(7,4)).

pub mod bits;
pub mod carrier;
pub mod channel;
pub mod config;
pub mod error;
pub mod error_control;
pub mod framing;
pub mod hamming;
pub mod line;
pub mod scheme;
pub mod transmit;
pub mod waveform;

pub use carrier::CarrierModulator;
pub use channel::{add_awgn, NoiseChannel};
pub use config::ModemConfig;
pub use error::{Decoded, LinkError, Result};
pub use error_control::ErrorDetection;
pub use framing::Framing;
pub use line::{AmiPolarity, LineCoder};
pub use scheme::Scheme;
pub use transmit::{bit_error_rate, Transmission, TransmitParams, Transmitter};
pub use waveform::Waveform;

// Modem configuration
pub const DEFAULT_SAMPLES_PER_BIT: usize = 50;
pub const MIN_SAMPLES_PER_BIT: usize = 4;
pub const DEFAULT_AMPLITUDE: f32 = 1.0;
pub const NOMINAL_BIT_PERIOD: f32 = 1.0; // seconds

// Line coding
pub const AMI_ZERO_THRESHOLD: f32 = 0.4; // fraction of V

// Carrier modulation (Hz, with a 1 s bit period)
pub const ASK_CARRIER_HZ: f32 = 10.0;
pub const FSK_MARK_HZ: f32 = 2.0; // bit 1
pub const FSK_SPACE_HZ: f32 = 1.0; // bit 0
pub const QPSK_BITS_PER_SYMBOL: usize = 2;
pub const QAM16_BITS_PER_SYMBOL: usize = 4;

// Channel
pub const NOISE_FLOOR_FALLBACK: f64 = 0.001;

// Framing
pub const MAX_COUNTED_PAYLOAD: usize = 254;
pub const FLAG_BYTE: u8 = 0x7E;
pub const ESC_BYTE: u8 = 0x7D;
pub const BIT_FLAG: [bool; 8] = [false, true, true, true, true, true, true, false];
pub const STUFFING_RUN: usize = 5;

// CRC-32 (IEEE 802.3, MSB first)
pub const CRC32_POLY: u32 = 0x04C1_1DB7;
pub const CRC32_INIT: u32 = 0xFFFF_FFFF;
pub const CRC32_XOR_OUT: u32 = 0xFFFF_FFFF;
