//! One-shot transmission: text -> bits -> Hamming -> framing -> error
//! detection -> waveform -> channel, and the exact reverse on receive.

use crate::bits::{bits_to_text, text_to_bits};
use crate::channel::NoiseChannel;
use crate::config::ModemConfig;
use crate::error::Result;
use crate::error_control::ErrorDetection;
use crate::framing::Framing;
use crate::hamming;
use crate::scheme::Scheme;
use crate::waveform::Waveform;
use rand::Rng;

/// The parameter bag of one transmission.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransmitParams {
    pub modem: ModemConfig,
    pub scheme: Scheme,
    pub framing: Framing,
    pub detection: ErrorDetection,
    pub hamming: bool,
    /// `None` or <= 0 dB means a noiseless channel.
    pub snr_db: Option<f64>,
}

/// What goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    /// Bits after Hamming, framing and error detection
    pub bits: Vec<bool>,
    pub waveform: Waveform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    /// Demodulated bits, truncated to the transmitted length
    pub bits: Vec<bool>,
    pub text: String,
    /// Parity, checksum or CRC mismatch
    pub error_detected: bool,
    /// Frame did not follow its framing discipline
    pub framing_error: bool,
    pub corrected_blocks: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    pub tx_bits: Vec<bool>,
    pub tx_waveform: Waveform,
    pub rx_waveform: Waveform,
    pub rx_bits: Vec<bool>,
    pub text: String,
    pub error_detected: bool,
    pub framing_error: bool,
    pub corrected_blocks: usize,
    pub bit_error_rate: f64,
}

impl Transmission {
    fn empty(sample_rate: f32) -> Self {
        Self {
            tx_bits: Vec::new(),
            tx_waveform: Waveform::new(Vec::new(), sample_rate),
            rx_waveform: Waveform::new(Vec::new(), sample_rate),
            rx_bits: Vec::new(),
            text: String::new(),
            error_detected: false,
            framing_error: false,
            corrected_blocks: 0,
            bit_error_rate: 0.0,
        }
    }
}

/// Fraction of positions where `rx` differs from `tx`. Bits present in only
/// one of the two count as errors.
pub fn bit_error_rate(tx: &[bool], rx: &[bool]) -> f64 {
    let total = tx.len().max(rx.len());
    if total == 0 {
        return 0.0;
    }
    let mismatched = tx.iter().zip(rx).filter(|(a, b)| a != b).count();
    let missing = tx.len().abs_diff(rx.len());
    (mismatched + missing) as f64 / total as f64
}

pub struct Transmitter {
    params: TransmitParams,
}

impl Transmitter {
    pub fn new(params: TransmitParams) -> Result<Self> {
        params.modem.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &TransmitParams {
        &self.params
    }

    /// Encode `text` into wire bits and modulate them.
    pub fn send(&self, text: &str) -> Result<Sent> {
        let p = &self.params;
        let mut bits = text_to_bits(text);
        log::debug!("{} payload bits", bits.len());

        if p.hamming {
            bits = hamming::encode(&bits);
            log::debug!("{} bits after Hamming(7,4)", bits.len());
        }

        bits = p.framing.encode(&bits);
        log::debug!("{} bits after {} framing", bits.len(), p.framing);

        bits = p.detection.encode(&bits);
        log::debug!("{} bits after {} trailer", bits.len(), p.detection);

        let waveform = p.scheme.modulate(&p.modem, &bits)?;
        log::debug!("{} modulated to {} samples", p.scheme, waveform.len());

        Ok(Sent { bits, waveform })
    }

    /// Demodulate `waveform` and undo every encoding stage.
    ///
    /// `tx_bit_len` is the number of wire bits that were sent; symbol padding
    /// beyond it is discarded.
    pub fn receive(&self, waveform: &Waveform, tx_bit_len: usize) -> Result<Received> {
        let p = &self.params;
        let mut bits = p.scheme.demodulate(&p.modem, &waveform.samples)?;
        bits.truncate(tx_bit_len);

        let checked = p.detection.decode(&bits);
        if checked.error {
            log::warn!("{} reported corruption", p.detection);
        }

        let deframed = p.framing.decode(&checked.payload);

        let (data, corrected_blocks) = if p.hamming {
            let decoded = hamming::decode(&deframed.payload);
            (decoded.bits, decoded.corrected_blocks)
        } else {
            (deframed.payload, 0)
        };

        Ok(Received {
            text: bits_to_text(&data),
            bits,
            error_detected: checked.error,
            framing_error: deframed.error,
            corrected_blocks,
        })
    }

    /// Full pipeline with the channel in between. `rng` drives the noise.
    pub fn transmit<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<Transmission> {
        if text.is_empty() {
            return Ok(Transmission::empty(self.params.modem.sample_rate()));
        }

        let sent = self.send(text)?;
        let channel = NoiseChannel::new(self.params.snr_db);
        let rx_waveform = channel.apply(&sent.waveform, rng);
        let received = self.receive(&rx_waveform, sent.bits.len())?;

        Ok(Transmission {
            bit_error_rate: bit_error_rate(&sent.bits, &received.bits),
            tx_bits: sent.bits,
            tx_waveform: sent.waveform,
            rx_waveform,
            rx_bits: received.bits,
            text: received.text,
            error_detected: received.error_detected,
            framing_error: received.framing_error,
            corrected_blocks: received.corrected_blocks,
        })
    }
}
