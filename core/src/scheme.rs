use crate::carrier::CarrierModulator;
use crate::config::ModemConfig;
use crate::error::{LinkError, Result};
use crate::line::LineCoder;
use crate::waveform::Waveform;
use crate::{QAM16_BITS_PER_SYMBOL, QPSK_BITS_PER_SYMBOL};
use std::fmt;
use std::str::FromStr;

/// Every physical-layer encoding, chosen once per transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    #[default]
    NrzPolar,
    Manchester,
    BipolarAmi,
    Ask,
    Fsk,
    Qpsk,
    Qam16,
}

impl Scheme {
    pub const ALL: [Scheme; 7] = [
        Scheme::NrzPolar,
        Scheme::Manchester,
        Scheme::BipolarAmi,
        Scheme::Ask,
        Scheme::Fsk,
        Scheme::Qpsk,
        Scheme::Qam16,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scheme::NrzPolar => "nrz-polar",
            Scheme::Manchester => "manchester",
            Scheme::BipolarAmi => "ami",
            Scheme::Ask => "ask",
            Scheme::Fsk => "fsk",
            Scheme::Qpsk => "qpsk",
            Scheme::Qam16 => "16qam",
        }
    }

    pub fn bits_per_symbol(&self) -> usize {
        match self {
            Scheme::Qpsk => QPSK_BITS_PER_SYMBOL,
            Scheme::Qam16 => QAM16_BITS_PER_SYMBOL,
            _ => 1,
        }
    }

    /// Bits the modulator adds to fill the last symbol.
    pub fn padding_bits(&self, bit_len: usize) -> usize {
        let bps = self.bits_per_symbol();
        (bps - bit_len % bps) % bps
    }

    /// Modulate `bits`. AMI polarity always starts fresh.
    pub fn modulate(&self, config: &ModemConfig, bits: &[bool]) -> Result<Waveform> {
        let line = LineCoder::new(*config)?;
        let carrier = CarrierModulator::new(*config)?;
        let waveform = match self {
            Scheme::NrzPolar => line.nrz_polar(bits),
            Scheme::Manchester => line.manchester(bits),
            Scheme::BipolarAmi => line.bipolar_ami(bits),
            Scheme::Ask => carrier.ask(bits),
            Scheme::Fsk => carrier.fsk(bits)?,
            Scheme::Qpsk => carrier.qpsk(bits),
            Scheme::Qam16 => carrier.qam16(bits),
        };
        Ok(waveform)
    }

    /// Demodulate every complete bit/symbol interval, padding included.
    pub fn demodulate(&self, config: &ModemConfig, samples: &[f32]) -> Result<Vec<bool>> {
        let line = LineCoder::new(*config)?;
        let carrier = CarrierModulator::new(*config)?;
        let bits = match self {
            Scheme::NrzPolar => line.decode_nrz_polar(samples),
            Scheme::Manchester => line.decode_manchester(samples),
            Scheme::BipolarAmi => line.decode_bipolar_ami(samples),
            Scheme::Ask => carrier.decode_ask(samples),
            Scheme::Fsk => carrier.decode_fsk(samples),
            Scheme::Qpsk => carrier.decode_qpsk(samples),
            Scheme::Qam16 => carrier.decode_qam16(samples),
        };
        Ok(bits)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nrz-polar" | "nrz" => Ok(Scheme::NrzPolar),
            "manchester" => Ok(Scheme::Manchester),
            "ami" | "bipolar-ami" | "bipolar" => Ok(Scheme::BipolarAmi),
            "ask" => Ok(Scheme::Ask),
            "fsk" => Ok(Scheme::Fsk),
            "qpsk" => Ok(Scheme::Qpsk),
            "16qam" | "16-qam" | "qam16" => Ok(Scheme::Qam16),
            _ => Err(LinkError::UnknownScheme(s.to_string())),
        }
    }
}
