//! Passband modulation: ASK, FSK, QPSK and 16-QAM.
//!
//! Each bit (or symbol) interval starts its carrier at phase zero. QPSK and
//! 16-QAM zero-pad the bit stream to whole symbols; the demodulators return
//! those padding bits too, so callers truncate to the length they sent.

use crate::config::ModemConfig;
use crate::error::{LinkError, Result};
use crate::waveform::{correlate, mean_power, Waveform};
use crate::{
    ASK_CARRIER_HZ, FSK_MARK_HZ, FSK_SPACE_HZ, NOMINAL_BIT_PERIOD, QAM16_BITS_PER_SYMBOL,
    QPSK_BITS_PER_SYMBOL,
};
use std::f32::consts::PI;

/// QPSK Gray map: symbol value (first bit is MSB) -> (I, Q) signs.
const QPSK_GRAY_MAP: [(u8, (f32, f32)); 4] = [
    (0b00, (1.0, 1.0)),
    (0b01, (-1.0, 1.0)),
    (0b11, (-1.0, -1.0)),
    (0b10, (1.0, -1.0)),
];

/// 16-QAM per-axis Gray map: 2-bit value -> index into the ascending level table.
/// The table is its own inverse.
const QAM16_GRAY_MAP: [usize; 4] = [0, 1, 3, 2];

/// Group bits into symbol values of `bits_per_symbol` bits, first bit most
/// significant, zero-padding the final group.
pub fn bits_to_symbols(bits: &[bool], bits_per_symbol: usize) -> Vec<u8> {
    bits.chunks(bits_per_symbol)
        .map(|chunk| {
            let mut value = 0u8;
            for i in 0..bits_per_symbol {
                value = (value << 1) | chunk.get(i).copied().unwrap_or(false) as u8;
            }
            value
        })
        .collect()
}

fn push_symbol_bits(bits: &mut Vec<bool>, value: u8, bits_per_symbol: usize) {
    for i in (0..bits_per_symbol).rev() {
        bits.push((value >> i) & 1 == 1);
    }
}

/// Orthonormal-style I/Q basis over one symbol: one carrier cycle per symbol,
/// scaled by sqrt(2 / Ts).
struct QuadratureBasis {
    in_phase: Vec<f32>,
    quadrature: Vec<f32>,
    energy: f32,
}

impl QuadratureBasis {
    fn new(samples_per_symbol: usize, symbol_period: f32, sample_rate: f32) -> Self {
        let fc = 1.0 / symbol_period;
        let scale = (2.0 / symbol_period).sqrt();
        let mut in_phase = Vec::with_capacity(samples_per_symbol);
        let mut quadrature = Vec::with_capacity(samples_per_symbol);
        for n in 0..samples_per_symbol {
            let phase = 2.0 * PI * fc * n as f32 / sample_rate;
            in_phase.push(scale * phase.cos());
            quadrature.push(-scale * phase.sin());
        }
        let energy = in_phase.iter().map(|x| x * x).sum();
        Self {
            in_phase,
            quadrature,
            energy,
        }
    }

    fn synthesize(&self, i: f32, q: f32, out: &mut Vec<f32>) {
        out.extend(
            self.in_phase
                .iter()
                .zip(&self.quadrature)
                .map(|(phi_i, phi_q)| i * phi_i + q * phi_q),
        );
    }

    /// Projection of one symbol interval onto each axis, normalized by the
    /// reference energy so the result is in amplitude units.
    fn project(&self, symbol: &[f32]) -> (f32, f32) {
        (
            correlate(symbol, &self.in_phase) / self.energy,
            correlate(symbol, &self.quadrature) / self.energy,
        )
    }
}

pub struct CarrierModulator {
    config: ModemConfig,
}

impl CarrierModulator {
    pub fn new(config: ModemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn sample_rate(&self) -> f32 {
        self.config.sample_rate()
    }

    /// `amplitude * sin(2 pi f t)` over one bit interval.
    fn tone(&self, freq: f32, amplitude: f32) -> Vec<f32> {
        let fs = self.sample_rate();
        (0..self.config.samples_per_bit)
            .map(|n| amplitude * (2.0 * PI * freq * n as f32 / fs).sin())
            .collect()
    }

    /// ASK carrier frequency. Drops to fs/4 when the nominal carrier would sit
    /// at or above Nyquist.
    pub fn ask_carrier_hz(&self) -> f32 {
        let fs = self.sample_rate();
        if 2.0 * ASK_CARRIER_HZ >= fs {
            fs / 4.0
        } else {
            ASK_CARRIER_HZ
        }
    }

    /// 1 -> one bit interval of carrier, 0 -> silence.
    pub fn ask(&self, bits: &[bool]) -> Waveform {
        let carrier = self.tone(self.ask_carrier_hz(), self.config.amplitude);
        let silence = vec![0.0; self.config.samples_per_bit];

        let mut samples = Vec::with_capacity(bits.len() * carrier.len());
        for &bit in bits {
            samples.extend_from_slice(if bit { &carrier } else { &silence });
        }
        Waveform::new(samples, self.sample_rate())
    }

    /// Mean power per interval against a V^2/4 threshold.
    pub fn decode_ask(&self, samples: &[f32]) -> Vec<bool> {
        let threshold = self.config.amplitude * self.config.amplitude / 4.0;
        samples
            .chunks_exact(self.config.samples_per_bit)
            .map(|chunk| mean_power(chunk) > threshold)
            .collect()
    }

    fn check_fsk_tones(&self) -> Result<()> {
        let fs = self.sample_rate();
        if 2.0 * FSK_MARK_HZ.max(FSK_SPACE_HZ) >= fs {
            return Err(LinkError::InvalidConfig(format!(
                "FSK tone of {} Hz is not representable at {} samples per bit",
                FSK_MARK_HZ.max(FSK_SPACE_HZ),
                self.config.samples_per_bit
            )));
        }
        Ok(())
    }

    /// 1 -> tone at f1, 0 -> tone at f2, phase restarting every bit.
    pub fn fsk(&self, bits: &[bool]) -> Result<Waveform> {
        self.check_fsk_tones()?;

        let mark = self.tone(FSK_MARK_HZ, self.config.amplitude);
        let space = self.tone(FSK_SPACE_HZ, self.config.amplitude);

        let mut samples = Vec::with_capacity(bits.len() * mark.len());
        for &bit in bits {
            samples.extend_from_slice(if bit { &mark } else { &space });
        }
        Ok(Waveform::new(samples, self.sample_rate()))
    }

    /// Non-coherent energy detector: correlate each interval with sine and
    /// cosine references at both tones and pick the stronger tone.
    pub fn decode_fsk(&self, samples: &[f32]) -> Vec<bool> {
        let fs = self.sample_rate();
        let spb = self.config.samples_per_bit;
        let reference = |freq: f32| -> (Vec<f32>, Vec<f32>) {
            (0..spb)
                .map(|n| {
                    let phase = 2.0 * PI * freq * n as f32 / fs;
                    (phase.sin(), phase.cos())
                })
                .unzip()
        };
        let (mark_sin, mark_cos) = reference(FSK_MARK_HZ);
        let (space_sin, space_cos) = reference(FSK_SPACE_HZ);

        samples
            .chunks_exact(spb)
            .map(|chunk| {
                let mark_energy =
                    correlate(chunk, &mark_sin).powi(2) + correlate(chunk, &mark_cos).powi(2);
                let space_energy =
                    correlate(chunk, &space_sin).powi(2) + correlate(chunk, &space_cos).powi(2);
                mark_energy > space_energy
            })
            .collect()
    }

    fn qpsk_basis(&self) -> QuadratureBasis {
        let bps = QPSK_BITS_PER_SYMBOL;
        QuadratureBasis::new(
            bps * self.config.samples_per_bit,
            bps as f32 * NOMINAL_BIT_PERIOD,
            self.sample_rate(),
        )
    }

    fn qam16_basis(&self) -> QuadratureBasis {
        let bps = QAM16_BITS_PER_SYMBOL;
        QuadratureBasis::new(
            bps * self.config.samples_per_bit,
            bps as f32 * NOMINAL_BIT_PERIOD,
            self.sample_rate(),
        )
    }

    /// Two bits per symbol, Gray mapped to (+-V, +-V) on I/Q carriers.
    pub fn qpsk(&self, bits: &[bool]) -> Waveform {
        let basis = self.qpsk_basis();
        let v = self.config.amplitude;
        let symbols = bits_to_symbols(bits, QPSK_BITS_PER_SYMBOL);

        let mut samples = Vec::with_capacity(symbols.len() * basis.in_phase.len());
        for symbol in symbols {
            let (i, q) = QPSK_GRAY_MAP
                .iter()
                .find(|(value, _)| *value == symbol)
                .map(|(_, point)| *point)
                .unwrap_or((1.0, 1.0));
            basis.synthesize(i * v, q * v, &mut samples);
        }
        Waveform::new(samples, self.sample_rate())
    }

    /// Decides each symbol from the signs of its I/Q projections.
    pub fn decode_qpsk(&self, samples: &[f32]) -> Vec<bool> {
        let basis = self.qpsk_basis();
        let mut bits = Vec::new();
        for symbol in samples.chunks_exact(basis.in_phase.len()) {
            let (i_hat, q_hat) = basis.project(symbol);
            let value = QPSK_GRAY_MAP
                .iter()
                .find(|(_, (i, q))| (i_hat > 0.0) == (*i > 0.0) && (q_hat > 0.0) == (*q > 0.0))
                .map(|(value, _)| *value)
                .unwrap_or(0b10);
            push_symbol_bits(&mut bits, value, QPSK_BITS_PER_SYMBOL);
        }
        bits
    }

    /// Per-axis amplitude levels, ascending: -3a, -a, a, 3a with a = V / (3 sqrt 2).
    pub fn qam16_levels(&self) -> [f32; 4] {
        let outer = self.config.amplitude / 2.0f32.sqrt();
        let inner = self.config.amplitude / (3.0 * 2.0f32.sqrt());
        [-outer, -inner, inner, outer]
    }

    /// Four bits per symbol: the first two pick the I level, the last two the
    /// Q level, each through the 2-bit Gray map.
    pub fn qam16(&self, bits: &[bool]) -> Waveform {
        let basis = self.qam16_basis();
        let levels = self.qam16_levels();
        let symbols = bits_to_symbols(bits, QAM16_BITS_PER_SYMBOL);

        let mut samples = Vec::with_capacity(symbols.len() * basis.in_phase.len());
        for symbol in symbols {
            let i = levels[QAM16_GRAY_MAP[(symbol >> 2) as usize]];
            let q = levels[QAM16_GRAY_MAP[(symbol & 0b11) as usize]];
            basis.synthesize(i, q, &mut samples);
        }
        Waveform::new(samples, self.sample_rate())
    }

    /// Nearest level per axis, then back through the Gray map.
    pub fn decode_qam16(&self, samples: &[f32]) -> Vec<bool> {
        let basis = self.qam16_basis();
        let levels = self.qam16_levels();
        let nearest = |x: f32| -> u8 {
            let idx = levels
                .iter()
                .enumerate()
                .min_by(|a, b| (x - a.1).abs().total_cmp(&(x - b.1).abs()))
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            // The Gray map is an involution, so it also inverts itself
            QAM16_GRAY_MAP[idx] as u8
        };

        let mut bits = Vec::new();
        for symbol in samples.chunks_exact(basis.in_phase.len()) {
            let (i_hat, q_hat) = basis.project(symbol);
            let value = (nearest(i_hat) << 2) | nearest(q_hat);
            push_symbol_bits(&mut bits, value, QAM16_BITS_PER_SYMBOL);
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{bytes_to_bits, parse_bits};

    fn modulator(spb: usize) -> CarrierModulator {
        CarrierModulator::new(ModemConfig::new(spb, 1.0).unwrap()).unwrap()
    }

    #[test]
    fn test_bits_to_symbols_pads() {
        assert_eq!(bits_to_symbols(&parse_bits("10011"), 2), vec![0b10, 0b01, 0b10]);
        assert_eq!(bits_to_symbols(&parse_bits("101"), 4), vec![0b1010]);
        assert!(bits_to_symbols(&[], 4).is_empty());
    }

    #[test]
    fn test_ask_silence_and_carrier() {
        let m = modulator(50);
        let wave = m.ask(&parse_bits("01"));
        assert_eq!(wave.len(), 100);
        assert!(wave.samples[..50].iter().all(|&s| s == 0.0));
        assert!(mean_power(&wave.samples[50..]) > 0.4);
    }

    #[test]
    fn test_ask_carrier_falls_back_below_nyquist() {
        assert_eq!(modulator(50).ask_carrier_hz(), 10.0);
        assert_eq!(modulator(20).ask_carrier_hz(), 5.0);
        assert_eq!(modulator(4).ask_carrier_hz(), 1.0);
    }

    #[test]
    fn test_fsk_rejects_unrepresentable_tone() {
        assert!(modulator(4).fsk(&parse_bits("1")).is_err());
        assert!(modulator(5).fsk(&parse_bits("1")).is_ok());
    }

    #[test]
    fn test_qpsk_gray_constellation() {
        let m = modulator(8);
        let basis = m.qpsk_basis();
        for (value, (i, q)) in QPSK_GRAY_MAP {
            let mut bits = Vec::new();
            push_symbol_bits(&mut bits, value, 2);
            let wave = m.qpsk(&bits);
            let (i_hat, q_hat) = basis.project(&wave.samples);
            assert!((i_hat - i).abs() < 1e-4, "I for {:02b}: {}", value, i_hat);
            assert!((q_hat - q).abs() < 1e-4, "Q for {:02b}: {}", value, q_hat);
        }
    }

    #[test]
    fn test_qam16_projection_hits_levels() {
        let m = modulator(10);
        let levels = m.qam16_levels();
        let basis = m.qam16_basis();
        // 0111 -> I from 01 (level 1), Q from 11 (level 3)
        let wave = m.qam16(&parse_bits("0111"));
        let (i_hat, q_hat) = basis.project(&wave.samples);
        assert!((i_hat - levels[1]).abs() < 1e-4);
        assert!((q_hat - levels[3]).abs() < 1e-4);
    }

    #[test]
    fn test_round_trips_with_padding() {
        let bits = bytes_to_bits(b"Hi!\x00\xff");
        let odd: Vec<bool> = bits[..37].to_vec();
        for spb in [5, 8, 16, 50] {
            let m = modulator(spb);
            for input in [&bits, &odd] {
                assert_eq!(&m.decode_ask(&m.ask(input).samples), input);
                assert_eq!(&m.decode_fsk(&m.fsk(input).unwrap().samples), input);

                let qpsk = m.decode_qpsk(&m.qpsk(input).samples);
                assert_eq!(qpsk.len() % 2, 0);
                assert_eq!(&qpsk[..input.len()], &input[..]);

                let qam = m.decode_qam16(&m.qam16(input).samples);
                assert_eq!(qam.len() % 4, 0);
                assert_eq!(&qam[..input.len()], &input[..]);
            }
        }
    }

    #[test]
    fn test_all_qam16_symbols() {
        let m = modulator(4);
        let mut bits = Vec::new();
        for value in 0..16u8 {
            push_symbol_bits(&mut bits, value, 4);
        }
        assert_eq!(m.decode_qam16(&m.qam16(&bits).samples), bits);
    }
}
