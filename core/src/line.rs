//! Baseband line coding: NRZ-Polar, Manchester and Bipolar-AMI.
//!
//! Every encoder holds each level for whole sample intervals; every decoder
//! looks at `len / samples_per_bit` complete intervals and ignores a trailing
//! partial one.

use crate::config::ModemConfig;
use crate::error::Result;
use crate::waveform::{mean, Waveform};
use crate::AMI_ZERO_THRESHOLD;

/// Polarity state of a Bipolar-AMI encoder.
///
/// The first mark after `AmiPolarity::default()` is sent at +V. Start a new
/// value for every independent transmission; carrying one over shifts the
/// starting polarity of the next stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmiPolarity {
    next_positive: bool,
}

impl AmiPolarity {
    /// Sign of the next mark, advancing the state.
    fn next_mark(&mut self) -> f32 {
        let sign = if self.next_positive { 1.0 } else { -1.0 };
        self.next_positive = !self.next_positive;
        sign
    }

    pub fn next_is_positive(&self) -> bool {
        self.next_positive
    }
}

impl Default for AmiPolarity {
    fn default() -> Self {
        Self {
            next_positive: true,
        }
    }
}

pub struct LineCoder {
    config: ModemConfig,
}

impl LineCoder {
    pub fn new(config: ModemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn waveform_from_levels(&self, bits: &[bool], mut level: impl FnMut(bool) -> f32) -> Waveform {
        let spb = self.config.samples_per_bit;
        let mut samples = Vec::with_capacity(bits.len() * spb);
        for &bit in bits {
            let value = level(bit);
            samples.extend(std::iter::repeat(value).take(spb));
        }
        Waveform::new(samples, self.config.sample_rate())
    }

    /// 1 -> +V, 0 -> -V for the whole bit interval.
    pub fn nrz_polar(&self, bits: &[bool]) -> Waveform {
        let v = self.config.amplitude;
        self.waveform_from_levels(bits, |bit| if bit { v } else { -v })
    }

    /// 1 -> +V then -V, 0 -> -V then +V.
    ///
    /// With an odd sample count the second half is one sample longer.
    pub fn manchester(&self, bits: &[bool]) -> Waveform {
        let spb = self.config.samples_per_bit;
        let half = spb / 2;
        let v = self.config.amplitude;

        let mut samples = Vec::with_capacity(bits.len() * spb);
        for &bit in bits {
            let first = if bit { v } else { -v };
            samples.extend(std::iter::repeat(first).take(half));
            samples.extend(std::iter::repeat(-first).take(spb - half));
        }
        Waveform::new(samples, self.config.sample_rate())
    }

    /// Bipolar-AMI starting from a fresh polarity: 0 -> 0 V, marks alternate
    /// +V, -V, +V, ...
    pub fn bipolar_ami(&self, bits: &[bool]) -> Waveform {
        let mut polarity = AmiPolarity::default();
        self.bipolar_ami_with(bits, &mut polarity)
    }

    /// Bipolar-AMI continuing from `polarity`, which is left pointing at the
    /// sign of the next mark.
    pub fn bipolar_ami_with(&self, bits: &[bool], polarity: &mut AmiPolarity) -> Waveform {
        let v = self.config.amplitude;
        self.waveform_from_levels(bits, |bit| if bit { v * polarity.next_mark() } else { 0.0 })
    }

    fn intervals<'a>(&self, samples: &'a [f32]) -> impl Iterator<Item = &'a [f32]> {
        let spb = self.config.samples_per_bit;
        samples.chunks_exact(spb)
    }

    /// Sign of the mean over each bit interval.
    pub fn decode_nrz_polar(&self, samples: &[f32]) -> Vec<bool> {
        self.intervals(samples).map(|chunk| mean(chunk) > 0.0).collect()
    }

    /// First half mean above second half mean means 1.
    pub fn decode_manchester(&self, samples: &[f32]) -> Vec<bool> {
        let half = self.config.samples_per_bit / 2;
        self.intervals(samples)
            .map(|chunk| mean(&chunk[..half]) > mean(&chunk[half..]))
            .collect()
    }

    /// Magnitude-only detector: |mean| below 0.4 V is a 0, anything else a 1.
    ///
    /// Polarity alternation is not checked, so bipolar violations go unnoticed.
    pub fn decode_bipolar_ami(&self, samples: &[f32]) -> Vec<bool> {
        let threshold = self.config.amplitude * AMI_ZERO_THRESHOLD;
        self.intervals(samples)
            .map(|chunk| mean(chunk).abs() >= threshold)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bits;

    fn coder(spb: usize) -> LineCoder {
        LineCoder::new(ModemConfig::new(spb, 2.0).unwrap()).unwrap()
    }

    #[test]
    fn test_nrz_levels() {
        let wave = coder(4).nrz_polar(&parse_bits("10"));
        assert_eq!(wave.samples, vec![2.0, 2.0, 2.0, 2.0, -2.0, -2.0, -2.0, -2.0]);
        assert_eq!(wave.sample_rate, 4.0);
    }

    #[test]
    fn test_manchester_odd_samples_per_bit() {
        let wave = coder(5).manchester(&parse_bits("1"));
        assert_eq!(wave.samples, vec![2.0, 2.0, -2.0, -2.0, -2.0]);

        let decoded = coder(5).decode_manchester(&coder(5).manchester(&parse_bits("0110")).samples);
        assert_eq!(decoded, parse_bits("0110"));
    }

    #[test]
    fn test_ami_alternates_and_resets() {
        let coder = coder(4);
        let bits = parse_bits("1101");
        let first: Vec<f32> = coder.bipolar_ami(&bits).samples.chunks(4).map(|c| c[0]).collect();
        assert_eq!(first, vec![2.0, -2.0, 0.0, 2.0]);

        // A fresh call starts at +V again
        let second = coder.bipolar_ami(&parse_bits("1"));
        assert_eq!(second.samples[0], 2.0);
    }

    #[test]
    fn test_ami_continued_state() {
        let coder = coder(4);
        let mut polarity = AmiPolarity::default();
        coder.bipolar_ami_with(&parse_bits("1"), &mut polarity);
        assert!(!polarity.next_is_positive());

        let wave = coder.bipolar_ami_with(&parse_bits("1"), &mut polarity);
        assert_eq!(wave.samples[0], -2.0);
        assert!(polarity.next_is_positive());
    }

    #[test]
    fn test_round_trips() {
        let bits = parse_bits("0100100001001001 1111 0000 101");
        for spb in [4, 5, 8, 50] {
            let coder = coder(spb);
            assert_eq!(coder.decode_nrz_polar(&coder.nrz_polar(&bits).samples), bits);
            assert_eq!(coder.decode_manchester(&coder.manchester(&bits).samples), bits);
            assert_eq!(coder.decode_bipolar_ami(&coder.bipolar_ami(&bits).samples), bits);
        }
    }

    #[test]
    fn test_ami_decoder_ignores_polarity() {
        // Two consecutive +V marks violate AMI but still decode as 1 1
        let coder = coder(4);
        let samples = vec![2.0; 8];
        assert_eq!(coder.decode_bipolar_ami(&samples), vec![true, true]);
    }

    #[test]
    fn test_partial_interval_is_ignored() {
        let coder = coder(4);
        let samples = vec![2.0, 2.0, 2.0, 2.0, -2.0, -2.0];
        assert_eq!(coder.decode_nrz_polar(&samples), vec![true]);
    }
}
