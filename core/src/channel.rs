//! Additive white Gaussian noise channel.

use crate::waveform::Waveform;
use crate::NOISE_FLOOR_FALLBACK;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Add zero-mean Gaussian noise so that signal power / noise power matches
/// `snr_db`.
///
/// Signal power is the mean of squared samples. An SNR that does not give a
/// usable linear ratio (NaN, -inf) falls back to a noise floor of
/// `NOISE_FLOOR_FALLBACK` times the signal power.
pub fn add_awgn<R: Rng + ?Sized>(waveform: &Waveform, snr_db: f64, rng: &mut R) -> Waveform {
    let signal_power = waveform.power() as f64;
    let snr_linear = 10f64.powf(snr_db / 10.0);
    let noise_power = if snr_linear.is_nan() || snr_linear == 0.0 {
        signal_power * NOISE_FLOOR_FALLBACK
    } else {
        signal_power / snr_linear
    };
    let std_dev = noise_power.sqrt();

    let samples = waveform
        .samples
        .iter()
        .map(|&s| {
            let z: f64 = StandardNormal.sample(&mut *rng);
            s + (z * std_dev) as f32
        })
        .collect();
    Waveform::new(samples, waveform.sample_rate)
}

/// Channel model of one transmission. `None` or an SNR at or below 0 dB
/// leaves the waveform untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoiseChannel {
    snr_db: Option<f64>,
}

impl NoiseChannel {
    pub fn new(snr_db: Option<f64>) -> Self {
        Self { snr_db }
    }

    pub fn is_noiseless(&self) -> bool {
        !matches!(self.snr_db, Some(snr) if snr > 0.0)
    }

    pub fn apply<R: Rng + ?Sized>(&self, waveform: &Waveform, rng: &mut R) -> Waveform {
        match self.snr_db {
            Some(snr) if snr > 0.0 => add_awgn(waveform, snr, rng),
            _ => waveform.clone(),
        }
    }
}
