/// Sampled analog signal produced by a line coder or carrier modulator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: f32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time axis in seconds, one entry per sample.
    pub fn times(&self) -> Vec<f32> {
        (0..self.samples.len())
            .map(|i| i as f32 / self.sample_rate)
            .collect()
    }

    /// Mean of squared samples, 0 for an empty waveform.
    pub fn power(&self) -> f32 {
        mean_power(&self.samples)
    }
}

pub(crate) fn mean(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}

pub(crate) fn mean_power(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32
}

/// Sum of element-wise products over the shorter of the two slices.
pub(crate) fn correlate(samples: &[f32], reference: &[f32]) -> f32 {
    samples.iter().zip(reference).map(|(a, b)| a * b).sum()
}
