use crate::error::{LinkError, Result};
use crate::{DEFAULT_AMPLITUDE, DEFAULT_SAMPLES_PER_BIT, MIN_SAMPLES_PER_BIT, NOMINAL_BIT_PERIOD};

/// Parameters shared by every line coder and carrier modulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModemConfig {
    /// Samples per bit interval (>= 4)
    pub samples_per_bit: usize,
    /// Peak amplitude V
    pub amplitude: f32,
}

impl ModemConfig {
    pub fn new(samples_per_bit: usize, amplitude: f32) -> Result<Self> {
        let config = Self {
            samples_per_bit,
            amplitude,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.samples_per_bit < MIN_SAMPLES_PER_BIT {
            return Err(LinkError::InvalidConfig(format!(
                "samples per bit must be >= {}, got {}",
                MIN_SAMPLES_PER_BIT, self.samples_per_bit
            )));
        }
        if !self.amplitude.is_finite() || self.amplitude <= 0.0 {
            return Err(LinkError::InvalidConfig(format!(
                "amplitude must be a positive number, got {}",
                self.amplitude
            )));
        }
        Ok(())
    }

    /// Sample rate in Hz, with one bit lasting `NOMINAL_BIT_PERIOD` seconds.
    pub fn sample_rate(&self) -> f32 {
        self.samples_per_bit as f32 / NOMINAL_BIT_PERIOD
    }
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            samples_per_bit: DEFAULT_SAMPLES_PER_BIT,
            amplitude: DEFAULT_AMPLITUDE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ModemConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate(), 50.0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ModemConfig::new(3, 1.0).is_err());
        assert!(ModemConfig::new(4, 0.0).is_err());
        assert!(ModemConfig::new(4, -1.0).is_err());
        assert!(ModemConfig::new(4, f32::NAN).is_err());
        assert!(ModemConfig::new(4, 0.5).is_ok());
    }
}
