use linkwave_core::bits::format_bits;
use linkwave_core::{
    ErrorDetection, Framing, ModemConfig, Scheme, TransmitParams, Transmission, Transmitter,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Transmitter configured from the front end's parameter bag
#[wasm_bindgen]
pub struct WasmTransmitter {
    inner: Transmitter,
}

#[wasm_bindgen]
impl WasmTransmitter {
    /// `snr_db <= 0` selects a noiseless channel.
    #[wasm_bindgen(constructor)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scheme: &str,
        framing: &str,
        detection: &str,
        hamming: bool,
        samples_per_bit: usize,
        amplitude: f32,
        snr_db: f64,
    ) -> Result<WasmTransmitter, JsValue> {
        let params = TransmitParams {
            modem: ModemConfig::new(samples_per_bit, amplitude).map_err(js_error)?,
            scheme: scheme.parse::<Scheme>().map_err(js_error)?,
            framing: framing.parse::<Framing>().map_err(js_error)?,
            detection: detection.parse::<ErrorDetection>().map_err(js_error)?,
            hamming,
            snr_db: (snr_db > 0.0).then_some(snr_db),
        };
        Transmitter::new(params)
            .map(|inner| WasmTransmitter { inner })
            .map_err(js_error)
    }

    /// Run one transmission; `seed` makes the channel noise reproducible
    #[wasm_bindgen]
    pub fn transmit(&self, text: &str, seed: u64) -> Result<WasmTransmission, JsValue> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.inner
            .transmit(text, &mut rng)
            .map(|inner| WasmTransmission { inner })
            .map_err(js_error)
    }
}

#[wasm_bindgen]
pub struct WasmTransmission {
    inner: Transmission,
}

#[wasm_bindgen]
impl WasmTransmission {
    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.inner.text.clone()
    }

    #[wasm_bindgen(getter, js_name = errorDetected)]
    pub fn error_detected(&self) -> bool {
        self.inner.error_detected
    }

    #[wasm_bindgen(getter, js_name = framingError)]
    pub fn framing_error(&self) -> bool {
        self.inner.framing_error
    }

    #[wasm_bindgen(getter, js_name = correctedBlocks)]
    pub fn corrected_blocks(&self) -> usize {
        self.inner.corrected_blocks
    }

    #[wasm_bindgen(getter, js_name = bitErrorRate)]
    pub fn bit_error_rate(&self) -> f64 {
        self.inner.bit_error_rate
    }

    #[wasm_bindgen(getter, js_name = sampleRate)]
    pub fn sample_rate(&self) -> f32 {
        self.inner.tx_waveform.sample_rate
    }

    /// Transmitted samples as a Float32Array
    #[wasm_bindgen(js_name = txSamples)]
    pub fn tx_samples(&self) -> Vec<f32> {
        self.inner.tx_waveform.samples.clone()
    }

    /// Received (noisy) samples as a Float32Array
    #[wasm_bindgen(js_name = rxSamples)]
    pub fn rx_samples(&self) -> Vec<f32> {
        self.inner.rx_waveform.samples.clone()
    }

    #[wasm_bindgen(js_name = txBits)]
    pub fn tx_bits(&self) -> String {
        format_bits(&self.inner.tx_bits)
    }

    #[wasm_bindgen(js_name = rxBits)]
    pub fn rx_bits(&self) -> String {
        format_bits(&self.inner.rx_bits)
    }
}
