use clap::{Parser, Subcommand};
use hound::WavSpec;
use linkwave_core::bits::format_bits;
use linkwave_core::{
    add_awgn, bit_error_rate, ErrorDetection, Framing, ModemConfig, NoiseChannel, Scheme,
    TransmitParams, Transmitter, Waveform, DEFAULT_AMPLITUDE, DEFAULT_SAMPLES_PER_BIT,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("SNR sweep needs at least one value")]
    EmptySweep,

    #[error("Bit count must be > 0")]
    NoBits,
}

#[derive(Parser)]
#[command(name = "linkwave")]
#[command(about = "Physical and link layer transmission simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send text through framing, error control, modulation and an AWGN channel
    Transmit {
        /// Text to transmit
        #[arg(value_name = "TEXT")]
        text: String,

        /// nrz-polar, manchester, ami, ask, fsk, qpsk or 16qam
        #[arg(short, long, default_value = "nrz-polar")]
        scheme: Scheme,

        /// none, count, byte-stuffing or bit-stuffing
        #[arg(short, long, default_value = "none")]
        framing: Framing,

        /// none, parity, checksum or crc32
        #[arg(short, long, default_value = "parity")]
        detection: ErrorDetection,

        /// Protect the payload with Hamming(7,4)
        #[arg(long)]
        hamming: bool,

        /// Samples per bit interval (>= 4)
        #[arg(long, default_value_t = DEFAULT_SAMPLES_PER_BIT)]
        samples_per_bit: usize,

        /// Peak amplitude V
        #[arg(long, default_value_t = DEFAULT_AMPLITUDE)]
        amplitude: f32,

        /// Channel SNR in dB (omit or <= 0 for a noiseless channel)
        #[arg(long, allow_negative_numbers = true)]
        snr_db: Option<f64>,

        /// Noise RNG seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Write the transmitted waveform as a 32-bit float WAV file
        #[arg(long, value_name = "TX.WAV")]
        tx_wav: Option<PathBuf>,

        /// Write the received (noisy) waveform as a 32-bit float WAV file
        #[arg(long, value_name = "RX.WAV")]
        rx_wav: Option<PathBuf>,

        /// Print a JSON report instead of the text summary
        #[arg(long)]
        json: bool,
    },

    /// Measure raw bit error rate of a scheme over a range of SNR values
    Ber {
        /// Modulation scheme to measure
        #[arg(value_name = "SCHEME")]
        scheme: Scheme,

        /// Comma-separated SNR values in dB. Raw AWGN: unlike `transmit`,
        /// 0 dB and below still add noise
        #[arg(
            long,
            value_delimiter = ',',
            allow_hyphen_values = true,
            default_values_t = vec![2.0, 4.0, 6.0, 8.0, 10.0]
        )]
        snr_db: Vec<f64>,

        /// Random payload bits per SNR point
        #[arg(long, default_value_t = 10_000)]
        bits: usize,

        #[arg(long, default_value_t = DEFAULT_SAMPLES_PER_BIT)]
        samples_per_bit: usize,

        #[arg(long, default_value_t = DEFAULT_AMPLITUDE)]
        amplitude: f32,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct TransmitReport<'a> {
    text_in: &'a str,
    text_out: &'a str,
    scheme: String,
    framing: String,
    detection: String,
    hamming: bool,
    samples_per_bit: usize,
    amplitude: f32,
    snr_db: Option<f64>,
    seed: u64,
    tx_bits: String,
    rx_bits: String,
    samples: usize,
    error_detected: bool,
    framing_error: bool,
    corrected_blocks: usize,
    bit_error_rate: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Transmit {
            text,
            scheme,
            framing,
            detection,
            hamming,
            samples_per_bit,
            amplitude,
            snr_db,
            seed,
            tx_wav,
            rx_wav,
            json,
        } => {
            let params = TransmitParams {
                modem: ModemConfig::new(samples_per_bit, amplitude)?,
                scheme,
                framing,
                detection,
                hamming,
                snr_db,
            };
            transmit_command(
                &text,
                Transmitter::new(params)?,
                seed,
                tx_wav.as_deref(),
                rx_wav.as_deref(),
                json,
            )?
        }
        Commands::Ber {
            scheme,
            snr_db,
            bits,
            samples_per_bit,
            amplitude,
            seed,
        } => {
            let modem = ModemConfig::new(samples_per_bit, amplitude)?;
            ber_command(scheme, modem, &snr_db, bits, seed)?
        }
    }

    Ok(())
}

fn transmit_command(
    text: &str,
    transmitter: Transmitter,
    seed: Option<u64>,
    tx_wav: Option<&Path>,
    rx_wav: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let result = transmitter.transmit(text, &mut rng)?;
    let params = transmitter.params();

    if let Some(path) = tx_wav {
        write_wav(path, &result.tx_waveform)?;
        log::info!("Wrote transmitted waveform to {}", path.display());
    }
    if let Some(path) = rx_wav {
        write_wav(path, &result.rx_waveform)?;
        log::info!("Wrote received waveform to {}", path.display());
    }

    if json {
        let report = TransmitReport {
            text_in: text,
            text_out: &result.text,
            scheme: params.scheme.to_string(),
            framing: params.framing.to_string(),
            detection: params.detection.to_string(),
            hamming: params.hamming,
            samples_per_bit: params.modem.samples_per_bit,
            amplitude: params.modem.amplitude,
            snr_db: params.snr_db,
            seed,
            tx_bits: format_bits(&result.tx_bits),
            rx_bits: format_bits(&result.rx_bits),
            samples: result.tx_waveform.len(),
            error_detected: result.error_detected,
            framing_error: result.framing_error,
            corrected_blocks: result.corrected_blocks,
            bit_error_rate: result.bit_error_rate,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Scheme: {}, framing: {}, detection: {}, hamming: {}",
        params.scheme,
        params.framing,
        params.detection,
        if params.hamming { "on" } else { "off" }
    );
    match params.snr_db {
        Some(snr) if !NoiseChannel::new(params.snr_db).is_noiseless() => {
            println!("Channel: AWGN at {} dB (seed {})", snr, seed)
        }
        _ => println!("Channel: noiseless"),
    }
    println!(
        "Bits TX ({}): {}",
        result.tx_bits.len(),
        format_bits(&result.tx_bits)
    );
    println!(
        "Bits RX ({}): {}",
        result.rx_bits.len(),
        format_bits(&result.rx_bits)
    );
    println!("Samples: {}", result.tx_waveform.len());
    println!("Bit error rate: {:.6}", result.bit_error_rate);
    if result.corrected_blocks > 0 {
        println!("Hamming corrected blocks: {}", result.corrected_blocks);
    }
    if result.framing_error {
        println!("Framing: malformed frame");
    }
    println!(
        "Error detected: {}",
        if result.error_detected { "yes" } else { "no" }
    );
    println!("Received: {}", result.text);

    Ok(())
}

fn ber_command(
    scheme: Scheme,
    modem: ModemConfig,
    snr_values: &[f64],
    bit_count: usize,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    if snr_values.is_empty() {
        return Err(CliError::EmptySweep.into());
    }
    if bit_count == 0 {
        return Err(CliError::NoBits.into());
    }

    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let bits: Vec<bool> = (0..bit_count).map(|_| rng.gen::<bool>()).collect();
    let clean = scheme.modulate(&modem, &bits)?;

    println!("# {} over {} bits (seed {})", scheme, bit_count, seed);
    println!("{:>8}  {:>10}", "snr_db", "ber");
    for &snr in snr_values {
        let noisy = add_awgn(&clean, snr, &mut rng);
        let mut decoded = scheme.demodulate(&modem, &noisy.samples)?;
        decoded.truncate(bits.len());
        println!("{:>8.2}  {:>10.6}", snr, bit_error_rate(&bits, &decoded));
    }

    Ok(())
}

fn write_wav(path: &Path, waveform: &Waveform) -> Result<(), Box<dyn std::error::Error>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate.round().max(1.0) as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let file = File::create(path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;
    for &sample in &waveform.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
