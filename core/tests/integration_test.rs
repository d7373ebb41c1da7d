use linkwave_core::bits::{bytes_to_bits, format_bits};
use linkwave_core::error_control::{crc32_decode, crc32_encode};
use linkwave_core::framing::{bit_stuff, bit_unstuff, byte_stuff, byte_unstuff};
use linkwave_core::{
    hamming, ErrorDetection, Framing, ModemConfig, Scheme, TransmitParams, Transmitter,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_bits(rng: &mut StdRng, len: usize) -> Vec<bool> {
    (0..len).map(|_| rng.gen::<bool>()).collect()
}

fn params(scheme: Scheme, framing: Framing, detection: ErrorDetection) -> TransmitParams {
    TransmitParams {
        scheme,
        framing,
        detection,
        ..TransmitParams::default()
    }
}

/// Negate the samples of one bit interval, which flips that bit for NRZ-Polar.
fn flip_interval(samples: &mut [f32], samples_per_bit: usize, bit: usize) {
    for s in &mut samples[bit * samples_per_bit..(bit + 1) * samples_per_bit] {
        *s = -*s;
    }
}

#[test]
fn test_hi_counted_crc_nrz_scenario() {
    init_logging();
    let mut p = params(Scheme::NrzPolar, Framing::CharacterCount, ErrorDetection::Crc32);
    p.snr_db = Some(0.0);

    let tx = Transmitter::new(p).expect("valid params");
    let mut rng = StdRng::seed_from_u64(1);
    let result = tx.transmit("HI", &mut rng).expect("transmit");

    // Payload bits of "HI" sit right after the count byte
    assert_eq!(format_bits(&result.tx_bits[8..24]), "0100100001001001");
    assert_eq!(result.tx_bits.len(), 24 + 32);
    assert_eq!(result.rx_waveform, result.tx_waveform);
    assert_eq!(result.text, "HI");
    assert!(!result.error_detected);
    assert!(!result.framing_error);
    assert_eq!(result.bit_error_rate, 0.0);
}

#[test]
fn test_single_flipped_bit_sets_crc_flag() {
    init_logging();
    let p = params(Scheme::NrzPolar, Framing::CharacterCount, ErrorDetection::Crc32);
    let tx = Transmitter::new(p).unwrap();
    let sent = tx.send("HI").unwrap();
    let spb = p.modem.samples_per_bit;

    for bit in 0..sent.bits.len() {
        let mut waveform = sent.waveform.clone();
        flip_interval(&mut waveform.samples, spb, bit);
        let received = tx.receive(&waveform, sent.bits.len()).unwrap();
        assert!(received.error_detected, "flip of wire bit {} went unnoticed", bit);
    }
}

#[test]
fn test_hamming_repairs_flipped_bit() {
    init_logging();
    let mut p = params(Scheme::NrzPolar, Framing::None, ErrorDetection::None);
    p.hamming = true;
    let tx = Transmitter::new(p).unwrap();
    let sent = tx.send("HI").unwrap();
    assert_eq!(sent.bits.len(), 28);

    let mut waveform = sent.waveform.clone();
    flip_interval(&mut waveform.samples, p.modem.samples_per_bit, 9);
    let received = tx.receive(&waveform, sent.bits.len()).unwrap();
    assert_eq!(received.text, "HI");
    assert_eq!(received.corrected_blocks, 1);
    assert!(!received.error_detected);
}

#[test]
fn test_every_combination_noiseless() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0);
    let text = "Mensagem teste ~}";
    for scheme in Scheme::ALL {
        for framing in Framing::ALL {
            for detection in ErrorDetection::ALL {
                for hamming in [false, true] {
                    let mut p = params(scheme, framing, detection);
                    p.hamming = hamming;
                    p.modem = ModemConfig::new(12, 0.8).unwrap();
                    let result = Transmitter::new(p).unwrap().transmit(text, &mut rng).unwrap();
                    let label = format!("{} / {} / {} / hamming={}", scheme, framing, detection, hamming);
                    assert_eq!(result.text, text, "{}", label);
                    assert!(!result.error_detected, "{}", label);
                    assert!(!result.framing_error, "{}", label);
                    assert_eq!(result.corrected_blocks, 0, "{}", label);
                }
            }
        }
    }
}

#[test]
fn test_line_codes_random_round_trip() {
    let mut rng = StdRng::seed_from_u64(11);
    let config = ModemConfig::new(8, 1.5).unwrap();
    for _ in 0..20 {
        let len = rng.gen_range(0..200);
        let bits = random_bits(&mut rng, len);
        for scheme in [Scheme::NrzPolar, Scheme::Manchester, Scheme::BipolarAmi] {
            let wave = scheme.modulate(&config, &bits).unwrap();
            assert_eq!(scheme.demodulate(&config, &wave.samples).unwrap(), bits, "{}", scheme);
        }
    }
}

#[test]
fn test_carrier_random_round_trip_up_to_padding() {
    let mut rng = StdRng::seed_from_u64(12);
    let config = ModemConfig::new(20, 1.0).unwrap();
    for _ in 0..20 {
        let len = rng.gen_range(1..120);
        let bits = random_bits(&mut rng, len);
        for scheme in [Scheme::Ask, Scheme::Fsk, Scheme::Qpsk, Scheme::Qam16] {
            let wave = scheme.modulate(&config, &bits).unwrap();
            let decoded = scheme.demodulate(&config, &wave.samples).unwrap();
            assert_eq!(decoded.len(), len + scheme.padding_bits(len), "{}", scheme);
            assert_eq!(&decoded[..len], &bits[..], "{}", scheme);
            assert!(decoded[len..].iter().all(|&b| !b), "{} padding", scheme);
        }
    }
}

#[test]
fn test_moderate_noise_is_survivable() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(99);
    for scheme in [Scheme::NrzPolar, Scheme::Manchester, Scheme::Qpsk] {
        let mut p = params(scheme, Framing::ByteStuffing, ErrorDetection::Crc32);
        p.snr_db = Some(20.0);
        let result = Transmitter::new(p)
            .unwrap()
            .transmit("Hello, link layer!", &mut rng)
            .unwrap();
        assert_ne!(result.rx_waveform, result.tx_waveform);
        assert_eq!(result.text, "Hello, link layer!", "{}", scheme);
        assert!(!result.error_detected, "{}", scheme);
    }
}

#[test]
fn test_crc_catches_random_single_flips() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let len = rng.gen_range(0..300);
        let framed = crc32_encode(&random_bits(&mut rng, len));
        let pos = rng.gen_range(0..framed.len());
        let mut corrupted = framed.clone();
        corrupted[pos] = !corrupted[pos];
        assert!(!crc32_decode(&framed).error);
        assert!(crc32_decode(&corrupted).error);
    }
}

#[test]
fn test_hamming_random_single_flip_per_block() {
    let mut rng = StdRng::seed_from_u64(6);
    let data = random_bits(&mut rng, 400);
    let mut codeword = hamming::encode(&data);
    for block in codeword.chunks_mut(hamming::BLOCK_BITS) {
        let pos = rng.gen_range(0..hamming::BLOCK_BITS);
        block[pos] = !block[pos];
    }
    let decoded = hamming::decode(&codeword);
    assert_eq!(decoded.bits, data);
    assert_eq!(decoded.corrected_blocks, 100);
}

#[test]
fn test_stuffing_round_trips() {
    let payload = vec![0x7E, 0x7D, 0x7E, 0x7E, 0x00, 0x7D];
    assert_eq!(byte_unstuff(&byte_stuff(&payload)).payload, payload);

    let bits = bytes_to_bits(&[0xFF, 0xFF, 0x7E, 0x3F]);
    let decoded = bit_unstuff(&bit_stuff(&bits));
    assert!(!decoded.error);
    assert_eq!(decoded.payload, bits);
}

#[test]
fn test_long_text_spans_counted_frames() {
    let text: String = std::iter::repeat("abcdefghij").take(60).collect();
    let mut p = params(Scheme::Manchester, Framing::CharacterCount, ErrorDetection::Checksum);
    p.modem = ModemConfig::new(4, 1.0).unwrap();
    let result = Transmitter::new(p)
        .unwrap()
        .transmit(&text, &mut StdRng::seed_from_u64(2))
        .unwrap();
    // 600 bytes -> three frames -> three header bytes, plus the checksum byte
    assert_eq!(result.tx_bits.len(), (600 + 3 + 1) * 8);
    assert_eq!(result.text, text);
    assert!(!result.error_detected);
}

#[test]
fn test_ami_transmissions_are_independent() {
    let p = params(Scheme::BipolarAmi, Framing::None, ErrorDetection::None);
    let tx = Transmitter::new(p).unwrap();
    let first = tx.send("A").unwrap();
    let second = tx.send("A").unwrap();
    assert_eq!(first.waveform, second.waveform);

    // 'A' = 01000001: first mark is +V, second is -V
    let spb = p.modem.samples_per_bit;
    assert_eq!(first.waveform.samples[spb], 1.0);
    assert_eq!(first.waveform.samples[7 * spb], -1.0);
}
