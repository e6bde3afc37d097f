#![no_main]

use libfuzzer_sys::fuzz_target;
use vx_outcome::{multiplier_from_digest, select_weighted, validate_probabilities};

// Multiplier and weighted-selection arithmetic over arbitrary inputs.
fuzz_target!(|data: &[u8]| {
    if data.len() < 42 {
        return;
    }
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&data[..32]);
    let bps = u16::from_be_bytes([data[32], data[33]]);
    if let Ok(m) = multiplier_from_digest(&digest, bps) {
        assert!(m.hundredths() >= 100);
    }

    let x = u64::from_be_bytes([
        data[34], data[35], data[36], data[37], data[38], data[39], data[40], data[41],
    ]) as f64
        / u64::MAX as f64;
    let probabilities: Vec<f64> = data[42..]
        .iter()
        .map(|&b| f64::from(b))
        .collect();
    let total: f64 = probabilities.iter().sum();
    if total > 0.0 {
        let normalised: Vec<f64> = probabilities.iter().map(|p| p / total).collect();
        if validate_probabilities(&normalised).is_ok() && x < 1.0 {
            let index = select_weighted(x, &normalised).expect("valid distribution selects");
            assert!(index < normalised.len());
            assert!(normalised[index] > 0.0);
        }
    }
});
