//! Property tests for the decoders, driven through real BLS signatures.

use std::collections::BTreeSet;

use proptest::prelude::*;
use vx_crypto::{verify_signature, BlsKeypair, VerifiedSignature};
use vx_outcome::{decode_card, decode_crash_dice, sample_without_replacement, select_weighted};
use vx_types::Multiplier;

fn signed(message: &[u8]) -> VerifiedSignature {
    let kp = BlsKeypair::from_ikm(&[17u8; 32]).unwrap();
    verify_signature(kp.sign(message), message, kp.public_key()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sampled_cells_avoid_safe_cells(
        message in prop::collection::vec(any::<u8>(), 1..64),
        cells in 2u32..40,
        safe in prop::collection::btree_set(0u32..40, 0..10),
        mines in 1u32..10,
    ) {
        let safe: BTreeSet<u32> = safe.into_iter().filter(|c| *c < cells).collect();
        let free = cells - safe.len() as u32;
        prop_assume!(mines <= free);

        let sig = signed(&message);
        let picks = sample_without_replacement(&sig, cells, mines, &safe).unwrap();
        prop_assert_eq!(picks.len() as u32, mines);
        let unique: BTreeSet<u32> = picks.iter().copied().collect();
        prop_assert_eq!(unique.len(), picks.len());
        for cell in &picks {
            prop_assert!(*cell < cells);
            prop_assert!(!safe.contains(cell));
        }
    }

    #[test]
    fn card_and_multiplier_in_range(message in prop::collection::vec(any::<u8>(), 0..64), edge in 0u16..2_000) {
        let sig = signed(&message);
        let card = decode_card(&sig).unwrap();
        prop_assert!((1..=13).contains(&card));
        let m = decode_crash_dice(&sig, edge).unwrap();
        prop_assert!(m >= Multiplier::ONE);
        prop_assert_eq!(m, decode_crash_dice(&sig, edge).unwrap());
    }

    #[test]
    fn weighted_selection_is_monotone(
        weights in prop::collection::vec(0.01f64..1.0, 1..8),
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let total: f64 = weights.iter().sum();
        let mut probabilities: Vec<f64> = weights.iter().map(|w| w / total).collect();
        // absorb rounding into the last bucket
        let head: f64 = probabilities[..probabilities.len() - 1].iter().sum();
        let last = probabilities.len() - 1;
        probabilities[last] = 1.0 - head;

        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let i = select_weighted(lo, &probabilities).unwrap();
        let j = select_weighted(hi, &probabilities).unwrap();
        prop_assert!(i <= j);
        prop_assert!(j < probabilities.len());
    }
}
