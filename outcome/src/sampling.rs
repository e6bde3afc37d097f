//! Sampling mine cells without replacement from one signature.
//!
//! The signature is a mixed-radix number: pick `i` takes the digit
//! `value mod remaining_i` and continues with `value / remaining_i`. The digit
//! indexes the cells still unassigned, scanned in ascending order. Every
//! ordered pick sequence is equally likely (up to a bias below `2^-600` for a
//! 96-byte signature), so every `C(N, K)` subset is too.

use std::collections::BTreeSet;

use vx_crypto::VerifiedSignature;

use crate::bigint::BigEndianValue;
use crate::{check_len, OutcomeError};

/// Choose `picks` distinct cells out of `0..cells`, never one in `preassigned`.
///
/// Cells are returned in pick order.
pub fn sample_without_replacement(
    signature: &VerifiedSignature,
    cells: u32,
    picks: u32,
    preassigned: &BTreeSet<u32>,
) -> Result<Vec<u32>, OutcomeError> {
    sample_from_bytes(signature.as_bytes(), cells, picks, preassigned)
}

pub(crate) fn sample_from_bytes(
    bytes: &[u8],
    cells: u32,
    picks: u32,
    preassigned: &BTreeSet<u32>,
) -> Result<Vec<u32>, OutcomeError> {
    check_len(bytes)?;
    let mut value = BigEndianValue::new(bytes);
    let mut assigned: BTreeSet<u32> = preassigned.range(..cells).copied().collect();
    let mut picked = Vec::with_capacity(picks as usize);

    for _ in 0..picks {
        let remaining = cells - assigned.len() as u32;
        if remaining == 0 {
            return Err(OutcomeError::NoRemainingCells {
                cells,
                assigned: assigned.len() as u32,
            });
        }
        let idx = value.div_rem(u64::from(remaining)) as u32;
        let cell = nth_unassigned(cells, &assigned, idx).ok_or(OutcomeError::NoRemainingCells {
            cells,
            assigned: assigned.len() as u32,
        })?;
        assigned.insert(cell);
        picked.push(cell);
    }
    Ok(picked)
}

fn nth_unassigned(cells: u32, assigned: &BTreeSet<u32>, idx: u32) -> Option<u32> {
    (0..cells).filter(|c| !assigned.contains(c)).nth(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use vx_crypto::sha256_multi;

    fn pseudo_signature(i: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(96);
        for part in 0u8..3 {
            bytes.extend_from_slice(&sha256_multi(&[&i.to_be_bytes(), &[part]]));
        }
        bytes
    }

    #[test]
    fn picks_are_distinct_and_in_range() {
        for i in 0..200 {
            let picks = sample_from_bytes(&pseudo_signature(i), 25, 24, &BTreeSet::new()).unwrap();
            let unique: BTreeSet<u32> = picks.iter().copied().collect();
            assert_eq!(unique.len(), 24);
            assert!(picks.iter().all(|c| *c < 25));
        }
    }

    #[test]
    fn never_picks_preassigned() {
        let safe: BTreeSet<u32> = [0, 3, 4, 9].into_iter().collect();
        for i in 0..200 {
            let picks = sample_from_bytes(&pseudo_signature(i), 10, 6, &safe).unwrap();
            assert!(picks.iter().all(|c| !safe.contains(c)), "{picks:?}");
        }
    }

    #[test]
    fn guard_on_exhausted_grid() {
        let safe: BTreeSet<u32> = (0..4).collect();
        assert_eq!(
            sample_from_bytes(&pseudo_signature(1), 5, 2, &safe),
            Err(OutcomeError::NoRemainingCells {
                cells: 5,
                assigned: 5
            })
        );
        assert_eq!(
            sample_from_bytes(&pseudo_signature(1), 0, 1, &BTreeSet::new()),
            Err(OutcomeError::NoRemainingCells {
                cells: 0,
                assigned: 0
            })
        );
    }

    #[test]
    fn zero_picks_is_empty() {
        assert_eq!(
            sample_from_bytes(&pseudo_signature(1), 0, 0, &BTreeSet::new()),
            Ok(vec![])
        );
    }

    #[test]
    fn first_pick_is_value_mod_cells() {
        let mut bytes = vec![0u8; 96];
        bytes[95] = 7;
        // 7 mod 5 = 2, then 7 / 5 = 1 -> second unassigned of {0,1,3,4} = 1
        assert_eq!(
            sample_from_bytes(&bytes, 5, 2, &BTreeSet::new()),
            Ok(vec![2, 1])
        );
    }

    #[test]
    fn out_of_range_preassigned_is_ignored() {
        let safe: BTreeSet<u32> = [100].into_iter().collect();
        assert!(sample_from_bytes(&pseudo_signature(2), 3, 3, &safe).is_ok());
    }

    #[test]
    fn subsets_are_uniform() {
        // C(5, 2) = 10 subsets
        const TRIALS: u32 = 20_000;
        let mut counts: HashMap<Vec<u32>, u32> = HashMap::new();
        for i in 0..TRIALS {
            let mut picks =
                sample_from_bytes(&pseudo_signature(i), 5, 2, &BTreeSet::new()).unwrap();
            picks.sort_unstable();
            *counts.entry(picks).or_default() += 1;
        }
        assert_eq!(counts.len(), 10);
        let expected = TRIALS / 10;
        for (subset, count) in counts {
            // sd is about 42; 300 is more than 7 sd
            assert!(
                count.abs_diff(expected) < 300,
                "{subset:?} drawn {count} times, expected about {expected}"
            );
        }
    }
}
