use proptest::prelude::*;

use vx_commitment::{chain_commitment, keyed_contribution, verify_link, HashChain};
use vx_types::{RoundKey, Seed};

proptest! {
    /// Same (seed, client seed, round, move) always reproduces the same contribution.
    #[test]
    fn keyed_derivation_is_deterministic(
        seed in prop::array::uniform32(0u8..),
        client in ".{0,24}",
        round in 0u64..1_000_000,
        sub in proptest::option::of(0u32..64),
    ) {
        let key = RoundKey { round, sub };
        prop_assert_eq!(
            keyed_contribution(&seed, &client, key),
            keyed_contribution(&seed, &client, key)
        );
    }

    /// Distinct round keys never collide for the same seed and client seed.
    #[test]
    fn keyed_derivation_separates_rounds(
        seed in prop::array::uniform32(0u8..),
        client in "[a-z0-9]{0,16}",
        a in 0u64..10_000,
        b in 0u64..10_000,
        sa in proptest::option::of(0u32..16),
        sb in proptest::option::of(0u32..16),
    ) {
        let ka = RoundKey { round: a, sub: sa };
        let kb = RoundKey { round: b, sub: sb };
        prop_assume!(ka != kb);
        prop_assert_ne!(
            keyed_contribution(&seed, &client, ka),
            keyed_contribution(&seed, &client, kb)
        );
    }

    /// A chain of length N has N-1 links that each hash to their predecessor,
    /// starting from the commitment.
    #[test]
    fn chain_integrity(seed in prop::array::uniform32(0u8..), length in 2u32..64) {
        let mut chain = HashChain::build(Seed::new(seed), length).unwrap();
        prop_assert_eq!(chain.commitment(), chain_commitment(&seed, length).unwrap());
        let mut previous = *chain.commitment().as_bytes();
        let mut rounds = 0u32;
        while let Ok((round, link)) = chain.next_link() {
            rounds += 1;
            prop_assert_eq!(round, u64::from(rounds));
            prop_assert!(verify_link(&link, &previous));
            previous = link;
        }
        prop_assert_eq!(rounds, length - 1);
    }
}
