use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vx_crypto::{verify_signature, BlsKeypair};
use vx_outcome::{decode_coin_toss, decode_crash_dice, sample_without_replacement, select_weighted};

fn bench_decoders(c: &mut Criterion) {
    let kp = BlsKeypair::from_ikm(&[1u8; 32]).unwrap();
    let sig = verify_signature(kp.sign(b"bench"), b"bench", kp.public_key()).unwrap();

    c.bench_function("decode_coin_toss", |b| {
        b.iter(|| decode_coin_toss(black_box(&sig)))
    });

    c.bench_function("decode_crash_dice", |b| {
        b.iter(|| decode_crash_dice(black_box(&sig), 100))
    });

    let safe: BTreeSet<u32> = (0..5).collect();
    c.bench_function("sample_20_of_25_with_5_safe", |b| {
        b.iter(|| sample_without_replacement(black_box(&sig), 25, 20, &safe))
    });

    let wheel = [0.495, 0.495, 0.01];
    c.bench_function("select_weighted", |b| {
        b.iter(|| select_weighted(black_box(0.73), &wheel))
    });
}

criterion_group!(benches, bench_decoders);
criterion_main!(benches);
