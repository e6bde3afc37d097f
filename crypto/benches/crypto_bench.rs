use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bls_sign_bench(c: &mut Criterion) {
    let kp = vx_crypto::BlsKeypair::from_ikm(&[42u8; 32]).unwrap();
    let msg = [7u8; 32];

    c.bench_function("bls_sign_32B", |b| b.iter(|| kp.sign(black_box(&msg))));
}

fn bls_verify_bench(c: &mut Criterion) {
    let kp = vx_crypto::BlsKeypair::from_ikm(&[42u8; 32]).unwrap();
    let msg = [7u8; 32];
    let sig = kp.sign(&msg);

    c.bench_function("bls_verify_32B", |b| {
        b.iter(|| vx_crypto::verify(black_box(&sig), &msg, kp.public_key()))
    });
}

fn hmac_sha256_bench(c: &mut Criterion) {
    let key = [0xABu8; 32];

    c.bench_function("hmac_sha256_contribution", |b| {
        b.iter(|| vx_crypto::hmac_sha256(black_box(&key), b"chicken:1024:3"))
    });
}

fn sha256_chain_bench(c: &mut Criterion) {
    c.bench_function("sha256_chain_1000", |b| {
        b.iter(|| {
            let mut link = [0u8; 32];
            for _ in 0..1000 {
                link = vx_crypto::sha256(black_box(&link));
            }
            link
        })
    });
}

criterion_group!(
    benches,
    bls_sign_bench,
    bls_verify_bench,
    hmac_sha256_bench,
    sha256_chain_bench,
);
criterion_main!(benches);
