//! Cost of NIP-49 encryption across scrypt exponents.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyward_core::{codec, decrypt_secret, encrypt_secret, EncryptionParams, KeySecurity};

fn encrypt(c: &mut Criterion) {
    let secret = codec::generate();
    let mut group = c.benchmark_group("encrypt");
    group.sample_size(10);
    for log_n in [1u8, 8, 12, 16] {
        let params = EncryptionParams::new(log_n, KeySecurity::Secure).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(log_n), &params, |b, params| {
            b.iter(|| encrypt_secret(black_box(&secret), "benchmark", *params).unwrap())
        });
    }
    group.finish();
}

fn decrypt(c: &mut Criterion) {
    let secret = codec::generate();
    let mut group = c.benchmark_group("decrypt");
    group.sample_size(10);
    for log_n in [1u8, 8, 12] {
        let params = EncryptionParams::new(log_n, KeySecurity::Secure).unwrap();
        let blob = encrypt_secret(&secret, "benchmark", params).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(log_n), &blob, |b, blob| {
            b.iter(|| decrypt_secret(black_box(blob), "benchmark").unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, encrypt, decrypt);
criterion_main!(benches);
