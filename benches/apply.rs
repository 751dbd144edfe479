//! Benchmarks for gate application and measurement over register sizes.
//!
//! Run with: cargo bench
//! For HTML reports: cargo bench -- --verbose

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::f64::consts::PI;
use qreg_rs::{Gate, Register, RegisterConfig};

fn register(n: usize, sparse: bool, parallel: bool) -> Register {
    let config = RegisterConfig {
        sparse,
        parallel_threshold: if parallel { 0 } else { usize::MAX },
        ..RegisterConfig::seeded(0)
    };
    Register::new(n, 0, config).unwrap()
}

/// H on every qubit.
fn h_all(reg: &mut Register) {
    for q in 0..reg.qubit_count() {
        reg.apply_gate(&Gate::H, q);
    }
}

/// QFT-like layer: H plus controlled phases, then bit reversal with swaps.
fn qft(reg: &mut Register) {
    let n = reg.qubit_count();
    for i in 0..n {
        reg.apply_gate(&Gate::H, i);
        for j in 1..(n - i) {
            let theta = 2.0 * PI / (1 << (j + 1)) as f64;
            reg.apply_controlled_single_bit(&[i + j], i, &Gate::Phase(theta).matrix());
        }
    }
    for i in 0..(n / 2) {
        reg.swap(i, n - 1 - i);
    }
}

fn bench_h_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("h_all");

    for n_qubits in [8, 10, 12, 14, 16] {
        for (label, parallel) in [("sequential", false), ("parallel", true)] {
            let base = register(n_qubits, false, parallel);
            group.bench_with_input(BenchmarkId::new(label, n_qubits), &n_qubits, |b, _| {
                b.iter(|| {
                    let mut reg = base.clone();
                    h_all(black_box(&mut reg));
                    reg
                })
            });
        }
    }

    group.finish();
}

fn bench_qft(c: &mut Criterion) {
    let mut group = c.benchmark_group("qft");

    for n_qubits in [4, 6, 8, 10, 12] {
        let base = register(n_qubits, false, false);
        group.bench_with_input(BenchmarkId::new("dense", n_qubits), &n_qubits, |b, _| {
            b.iter(|| {
                let mut reg = base.clone();
                qft(black_box(&mut reg));
                reg
            })
        });
    }

    group.finish();
}

fn bench_swap_sparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_basis_state");

    for n_qubits in [8, 12, 16] {
        for (label, sparse) in [("dense", false), ("sparse", true)] {
            let base = register(n_qubits, sparse, false);
            group.bench_with_input(BenchmarkId::new(label, n_qubits), &n_qubits, |b, &n| {
                b.iter(|| {
                    let mut reg = base.clone();
                    for i in 1..n - 1 {
                        reg.anti_cswap(&[0], i, i + 1);
                    }
                    reg
                })
            });
        }
    }

    group.finish();
}

fn bench_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("m_all");
    group.sample_size(50);

    for n_qubits in [8, 10, 12, 14] {
        let mut base = register(n_qubits, false, false);
        h_all(&mut base);
        group.bench_with_input(BenchmarkId::new("uniform", n_qubits), &n_qubits, |b, _| {
            b.iter(|| {
                let mut reg = base.clone();
                black_box(reg.m_all())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_h_all, bench_qft, bench_swap_sparse, bench_measure);
criterion_main!(benches);
