//! Shared test utilities for qreg-rs integration tests.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qreg_rs::{Register, RegisterConfig};

/// Install `env_logger` once; later calls are ignored.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-10
}

/// Seeded configuration for the requested backend.
#[allow(dead_code)]
pub fn config(seed: u64, sparse: bool) -> RegisterConfig {
    RegisterConfig {
        sparse,
        ..RegisterConfig::seeded(seed)
    }
}

/// Normalized random amplitude vector of `2^n` entries.
#[allow(dead_code)]
pub fn random_amplitudes(n: usize, seed: u64) -> Vec<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut amps: Vec<Complex64> = (0..1usize << n)
        .map(|_| Complex64::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5))
        .collect();
    let norm: f64 = amps.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
    for c in amps.iter_mut() {
        *c /= norm;
    }
    amps
}

/// Register holding a random normalized state.
#[allow(dead_code)]
pub fn random_register(n: usize, seed: u64, sparse: bool) -> Register {
    let mut reg = Register::new(n, 0, config(seed, sparse)).unwrap();
    reg.set_quantum_state(&random_amplitudes(n, seed));
    reg
}

/// Assert every amplitude of two registers agrees to within 1e-10.
#[allow(dead_code)]
pub fn assert_states_close(a: &Register, b: &Register) {
    assert_eq!(a.qubit_count(), b.qubit_count());
    for i in 0..a.max_power() {
        let (x, y) = (a.get_amplitude(i), b.get_amplitude(i));
        assert!((x - y).norm() < 1e-10, "amplitude {} differs: {} vs {}", i, x, y);
    }
}

/// Assert two registers hold exactly the same amplitudes.
#[allow(dead_code)]
pub fn assert_states_equal(a: &Register, b: &Register) {
    for i in 0..a.max_power() {
        assert_eq!(a.get_amplitude(i), b.get_amplitude(i), "amplitude {} differs", i);
    }
}
