//! The simulated register: one amplitude store plus the state that the gate
//! and measurement engines share (running norm, RNG, configuration).

use std::f64::consts::PI;

use log::{debug, info, trace};
use ndarray::Array1;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{PhasePolicy, RegisterConfig, MAX_QUBITS};
use crate::error::{RegisterError, Result};
use crate::gate::{Gate, Matrix2};
use crate::index::{pow2, sorted_powers};
use crate::instruct::{self, NormPolicy};
use crate::store::{new_store, AmplitudeStore, ReadGuard};

const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Maximum summed squared difference for two registers to compare equal.
pub const APPROX_COMPARE_ERROR: f64 = 1e-7;

/// An N-qubit register holding the full amplitude vector.
#[derive(Debug)]
pub struct Register {
    qubit_count: usize,
    max_power: usize,
    store: Box<dyn AmplitudeStore>,
    running_norm: f64,
    config: RegisterConfig,
    rng: StdRng,
}

impl Register {
    /// Creates a register of `qubit_count` qubits in basis state `init_perm`.
    ///
    /// # Example
    /// ```
    /// use qreg_rs::{Register, RegisterConfig};
    ///
    /// let reg = Register::new(2, 1, RegisterConfig::default()).unwrap();
    /// assert_eq!(reg.get_amplitude(1).re, 1.0);
    /// ```
    pub fn new(qubit_count: usize, init_perm: usize, config: RegisterConfig) -> Result<Self> {
        config.validate()?;
        if qubit_count > MAX_QUBITS {
            return Err(RegisterError::TooManyQubits {
                qubits: qubit_count,
                max: MAX_QUBITS,
            });
        }
        let max_power = pow2(qubit_count);
        if init_perm >= max_power {
            return Err(RegisterError::PermutationOutOfRange {
                perm: init_perm,
                qubits: qubit_count,
            });
        }

        info!(
            "allocating {}-qubit register ({} store)",
            qubit_count,
            if config.sparse { "sparse" } else { "dense" }
        );

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut reg = Register {
            qubit_count,
            max_power,
            store: new_store(max_power, config.sparse),
            running_norm: 1.0,
            config,
            rng,
        };
        reg.set_permutation(init_perm);
        Ok(reg)
    }

    /// Creates a register in |0...0⟩ with the default configuration.
    pub fn zero_state(qubit_count: usize) -> Result<Self> {
        Self::new(qubit_count, 0, RegisterConfig::default())
    }

    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    /// `2^qubit_count`, the number of amplitudes.
    pub fn max_power(&self) -> usize {
        self.max_power
    }

    pub fn config(&self) -> &RegisterConfig {
        &self.config
    }

    pub fn running_norm(&self) -> f64 {
        self.running_norm
    }

    pub fn is_sparse(&self) -> bool {
        self.store.is_sparse()
    }

    pub(crate) fn store(&self) -> &dyn AmplitudeStore {
        self.store.as_ref()
    }

    pub(crate) fn parallel(&self) -> bool {
        self.qubit_count >= self.config.parallel_threshold
    }

    /// Uniform random value in `[0, 1)` from the register's generator.
    pub fn rand(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Reseed the register's generator.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Phase factor applied by non-unitary operations (collapse, reset).
    pub fn nonunitary_phase(&mut self) -> Complex64 {
        match self.config.phase {
            PhasePolicy::Unity => ONE,
            PhasePolicy::Random => Complex64::from_polar(1.0, 2.0 * PI * self.rand()),
        }
    }

    /// Reset to basis state `perm`.
    pub fn set_permutation(&mut self, perm: usize) {
        assert!(perm < self.max_power, "permutation {} out of range", perm);
        let phase = self.nonunitary_phase();
        self.store.clear();
        self.store.write(perm, phase);
        self.running_norm = 1.0;
    }

    /// Overwrite the amplitude vector from a buffer of length `max_power`.
    pub fn set_quantum_state(&mut self, state: &[Complex64]) {
        self.store.copy_in(state);
        self.update_running_norm();
    }

    /// Copy the amplitude vector into a buffer of length `max_power`.
    pub fn copy_quantum_state(&mut self, out: &mut [Complex64]) {
        let guard = ReadGuard::acquire(self.store.as_mut());
        guard.copy_out(out);
    }

    /// The amplitude vector as an owned array.
    pub fn get_quantum_state(&mut self) -> Array1<Complex64> {
        let mut out = Array1::zeros(self.max_power);
        if let Some(buf) = out.as_slice_mut() {
            self.copy_quantum_state(buf);
        }
        out
    }

    /// Squared magnitude of every amplitude.
    pub fn get_probs(&mut self) -> Array1<f64> {
        let mut out = Array1::zeros(self.max_power);
        if let Some(buf) = out.as_slice_mut() {
            let guard = ReadGuard::acquire(self.store.as_mut());
            guard.get_probs(buf);
        }
        out
    }

    pub fn get_amplitude(&self, perm: usize) -> Complex64 {
        self.store.read(perm)
    }

    pub fn set_amplitude(&mut self, perm: usize, amp: Complex64) {
        let old = self.store.read(perm);
        self.running_norm += amp.norm_sqr() - old.norm_sqr();
        self.store.write(perm, amp);
    }

    /// Recompute the running norm from scratch.
    pub fn update_running_norm(&mut self) {
        self.running_norm =
            instruct::norm_sum(self.store.as_ref(), self.config.norm_threshold, self.parallel());
    }

    /// Rescale the vector to unit norm.
    ///
    /// `nrm` is the current squared norm; `None` uses the running norm.
    /// Amplitudes below the configured threshold are flushed to zero.
    pub fn normalize_state(&mut self, nrm: Option<f64>) {
        let nrm = nrm.unwrap_or(self.running_norm);
        if nrm <= 0.0 || nrm == 1.0 {
            return;
        }
        debug!("renormalizing from squared norm {}", nrm);
        let scale = 1.0 / nrm.sqrt();
        let threshold = self.config.norm_threshold;
        for (i, c) in self.store.nonzero() {
            let c = if c.norm_sqr() < threshold { Complex64::new(0.0, 0.0) } else { c * scale };
            self.store.write(i, c);
        }
        self.running_norm = 1.0;
    }

    /// Apply `mtrx` to the pairs `(i | offset1, i | offset2)` for every `i`
    /// with zeros at `sorted_powers`.
    ///
    /// When `do_calc_norm` is set, the normalization policy is active and the
    /// gate touches a single bit, any pending renormalization is folded into
    /// the matrix and the running norm is refreshed from the written values.
    pub fn apply_2x2(
        &mut self,
        offset1: usize,
        offset2: usize,
        mtrx: &Matrix2,
        sorted_powers: &[usize],
        do_calc_norm: bool,
    ) {
        let do_calc_norm = do_calc_norm && self.config.normalize && sorted_powers.len() == 1;
        let mut mtrx = *mtrx;
        if do_calc_norm && self.running_norm > 0.0 && self.running_norm != 1.0 {
            let scale = 1.0 / self.running_norm.sqrt();
            for m in mtrx.iter_mut() {
                *m *= scale;
            }
        }
        let norm = if do_calc_norm {
            NormPolicy::Accumulate {
                threshold: self.config.norm_threshold,
            }
        } else {
            NormPolicy::Skip
        };
        let parallel = self.parallel();
        if let Some(nrm) = instruct::apply_2x2(
            self.store.as_mut(),
            self.qubit_count,
            offset1,
            offset2,
            &mtrx,
            sorted_powers,
            norm,
            parallel,
        ) {
            self.running_norm = nrm;
        }
    }

    /// Apply a 2x2 matrix to one bit.
    pub fn apply_single_bit(&mut self, mtrx: &Matrix2, do_calc_norm: bool, qubit: usize) {
        let power = pow2(qubit);
        self.apply_2x2(0, power, mtrx, &[power], do_calc_norm);
    }

    /// Apply a named gate to one bit.
    pub fn apply_gate(&mut self, gate: &Gate, qubit: usize) {
        trace!("{} on qubit {}", gate, qubit);
        self.apply_single_bit(&gate.matrix(), true, qubit);
    }

    /// Apply `mtrx` to `target` where every control bit is 1.
    pub fn apply_controlled_2x2(
        &mut self,
        controls: &[usize],
        target: usize,
        mtrx: &Matrix2,
        do_calc_norm: bool,
    ) {
        let control_mask = controls.iter().fold(0usize, |acc, &c| acc | pow2(c));
        let mut bits = controls.to_vec();
        bits.push(target);
        let powers = sorted_powers(&bits);
        self.apply_2x2(
            control_mask,
            control_mask | pow2(target),
            mtrx,
            &powers,
            do_calc_norm,
        );
    }

    /// Apply `mtrx` to `target` where every control bit is 0.
    pub fn apply_anti_controlled_2x2(
        &mut self,
        controls: &[usize],
        target: usize,
        mtrx: &Matrix2,
        do_calc_norm: bool,
    ) {
        let mut bits = controls.to_vec();
        bits.push(target);
        let powers = sorted_powers(&bits);
        self.apply_2x2(0, pow2(target), mtrx, &powers, do_calc_norm);
    }

    pub fn apply_controlled_single_bit(&mut self, controls: &[usize], target: usize, mtrx: &Matrix2) {
        if controls.is_empty() {
            self.apply_single_bit(mtrx, true, target);
        } else {
            self.apply_controlled_2x2(controls, target, mtrx, false);
            if self.config.normalize {
                self.update_running_norm();
            }
        }
    }

    pub fn apply_anti_controlled_single_bit(
        &mut self,
        controls: &[usize],
        target: usize,
        mtrx: &Matrix2,
    ) {
        if controls.is_empty() {
            self.apply_single_bit(mtrx, true, target);
        } else {
            self.apply_anti_controlled_2x2(controls, target, mtrx, false);
            if self.config.normalize {
                self.update_running_norm();
            }
        }
    }

    /// Project onto the subspace where the bits under `mask` equal `result`,
    /// scaling survivors by `nrm`. Resets the running norm to 1.
    pub fn apply_m(&mut self, mask: usize, result: usize, nrm: Complex64) {
        if mask.is_power_of_two() {
            let mtrx = instruct::projector(result & mask != 0, nrm);
            self.apply_2x2(0, mask, &mtrx, &[mask], false);
        } else {
            instruct::apply_m_mask(self.store.as_mut(), self.qubit_count, mask, result, nrm);
        }
        self.running_norm = 1.0;
    }

    /// Summed squared amplitude difference against another register.
    ///
    /// Registers of different width are maximally different.
    pub fn sum_sqr_diff(&self, other: &Register) -> f64 {
        if self.qubit_count != other.qubit_count {
            return 4.0;
        }
        (0..self.max_power)
            .map(|i| (self.store.read(i) - other.store.read(i)).norm_sqr())
            .sum()
    }

    /// Deep copy with its own store, running norm and RNG stream.
    pub fn clone_register(&self) -> Register {
        let mut store = new_store(self.max_power, self.store.is_sparse());
        store.copy(self.store.as_ref());
        Register {
            qubit_count: self.qubit_count,
            max_power: self.max_power,
            store,
            running_norm: self.running_norm,
            config: self.config.clone(),
            rng: self.rng.clone(),
        }
    }

    /// Whether two registers hold the same amplitudes up to
    /// [`APPROX_COMPARE_ERROR`].
    pub fn approx_compare(&self, other: &Register) -> bool {
        self.sum_sqr_diff(other) <= APPROX_COMPARE_ERROR
    }
}

impl Clone for Register {
    fn clone(&self) -> Self {
        self.clone_register()
    }
}
