//! Marginal probabilities over single bits, contiguous ranges and arbitrary
//! masks.

use rayon::prelude::*;

use crate::index::{gather_powers, insert_zero_bits, mask_powers, pow2, reg_mask, skip_powers};
use crate::register::Register;

impl Register {
    /// Probability mass of every basis index `i` with `i & mask == fixed`.
    fn masked_sum(&self, mask: usize, fixed: usize) -> f64 {
        self.masked_sum_powers(mask, &mask_powers(mask), fixed)
    }

    /// [`Register::masked_sum`] with `powers` the ascending powers of `mask`.
    fn masked_sum_powers(&self, mask: usize, powers: &[usize], fixed: usize) -> f64 {
        let store = self.store();
        if store.is_sparse() {
            return store
                .nonzero()
                .iter()
                .filter(|(i, _)| i & mask == fixed)
                .map(|(_, c)| c.norm_sqr())
                .sum();
        }
        let count = 1usize << (self.qubit_count() - powers.len());
        let prob_at = |lcv: usize| store.read(insert_zero_bits(lcv, powers) | fixed).norm_sqr();
        if self.parallel() {
            (0..count).into_par_iter().map(prob_at).sum()
        } else {
            (0..count).map(prob_at).sum()
        }
    }

    /// Probability that `qubit` reads 1.
    pub fn prob(&self, qubit: usize) -> f64 {
        assert!(qubit < self.qubit_count(), "qubit {} out of range", qubit);
        let power = pow2(qubit);
        self.masked_sum(power, power)
    }

    /// Probability of the whole register being in basis state `perm`.
    pub fn prob_all(&self, perm: usize) -> f64 {
        self.get_amplitude(perm).norm_sqr()
    }

    /// Probability that bits `start..start + length` read `perm`.
    pub fn prob_reg(&self, start: usize, length: usize, perm: usize) -> f64 {
        assert!(start + length <= self.qubit_count(), "register range out of bounds");
        self.masked_sum(reg_mask(start, length), perm << start)
    }

    /// Probability that the bits under `mask` equal the same bits of `perm`.
    ///
    /// `perm` is a full basis index, not a compressed value; bits outside
    /// `mask` must be zero.
    pub fn prob_mask(&self, mask: usize, perm: usize) -> f64 {
        debug_assert_eq!(perm & !mask, 0, "permutation has bits outside mask");
        self.masked_sum(mask, perm)
    }

    /// Distribution over all `2^length` values of bits `start..start + length`.
    ///
    /// # Example
    /// ```
    /// use qreg_rs::{Gate, Register, RegisterConfig};
    ///
    /// let mut reg = Register::new(2, 0, RegisterConfig::default()).unwrap();
    /// reg.apply_gate(&Gate::H, 0);
    /// reg.apply_gate(&Gate::H, 1);
    /// for p in reg.prob_reg_all(0, 2) {
    ///     assert!((p - 0.25).abs() < 1e-7);
    /// }
    /// ```
    pub fn prob_reg_all(&self, start: usize, length: usize) -> Vec<f64> {
        assert!(start + length <= self.qubit_count(), "register range out of bounds");
        let mask = reg_mask(start, length);
        let powers = mask_powers(mask);
        if self.is_sparse() {
            return self.bucket_nonzero(&powers);
        }
        (0..pow2(length))
            .map(|perm| self.masked_sum_powers(mask, &powers, perm << start))
            .collect()
    }

    /// Distribution over all values of the bits under `mask`.
    ///
    /// Entry `v` holds the probability that the mask bits, read in ascending
    /// position order, spell the binary value `v`.
    pub fn prob_mask_all(&self, mask: usize) -> Vec<f64> {
        let powers = mask_powers(mask);
        if self.is_sparse() {
            return self.bucket_nonzero(&powers);
        }
        let skips = skip_powers(mask);
        (0..pow2(powers.len()))
            .map(|v| self.masked_sum_powers(mask, &powers, insert_zero_bits(v, &skips)))
            .collect()
    }

    /// Single pass over the non-zero entries, binning by compressed mask value.
    fn bucket_nonzero(&self, powers: &[usize]) -> Vec<f64> {
        let mut out = vec![0.0; pow2(powers.len())];
        for (i, c) in self.store().nonzero() {
            out[gather_powers(i, powers)] += c.norm_sqr();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RegisterConfig;
    use crate::gate::Gate;
    use crate::register::Register;
    use approx::assert_abs_diff_eq;

    fn ghz(sparse: bool) -> Register {
        let config = RegisterConfig {
            sparse,
            ..RegisterConfig::seeded(5)
        };
        let mut reg = Register::new(3, 0, config).unwrap();
        reg.apply_gate(&Gate::H, 0);
        reg.apply_controlled_single_bit(&[0], 1, &Gate::X.matrix());
        reg.apply_controlled_single_bit(&[1], 2, &Gate::X.matrix());
        reg
    }

    #[test]
    fn test_prob_single_bit() {
        for sparse in [false, true] {
            let reg = ghz(sparse);
            for q in 0..3 {
                assert_abs_diff_eq!(reg.prob(q), 0.5, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_prob_reg_and_mask() {
        for sparse in [false, true] {
            let reg = ghz(sparse);
            assert_abs_diff_eq!(reg.prob_reg(1, 2, 0b11), 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(reg.prob_reg(1, 2, 0b01), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(reg.prob_mask(0b101, 0b101), 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(reg.prob_mask(0b101, 0b001), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(reg.prob_all(0b111), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_prob_mask_all_compresses_mask_bits() {
        for sparse in [false, true] {
            let reg = ghz(sparse);
            let out = reg.prob_mask_all(0b101);
            assert_eq!(out.len(), 4);
            assert_abs_diff_eq!(out[0b00], 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(out[0b11], 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(out[0b01] + out[0b10], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_prob_all_distributions_match_binning() {
        let amps: Vec<f64> = (1..=16).map(|i| i as f64).collect();
        let total: f64 = amps.iter().map(|a| a * a).sum();
        for sparse in [false, true] {
            let config = RegisterConfig {
                sparse,
                ..RegisterConfig::seeded(2)
            };
            let mut reg = Register::new(4, 0, config).unwrap();
            for (i, a) in amps.iter().enumerate() {
                reg.set_amplitude(i, num_complex::Complex64::new(a / total.sqrt(), 0.0));
            }
            for mask in [0b1010usize, 0b1001, 0b0110, 0b1101] {
                let mut expected = vec![0.0; 1 << mask.count_ones()];
                for (i, a) in amps.iter().enumerate() {
                    expected[crate::index::gather_bits(i, mask)] += a * a / total;
                }
                for (got, want) in reg.prob_mask_all(mask).iter().zip(&expected) {
                    assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
                }
            }
            let by_reg = reg.prob_reg_all(1, 2);
            for (v, got) in by_reg.iter().enumerate() {
                let want: f64 = (0..16)
                    .filter(|i| (i >> 1) & 0b11 == v)
                    .map(|i| amps[i] * amps[i] / total)
                    .sum();
                assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_prob_mask_all_empty_mask() {
        let reg = ghz(false);
        let out = reg.prob_mask_all(0);
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0], 1.0, epsilon = 1e-12);
    }
}
