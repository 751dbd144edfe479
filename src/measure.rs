//! Measurement: forced and sampled collapse of one bit, a bit set, or a
//! contiguous range.

use log::warn;
use num_complex::Complex64;

use crate::index::{pow2, reg_mask, scatter_bits};
use crate::register::Register;

/// Pick the outcome whose cumulative probability first exceeds `draw`.
///
/// Returns the outcome index and its probability. If rounding keeps the
/// cumulative sum from ever exceeding the draw, the largest-probability
/// outcome seen during the scan is used instead.
pub fn select_outcome(probs: &[f64], draw: f64) -> (usize, f64) {
    debug_assert!(!probs.is_empty());
    let mut lower = 0.0;
    let mut largest = 0.0;
    let mut fallback = (probs.len() - 1, 1.0);
    for (lcv, &p) in probs.iter().enumerate() {
        lower += p;
        if largest <= p {
            largest = p;
            fallback = (lcv, p);
        }
        if lower > draw {
            return (lcv, p);
        }
    }
    warn!(
        "cumulative probability {} never exceeded draw {}; using outcome {}",
        lower, draw, fallback.0
    );
    fallback
}

impl Register {
    /// Renormalize before measuring when the policy asks for it.
    fn prepare_measurement(&mut self) {
        if self.config().normalize {
            self.normalize_state(None);
        }
    }

    /// Project onto `result` under `mask`, dividing survivors by the square
    /// root of `nrmlzr`, the outcome's probability.
    fn collapse(&mut self, mask: usize, result: usize, nrmlzr: f64) {
        if nrmlzr <= 0.0 {
            warn!(
                "forced outcome {:#b} under mask {:#b} has zero probability; state left unchanged",
                result, mask
            );
            return;
        }
        let phase = self.nonunitary_phase();
        let nrm: Complex64 = phase / nrmlzr.sqrt();
        self.apply_m(mask, result, nrm);
    }

    /// Measure one bit, or force it to `result` when `do_force` is set.
    ///
    /// # Example
    /// ```
    /// use qreg_rs::{Register, RegisterConfig};
    ///
    /// let mut reg = Register::new(2, 0b10, RegisterConfig::seeded(1)).unwrap();
    /// assert!(reg.force_m(1, false, false));
    /// assert!(!reg.force_m(0, false, false));
    /// ```
    pub fn force_m(&mut self, qubit: usize, result: bool, do_force: bool) -> bool {
        self.prepare_measurement();

        let one_chance = self.prob(qubit);
        let result = if do_force {
            result
        } else {
            let draw = self.rand();
            draw < one_chance && one_chance > 0.0
        };
        let nrmlzr = if result { one_chance } else { 1.0 - one_chance };

        let power = pow2(qubit);
        self.collapse(power, if result { power } else { 0 }, nrmlzr);
        result
    }

    /// Measure one bit.
    pub fn m(&mut self, qubit: usize) -> bool {
        self.force_m(qubit, false, false)
    }

    /// Measure the listed bits, or force them to `values`.
    ///
    /// The outcome is returned as a full basis index: the power of every
    /// listed bit that reads 1, OR-ed together. An empty list reads 0.
    pub fn force_m_bits(&mut self, bits: &[usize], values: Option<&[bool]>) -> usize {
        if let Some(values) = values {
            assert_eq!(bits.len(), values.len(), "one forced value per bit");
        }
        if bits.is_empty() {
            return 0;
        }

        if bits.len() == 1 {
            let one = match values {
                Some(values) => self.force_m(bits[0], values[0], true),
                None => self.m(bits[0]),
            };
            return if one { pow2(bits[0]) } else { 0 };
        }

        self.prepare_measurement();
        let mask = bits.iter().fold(0usize, |acc, &b| acc | pow2(b));
        debug_assert_eq!(mask.count_ones() as usize, bits.len(), "duplicate bit in {:?}", bits);

        if let Some(values) = values {
            let result = bits
                .iter()
                .zip(values)
                .filter(|&(_, &v)| v)
                .fold(0usize, |acc, (&b, _)| acc | pow2(b));
            let nrmlzr = self.prob_mask(mask, result);
            self.collapse(mask, result, nrmlzr);
            return result;
        }

        let draw = self.rand();
        let probs = self.prob_mask_all(mask);
        let (outcome, nrmlzr) = select_outcome(&probs, draw);
        let result = scatter_bits(outcome, mask);
        self.collapse(mask, result, nrmlzr);
        result
    }

    /// Measure the listed bits.
    pub fn m_bits(&mut self, bits: &[usize]) -> usize {
        self.force_m_bits(bits, None)
    }

    /// Measure bits `start..start + length` as an integer, or force them to
    /// `result` when `do_force` is set.
    ///
    /// Unlike [`Register::force_m_bits`] the outcome is relative to `start`.
    /// An empty range reads 0.
    pub fn force_m_reg(&mut self, start: usize, length: usize, result: usize, do_force: bool) -> usize {
        assert!(start + length <= self.qubit_count(), "register range out of bounds");
        if length == 0 {
            return 0;
        }

        if length == 1 {
            return usize::from(self.force_m(start, result & 1 == 1, do_force));
        }

        self.prepare_measurement();
        let mask = reg_mask(start, length);

        let (result, nrmlzr) = if do_force {
            assert!(result < pow2(length), "forced value {} does not fit {} bits", result, length);
            (result, self.prob_reg(start, length, result))
        } else {
            let draw = self.rand();
            let probs = self.prob_reg_all(start, length);
            select_outcome(&probs, draw)
        };

        self.collapse(mask, result << start, nrmlzr);
        result
    }

    /// Measure bits `start..start + length` as an integer.
    pub fn m_reg(&mut self, start: usize, length: usize) -> usize {
        self.force_m_reg(start, length, 0, false)
    }

    /// Measure the whole register.
    pub fn m_all(&mut self) -> usize {
        let n = self.qubit_count();
        self.m_reg(0, n)
    }
}
