//! Swap-family gates.
//!
//! Each gate is a fixed 2x2 matrix acting on the `|01⟩`/`|10⟩` pair of the two
//! target bits, with any control bits folded into the offsets.

use crate::gate::{Gate, Matrix2};
use crate::index::{pow2, sorted_powers};
use crate::register::Register;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Controls {
    None,
    High,
    Low,
}

impl Register {
    fn swap_kind(
        &mut self,
        controls: &[usize],
        kind: Controls,
        qubit1: usize,
        qubit2: usize,
        mtrx: &Matrix2,
    ) {
        if qubit1 == qubit2 {
            return;
        }
        let (power1, power2) = (pow2(qubit1), pow2(qubit2));
        let mut bits = controls.to_vec();
        bits.push(qubit1);
        bits.push(qubit2);
        let powers = sorted_powers(&bits);

        let fixed = match kind {
            Controls::High => controls.iter().fold(0usize, |acc, &c| acc | pow2(c)),
            Controls::None | Controls::Low => 0,
        };
        self.apply_2x2(fixed | power1, fixed | power2, mtrx, &powers, false);
    }

    /// Exchange the values of two bits.
    ///
    /// # Example
    /// ```
    /// use qreg_rs::{Register, RegisterConfig};
    ///
    /// let mut reg = Register::new(2, 0b01, RegisterConfig::default()).unwrap();
    /// reg.swap(0, 1);
    /// assert_eq!(reg.get_amplitude(0b10).re, 1.0);
    /// ```
    pub fn swap(&mut self, qubit1: usize, qubit2: usize) {
        self.swap_kind(&[], Controls::None, qubit1, qubit2, &Gate::X.matrix());
    }

    /// Square root of swap. Applied twice it equals [`Register::swap`].
    pub fn sqrt_swap(&mut self, qubit1: usize, qubit2: usize) {
        self.swap_kind(&[], Controls::None, qubit1, qubit2, &Gate::SqrtX.matrix());
    }

    /// Inverse of [`Register::sqrt_swap`].
    pub fn isqrt_swap(&mut self, qubit1: usize, qubit2: usize) {
        self.swap_kind(&[], Controls::None, qubit1, qubit2, &Gate::ISqrtX.matrix());
    }

    /// Swap where every control bit is 1.
    pub fn cswap(&mut self, controls: &[usize], qubit1: usize, qubit2: usize) {
        self.swap_kind(controls, Controls::High, qubit1, qubit2, &Gate::X.matrix());
    }

    /// Swap where every control bit is 0.
    pub fn anti_cswap(&mut self, controls: &[usize], qubit1: usize, qubit2: usize) {
        self.swap_kind(controls, Controls::Low, qubit1, qubit2, &Gate::X.matrix());
    }

    pub fn csqrt_swap(&mut self, controls: &[usize], qubit1: usize, qubit2: usize) {
        self.swap_kind(controls, Controls::High, qubit1, qubit2, &Gate::SqrtX.matrix());
    }

    pub fn anti_csqrt_swap(&mut self, controls: &[usize], qubit1: usize, qubit2: usize) {
        self.swap_kind(controls, Controls::Low, qubit1, qubit2, &Gate::SqrtX.matrix());
    }

    pub fn cisqrt_swap(&mut self, controls: &[usize], qubit1: usize, qubit2: usize) {
        self.swap_kind(controls, Controls::High, qubit1, qubit2, &Gate::ISqrtX.matrix());
    }

    pub fn anti_cisqrt_swap(&mut self, controls: &[usize], qubit1: usize, qubit2: usize) {
        self.swap_kind(controls, Controls::Low, qubit1, qubit2, &Gate::ISqrtX.matrix());
    }
}
