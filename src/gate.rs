use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

/// Row-major 2x2 complex matrix `[m00, m01, m10, m11]`.
pub type Matrix2 = [Complex64; 4];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Single-bit gates, each reducing to one 2x2 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    X,
    Y,
    Z,
    H,
    S,
    T,
    /// Phase gate: diag(1, e^(iθ)).
    Phase(f64),
    Rx(f64),
    Ry(f64),
    Rz(f64),
    /// √X gate: SqrtX² = X
    SqrtX,
    /// Inverse of √X, the conjugate transpose of `SqrtX`.
    ISqrtX,
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::X => write!(f, "X"),
            Gate::Y => write!(f, "Y"),
            Gate::Z => write!(f, "Z"),
            Gate::H => write!(f, "H"),
            Gate::S => write!(f, "S"),
            Gate::T => write!(f, "T"),
            Gate::SqrtX => write!(f, "SqrtX"),
            Gate::ISqrtX => write!(f, "ISqrtX"),
            Gate::Phase(theta) => write!(f, "Phase({:.4})", theta),
            Gate::Rx(theta) => write!(f, "Rx({:.4})", theta),
            Gate::Ry(theta) => write!(f, "Ry({:.4})", theta),
            Gate::Rz(theta) => write!(f, "Rz({:.4})", theta),
        }
    }
}

impl Gate {
    /// Returns the 2x2 matrix of the gate in row-major order.
    pub fn matrix(&self) -> Matrix2 {
        let i = Complex64::new(0.0, 1.0);

        match self {
            Gate::X => [ZERO, ONE, ONE, ZERO],
            Gate::Y => [ZERO, -i, i, ZERO],
            Gate::Z => [ONE, ZERO, ZERO, -ONE],
            Gate::H => {
                let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
                [s, s, s, -s]
            }
            Gate::S => [ONE, ZERO, ZERO, i],
            Gate::T => [ONE, ZERO, ZERO, Complex64::from_polar(1.0, FRAC_PI_4)],
            Gate::Phase(theta) => [ONE, ZERO, ZERO, Complex64::from_polar(1.0, *theta)],
            Gate::Rx(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let neg_i_sin = Complex64::new(0.0, -(theta / 2.0).sin());
                [cos, neg_i_sin, neg_i_sin, cos]
            }
            Gate::Ry(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let sin = Complex64::new((theta / 2.0).sin(), 0.0);
                [cos, -sin, sin, cos]
            }
            Gate::Rz(theta) => {
                let phase_neg = Complex64::from_polar(1.0, -theta / 2.0);
                let phase_pos = Complex64::from_polar(1.0, theta / 2.0);
                [phase_neg, ZERO, ZERO, phase_pos]
            }
            // (1+i)/2 on the diagonal, (1-i)/2 off it
            Gate::SqrtX => {
                let p = Complex64::new(0.5, 0.5);
                let m = Complex64::new(0.5, -0.5);
                [p, m, m, p]
            }
            Gate::ISqrtX => {
                let p = Complex64::new(0.5, 0.5);
                let m = Complex64::new(0.5, -0.5);
                [m, p, p, m]
            }
        }
    }

    /// Return the adjoint (conjugate transpose) of this gate.
    pub fn dagger(&self) -> Self {
        match self {
            Gate::H | Gate::X | Gate::Y | Gate::Z => *self,
            Gate::S => Gate::Phase(-std::f64::consts::FRAC_PI_2),
            Gate::T => Gate::Phase(-FRAC_PI_4),
            Gate::Rx(theta) => Gate::Rx(-theta),
            Gate::Ry(theta) => Gate::Ry(-theta),
            Gate::Rz(theta) => Gate::Rz(-theta),
            Gate::Phase(theta) => Gate::Phase(-theta),
            Gate::SqrtX => Gate::ISqrtX,
            Gate::ISqrtX => Gate::SqrtX,
        }
    }
}

/// Product `left * right` of two 2x2 matrices.
pub fn mul2x2(left: &Matrix2, right: &Matrix2) -> Matrix2 {
    [
        left[0] * right[0] + left[1] * right[2],
        left[0] * right[1] + left[1] * right[3],
        left[2] * right[0] + left[3] * right[2],
        left[2] * right[1] + left[3] * right[3],
    ]
}
