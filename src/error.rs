//! Error types for register construction and configuration.
//!
//! Only the recoverable surface reports errors. Caller-contract violations
//! inside gate application and measurement (bad bit positions, unsorted
//! powers, mismatched buffer lengths) panic instead.

use thiserror::Error;

/// Result type alias for register operations.
pub type Result<T> = std::result::Result<T, RegisterError>;

/// Errors that can occur while building or configuring a register.
#[derive(Error, Debug)]
pub enum RegisterError {
    /// The register is too wide for a `usize` permutation value.
    #[error("qubit count {qubits} exceeds the addressable maximum of {max}")]
    TooManyQubits { qubits: usize, max: usize },

    /// The initial permutation does not fit in the register.
    #[error("initial permutation {perm} is out of range for {qubits} qubits")]
    PermutationOutOfRange { perm: usize, qubits: usize },

    /// A configuration value is outside its valid range.
    #[error("invalid config value '{name}': {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    /// The configuration JSON could not be parsed.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
