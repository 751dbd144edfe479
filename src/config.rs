//! Register configuration.
//!
//! The normalization policy and the global phase convention are inputs from
//! the enclosing register, never hard-coded by the gate or measurement code.

use serde::{Deserialize, Serialize};

use crate::error::{RegisterError, Result};

/// Largest register width addressable with a `usize` permutation value.
pub const MAX_QUBITS: usize = usize::BITS as usize - 1;

/// Global phase convention for non-unitary operations and fresh states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhasePolicy {
    /// Always use phase 1.
    #[default]
    Unity,
    /// Draw a uniformly random unit phase each time one is needed.
    Random,
}

/// Construction-time options for a [`Register`](crate::register::Register).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// Renormalize before measurement and track the running norm during
    /// single-bit gate application.
    pub normalize: bool,
    pub phase: PhasePolicy,
    /// Back the register with a sparse map instead of a dense array.
    pub sparse: bool,
    /// Fixed RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Squared magnitudes below this are flushed to zero when normalizing.
    pub norm_threshold: f64,
    /// Qubit count at which amplitude loops fan out across threads.
    pub parallel_threshold: usize,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        RegisterConfig {
            normalize: true,
            phase: PhasePolicy::Unity,
            sparse: false,
            seed: None,
            norm_threshold: 1e-30,
            parallel_threshold: 14,
        }
    }
}

impl RegisterConfig {
    /// Default configuration with a fixed RNG seed.
    pub fn seeded(seed: u64) -> Self {
        RegisterConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Example
    /// ```
    /// use qreg_rs::config::{PhasePolicy, RegisterConfig};
    ///
    /// let config = RegisterConfig::from_json(r#"{"sparse": true, "phase": "random"}"#).unwrap();
    /// assert!(config.sparse);
    /// assert_eq!(config.phase, PhasePolicy::Random);
    /// assert!(config.normalize);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RegisterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.norm_threshold.is_finite() || self.norm_threshold < 0.0 {
            return Err(RegisterError::InvalidConfig {
                name: "norm_threshold",
                reason: format!("must be finite and non-negative, got {}", self.norm_threshold),
            });
        }
        Ok(())
    }
}
