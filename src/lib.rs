pub mod error;
pub mod config;
pub mod store;
pub mod index;
pub mod gate;
pub mod instruct;
pub mod register;
pub mod swap;
pub mod probs;
pub mod measure;

pub use config::{PhasePolicy, RegisterConfig};
pub use error::{RegisterError, Result};
pub use gate::{Gate, Matrix2};
pub use register::Register;
pub use store::{AmplitudeStore, DenseStore, SparseStore};
