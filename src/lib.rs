pub mod config;
pub mod engines;
pub mod error;
pub mod persistence;
pub mod types;

pub use config::SimulationConfig;
pub use engines::population::{Population, StepRecord};
pub use error::{BlottoError, Result};
pub use types::Strategy;
