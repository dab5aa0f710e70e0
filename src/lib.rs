//! datasynth - Seeded synthetic data generation for tabular data
//!
//! A library of reproducible sampling and correlation routines over an
//! in-memory columnar table: distribution samplers, column correlators, and
//! a distribution-replica analyzer that statistically mimics an existing
//! dataset.

pub mod analyze;
pub mod correlate;
pub mod env;
pub mod error;
pub mod hurst;
pub mod model;
pub mod output;
pub mod reader;
pub mod recipe;
pub mod rng;
pub mod sample;

pub use error::{Error, Result};
pub use model::Table;
pub use recipe::Recipe;
