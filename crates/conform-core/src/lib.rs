//! Conformance test engine for search adapters.
//!
//! [`Tester`] drives a fixed sequence of probes against anything that
//! implements [`Adapter`] and reports one status line per step.

pub mod adapter;
pub mod config;
pub mod handler;
pub mod step;
pub mod tester;
pub mod validate;

mod error;

#[cfg(test)]
mod tests;

pub use adapter::{Adapter, Download};
pub use error::{Error, Result};
pub use step::{StepOutcome, StepRunner};
pub use tester::{RunOutcome, Tester, TesterOptions, test_adapter};

pub use conform_types::*;
