//! matchscore command line
//!
//! `train` fits the classifier offline and writes the two artifacts the
//! server loads; `probe` drives a running server through all three
//! endpoints.

pub mod cli;
pub mod probe;
pub mod train;

pub use cli::{Cli, Commands};
