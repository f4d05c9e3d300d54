//! Command line interface for ryc

pub mod args;
pub mod output;

pub use args::*;
pub use output::*;
