//! Artifact persistence for ryc

pub mod saver;

pub use saver::*;
