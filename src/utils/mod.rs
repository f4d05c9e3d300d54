//! Utility functions for ryc

pub mod filename;
pub mod humanize;
pub mod url;

pub use self::filename::*;
pub use self::humanize::*;
pub use self::url::*;
