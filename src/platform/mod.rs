//! Backend API client and wire types

pub mod api;
pub mod backend;
pub mod client;

pub use api::*;
pub use backend::*;
pub use client::*;
