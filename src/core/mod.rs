//! Core client state machine for ryc

pub mod controller;
pub mod events;
pub mod monitor;
pub mod progress;
pub mod selector;
pub mod session;
pub mod video_info;

pub use controller::*;
pub use events::*;
pub use monitor::*;
pub use progress::*;
pub use selector::*;
pub use session::*;
pub use video_info::*;
