//! Helper Utilities
//!
//! Common utilities used across the application.

mod busy;
mod fs;

pub use busy::*;
pub use fs::*;
