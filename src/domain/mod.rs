//! Domain - Pure Data Structures and Protocol Types
//!
//! Wire types exchanged with the backend and the update service. Field names
//! are camelCase on the wire.

pub mod config;
pub mod item;
pub mod update;

pub use config::*;
pub use item::*;
pub use update::*;
