//! Application Layer
//!
//! Composition root for the client-side components.

pub mod entities;

pub use entities::AppEntities;
