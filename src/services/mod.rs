//! Service Layer
//!
//! Abstraction over the external collaborators: the privileged backend
//! (reached through named async commands) and the self-update provider.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       State Layer                            │
//! │  ConfigStore · ItemSyncController · Profile/SourceManager    │
//! │                     UpdateManager                            │
//! └─────────────────────────────────────────────────────────────┘
//!                │                              │
//!                ▼ typed calls                  ▼ check / stream / relaunch
//! ┌──────────────────────────────┐   ┌──────────────────────────┐
//! │ BackendClient                │   │ UpdateService            │
//! │   └─ dyn CommandChannel      │   │   └─ dyn UpdateHandle    │
//! └──────────────────────────────┘   └──────────────────────────┘
//! ```

mod backend;
mod client;
mod runtime;
mod updater;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::*;
pub use client::*;
pub use runtime::*;
pub use updater::*;
