//! Symlink Manager Client
//!
//! Client-side state synchronization for the symlink manager desktop app. The
//! privileged backend owns the filesystem and the configuration file; this
//! crate mirrors its state, runs mutations against it and keeps the UI
//! informed through [`eventing::EventBus`].
//!
//! ```text
//! AppEntities
//!   ├─ ConfigStore ──────────┐
//!   ├─ ProfileManager ───────┤
//!   ├─ SourceManager ────────┼─► BackendClient ─► dyn CommandChannel
//!   ├─ ItemSyncController ───┘
//!   ├─ UpdateManager ────────────► dyn UpdateService
//!   └─ PreferenceStore ──────────► preferences.toml
//! ```

pub mod app;
pub mod constants;
pub mod domain;
pub mod error;
pub mod eventing;
pub mod helpers;
pub mod logging;
pub mod services;
pub mod states;

pub use app::AppEntities;
pub use error::{Error, Result};
