//! State Layer
//!
//! Components that mirror backend state on the client. Each one owns its data
//! behind short `parking_lot` locks and publishes changes on the shared
//! [`EventBus`](crate::eventing::EventBus):
//!
//! ```text
//! UI Action → component method → BackendClient command → state update → AppEvent → UI refresh
//! ```

mod config_store;
mod items;
mod load_state;
mod preferences;
mod profiles;
mod sources;
mod updater;

pub use config_store::*;
pub use items::*;
pub use load_state::*;
pub use preferences::*;
pub use profiles::*;
pub use sources::*;
pub use updater::*;
