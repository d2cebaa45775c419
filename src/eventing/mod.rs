//! Eventing - State Change Notifications

mod app_event;
mod bus;

pub use app_event::*;
pub use bus::*;
