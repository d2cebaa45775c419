//! AppEvent - Application Event Enum
//!
//! Change notifications sent from the state layer to subscribers (the UI).
//! Events describe what changed; subscribers read the new values from the
//! owning component.

use crate::domain::UpdateStatus;
use crate::states::ThemeMode;

/// Application events for state -> UI communication
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A new configuration snapshot was installed
    ConfigReplaced {
        profiles: usize,
    },

    /// The active profile selection changed
    ActiveProfileChanged {
        profile_id: Option<String>,
    },

    /// Permission status was fetched
    PermissionsLoaded {
        can_create_symlinks: bool,
    },

    /// The item list for a scope was replaced (or cleared)
    ItemsReplaced {
        profile_id: Option<String>,
        source_id: Option<String>,
        count: usize,
    },

    /// A single item was patched after a successful toggle
    ItemToggled {
        item_name: String,
        enabled: bool,
    },

    /// The update state machine moved to a new status
    UpdateStatusChanged {
        status: UpdateStatus,
    },

    /// Download progress percentage changed
    UpdateProgress {
        percent: u8,
    },

    /// Theme preference changed
    ThemeChanged {
        mode: ThemeMode,
    },
}

impl AppEvent {
    /// Create an active profile change event
    pub fn active_profile(profile_id: Option<&str>) -> Self {
        Self::ActiveProfileChanged {
            profile_id: profile_id.map(str::to_string),
        }
    }

    /// Create an update status event
    pub fn update_status(status: UpdateStatus) -> Self {
        Self::UpdateStatusChanged { status }
    }
}
