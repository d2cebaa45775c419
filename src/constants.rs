//! Constants
//!
//! Backend command names, persisted file names and user-facing messages.

// ==================== Backend Commands ====================

pub const CMD_LOAD_CONFIG: &str = "load_config";
pub const CMD_CHECK_SYMLINK_PERMISSIONS: &str = "check_symlink_permissions";
pub const CMD_SET_ACTIVE_PROFILE: &str = "set_active_profile";
pub const CMD_CREATE_PROFILE: &str = "create_profile";
pub const CMD_UPDATE_PROFILE: &str = "update_profile";
pub const CMD_DELETE_PROFILE: &str = "delete_profile";
pub const CMD_CREATE_SOURCE: &str = "create_source";
pub const CMD_UPDATE_SOURCE: &str = "update_source";
pub const CMD_DELETE_SOURCE: &str = "delete_source";
pub const CMD_GET_ITEMS_WITH_STATUS: &str = "get_items_with_status";
pub const CMD_TOGGLE_ITEM: &str = "toggle_item";
pub const CMD_LIST_ITEMS: &str = "list_items";
pub const CMD_VALIDATE_PATH: &str = "validate_path";

// ==================== Messages ====================

/// Returned by toggles issued without a full (profile, source) scope
pub const NO_SCOPE_MESSAGE: &str = "No profile or source selected";

/// Recorded when installing without a retained update handle
pub const NO_UPDATE_MESSAGE: &str = "No update available to install";

// ==================== Persistence ====================

/// Project identifiers for `directories::ProjectDirs`
pub const PROJECT_QUALIFIER: &str = "com";
pub const PROJECT_ORGANIZATION: &str = "symlink-manager";
pub const PROJECT_APPLICATION: &str = "symlink-manager";

/// Local preference file name (inside the config directory)
pub const PREFERENCES_FILE: &str = "preferences.toml";

/// Rolling log file prefix
pub const LOG_FILE_PREFIX: &str = "symlink-manager.log";

/// Upper bound for download progress percentage
pub const PROGRESS_COMPLETE: u8 = 100;
