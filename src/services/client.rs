//! Backend Client
//!
//! Typed facade over a [`CommandChannel`]. Each method issues exactly one
//! backend command, serializes its arguments and decodes the reply. Errors come
//! back as [`Error::Command`] (rejected / transport failure) or
//! [`Error::Decode`] (reply of the wrong shape).

use crate::constants::*;
use crate::domain::{AppConfig, Item, PermissionStatus, Profile, Source, SymlinkResult};
use crate::error::{Error, Result};
use crate::services::CommandChannel;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

/// Typed command surface of the backend
#[derive(Clone)]
pub struct BackendClient {
    channel: Arc<dyn CommandChannel>,
}

impl BackendClient {
    /// Create a client over the given transport
    pub fn new(channel: Arc<dyn CommandChannel>) -> Self {
        Self { channel }
    }

    async fn call<T: DeserializeOwned>(&self, command: &'static str, args: Value) -> Result<T> {
        tracing::debug!(command, "Invoking backend command");

        let reply = self
            .channel
            .invoke(command, args)
            .await
            .map_err(|message| {
                tracing::warn!(command, error = %message, "Backend command failed");
                Error::Command { command, message }
            })?;

        serde_json::from_value(reply).map_err(|source| Error::Decode { command, source })
    }

    // ==================== Config ====================

    pub async fn load_config(&self) -> Result<AppConfig> {
        self.call(CMD_LOAD_CONFIG, json!({})).await
    }

    pub async fn check_symlink_permissions(&self) -> Result<PermissionStatus> {
        self.call(CMD_CHECK_SYMLINK_PERMISSIONS, json!({})).await
    }

    pub async fn set_active_profile(&self, profile_id: Option<&str>) -> Result<()> {
        self.call(CMD_SET_ACTIVE_PROFILE, json!({ "profileId": profile_id }))
            .await
    }

    // ==================== Profiles ====================

    pub async fn create_profile(&self, name: &str, base_path: &str) -> Result<Profile> {
        self.call(
            CMD_CREATE_PROFILE,
            json!({ "name": name, "basePath": base_path }),
        )
        .await
    }

    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        self.call(CMD_UPDATE_PROFILE, json!({ "profile": profile }))
            .await
    }

    pub async fn delete_profile(&self, profile_id: &str) -> Result<()> {
        self.call(CMD_DELETE_PROFILE, json!({ "profileId": profile_id }))
            .await
    }

    // ==================== Sources ====================

    /// `target_path` is always sent, as `null` when absent
    pub async fn create_source(
        &self,
        profile_id: &str,
        name: &str,
        source_path: &str,
        target_path: Option<&str>,
    ) -> Result<Source> {
        self.call(
            CMD_CREATE_SOURCE,
            json!({
                "profileId": profile_id,
                "name": name,
                "sourcePath": source_path,
                "targetPath": target_path,
            }),
        )
        .await
    }

    pub async fn update_source(&self, profile_id: &str, source: &Source) -> Result<Source> {
        self.call(
            CMD_UPDATE_SOURCE,
            json!({ "profileId": profile_id, "source": source }),
        )
        .await
    }

    pub async fn delete_source(&self, profile_id: &str, source_id: &str) -> Result<()> {
        self.call(
            CMD_DELETE_SOURCE,
            json!({ "profileId": profile_id, "sourceId": source_id }),
        )
        .await
    }

    // ==================== Items ====================

    pub async fn get_items_with_status(
        &self,
        profile_id: &str,
        source_id: &str,
    ) -> Result<Vec<Item>> {
        self.call(
            CMD_GET_ITEMS_WITH_STATUS,
            json!({ "profileId": profile_id, "sourceId": source_id }),
        )
        .await
    }

    pub async fn toggle_item(
        &self,
        profile_id: &str,
        source_id: &str,
        item_name: &str,
        enabled: bool,
    ) -> Result<SymlinkResult> {
        self.call(
            CMD_TOGGLE_ITEM,
            json!({
                "profileId": profile_id,
                "sourceId": source_id,
                "itemName": item_name,
                "enabled": enabled,
            }),
        )
        .await
    }

    // ==================== Filesystem ====================

    /// Raw listing of a source directory, without link status
    pub async fn list_items(&self, source_path: &str) -> Result<Vec<Item>> {
        self.call(CMD_LIST_ITEMS, json!({ "sourcePath": source_path }))
            .await
    }

    pub async fn validate_path(&self, path: &str) -> Result<bool> {
        self.call(CMD_VALIDATE_PATH, json!({ "path": path })).await
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient").finish_non_exhaustive()
    }
}
