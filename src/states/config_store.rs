//! Config Store
//!
//! Holds the authoritative configuration snapshot, the active profile
//! selection and the host permission status. This is the only component that
//! replaces the whole snapshot; everything else asks it to reload.
//!
//! The snapshot is an `Arc<AppConfig>` swapped under a short write lock, so
//! readers always observe either the old or the new complete snapshot. Derived
//! views (`profiles`, `active_profile`, `can_create_symlinks`) are computed on
//! read from a single lock acquisition and are never stored.

use crate::domain::{AppConfig, PermissionStatus, Profile};
use crate::error::Result;
use crate::eventing::{AppEvent, EventBus};
use crate::services::BackendClient;
use crate::states::LoadState;
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct StoreState {
    /// Current snapshot (None before the first successful load)
    config: Option<Arc<AppConfig>>,
    /// Selected profile, possibly ahead of what the backend has persisted
    active_profile_id: Option<String>,
    /// Host capability, fetched once at startup
    permissions: Option<PermissionStatus>,
    load_state: LoadState,
    loaded_at: Option<DateTime<Local>>,
}

struct ConfigStoreInner {
    client: BackendClient,
    events: EventBus,
    state: RwLock<StoreState>,
}

/// Authoritative in-memory configuration
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<ConfigStoreInner>,
}

impl ConfigStore {
    /// Create an empty store; call [`ConfigStore::initialize`] to load it
    pub fn new(client: BackendClient, events: EventBus) -> Self {
        Self {
            inner: Arc::new(ConfigStoreInner {
                client,
                events,
                state: RwLock::new(StoreState::default()),
            }),
        }
    }

    /// Backend client shared with the managers
    pub fn client(&self) -> &BackendClient {
        &self.inner.client
    }

    /// Event bus shared with the managers
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    // ==================== Getters ====================

    /// Current configuration snapshot
    pub fn config(&self) -> Option<Arc<AppConfig>> {
        self.inner.state.read().config.clone()
    }

    /// Profiles of the current snapshot, or empty
    pub fn profiles(&self) -> Vec<Profile> {
        self.inner
            .state
            .read()
            .config
            .as_ref()
            .map(|config| config.profiles.clone())
            .unwrap_or_default()
    }

    pub fn active_profile_id(&self) -> Option<String> {
        self.inner.state.read().active_profile_id.clone()
    }

    /// Profile matching the active ID in the current snapshot
    pub fn active_profile(&self) -> Option<Profile> {
        let state = self.inner.state.read();
        let id = state.active_profile_id.as_deref()?;
        state.config.as_ref()?.profile(id).cloned()
    }

    pub fn permission_status(&self) -> Option<PermissionStatus> {
        self.inner.state.read().permissions.clone()
    }

    /// Permission flag, `true` until the first permission check completes
    pub fn can_create_symlinks(&self) -> bool {
        self.inner
            .state
            .read()
            .permissions
            .as_ref()
            .is_none_or(|p| p.can_create_symlinks)
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.state.read().load_state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().load_state.is_loading()
    }

    /// Error of the last failed initialize/reload
    pub fn error(&self) -> Option<String> {
        self.inner.state.read().load_state.error().map(str::to_string)
    }

    /// When the current snapshot was installed
    pub fn last_loaded_at(&self) -> Option<DateTime<Local>> {
        self.inner.state.read().loaded_at
    }

    // ==================== Actions ====================

    /// Fetch configuration and permissions together
    ///
    /// Both results are applied, or neither: if either call fails the store is
    /// left empty with no profile selected and the error recorded.
    pub async fn initialize(&self) -> Result<()> {
        self.inner.state.write().load_state = LoadState::Loading;
        info!("Initializing configuration store");

        let client = &self.inner.client;
        let fetched =
            futures::future::try_join(client.load_config(), client.check_symlink_permissions())
                .await;

        match fetched {
            Ok((config, permissions)) => {
                let active = resolve_active_profile(&config);
                let profiles = config.profiles.len();
                let can_create_symlinks = permissions.can_create_symlinks;

                {
                    let mut state = self.inner.state.write();
                    state.config = Some(Arc::new(config));
                    state.permissions = Some(permissions);
                    state.active_profile_id = active.clone();
                    state.load_state = LoadState::Loaded;
                    state.loaded_at = Some(Local::now());
                }

                info!(profiles, active_profile = ?active, can_create_symlinks, "Configuration loaded");
                self.emit(AppEvent::ConfigReplaced { profiles });
                self.emit(AppEvent::PermissionsLoaded {
                    can_create_symlinks,
                });
                self.emit(AppEvent::active_profile(active.as_deref()));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to initialize configuration");
                *self.inner.state.write() = StoreState {
                    load_state: LoadState::Error(e.to_string().into()),
                    ..StoreState::default()
                };
                self.emit(AppEvent::ConfigReplaced { profiles: 0 });
                self.emit(AppEvent::active_profile(None));
                Err(e)
            }
        }
    }

    /// Select a profile immediately, then persist the choice
    ///
    /// A persistence failure is logged and the selection is kept.
    pub async fn set_active_profile(&self, profile_id: Option<String>) {
        self.inner.state.write().active_profile_id = profile_id.clone();
        self.emit(AppEvent::active_profile(profile_id.as_deref()));

        if let Err(e) = self
            .inner
            .client
            .set_active_profile(profile_id.as_deref())
            .await
        {
            warn!(error = %e, profile_id = ?profile_id, "Failed to save active profile");
        }
    }

    /// Refetch the configuration and replace the snapshot
    ///
    /// Permissions and the active selection are left untouched. On failure the
    /// previous snapshot stays in place and the error is recorded.
    pub async fn reload_config(&self) -> Result<()> {
        match self.inner.client.load_config().await {
            Ok(config) => {
                self.install(config);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to reload configuration");
                self.inner.state.write().load_state = LoadState::Error(e.to_string().into());
                Err(e)
            }
        }
    }

    /// Replace the snapshot with one the caller already holds
    pub fn update_config(&self, config: AppConfig) {
        self.install(config);
    }

    /// Tear down to the empty state
    pub fn clear(&self) {
        *self.inner.state.write() = StoreState::default();
        info!("Configuration store cleared");
        self.emit(AppEvent::ConfigReplaced { profiles: 0 });
        self.emit(AppEvent::active_profile(None));
    }

    fn install(&self, config: AppConfig) {
        let profiles = config.profiles.len();
        {
            let mut state = self.inner.state.write();
            state.config = Some(Arc::new(config));
            state.load_state = LoadState::Loaded;
            state.loaded_at = Some(Local::now());
        }
        info!(profiles, "Configuration snapshot replaced");
        self.emit(AppEvent::ConfigReplaced { profiles });
    }

    fn emit(&self, event: AppEvent) {
        self.inner.events.emit(event);
    }
}

/// Persisted selection if it still exists, else the first profile
fn resolve_active_profile(config: &AppConfig) -> Option<String> {
    config
        .active_profile_id
        .as_deref()
        .filter(|id| config.profile(id).is_some())
        .or_else(|| config.first_profile_id())
        .map(str::to_string)
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("ConfigStore")
            .field("profiles", &state.config.as_ref().map(|c| c.profiles.len()))
            .field("active_profile_id", &state.active_profile_id)
            .field("load_state", &state.load_state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::services::mock::{MockChannel, config_json, permissions_json};
    use serde_json::json;

    fn store(channel: &Arc<MockChannel>) -> ConfigStore {
        ConfigStore::new(BackendClient::new(channel.clone()), EventBus::new())
    }

    #[tokio::test]
    async fn initialize_selects_first_profile_without_persisted_choice() {
        let channel = MockChannel::new();
        channel.reply_value(CMD_LOAD_CONFIG, config_json(&["p1"], None));
        channel.reply_value(CMD_CHECK_SYMLINK_PERMISSIONS, permissions_json(true));
        let store = store(&channel);

        store.initialize().await.expect("initialized");

        assert_eq!(store.active_profile_id().as_deref(), Some("p1"));
        assert_eq!(store.active_profile().map(|p| p.id), Some("p1".to_string()));
        assert!(store.load_state().is_loaded());
        assert!(store.last_loaded_at().is_some());
    }

    #[tokio::test]
    async fn initialize_prefers_persisted_active_profile() {
        let channel = MockChannel::new();
        channel.reply_value(CMD_LOAD_CONFIG, config_json(&["p1", "p2"], Some("p2")));
        channel.reply_value(CMD_CHECK_SYMLINK_PERMISSIONS, permissions_json(false));
        let store = store(&channel);

        store.initialize().await.expect("initialized");

        assert_eq!(store.active_profile_id().as_deref(), Some("p2"));
        assert!(!store.can_create_symlinks());
    }

    #[tokio::test]
    async fn initialize_drops_dangling_persisted_profile() {
        let channel = MockChannel::new();
        channel.reply_value(CMD_LOAD_CONFIG, config_json(&["p1"], Some("gone")));
        channel.reply_value(CMD_CHECK_SYMLINK_PERMISSIONS, permissions_json(true));
        let store = store(&channel);

        store.initialize().await.expect("initialized");

        assert_eq!(store.active_profile_id().as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn initialize_with_no_profiles_selects_nothing() {
        let channel = MockChannel::new();
        channel.reply_value(CMD_LOAD_CONFIG, config_json(&[], None));
        channel.reply_value(CMD_CHECK_SYMLINK_PERMISSIONS, permissions_json(true));
        let store = store(&channel);

        store.initialize().await.expect("initialized");

        assert_eq!(store.active_profile_id(), None);
        assert!(store.profiles().is_empty());
    }

    #[tokio::test]
    async fn initialize_failure_applies_neither_result() {
        let channel = MockChannel::new();
        channel.reply_value(CMD_LOAD_CONFIG, config_json(&["p1"], None));
        channel.fail(CMD_CHECK_SYMLINK_PERMISSIONS, "permission probe crashed");
        let store = store(&channel);

        let err = store.initialize().await.expect_err("must fail");

        assert_eq!(err.to_string(), "permission probe crashed");
        assert_eq!(store.config(), None);
        assert!(store.profiles().is_empty());
        assert_eq!(store.active_profile_id(), None);
        assert_eq!(store.permission_status(), None);
        assert!(store.can_create_symlinks());
        assert_eq!(store.error().as_deref(), Some("permission probe crashed"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn set_active_profile_keeps_selection_when_persist_fails() {
        let channel = MockChannel::new();
        channel.fail(CMD_SET_ACTIVE_PROFILE, "disk full");
        let store = store(&channel);
        let events = store.events().subscribe();

        store.set_active_profile(Some("p2".to_string())).await;

        assert_eq!(store.active_profile_id().as_deref(), Some("p2"));
        assert_eq!(channel.last_args(CMD_SET_ACTIVE_PROFILE), Some(json!({ "profileId": "p2" })));
        assert_eq!(events.try_recv().ok(), Some(AppEvent::active_profile(Some("p2"))));
    }

    #[tokio::test]
    async fn clearing_active_profile_sends_null() {
        let channel = MockChannel::new();
        channel.reply_value(CMD_SET_ACTIVE_PROFILE, json!(null));
        let store = store(&channel);

        store.set_active_profile(None).await;

        assert_eq!(channel.last_args(CMD_SET_ACTIVE_PROFILE), Some(json!({ "profileId": null })));
    }

    #[tokio::test]
    async fn reload_replaces_snapshot_but_not_selection() {
        let channel = MockChannel::new();
        channel.reply_value(CMD_LOAD_CONFIG, config_json(&["p1"], None));
        channel.reply_value(CMD_CHECK_SYMLINK_PERMISSIONS, permissions_json(false));
        let store = store(&channel);
        store.initialize().await.expect("initialized");
        let before = store.config().expect("snapshot");

        channel.reply_value(CMD_LOAD_CONFIG, config_json(&["p1", "p2"], Some("p2")));
        store.reload_config().await.expect("reloaded");

        let after = store.config().expect("snapshot");
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(store.profiles().len(), 2);
        assert_eq!(store.active_profile_id().as_deref(), Some("p1"));
        assert!(!store.can_create_symlinks());
        assert_eq!(channel.calls(CMD_CHECK_SYMLINK_PERMISSIONS), 1);
    }

    #[tokio::test]
    async fn reload_failure_keeps_previous_snapshot() {
        let channel = MockChannel::new();
        channel.reply_value(CMD_LOAD_CONFIG, config_json(&["p1"], None));
        channel.reply_value(CMD_CHECK_SYMLINK_PERMISSIONS, permissions_json(true));
        let store = store(&channel);
        store.initialize().await.expect("initialized");

        channel.fail(CMD_LOAD_CONFIG, "config locked");
        assert!(store.reload_config().await.is_err());

        assert_eq!(store.profiles().len(), 1);
        assert_eq!(store.error().as_deref(), Some("config locked"));
    }

    #[tokio::test]
    async fn update_config_and_clear() {
        let channel = MockChannel::new();
        let store = store(&channel);
        let config: AppConfig =
            serde_json::from_value(config_json(&["a", "b"], None)).expect("config");

        store.update_config(config);
        assert_eq!(store.profiles().len(), 2);
        assert_eq!(channel.total_calls(), 0);

        store.clear();
        assert_eq!(store.config(), None);
        assert!(matches!(store.load_state(), LoadState::Idle));
    }

    #[test]
    fn active_profile_hides_unknown_id() {
        let store = ConfigStore::new(BackendClient::new(MockChannel::new()), EventBus::new());
        let config: AppConfig = serde_json::from_value(config_json(&["p1"], None)).expect("config");
        store.update_config(config);
        store.inner.state.write().active_profile_id = Some("p9".to_string());

        assert_eq!(store.active_profile(), None);
    }
}
