//! Profile Manager
//!
//! Profile CRUD on top of the [`ConfigStore`]. Every successful mutation is
//! followed by a full configuration reload; nothing is patched locally.

use crate::domain::Profile;
use crate::error::Result;
use crate::helpers::BusyFlag;
use crate::states::ConfigStore;
use tracing::{info, warn};

/// Profile create/update/delete with busy flags
#[derive(Clone, Debug)]
pub struct ProfileManager {
    store: ConfigStore,
    creating: BusyFlag,
    updating: BusyFlag,
    deleting: BusyFlag,
}

impl ProfileManager {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            creating: BusyFlag::new(),
            updating: BusyFlag::new(),
            deleting: BusyFlag::new(),
        }
    }

    // ==================== Getters ====================

    pub fn profiles(&self) -> Vec<Profile> {
        self.store.profiles()
    }

    pub fn active_profile(&self) -> Option<Profile> {
        self.store.active_profile()
    }

    pub fn is_creating(&self) -> bool {
        self.creating.is_set()
    }

    pub fn is_updating(&self) -> bool {
        self.updating.is_set()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.is_set()
    }

    // ==================== Actions ====================

    pub async fn create_profile(&self, name: &str, base_path: &str) -> Result<Profile> {
        let _busy = self.creating.enter();

        let profile = self.store.client().create_profile(name, base_path).await?;
        info!(profile_id = %profile.id, name, "Profile created");

        self.reload().await;
        Ok(profile)
    }

    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        let _busy = self.updating.enter();

        let updated = self.store.client().update_profile(profile).await?;
        info!(profile_id = %updated.id, "Profile updated");

        self.reload().await;
        Ok(updated)
    }

    /// Delete a profile; if it was active, select the first remaining one
    pub async fn delete_profile(&self, profile_id: &str) -> Result<()> {
        let _busy = self.deleting.enter();

        self.store.client().delete_profile(profile_id).await?;
        info!(profile_id, "Profile deleted");

        self.reload().await;

        if self.store.active_profile_id().as_deref() == Some(profile_id) {
            // The snapshot may predate the delete if the reload failed
            let next = self
                .store
                .profiles()
                .into_iter()
                .find(|p| p.id != profile_id)
                .map(|p| p.id);
            info!(next = ?next, "Active profile deleted; selecting replacement");
            self.store.set_active_profile(next).await;
        }

        Ok(())
    }

    /// Select a profile (see [`ConfigStore::set_active_profile`])
    pub async fn set_active_profile(&self, profile_id: Option<String>) {
        self.store.set_active_profile(profile_id).await;
    }

    async fn reload(&self) {
        if let Err(e) = self.store.reload_config().await {
            warn!(error = %e, "Reload after profile change failed");
        }
    }
}
