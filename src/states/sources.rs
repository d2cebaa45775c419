//! Source Manager
//!
//! Source CRUD within a profile, plus read-only filesystem helpers used when
//! editing a source.

use crate::domain::{Item, Source};
use crate::error::Result;
use crate::helpers::BusyFlag;
use crate::states::ConfigStore;
use tracing::{debug, info, warn};

/// Source create/update/delete with busy flags
#[derive(Clone, Debug)]
pub struct SourceManager {
    store: ConfigStore,
    creating: BusyFlag,
    updating: BusyFlag,
    deleting: BusyFlag,
}

impl SourceManager {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            creating: BusyFlag::new(),
            updating: BusyFlag::new(),
            deleting: BusyFlag::new(),
        }
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

    /// Add a source to a profile
    ///
    /// An empty `target_path` is treated as absent; the source then links into
    /// the profile base path.
    pub async fn create_source(
        &self,
        profile_id: &str,
        name: &str,
        source_path: &str,
        target_path: Option<&str>,
    ) -> Result<Source> {
        let _busy = self.creating.enter();
        let target_path = target_path.filter(|path| !path.is_empty());

        let source = self
            .store
            .client()
            .create_source(profile_id, name, source_path, target_path)
            .await?;
        info!(profile_id, source_id = %source.id, name, "Source created");

        self.reload().await;
        Ok(source)
    }

    pub async fn update_source(&self, profile_id: &str, source: &Source) -> Result<Source> {
        let _busy = self.updating.enter();

        let updated = self.store.client().update_source(profile_id, source).await?;
        info!(profile_id, source_id = %updated.id, "Source updated");

        self.reload().await;
        Ok(updated)
    }

    pub async fn delete_source(&self, profile_id: &str, source_id: &str) -> Result<()> {
        let _busy = self.deleting.enter();

        self.store
            .client()
            .delete_source(profile_id, source_id)
            .await?;
        info!(profile_id, source_id, "Source deleted");

        self.reload().await;
        Ok(())
    }

    /// Preview the entries of a source directory
    pub async fn list_items(&self, source_path: &str) -> Result<Vec<Item>> {
        let items = self.store.client().list_items(source_path).await?;
        debug!(source_path, count = items.len(), "Listed source directory");
        Ok(items)
    }

    /// Whether `path` exists on the host
    pub async fn validate_path(&self, path: &str) -> Result<bool> {
        self.store.client().validate_path(path).await
    }

    async fn reload(&self) {
        if let Err(e) = self.store.reload_config().await {
            warn!(error = %e, "Reload after source change failed");
        }
    }
}
