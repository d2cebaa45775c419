//! AppEntities - Component Handles
//!
//! All client-side components are built here around one shared
//! [`EventBus`] and one [`BackendClient`], so the UI receives a single
//! handle instead of reaching for globals.

use crate::error::Result;
use crate::eventing::{AppEvent, EventBus};
use crate::services::{BackendClient, CommandChannel, UpdateService};
use crate::states::{
    ConfigStore, ItemScope, ItemSyncController, PreferenceStore, ProfileManager, SourceManager,
    UpdateManager,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Collection of all component handles
#[derive(Clone, Debug)]
pub struct AppEntities {
    /// Change notifications for every component
    pub events: EventBus,
    /// Configuration snapshot, active profile and permissions
    pub config: ConfigStore,
    pub profiles: ProfileManager,
    pub sources: SourceManager,
    /// Self-update state machine
    pub updater: UpdateManager,
    /// Local UI preferences
    pub preferences: PreferenceStore,
}

impl AppEntities {
    /// Wire every component to the given backend transport and update service
    pub fn new(
        channel: Arc<dyn CommandChannel>,
        updates: Arc<dyn UpdateService>,
        preferences: PreferenceStore,
    ) -> Self {
        let events = EventBus::new();
        let config = ConfigStore::new(BackendClient::new(channel), events.clone());

        Self {
            profiles: ProfileManager::new(config.clone()),
            sources: SourceManager::new(config.clone()),
            updater: UpdateManager::new(updates, events.clone()),
            preferences: preferences.with_events(events.clone()),
            config,
            events,
        }
    }

    /// Load configuration and permissions
    pub async fn start(&self) -> Result<()> {
        info!("Starting client state layer");
        self.config.initialize().await
    }

    /// Item list controller for a scope observed through `scope`
    ///
    /// Call [`ItemSyncController::watch_scope`] on the result to start syncing.
    pub fn items(&self, scope: watch::Receiver<ItemScope>) -> ItemSyncController {
        ItemSyncController::new(self.config.client().clone(), self.events.clone(), scope)
    }

    pub fn subscribe(&self) -> crossbeam_channel::Receiver<AppEvent> {
        self.events.subscribe()
    }

    /// Drop loaded state and any retained update
    pub fn shutdown(&self) {
        self.config.clear();
        self.updater.reset();
        info!("Client state layer shut down");
    }
}
