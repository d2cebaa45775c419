//! Item Sync Controller
//!
//! Keeps the item list of one (profile, source) pair in sync with the
//! backend, and applies toggles optimistically.
//!
//! The pair is observed through a `tokio::sync::watch` channel. Registering an
//! observer with [`ItemSyncController::watch_scope`] loads once immediately and
//! again after every change of either identifier.
//!
//! ```text
//! scope sender ──► watch::Receiver<ItemScope>
//!                        │ (immediately, then on change)
//!                        ▼
//!                  load_items() ──► get_items_with_status ──► items (replaced)
//!
//! toggle_item() ──► toggle_item ──► success? ──► patch one item in place
//! ```

use crate::constants::NO_SCOPE_MESSAGE;
use crate::domain::{Item, ItemStatus, SymlinkResult};
use crate::eventing::{AppEvent, EventBus};
use crate::helpers::BusyMap;
use crate::services::{BackendClient, spawn_named};
use crate::states::LoadState;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The (profile, source) pair an item list belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemScope {
    pub profile_id: Option<String>,
    pub source_id: Option<String>,
}

impl ItemScope {
    /// A fully specified scope
    pub fn new(profile_id: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            profile_id: Some(profile_id.into()),
            source_id: Some(source_id.into()),
        }
    }

    /// Both identifiers, if both are present and non-empty
    pub fn ids(&self) -> Option<(&str, &str)> {
        let profile_id = self.profile_id.as_deref().filter(|id| !id.is_empty())?;
        let source_id = self.source_id.as_deref().filter(|id| !id.is_empty())?;
        Some((profile_id, source_id))
    }
}

/// Create the channel that drives an [`ItemSyncController`]
pub fn scope_channel(initial: ItemScope) -> (watch::Sender<ItemScope>, watch::Receiver<ItemScope>) {
    watch::channel(initial)
}

#[derive(Debug, Default)]
struct ItemsState {
    items: Vec<Item>,
    load_state: LoadState,
    /// Bumped by every load; only the latest load may settle `load_state`
    generation: u64,
}

struct ItemsInner {
    client: BackendClient,
    events: EventBus,
    scope: watch::Receiver<ItemScope>,
    state: RwLock<ItemsState>,
    toggling: BusyMap,
}

/// Reactive item list for one scope
#[derive(Clone)]
pub struct ItemSyncController {
    inner: Arc<ItemsInner>,
}

impl ItemSyncController {
    pub fn new(client: BackendClient, events: EventBus, scope: watch::Receiver<ItemScope>) -> Self {
        Self {
            inner: Arc::new(ItemsInner {
                client,
                events,
                scope,
                state: RwLock::new(ItemsState::default()),
                toggling: BusyMap::new(),
            }),
        }
    }

    // ==================== Getters ====================

    /// Current scope
    pub fn scope(&self) -> ItemScope {
        self.inner.scope.borrow().clone()
    }

    pub fn items(&self) -> Vec<Item> {
        self.inner.state.read().items.clone()
    }

    pub fn item(&self, name: &str) -> Option<Item> {
        self.inner
            .state
            .read()
            .items
            .iter()
            .find(|item| item.name == name)
            .cloned()
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.state.read().load_state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().load_state.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.read().load_state.error().map(str::to_string)
    }

    /// Whether a toggle of `name` is in flight
    pub fn is_toggling(&self, name: &str) -> bool {
        self.inner.toggling.is_busy(name)
    }

    /// Names with a toggle in flight
    pub fn toggling_items(&self) -> Vec<String> {
        self.inner.toggling.busy_keys()
    }

    // ==================== Actions ====================

    /// Register the scope observer
    ///
    /// Loads immediately, then reloads whenever the scope changes. The task ends
    /// when the scope sender is dropped.
    pub fn watch_scope(&self) -> JoinHandle<()> {
        let controller = self.clone();
        let mut scope = self.inner.scope.clone();

        spawn_named("item-scope-watch", async move {
            loop {
                let _ = scope.borrow_and_update();
                controller.load_items().await;

                if scope.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Fetch the full item list for the current scope
    ///
    /// Without a complete scope the list is cleared and the backend is not
    /// contacted. A failed fetch clears the list and records the error. A reply
    /// for a scope that is no longer current, or one overtaken by a newer load,
    /// is discarded; the loading state is always settled by the latest load.
    pub async fn load_items(&self) {
        let scope = self.scope();
        let Some((profile_id, source_id)) = scope.ids() else {
            {
                let mut state = self.inner.state.write();
                state.generation += 1;
                state.items.clear();
                state.load_state = LoadState::Idle;
            }
            self.emit_replaced(&scope, 0);
            return;
        };

        let generation = {
            let mut state = self.inner.state.write();
            state.generation += 1;
            state.load_state = LoadState::Loading;
            state.generation
        };

        let fetched = self
            .inner
            .client
            .get_items_with_status(profile_id, source_id)
            .await;

        let stale_scope = self.scope() != scope;
        let count = {
            let mut state = self.inner.state.write();
            if state.generation != generation {
                debug!(profile_id, source_id, "Discarding items superseded by a newer load");
                return;
            }
            if stale_scope {
                debug!(profile_id, source_id, "Discarding items for a stale scope");
                state.load_state = LoadState::Idle;
                return;
            }
            match fetched {
                Ok(items) => {
                    state.items = items;
                    state.load_state = LoadState::Loaded;
                }
                Err(e) => {
                    warn!(profile_id, source_id, error = %e, "Failed to load items");
                    state.items.clear();
                    state.load_state = LoadState::Error(e.to_string().into());
                }
            }
            state.items.len()
        };

        debug!(profile_id, source_id, count, "Items loaded");
        self.emit_replaced(&scope, count);
    }

    /// Enable or disable one item
    ///
    /// Never fails: precondition and backend errors come back as a result with
    /// `success == false`. On success the local item is patched to
    /// `active`/`inactive` by the enabled flag alone; broken and conflict states
    /// are only rediscovered by the next full load.
    pub async fn toggle_item(&self, item_name: &str, enabled: bool) -> SymlinkResult {
        let scope = self.scope();
        let Some((profile_id, source_id)) = scope.ids() else {
            return SymlinkResult::failure(item_name, NO_SCOPE_MESSAGE);
        };

        let _busy = self.inner.toggling.enter(item_name);

        let result = match self
            .inner
            .client
            .toggle_item(profile_id, source_id, item_name, enabled)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(item = item_name, enabled, error = %e, "Toggle failed");
                return SymlinkResult::failure(item_name, e.to_string());
            }
        };

        if result.success {
            info!(item = item_name, enabled, "Item toggled");
            self.apply_toggle(&scope, item_name, enabled);
        } else {
            warn!(item = item_name, enabled, error = ?result.error, "Backend rejected toggle");
        }

        result
    }

    fn apply_toggle(&self, scope: &ItemScope, item_name: &str, enabled: bool) {
        if self.scope() != *scope {
            debug!(item = item_name, "Scope changed during toggle; skipping local patch");
            return;
        }

        let patched = {
            let mut state = self.inner.state.write();
            match state.items.iter_mut().find(|item| item.name == item_name) {
                Some(item) => {
                    item.enabled = enabled;
                    item.status = ItemStatus::from_enabled(enabled);
                    true
                }
                None => false,
            }
        };

        if patched {
            self.inner.events.emit(AppEvent::ItemToggled {
                item_name: item_name.to_string(),
                enabled,
            });
        }
    }

    fn emit_replaced(&self, scope: &ItemScope, count: usize) {
        self.inner.events.emit(AppEvent::ItemsReplaced {
            profile_id: scope.profile_id.clone(),
            source_id: scope.source_id.clone(),
            count,
        });
    }
}

impl std::fmt::Debug for ItemSyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("ItemSyncController")
            .field("scope", &*self.inner.scope.borrow())
            .field("items", &state.items.len())
            .field("load_state", &state.load_state)
            .finish()
    }
}
