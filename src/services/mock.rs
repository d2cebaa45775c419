//! Scripted fakes for the backend channel and the update service (tests only)

use crate::domain::{DownloadEvent, UpdateInfo};
use crate::services::{AvailableUpdate, CommandChannel, ProgressSender, UpdateHandle, UpdateService};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

type Handler = Box<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Backend `AppConfig` with one empty source per profile
pub fn config_json(profile_ids: &[&str], active: Option<&str>) -> Value {
    let profiles: Vec<Value> = profile_ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Profile {id}"),
                "basePath": format!("/games/{id}"),
                "sources": [{
                    "id": format!("{id}-s1"),
                    "name": "Mods",
                    "sourcePath": format!("/library/{id}"),
                    "enabledItems": [],
                }],
            })
        })
        .collect();

    json!({ "version": 1, "profiles": profiles, "activeProfileId": active })
}

pub fn permissions_json(can_create_symlinks: bool) -> Value {
    json!({
        "canCreateSymlinks": can_create_symlinks,
        "requiresElevation": !can_create_symlinks,
        "isDeveloperMode": false,
    })
}

/// Backend item list; `(name, status, enabled)`
pub fn items_json(items: &[(&str, &str, bool)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(name, status, enabled)| {
            json!({
                "name": name,
                "isDirectory": true,
                "sourcePath": format!("/library/{name}"),
                "status": status,
                "enabled": enabled,
            })
        })
        .collect();
    Value::Array(items)
}

/// Poll `condition` until it holds, for at most one second
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

/// Backend fake answering each command with a scripted handler
#[derive(Default)]
pub struct MockChannel {
    handlers: Mutex<HashMap<&'static str, Handler>>,
    calls: Mutex<Vec<(&'static str, Value)>>,
    gates: Mutex<HashMap<&'static str, Arc<Semaphore>>>,
}

impl MockChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `command` with `handler`
    pub fn reply(
        &self,
        command: &'static str,
        handler: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) {
        self.handlers.lock().insert(command, Box::new(handler));
    }

    /// Answer `command` with a fixed value
    pub fn reply_value(&self, command: &'static str, value: Value) {
        self.reply(command, move |_| Ok(value.clone()));
    }

    /// Fail `command` with a fixed message
    pub fn fail(&self, command: &'static str, message: &str) {
        let message = message.to_string();
        self.reply(command, move |_| Err(message.clone()));
    }

    /// Hold every call to `command` until a permit is released on the gate
    pub fn hold(&self, command: &'static str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().insert(command, gate.clone());
        gate
    }

    /// Number of calls recorded for `command`
    pub fn calls(&self, command: &str) -> usize {
        self.calls.lock().iter().filter(|(c, _)| *c == command).count()
    }

    /// Total number of calls for all commands
    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Arguments of the most recent call to `command`
    pub fn last_args(&self, command: &str) -> Option<Value> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|(c, _)| *c == command)
            .map(|(_, args)| args.clone())
    }
}

impl CommandChannel for MockChannel {
    fn invoke(&self, command: &'static str, args: Value) -> BoxFuture<'_, Result<Value, String>> {
        Box::pin(async move {
            self.calls.lock().push((command, args.clone()));

            let gate = self.gates.lock().get(command).cloned();
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            // Let other tasks observe the in-flight call before answering
            tokio::task::yield_now().await;

            let handlers = self.handlers.lock();
            match handlers.get(command) {
                Some(handler) => handler(&args),
                None => Err(format!("no handler for {command}")),
            }
        })
    }
}

/// Scripted release returned by [`MockUpdateService`]
#[derive(Clone, Debug)]
pub struct MockRelease {
    pub info: UpdateInfo,
    pub events: Vec<DownloadEvent>,
    pub outcome: Result<(), String>,
}

impl MockRelease {
    pub fn new(version: &str, events: Vec<DownloadEvent>) -> Self {
        Self {
            info: UpdateInfo {
                version: version.to_string(),
                date: Some("2026-10-01".to_string()),
                body: Some("Bug fixes".to_string()),
            },
            events,
            outcome: Ok(()),
        }
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.outcome = Err(message.to_string());
        self
    }
}

/// Update service fake serving queued check results
#[derive(Default)]
pub struct MockUpdateService {
    checks: Mutex<VecDeque<Result<Option<MockRelease>, String>>>,
    relaunch_error: Mutex<Option<String>>,
    relaunches: AtomicUsize,
    downloads: Arc<AtomicUsize>,
}

impl MockUpdateService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the result of the next `check()`; an empty queue means "no update"
    pub fn queue_check(&self, result: Result<Option<MockRelease>, String>) {
        self.checks.lock().push_back(result);
    }

    pub fn fail_relaunch(&self, message: &str) {
        *self.relaunch_error.lock() = Some(message.to_string());
    }

    pub fn relaunches(&self) -> usize {
        self.relaunches.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

impl UpdateService for MockUpdateService {
    fn check(&self) -> BoxFuture<'_, Result<Option<AvailableUpdate>, String>> {
        Box::pin(async move {
            let next = self.checks.lock().pop_front();
            tokio::task::yield_now().await;

            let Some(release) = next.unwrap_or(Ok(None))? else {
                return Ok(None);
            };

            Ok(Some(AvailableUpdate {
                info: release.info,
                handle: Box::new(MockHandle {
                    events: release.events,
                    outcome: release.outcome,
                    downloads: self.downloads.clone(),
                }),
            }))
        })
    }

    fn relaunch(&self) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            self.relaunches.fetch_add(1, Ordering::SeqCst);
            match self.relaunch_error.lock().clone() {
                Some(message) => Err(message),
                None => Ok(()),
            }
        })
    }
}

struct MockHandle {
    events: Vec<DownloadEvent>,
    outcome: Result<(), String>,
    downloads: Arc<AtomicUsize>,
}

impl UpdateHandle for MockHandle {
    fn download_and_install(&self, progress: ProgressSender) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            for event in &self.events {
                if !progress.send(*event) {
                    return Err("download cancelled".to_string());
                }
                tokio::task::yield_now().await;
            }
            self.outcome.clone()
        })
    }
}
