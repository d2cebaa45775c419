//! Backend Command Channel
//!
//! The privileged backend is reachable only through asynchronous, named
//! command invocation with JSON arguments. Any transport (a desktop shell IPC
//! bridge, a socket, an in-process fake) plugs in by implementing
//! [`CommandChannel`].

use futures::future::BoxFuture;
use serde_json::Value;

/// Transport to the privileged backend
///
/// `args` is a JSON object keyed by camelCase argument names. Failures are
/// reported as the backend's error string. The channel may fail but must not
/// duplicate requests.
pub trait CommandChannel: Send + Sync + 'static {
    fn invoke(&self, command: &'static str, args: Value)
    -> BoxFuture<'_, Result<Value, String>>;
}
