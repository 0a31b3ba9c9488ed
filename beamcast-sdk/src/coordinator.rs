//! RouteCoordinator - the sync-first public face of the SDK
//!
//! All methods are synchronous; the async machinery lives in a background
//! worker thread the coordinator owns. Commands cross over an unbounded
//! channel, answers come back over per-call reply channels, and outward
//! events are drained through a blocking iterator.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc as std_mpsc, Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::mpsc;

use beamcast_observer::EventIterator;
use beamcast_platform::{
    AssetSource, EngineFactory, OutputRouteProvider, SessionChrome, Url,
};

use crate::error::{CoordinatorError, Result};
use crate::events::CoordinatorEvent;
use crate::status::StatusQuery;
use crate::worker::{spawn_worker, Command};

/// Validate the arguments of a `start` command
///
/// The URL must be absolute and well-formed; header shapes are free-form.
/// Returns the immediate, structured error the marshaling façade surfaces
/// to its caller; no state change accompanies a validation failure.
pub fn validate_source(url: &str, headers: HashMap<String, String>) -> Result<AssetSource> {
    let url = Url::parse(url).map_err(|error| CoordinatorError::InvalidArgument {
        what: "url",
        reason: error.to_string(),
    })?;
    Ok(AssetSource::new(url, headers))
}

/// External playback route coordinator
///
/// Owns the single playback session, observes route-change signals, and
/// runs a recovery protocol when the desired and actual routing state
/// diverge. Fully synchronous - no async/await required.
///
/// # Example
///
/// ```rust,ignore
/// use beamcast_sdk::RouteCoordinator;
///
/// let coordinator = RouteCoordinator::new(provider, engines, chrome);
///
/// if coordinator.start("https://cdn.example.com/live/master.m3u8", None) {
///     // Playback start is asynchronous; watch the outward events
///     for event in coordinator.events() {
///         println!("route event: {:?}", event);
///     }
/// }
/// ```
pub struct RouteCoordinator {
    command_tx: mpsc::UnboundedSender<Command>,
    status: StatusQuery,
    events_rx: Arc<Mutex<std_mpsc::Receiver<CoordinatorEvent>>>,

    /// Worker thread handle (kept alive for the coordinator's lifetime)
    _worker: JoinHandle<()>,
}

impl RouteCoordinator {
    /// Create a coordinator bound to the given platform seams
    ///
    /// Spawns the worker thread, configures the output subsystem for
    /// external playback (best effort), and enables route detection.
    pub fn new(
        provider: Arc<dyn OutputRouteProvider>,
        engines: Arc<dyn EngineFactory>,
        chrome: Box<dyn SessionChrome>,
    ) -> Self {
        let engine_external = Arc::new(AtomicBool::new(false));
        let (outward_tx, outward_rx) = std_mpsc::channel();

        let handles = spawn_worker(
            Arc::clone(&provider),
            engines,
            chrome,
            Arc::clone(&engine_external),
            outward_tx,
        );

        Self {
            command_tx: handles.command_tx,
            status: StatusQuery::new(provider, engine_external),
            events_rx: Arc::new(Mutex::new(outward_rx)),
            _worker: handles.join,
        }
    }

    // ========================================================================
    // Session commands
    // ========================================================================

    /// Start a new externally-routed playback session
    ///
    /// Tears down any existing session first - at most one session ever
    /// exists. Returns `false` on a malformed URL with no state change.
    /// `true` means the session object exists and the prior teardown
    /// completed; it does NOT mean playback has started. Actual start is
    /// asynchronous and observed via [`events`](RouteCoordinator::events).
    pub fn start(&self, url: &str, headers: Option<HashMap<String, String>>) -> bool {
        let source = match validate_source(url, headers.unwrap_or_default()) {
            Ok(source) => source,
            Err(error) => {
                tracing::warn!(%error, "rejecting start command");
                return false;
            }
        };

        let (reply_tx, reply_rx) = std_mpsc::channel();
        if self
            .command_tx
            .send(Command::Start {
                source,
                reply: reply_tx,
            })
            .is_err()
        {
            tracing::warn!("start command dropped: worker unavailable");
            return false;
        }
        reply_rx.recv().unwrap_or(false)
    }

    /// Stop and release the current session
    ///
    /// Idempotent: with no active session this is a no-op, not an error.
    /// Returns after the full stop sequence (observation teardown, pause,
    /// chrome dismissal, release) has completed.
    pub fn stop(&self) {
        let (reply_tx, reply_rx) = std_mpsc::channel();
        if self.command_tx.send(Command::Stop { reply: reply_tx }).is_ok() {
            let _ = reply_rx.recv();
        }
    }

    /// Seek to an offset in whole milliseconds; no-op when idle
    pub fn seek_ms(&self, position_ms: u64) {
        if self.command_tx.send(Command::Seek { position_ms }).is_err() {
            tracing::trace!("seek dropped: worker unavailable");
        }
    }

    /// Set the playback rate directly, no clamping; no-op when idle
    pub fn set_rate(&self, rate: f64) {
        if self.command_tx.send(Command::SetRate { rate }).is_err() {
            tracing::trace!("set_rate dropped: worker unavailable");
        }
    }

    /// Current position truncated to whole milliseconds; `0` when idle
    pub fn position_ms(&self) -> u64 {
        let (reply_tx, reply_rx) = std_mpsc::channel();
        if self
            .command_tx
            .send(Command::GetPosition { reply: reply_tx })
            .is_err()
        {
            return 0;
        }
        reply_rx.recv().unwrap_or(0)
    }

    // ========================================================================
    // Route queries and the picker
    // ========================================================================

    /// Whether any eligible external route is currently discoverable
    pub fn is_route_available(&self) -> bool {
        self.status.is_available()
    }

    /// Whether output is currently routed externally
    pub fn is_route_active(&self) -> bool {
        self.status.is_active()
    }

    /// Name of the connected external-wireless destination, if any
    pub fn connected_device_name(&self) -> Option<String> {
        self.status.connected_device_name()
    }

    /// Show the OS output-device picker; fire-and-forget
    pub fn show_route_selector(&self) {
        if self.command_tx.send(Command::ShowPicker).is_err() {
            tracing::trace!("picker request dropped: worker unavailable");
        }
    }

    /// The status query, for callers that want to share it
    pub fn status(&self) -> &StatusQuery {
        &self.status
    }

    // ========================================================================
    // Outward events
    // ========================================================================

    /// Blocking iterator over the coordinator's outward events
    ///
    /// Events are asynchronous relative to command returns but ordered
    /// relative to each other.
    pub fn events(&self) -> EventIterator<CoordinatorEvent> {
        EventIterator::new(Arc::clone(&self.events_rx))
    }
}

impl Drop for RouteCoordinator {
    fn drop(&mut self) {
        // Worker shutdown tears down any live session, detaches the
        // observer, and disables route detection
        let _ = self.command_tx.send(Command::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source_rejects_relative_urls() {
        let error = validate_source("not a url", HashMap::new()).unwrap_err();
        assert_eq!(error.kind(), "invalid_argument");
    }

    #[test]
    fn test_validate_source_accepts_https() {
        let source = validate_source(
            "https://cdn.example.com/live/master.m3u8",
            HashMap::from([("Authorization".to_string(), "Bearer x".to_string())]),
        )
        .unwrap();
        assert!(source.precise_timing);
        assert_eq!(source.headers.len(), 1);
    }
}
