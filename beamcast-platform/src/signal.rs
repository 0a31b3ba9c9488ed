//! Signal and event types flowing from the platform into the coordinator
//!
//! Two layers: [`SystemSignal`] is the raw shape platform providers emit
//! (one variant per underlying OS notification), and [`RouteEvent`] is the
//! normalized union the coordinator consumes. The observer performs the
//! normalization; nothing downstream ever sees a raw signal.

use serde::{Deserialize, Serialize};

/// Why the audio route changed, as reported by the output subsystem
///
/// Carried on the raw signal for logging only; normalization drops it
/// because the coordinator recomputes route state from a fresh snapshot
/// regardless of the stated reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteChangeReason {
    /// A new output device became the route
    NewDeviceAvailable,
    /// The previous route's device went away
    OldDeviceUnavailable,
    /// The route category or configuration changed
    CategoryChange,
    /// The subsystem gave no usable reason
    Unknown,
}

/// Raw notification emitted by an [`OutputRouteProvider`](crate::OutputRouteProvider)
///
/// These arrive on arbitrary threads, in whatever shape the underlying
/// platform delivers them. The observer normalizes them into [`RouteEvent`]
/// before they reach the coordinator's execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemSignal {
    /// The current audio output route changed
    AudioRouteChanged { reason: RouteChangeReason },
    /// Wireless external routes became discoverable, or stopped being so
    WirelessRoutesAvailable(bool),
    /// A second display surface was connected
    ScreenConnected,
    /// A display surface was disconnected
    ScreenDisconnected,
}

/// Loading status of the asset backing a playback session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum AssetStatus {
    /// Still loading; playback must not start yet
    Pending,
    /// Terminal success: the item can be played
    Ready,
    /// Terminal failure with the engine's reason string
    Failed(String),
}

impl AssetStatus {
    /// True for the terminal states (`Ready` or `Failed`)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AssetStatus::Pending)
    }
}

/// Property-observation signal emitted by a [`PlayerEngine`](crate::PlayerEngine)
///
/// The coordinator watches two engine flags and the asset status field.
/// Callbacks may fire on arbitrary threads; the observer redispatches them
/// onto the coordinator's execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSignal {
    /// The engine's externally-routed flag flipped
    ExternalFlagChanged { was: bool, now: bool },
    /// The engine's allowed-to-route-externally flag flipped
    AllowExternalChanged { was: bool, now: bool },
    /// The asset's loading status changed
    AssetStatusChanged(AssetStatus),
}

/// Normalized route event consumed by the session controller
///
/// One ordered stream carries every signal kind; arrival order of the
/// underlying system signals is preserved, never reordered or coalesced
/// across distinct kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteEvent {
    /// The audio output route changed
    AudioRouteChanged,
    /// Wireless external routes became discoverable, or stopped being so
    WirelessAvailabilityChanged(bool),
    /// A second display surface was connected
    ScreenConnected,
    /// A display surface was disconnected
    ScreenDisconnected,
    /// The engine's externally-routed flag flipped
    EngineExternalFlagChanged { was: bool, now: bool },
    /// The asset's loading status changed
    AssetStatusChanged(AssetStatus),
}

impl RouteEvent {
    /// Whether this event could plausibly change route active-ness
    ///
    /// Audio route changes and screen connect/disconnect all can; the
    /// availability and engine-internal events are reported through their
    /// own channels.
    pub fn affects_activeness(&self) -> bool {
        matches!(
            self,
            RouteEvent::AudioRouteChanged
                | RouteEvent::ScreenConnected
                | RouteEvent::ScreenDisconnected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_status_terminal() {
        assert!(!AssetStatus::Pending.is_terminal());
        assert!(AssetStatus::Ready.is_terminal());
        assert!(AssetStatus::Failed("network".to_string()).is_terminal());
    }

    #[test]
    fn test_activeness_classification() {
        assert!(RouteEvent::AudioRouteChanged.affects_activeness());
        assert!(RouteEvent::ScreenConnected.affects_activeness());
        assert!(RouteEvent::ScreenDisconnected.affects_activeness());
        assert!(!RouteEvent::WirelessAvailabilityChanged(true).affects_activeness());
        assert!(!RouteEvent::EngineExternalFlagChanged { was: true, now: false }
            .affects_activeness());
        assert!(!RouteEvent::AssetStatusChanged(AssetStatus::Ready).affects_activeness());
    }

    #[test]
    fn test_route_event_serializes() {
        let json = serde_json::to_string(&RouteEvent::WirelessAvailabilityChanged(true)).unwrap();
        assert!(json.contains("wireless_availability_changed"));
    }
}
