//! Outward events the coordinator reports to its host
//!
//! Asynchronous with respect to command returns, but ordered relative to
//! each other: for injected route events E1..En the outward events appear
//! in an order consistent with E1..En.

use serde::{Deserialize, Serialize};

/// Derived route-activity payload
///
/// Recomputed from a fresh system snapshot plus the engine's
/// externally-routed flag on every emission; never cached across a route
/// event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteActivity {
    /// Whether output is currently routed to an external destination
    pub active: bool,
    /// Name of the external-wireless destination, when there is one
    pub device_name: Option<String>,
}

/// Events emitted by the coordinator toward the marshaling façade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "payload")]
pub enum CoordinatorEvent {
    /// Wireless external routes became discoverable, or stopped being so
    RouteAvailabilityChanged(bool),
    /// Something plausibly changed route active-ness; carries the fresh state
    RouteStateChanged(RouteActivity),
}
