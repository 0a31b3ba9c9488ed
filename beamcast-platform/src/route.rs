//! Output-route descriptions and the raw system snapshot
//!
//! [`RouteSnapshot`] is the ground truth the status queries derive from.
//! It is always produced fresh by the provider; nothing caches one across
//! a route event.

use serde::{Deserialize, Serialize};

/// Kind of destination the current output route points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// The device's built-in output
    BuiltIn,
    /// A physically cabled destination (HDMI, line out)
    Wired,
    /// A discoverable wireless receiver
    ExternalWireless,
}

impl RouteKind {
    /// True for routes that count as external wireless destinations
    pub fn is_external_wireless(self) -> bool {
        matches!(self, RouteKind::ExternalWireless)
    }
}

/// Description of a single output-route destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// What kind of destination this is
    pub kind: RouteKind,
    /// The destination's user-visible name, when the subsystem reports one
    pub name: Option<String>,
}

impl RouteDescriptor {
    pub fn new(kind: RouteKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
        }
    }

    /// A nameless built-in route, the conservative default
    pub fn built_in() -> Self {
        Self {
            kind: RouteKind::BuiltIn,
            name: None,
        }
    }
}

/// Raw system truth read from the output subsystem
///
/// Recomputed on every query. The three fields are independent signals:
/// availability says nothing about active-ness, and a connected display
/// says nothing about the audio route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    /// At least one eligible external output route is currently discoverable
    pub wireless_available: bool,
    /// The current output route's destination, if the subsystem reports one
    pub current_route: Option<RouteDescriptor>,
    /// Number of display surfaces currently connected (1 = built-in only)
    pub connected_displays: usize,
}

impl RouteSnapshot {
    /// Name of the external-wireless destination, if that is the current route
    pub fn external_device_name(&self) -> Option<String> {
        self.current_route
            .as_ref()
            .filter(|route| route.kind.is_external_wireless())
            .and_then(|route| route.name.clone())
    }

    /// True when the current route points at an external wireless destination
    pub fn routed_externally(&self) -> bool {
        self.current_route
            .as_ref()
            .is_some_and(|route| route.kind.is_external_wireless())
    }

    /// True when more than one display surface is connected
    pub fn has_second_display(&self) -> bool {
        self.connected_displays > 1
    }
}

impl Default for RouteSnapshot {
    /// The conservative answer: nothing discoverable, built-in route, one display
    fn default() -> Self {
        Self {
            wireless_available: false,
            current_route: Some(RouteDescriptor::built_in()),
            connected_displays: 1,
        }
    }
}
