//! The system output-device picker affordance
//!
//! Fire-and-forget: the picker UI is opaque and self-contained, so there is
//! no success or failure to report back. Invoked from the coordinator's
//! execution context only.

use std::sync::Arc;

use beamcast_platform::OutputRouteProvider;

/// Trigger for the OS-provided output-device picker
pub struct RoutePickerTrigger {
    provider: Arc<dyn OutputRouteProvider>,
}

impl RoutePickerTrigger {
    pub fn new(provider: Arc<dyn OutputRouteProvider>) -> Self {
        Self { provider }
    }

    /// Request the picker be shown
    ///
    /// Idempotent to call repeatedly; overlapping invocations are last-wins
    /// with no queued state.
    pub fn present(&self) {
        tracing::debug!("presenting output-device picker");
        self.provider.present_picker();
    }
}
