//! The injected seam around system-wide output-route state
//!
//! Platform singletons (the shared audio session, the notification broadcast
//! center, the route detector) are wrapped behind [`OutputRouteProvider`] so
//! the coordinator never touches global state directly. Production binds the
//! trait to the platform; tests inject a scripted fake.

use std::sync::Arc;

use crate::error::Result;
use crate::route::RouteSnapshot;
use crate::signal::SystemSignal;

/// Handler invoked for every raw system signal
///
/// May be called from arbitrary threads; implementations must be cheap and
/// must not block (the observer redispatches onto the coordinator context).
pub type SignalHandler = Arc<dyn Fn(SystemSignal) + Send + Sync>;

/// Cancelable handle for a provider signal subscription
///
/// Dropping the handle also cancels, but the observer tears subscriptions
/// down explicitly rather than relying on drop order.
pub struct ProviderSubscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ProviderSubscription {
    /// Wrap a cancellation closure supplied by the provider
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Release the underlying registration
    ///
    /// Idempotent; the second call is a no-op.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ProviderSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for ProviderSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSubscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// System-level output-route access, injected into the coordinator
///
/// All methods are callable from any thread. `snapshot()` is a pure read of
/// current route state with no side effects; the rest mutate subsystem
/// configuration or UI only.
pub trait OutputRouteProvider: Send + Sync {
    /// Configure the shared output subsystem for externally-routed video
    ///
    /// Called once at coordinator construction (playback category, movie
    /// mode, external wireless routing allowed). Failure is reported but is
    /// not fatal to the coordinator.
    fn configure_for_external_playback(&self) -> Result<()>;

    /// Enable or disable discovery of external routes
    ///
    /// Enabled at coordinator construction, disabled again at shutdown.
    fn set_route_detection(&self, enabled: bool);

    /// Read the current route state, fresh every call
    fn snapshot(&self) -> RouteSnapshot;

    /// Register for raw system signals
    ///
    /// The handler may be invoked from arbitrary threads. The returned
    /// subscription releases the underlying registrations on cancel; after
    /// cancellation the provider must stop invoking the handler.
    fn subscribe(&self, handler: SignalHandler) -> ProviderSubscription;

    /// Request the OS output-device picker affordance be shown
    ///
    /// Side effect only; the picker UI is opaque and self-contained. Safe to
    /// call repeatedly; overlapping requests are last-wins.
    fn present_picker(&self);
}
