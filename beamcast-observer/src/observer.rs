//! RouteObserver - one ordered stream out of heterogeneous system signals
//!
//! Subscribes to the provider's raw notifications, normalizes them into the
//! [`RouteEvent`] union, and hands them to a delivery function that pushes
//! onto the coordinator's execution context. A shared gate guarantees that
//! after teardown nothing is delivered, even if the underlying system
//! re-fires a historical notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use beamcast_platform::{
    OutputRouteProvider, ProviderSubscription, RouteEvent, SystemSignal,
};

/// Observes system route signals for the lifetime of a coordinator
///
/// Created with [`attach`](RouteObserver::attach); torn down with
/// [`detach`](RouteObserver::detach) or on drop. Events pass through in
/// arrival order, one per underlying signal - no reordering, no coalescing
/// across distinct signal kinds.
pub struct RouteObserver {
    subscription: Option<ProviderSubscription>,
    gate: Arc<AtomicBool>,
}

impl RouteObserver {
    /// Subscribe to the provider, delivering normalized events to `deliver`
    ///
    /// `deliver` is invoked on whatever thread the underlying signal arrives
    /// on; it must redispatch onto the coordinator context (in practice, a
    /// channel send) rather than touch shared state.
    pub fn attach<F>(provider: &dyn OutputRouteProvider, deliver: F) -> Self
    where
        F: Fn(RouteEvent) + Send + Sync + 'static,
    {
        let gate = Arc::new(AtomicBool::new(true));
        let handler_gate = Arc::clone(&gate);

        let subscription = provider.subscribe(Arc::new(move |signal| {
            if !handler_gate.load(Ordering::SeqCst) {
                tracing::trace!(?signal, "discarding signal after observer teardown");
                return;
            }
            deliver(normalize(signal));
        }));

        Self {
            subscription: Some(subscription),
            gate,
        }
    }

    /// Release the underlying subscription and close the delivery gate
    ///
    /// Idempotent. After this returns no further events are delivered.
    pub fn detach(&mut self) {
        self.gate.store(false, Ordering::SeqCst);
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
            tracing::debug!("route observer detached");
        }
    }

    /// Whether the observer is still delivering events
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for RouteObserver {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Normalize a raw system signal into the event union
///
/// Payloads pass through untransformed; the route-change reason is logged
/// and dropped because the controller recomputes route state from a fresh
/// snapshot regardless.
fn normalize(signal: SystemSignal) -> RouteEvent {
    match signal {
        SystemSignal::AudioRouteChanged { reason } => {
            tracing::debug!(?reason, "audio route changed");
            RouteEvent::AudioRouteChanged
        }
        SystemSignal::WirelessRoutesAvailable(available) => {
            RouteEvent::WirelessAvailabilityChanged(available)
        }
        SystemSignal::ScreenConnected => RouteEvent::ScreenConnected,
        SystemSignal::ScreenDisconnected => RouteEvent::ScreenDisconnected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamcast_platform::fake::{CancelingProvider, FakeRouteProvider};
    use beamcast_platform::RouteChangeReason;
    use std::sync::Mutex;

    fn collecting_observer(
        provider: &dyn OutputRouteProvider,
    ) -> (RouteObserver, Arc<Mutex<Vec<RouteEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let observer = RouteObserver::attach(provider, move |event| {
            seen_clone.lock().unwrap().push(event);
        });
        (observer, seen)
    }

    #[test]
    fn test_normalizes_in_arrival_order() {
        let provider = FakeRouteProvider::new();
        let (_observer, seen) = collecting_observer(&provider);

        provider.emit(SystemSignal::WirelessRoutesAvailable(true));
        provider.emit(SystemSignal::AudioRouteChanged {
            reason: RouteChangeReason::NewDeviceAvailable,
        });
        provider.emit(SystemSignal::ScreenConnected);
        provider.emit(SystemSignal::ScreenDisconnected);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                RouteEvent::WirelessAvailabilityChanged(true),
                RouteEvent::AudioRouteChanged,
                RouteEvent::ScreenConnected,
                RouteEvent::ScreenDisconnected,
            ]
        );
    }

    #[test]
    fn test_gate_suppresses_refire_after_detach() {
        // The plain fake never unregisters handlers, standing in for a
        // system that re-fires notifications to dead observers.
        let provider = FakeRouteProvider::new();
        let (mut observer, seen) = collecting_observer(&provider);

        provider.emit(SystemSignal::ScreenConnected);
        observer.detach();
        provider.emit(SystemSignal::ScreenConnected);

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!observer.is_attached());
    }

    #[test]
    fn test_detach_releases_provider_registration() {
        let provider = Arc::new(FakeRouteProvider::new());
        let canceling = CancelingProvider(Arc::clone(&provider));
        let (mut observer, _seen) = collecting_observer(&canceling);

        assert_eq!(provider.subscriber_count(), 1);
        observer.detach();
        assert_eq!(provider.subscriber_count(), 0);
    }

    #[test]
    fn test_drop_is_scoped_teardown() {
        let provider = FakeRouteProvider::new();
        let (observer, seen) = collecting_observer(&provider);

        drop(observer);
        provider.emit(SystemSignal::ScreenConnected);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_detach_is_idempotent() {
        let provider = FakeRouteProvider::new();
        let (mut observer, _seen) = collecting_observer(&provider);
        observer.detach();
        observer.detach();
        assert!(!observer.is_attached());
    }
}
