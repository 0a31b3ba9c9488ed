//! Pure reads of current output-route state
//!
//! All three queries are synchronous, side-effect-free, and callable with no
//! session active. Nothing here caches: every call derives its answer from a
//! fresh provider snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use beamcast_platform::OutputRouteProvider;

/// Snapshot-backed status queries
///
/// Cloneable; clones share the provider and the engine mirror.
#[derive(Clone)]
pub struct StatusQuery {
    provider: Arc<dyn OutputRouteProvider>,
    /// The engine's externally-routed flag, mirrored by the worker
    ///
    /// False whenever no session holds an engine - the conservative answer.
    engine_external: Arc<AtomicBool>,
}

impl StatusQuery {
    pub fn new(provider: Arc<dyn OutputRouteProvider>, engine_external: Arc<AtomicBool>) -> Self {
        Self {
            provider,
            engine_external,
        }
    }

    /// At least one eligible external output route is currently discoverable
    ///
    /// Independent of whether anything is playing.
    pub fn is_available(&self) -> bool {
        self.provider.snapshot().wireless_available
    }

    /// Whether output is currently routed externally
    ///
    /// A deliberate OR across three independent signals, because no single
    /// one is reliable alone: the engine flag can lag reality, a route can
    /// be active without a display, and a second display can exist without
    /// the engine using it.
    pub fn is_active(&self) -> bool {
        if self.engine_external.load(Ordering::SeqCst) {
            return true;
        }
        let snapshot = self.provider.snapshot();
        snapshot.routed_externally() || snapshot.has_second_display()
    }

    /// Name of the current external-route destination
    ///
    /// Present only when the current output route's kind is external
    /// wireless.
    pub fn connected_device_name(&self) -> Option<String> {
        self.provider.snapshot().external_device_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamcast_platform::fake::FakeRouteProvider;
    use beamcast_platform::{RouteDescriptor, RouteKind, RouteSnapshot};
    use rstest::rstest;

    fn query_with(
        snapshot: RouteSnapshot,
        engine_external: bool,
    ) -> (StatusQuery, Arc<FakeRouteProvider>) {
        let provider = Arc::new(FakeRouteProvider::new());
        provider.set_snapshot(snapshot);
        let mirror = Arc::new(AtomicBool::new(engine_external));
        (
            StatusQuery::new(
                Arc::clone(&provider) as Arc<dyn OutputRouteProvider>,
                mirror,
            ),
            provider,
        )
    }

    fn snapshot(available: bool, kind: Option<RouteKind>, displays: usize) -> RouteSnapshot {
        RouteSnapshot {
            wireless_available: available,
            current_route: kind.map(|kind| RouteDescriptor {
                kind,
                name: Some("Den TV".to_string()),
            }),
            connected_displays: displays,
        }
    }

    #[rstest]
    // Any single leg of the OR is sufficient
    #[case(true, None, 1, true)]
    #[case(false, Some(RouteKind::ExternalWireless), 1, true)]
    #[case(false, None, 2, true)]
    // All legs false
    #[case(false, Some(RouteKind::BuiltIn), 1, false)]
    #[case(false, Some(RouteKind::Wired), 1, false)]
    #[case(false, None, 1, false)]
    fn test_is_active_or_logic(
        #[case] engine_external: bool,
        #[case] kind: Option<RouteKind>,
        #[case] displays: usize,
        #[case] expected: bool,
    ) {
        let (query, _provider) = query_with(snapshot(false, kind, displays), engine_external);
        assert_eq!(query.is_active(), expected);
    }

    #[test]
    fn test_availability_independent_of_activeness() {
        let (query, _provider) = query_with(snapshot(true, Some(RouteKind::BuiltIn), 1), false);
        assert!(query.is_available());
        assert!(!query.is_active());
    }

    #[test]
    fn test_device_name_only_for_wireless_routes() {
        let (query, _provider) =
            query_with(snapshot(true, Some(RouteKind::ExternalWireless), 1), false);
        assert_eq!(query.connected_device_name().as_deref(), Some("Den TV"));

        let (query, _provider) = query_with(snapshot(true, Some(RouteKind::Wired), 1), false);
        assert_eq!(query.connected_device_name(), None);
    }

    #[test]
    fn test_answers_recomputed_per_call() {
        let (query, provider) = query_with(snapshot(false, None, 1), false);
        assert!(!query.is_available());

        provider.set_snapshot(snapshot(true, Some(RouteKind::ExternalWireless), 2));
        assert!(query.is_available());
        assert!(query.is_active());
    }
}
