//! Scripted fakes for every platform seam
//!
//! Enabled with the `test-support` feature. Each fake answers status queries
//! from scripted state, records the calls the coordinator makes, and lets a
//! test inject signals from any thread it likes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::chrome::{ChromeCompletion, PresentationOptions, SessionChrome};
use crate::engine::{AssetSource, EngineFactory, EngineObserver, PlayerEngine};
use crate::error::{PlatformError, Result};
use crate::provider::{OutputRouteProvider, ProviderSubscription, SignalHandler};
use crate::route::RouteSnapshot;
use crate::signal::{AssetStatus, EngineSignal, SystemSignal};

// ============================================================================
// FakeRouteProvider
// ============================================================================

/// Scripted [`OutputRouteProvider`]
///
/// Tests mutate the snapshot and emit raw signals; the fake records picker
/// presentations, route-detection toggles, and configuration calls.
#[derive(Default)]
pub struct FakeRouteProvider {
    snapshot: Mutex<RouteSnapshot>,
    handlers: Mutex<HashMap<u64, SignalHandler>>,
    next_handler_id: AtomicU64,
    picker_presentations: AtomicUsize,
    route_detection: AtomicBool,
    configure_calls: AtomicUsize,
    fail_configuration: AtomicBool,
}

impl FakeRouteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scripted snapshot returned by future queries
    pub fn set_snapshot(&self, snapshot: RouteSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    /// Deliver a raw signal to every live subscriber
    ///
    /// Invoked from the test thread, which stands in for the arbitrary
    /// threads system notifications arrive on.
    pub fn emit(&self, signal: SystemSignal) {
        let handlers: Vec<SignalHandler> =
            self.handlers.lock().unwrap().values().cloned().collect();
        for handler in handlers {
            handler(signal.clone());
        }
    }

    /// Make the next `configure_for_external_playback` call fail
    pub fn fail_configuration(&self) {
        self.fail_configuration.store(true, Ordering::SeqCst);
    }

    pub fn picker_presentation_count(&self) -> usize {
        self.picker_presentations.load(Ordering::SeqCst)
    }

    pub fn route_detection_enabled(&self) -> bool {
        self.route_detection.load(Ordering::SeqCst)
    }

    pub fn configure_call_count(&self) -> usize {
        self.configure_calls.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }
}

impl OutputRouteProvider for FakeRouteProvider {
    fn configure_for_external_playback(&self) -> Result<()> {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_configuration.swap(false, Ordering::SeqCst) {
            return Err(PlatformError::OutputConfiguration(
                "scripted failure".to_string(),
            ));
        }
        Ok(())
    }

    fn set_route_detection(&self, enabled: bool) {
        self.route_detection.store(enabled, Ordering::SeqCst);
    }

    fn snapshot(&self) -> RouteSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    fn subscribe(&self, handler: SignalHandler) -> ProviderSubscription {
        let id = self.next_handler_id.fetch_add(1, Ordering::SeqCst);
        self.handlers.lock().unwrap().insert(id, handler);
        ProviderSubscription::noop()
    }

    fn present_picker(&self) {
        self.picker_presentations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Variant of [`FakeRouteProvider::subscribe`] wiring real cancellation
///
/// The plain fake returns a no-op subscription so tests can prove the
/// observer's own gate suppresses post-teardown delivery even when the
/// provider keeps firing. Wrap the provider in this type when a test wants
/// the subscription itself to unregister.
pub struct CancelingProvider(pub Arc<FakeRouteProvider>);

impl OutputRouteProvider for CancelingProvider {
    fn configure_for_external_playback(&self) -> Result<()> {
        self.0.configure_for_external_playback()
    }

    fn set_route_detection(&self, enabled: bool) {
        self.0.set_route_detection(enabled);
    }

    fn snapshot(&self) -> RouteSnapshot {
        self.0.snapshot()
    }

    fn subscribe(&self, handler: SignalHandler) -> ProviderSubscription {
        let id = self.0.next_handler_id.fetch_add(1, Ordering::SeqCst);
        self.0.handlers.lock().unwrap().insert(id, handler);
        let provider = Arc::clone(&self.0);
        ProviderSubscription::new(move || {
            provider.handlers.lock().unwrap().remove(&id);
        })
    }

    fn present_picker(&self) {
        self.0.present_picker();
    }
}

// ============================================================================
// FakePlayerEngine
// ============================================================================

/// Shared state behind a [`FakePlayerEngine`]
///
/// The engine itself is boxed into the coordinator; tests keep this handle
/// to script status transitions and read back recorded calls.
pub struct FakeEngineState {
    source: AssetSource,
    observer: Mutex<Option<EngineObserver>>,
    play_calls: AtomicUsize,
    pause_calls: AtomicUsize,
    stop_observing_calls: AtomicUsize,
    seeks: Mutex<Vec<u64>>,
    rates: Mutex<Vec<f64>>,
    position_ms: AtomicU64,
    allows_external: Mutex<Vec<bool>>,
    external_while_screen_active: Mutex<Vec<bool>>,
    external_active: AtomicBool,
    surface_binds: AtomicUsize,
}

impl FakeEngineState {
    fn new(source: AssetSource) -> Self {
        Self {
            source,
            observer: Mutex::new(None),
            play_calls: AtomicUsize::new(0),
            pause_calls: AtomicUsize::new(0),
            stop_observing_calls: AtomicUsize::new(0),
            seeks: Mutex::new(Vec::new()),
            rates: Mutex::new(Vec::new()),
            position_ms: AtomicU64::new(0),
            allows_external: Mutex::new(Vec::new()),
            external_while_screen_active: Mutex::new(Vec::new()),
            external_active: AtomicBool::new(false),
            surface_binds: AtomicUsize::new(0),
        }
    }

    /// The source this engine was created with
    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    fn signal(&self, signal: EngineSignal) {
        let observer = self.observer.lock().unwrap().clone();
        if let Some(observer) = observer {
            observer(signal);
        }
    }

    /// Script an asset status transition
    pub fn signal_asset_status(&self, status: AssetStatus) {
        self.signal(EngineSignal::AssetStatusChanged(status));
    }

    /// Script an externally-routed flag flip; updates the readable flag too
    pub fn signal_external_flag(&self, was: bool, now: bool) {
        self.external_active.store(now, Ordering::SeqCst);
        self.signal(EngineSignal::ExternalFlagChanged { was, now });
    }

    /// Script an allowed-to-route flag flip
    pub fn signal_allow_external(&self, was: bool, now: bool) {
        self.signal(EngineSignal::AllowExternalChanged { was, now });
    }

    /// Script the readable externally-routed flag without a signal
    pub fn set_external_active(&self, active: bool) {
        self.external_active.store(active, Ordering::SeqCst);
    }

    /// Script the position subsequent reads report
    pub fn set_position_ms(&self, position_ms: u64) {
        self.position_ms.store(position_ms, Ordering::SeqCst);
    }

    pub fn play_count(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst)
    }

    pub fn pause_count(&self) -> usize {
        self.pause_calls.load(Ordering::SeqCst)
    }

    pub fn stop_observing_count(&self) -> usize {
        self.stop_observing_calls.load(Ordering::SeqCst)
    }

    pub fn seeks(&self) -> Vec<u64> {
        self.seeks.lock().unwrap().clone()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.rates.lock().unwrap().clone()
    }

    /// Every value asserted on the allows-external flag, in order
    pub fn allows_external_asserts(&self) -> Vec<bool> {
        self.allows_external.lock().unwrap().clone()
    }

    /// Every value asserted on the external-while-screen-active flag
    pub fn external_while_screen_asserts(&self) -> Vec<bool> {
        self.external_while_screen_active.lock().unwrap().clone()
    }

    pub fn surface_bind_count(&self) -> usize {
        self.surface_binds.load(Ordering::SeqCst)
    }

    pub fn is_observed(&self) -> bool {
        self.observer.lock().unwrap().is_some()
    }
}

/// Recorded, scriptable [`PlayerEngine`]
pub struct FakePlayerEngine {
    state: Arc<FakeEngineState>,
}

impl PlayerEngine for FakePlayerEngine {
    fn observe(&mut self, observer: EngineObserver) {
        *self.state.observer.lock().unwrap() = Some(observer);
    }

    fn stop_observing(&mut self) {
        self.state.stop_observing_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.observer.lock().unwrap() = None;
    }

    fn play(&mut self) {
        self.state.play_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn pause(&mut self) {
        self.state.pause_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn seek_to_ms(&mut self, position_ms: u64) {
        self.state.seeks.lock().unwrap().push(position_ms);
        self.state.position_ms.store(position_ms, Ordering::SeqCst);
    }

    fn set_rate(&mut self, rate: f64) {
        self.state.rates.lock().unwrap().push(rate);
    }

    fn position_ms(&self) -> u64 {
        self.state.position_ms.load(Ordering::SeqCst)
    }

    fn set_allows_external_playback(&mut self, allowed: bool) {
        self.state.allows_external.lock().unwrap().push(allowed);
    }

    fn set_external_while_screen_active(&mut self, enabled: bool) {
        self.state
            .external_while_screen_active
            .lock()
            .unwrap()
            .push(enabled);
    }

    fn external_playback_active(&self) -> bool {
        self.state.external_active.load(Ordering::SeqCst)
    }

    fn bind_external_surface(&mut self) {
        self.state.surface_binds.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory handing out [`FakePlayerEngine`]s and retaining their state handles
#[derive(Default)]
pub struct FakeEngineFactory {
    created: Mutex<Vec<Arc<FakeEngineState>>>,
    fail_next: AtomicBool,
}

impl FakeEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create` call fail
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// State handle for the i-th engine created
    pub fn engine(&self, index: usize) -> Option<Arc<FakeEngineState>> {
        self.created.lock().unwrap().get(index).cloned()
    }

    /// State handle for the most recently created engine
    pub fn last_engine(&self) -> Option<Arc<FakeEngineState>> {
        self.created.lock().unwrap().last().cloned()
    }
}

impl EngineFactory for FakeEngineFactory {
    fn create(&self, source: &AssetSource) -> Result<Box<dyn PlayerEngine>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PlatformError::EngineCreation("scripted failure".to_string()));
        }
        let state = Arc::new(FakeEngineState::new(source.clone()));
        self.created.lock().unwrap().push(Arc::clone(&state));
        Ok(Box::new(FakePlayerEngine { state }))
    }
}

// ============================================================================
// FakeChrome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChromeMode {
    /// Completions fire inline, inside present/dismiss
    Immediate,
    /// Completions are held until the test releases them
    Manual,
}

/// Shared state behind a [`FakeChrome`]
pub struct FakeChromeState {
    mode: ChromeMode,
    pending_presents: Mutex<Vec<ChromeCompletion>>,
    pending_dismissals: Mutex<Vec<ChromeCompletion>>,
    present_calls: AtomicUsize,
    dismiss_calls: AtomicUsize,
    last_options: Mutex<Option<PresentationOptions>>,
}

impl FakeChromeState {
    pub fn present_count(&self) -> usize {
        self.present_calls.load(Ordering::SeqCst)
    }

    pub fn dismiss_count(&self) -> usize {
        self.dismiss_calls.load(Ordering::SeqCst)
    }

    /// Options passed with the most recent presentation
    pub fn last_options(&self) -> Option<PresentationOptions> {
        *self.last_options.lock().unwrap()
    }

    /// Fire the oldest held appearance completion; true if one was held
    pub fn complete_next_present(&self) -> bool {
        let completion = {
            let mut pending = self.pending_presents.lock().unwrap();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        };
        match completion {
            Some(done) => {
                done();
                true
            }
            None => false,
        }
    }

    /// Fire the oldest held dismissal completion; true if one was held
    pub fn complete_next_dismissal(&self) -> bool {
        let completion = {
            let mut pending = self.pending_dismissals.lock().unwrap();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        };
        match completion {
            Some(done) => {
                done();
                true
            }
            None => false,
        }
    }

    pub fn pending_present_count(&self) -> usize {
        self.pending_presents.lock().unwrap().len()
    }

    pub fn pending_dismissal_count(&self) -> usize {
        self.pending_dismissals.lock().unwrap().len()
    }
}

/// Scripted [`SessionChrome`]
pub struct FakeChrome {
    state: Arc<FakeChromeState>,
}

impl FakeChrome {
    fn with_mode(mode: ChromeMode) -> (Self, Arc<FakeChromeState>) {
        let state = Arc::new(FakeChromeState {
            mode,
            pending_presents: Mutex::new(Vec::new()),
            pending_dismissals: Mutex::new(Vec::new()),
            present_calls: AtomicUsize::new(0),
            dismiss_calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        });
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    /// Chrome whose animations complete inline
    pub fn immediate() -> (Self, Arc<FakeChromeState>) {
        Self::with_mode(ChromeMode::Immediate)
    }

    /// Chrome whose completions wait for the test to release them
    pub fn manual() -> (Self, Arc<FakeChromeState>) {
        Self::with_mode(ChromeMode::Manual)
    }
}

impl SessionChrome for FakeChrome {
    fn present(&mut self, options: PresentationOptions, done: ChromeCompletion) {
        self.state.present_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_options.lock().unwrap() = Some(options);
        match self.state.mode {
            ChromeMode::Immediate => done(),
            ChromeMode::Manual => self.state.pending_presents.lock().unwrap().push(done),
        }
    }

    fn dismiss(&mut self, done: ChromeCompletion) {
        self.state.dismiss_calls.fetch_add(1, Ordering::SeqCst);
        match self.state.mode {
            ChromeMode::Immediate => done(),
            ChromeMode::Manual => self.state.pending_dismissals.lock().unwrap().push(done),
        }
    }
}
