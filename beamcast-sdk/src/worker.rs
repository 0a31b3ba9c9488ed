//! Background worker: the coordinator's designated execution context
//!
//! A dedicated thread owns a current-thread tokio runtime and runs the
//! session controller loop. Every mutation of the session and the recovery
//! state machine happens here; signals from arbitrary threads are
//! redispatched in through one unbounded, ordered channel, and that
//! redispatch is the sole synchronization mechanism - confinement removes
//! the need for locks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use beamcast_observer::RouteObserver;
use beamcast_platform::{
    AssetSource, AssetStatus, EngineFactory, EngineSignal, OutputRouteProvider,
    PresentationOptions, RouteEvent, SessionChrome,
};

use crate::events::{CoordinatorEvent, RouteActivity};
use crate::picker::RoutePickerTrigger;
use crate::session::{PlaybackSession, SessionPhase};

/// Fixed delay between presentation completion and the first play attempt
///
/// Playing while the chrome is still animating fights the UI for the
/// external route.
const POST_PRESENTATION_DELAY: Duration = Duration::from_millis(500);

/// Fixed delay before the one-shot routing reconciliation check
const RECONCILIATION_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on waiting for chrome dismissal during teardown
///
/// A host that never completes its dismissal must not wedge `stop`.
const DISMISSAL_GUARD: Duration = Duration::from_secs(5);

/// Commands sent from the sync façade to the worker
pub(crate) enum Command {
    Start {
        source: AssetSource,
        reply: std_mpsc::Sender<bool>,
    },
    Stop {
        reply: std_mpsc::Sender<()>,
    },
    Seek {
        position_ms: u64,
    },
    SetRate {
        rate: f64,
    },
    GetPosition {
        reply: std_mpsc::Sender<u64>,
    },
    ShowPicker,
    Shutdown,
}

/// Everything redispatched onto the worker context
///
/// One channel carries all of it, so arrival order is processing order.
enum Observed {
    /// Normalized system route event from the observer
    Route(RouteEvent),
    /// Engine property observation callback, tagged with session identity
    Engine { generation: u64, signal: EngineSignal },
    /// Presentation chrome finished appearing
    ChromePresented { generation: u64 },
}

/// A scheduled one-shot continuation
///
/// Carries the session generation captured at schedule time; a stale
/// generation at fire time means the session it referenced is gone and the
/// action is discarded.
#[derive(Debug, Clone, Copy)]
struct Deferred {
    due: Instant,
    generation: u64,
    action: DeferredAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredAction {
    /// The post-presentation play attempt
    BeginPlayback,
    /// The one-shot routing reconciliation check
    ReconcileRouting,
}

pub(crate) struct WorkerHandles {
    pub command_tx: mpsc::UnboundedSender<Command>,
    pub join: JoinHandle<()>,
}

/// Spawn the worker thread with its own current-thread tokio runtime
pub(crate) fn spawn_worker(
    provider: Arc<dyn OutputRouteProvider>,
    engines: Arc<dyn EngineFactory>,
    chrome: Box<dyn SessionChrome>,
    engine_external: Arc<AtomicBool>,
    outward_tx: std_mpsc::Sender<CoordinatorEvent>,
) -> WorkerHandles {
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let join = thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(error) => {
                tracing::error!(%error, "failed to build runtime for coordinator worker");
                return;
            }
        };

        rt.block_on(run_worker(
            provider,
            engines,
            chrome,
            engine_external,
            outward_tx,
            command_rx,
        ));
    });

    WorkerHandles { command_tx, join }
}

async fn run_worker(
    provider: Arc<dyn OutputRouteProvider>,
    engines: Arc<dyn EngineFactory>,
    chrome: Box<dyn SessionChrome>,
    engine_external: Arc<AtomicBool>,
    outward_tx: std_mpsc::Sender<CoordinatorEvent>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
) {
    let (observed_tx, mut observed_rx) = mpsc::unbounded_channel();

    if let Err(error) = provider.configure_for_external_playback() {
        tracing::warn!(%error, "output subsystem configuration failed");
    }
    provider.set_route_detection(true);

    let route_tx = observed_tx.clone();
    let observer = RouteObserver::attach(provider.as_ref(), move |event| {
        let _ = route_tx.send(Observed::Route(event));
    });

    let mut controller = SessionController {
        provider: Arc::clone(&provider),
        engines,
        chrome,
        picker: RoutePickerTrigger::new(provider),
        observer,
        observed_tx,
        outward_tx,
        engine_external,
        session: None,
        generation: 0,
        deferred: Vec::new(),
    };

    tracing::info!("route coordinator worker started");

    loop {
        let deadline = controller.next_deadline();
        tokio::select! {
            biased;

            command = command_rx.recv() => match command {
                None | Some(Command::Shutdown) => break,
                Some(command) => controller.handle_command(command).await,
            },

            observed = observed_rx.recv() => match observed {
                Some(observed) => controller.handle_observed(observed),
                // Unreachable while the controller holds a sender clone
                None => break,
            },

            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                if deadline.is_some() =>
            {
                controller.fire_due_deferred();
            }
        }
    }

    controller.shutdown().await;
    tracing::info!("route coordinator worker shut down");
}

/// Owns the session and runs the recovery state machine
///
/// Lives entirely inside the worker's runtime; nothing here is shared with
/// other threads except the engine-external mirror, written here and read
/// by the status queries.
struct SessionController {
    provider: Arc<dyn OutputRouteProvider>,
    engines: Arc<dyn EngineFactory>,
    chrome: Box<dyn SessionChrome>,
    picker: RoutePickerTrigger,
    observer: RouteObserver,
    observed_tx: mpsc::UnboundedSender<Observed>,
    outward_tx: std_mpsc::Sender<CoordinatorEvent>,
    engine_external: Arc<AtomicBool>,
    session: Option<PlaybackSession>,
    generation: u64,
    deferred: Vec<Deferred>,
}

impl SessionController {
    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { source, reply } => {
                self.teardown_session().await;
                let started = self.begin_session(source);
                let _ = reply.send(started);
            }
            Command::Stop { reply } => {
                self.teardown_session().await;
                let _ = reply.send(());
            }
            Command::Seek { position_ms } => match self.session.as_mut() {
                Some(session) => session.engine.seek_to_ms(position_ms),
                None => tracing::trace!("seek with no active session is a no-op"),
            },
            Command::SetRate { rate } => match self.session.as_mut() {
                Some(session) => session.engine.set_rate(rate),
                None => tracing::trace!("set_rate with no active session is a no-op"),
            },
            Command::GetPosition { reply } => {
                let position = self
                    .session
                    .as_ref()
                    .map(|session| session.engine.position_ms())
                    .unwrap_or(0);
                let _ = reply.send(position);
            }
            Command::ShowPicker => self.picker.present(),
            // Handled by the loop before dispatch
            Command::Shutdown => {}
        }
    }

    /// Construct the new session after the previous one is fully gone
    ///
    /// Returns true once the session object exists; actual playback start
    /// is asynchronous and observed via the outward event stream.
    fn begin_session(&mut self, source: AssetSource) -> bool {
        self.generation += 1;
        let generation = self.generation;

        let mut engine = match self.engines.create(&source) {
            Ok(engine) => engine,
            Err(error) => {
                tracing::warn!(%error, url = %source.url, "engine creation failed; no session");
                return false;
            }
        };

        // Routing flags must be asserted before any presentation work
        engine.set_allows_external_playback(true);
        engine.set_external_while_screen_active(true);

        // Engine callbacks arrive on arbitrary threads; tag them with the
        // session identity and redispatch onto this context
        let engine_tx = self.observed_tx.clone();
        engine.observe(Arc::new(move |signal| {
            let _ = engine_tx.send(Observed::Engine { generation, signal });
        }));

        self.engine_external.store(false, Ordering::SeqCst);
        self.session = Some(PlaybackSession::new(source, engine, generation));
        tracing::debug!(generation, "session created, asset loading");

        // Chrome appears asynchronously after session construction
        let chrome_tx = self.observed_tx.clone();
        self.chrome.present(
            PresentationOptions::default(),
            Box::new(move || {
                let _ = chrome_tx.send(Observed::ChromePresented { generation });
            }),
        );

        true
    }

    /// Full stop sequence: observation teardown, pause, dismissal, release
    ///
    /// Idempotent; with no session this is a no-op. The session is released
    /// only after chrome dismissal completes (bounded by the guard).
    async fn teardown_session(&mut self) {
        let Some(mut session) = self.session.take() else {
            tracing::trace!("stop with no active session is a no-op");
            return;
        };

        // Invalidate pending deferred work and in-flight callbacks
        self.generation += 1;
        self.deferred.clear();

        session.engine.stop_observing();
        session.engine.pause();
        self.engine_external.store(false, Ordering::SeqCst);

        let (done_tx, done_rx) = oneshot::channel();
        self.chrome.dismiss(Box::new(move || {
            let _ = done_tx.send(());
        }));

        match tokio::time::timeout(DISMISSAL_GUARD, done_rx).await {
            Ok(_) => tracing::debug!(generation = session.generation, "session released"),
            Err(_) => tracing::warn!(
                generation = session.generation,
                "chrome dismissal never completed; releasing session anyway"
            ),
        }
    }

    fn handle_observed(&mut self, observed: Observed) {
        match observed {
            Observed::Route(event) => self.on_route_event(event),
            Observed::Engine { generation, signal } => {
                if !self.is_current(generation) {
                    tracing::trace!(generation, "discarding engine signal from a released session");
                    return;
                }
                match signal {
                    EngineSignal::ExternalFlagChanged { was, now } => {
                        self.on_route_event(RouteEvent::EngineExternalFlagChanged { was, now });
                    }
                    EngineSignal::AssetStatusChanged(status) => {
                        self.on_route_event(RouteEvent::AssetStatusChanged(status));
                    }
                    EngineSignal::AllowExternalChanged { was, now } => {
                        // Watched but carries no action of its own
                        tracing::debug!(was, now, "allowed-to-route-externally flag changed");
                    }
                }
            }
            Observed::ChromePresented { generation } => {
                if !self.is_current(generation) {
                    tracing::trace!(
                        generation,
                        "discarding chrome appearance for a released session"
                    );
                    return;
                }
                tracing::debug!("chrome appeared; deferring first play attempt");
                self.schedule(DeferredAction::BeginPlayback, POST_PRESENTATION_DELAY, generation);
            }
        }
    }

    fn on_route_event(&mut self, event: RouteEvent) {
        match event {
            RouteEvent::WirelessAvailabilityChanged(available) => {
                self.emit(CoordinatorEvent::RouteAvailabilityChanged(available));
            }
            RouteEvent::AudioRouteChanged
            | RouteEvent::ScreenConnected
            | RouteEvent::ScreenDisconnected => {
                let activity = self.current_activity();
                self.emit(CoordinatorEvent::RouteStateChanged(activity));
            }
            RouteEvent::EngineExternalFlagChanged { was, now } => {
                self.on_external_flag_changed(was, now);
            }
            RouteEvent::AssetStatusChanged(status) => self.on_asset_status(status),
        }
    }

    /// Derive fresh route activity; never cached across events
    fn current_activity(&self) -> RouteActivity {
        let snapshot = self.provider.snapshot();
        let active = self.engine_external.load(Ordering::SeqCst)
            || snapshot.routed_externally()
            || snapshot.has_second_display();
        RouteActivity {
            active,
            device_name: snapshot.external_device_name(),
        }
    }

    fn on_external_flag_changed(&mut self, was: bool, now: bool) {
        self.engine_external.store(now, Ordering::SeqCst);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if was && !now && session.desired_external_routing {
            // Immediate best-effort nudge; result unverified synchronously
            tracing::debug!("externally-routed flag dropped while desired; re-asserting");
            session.engine.set_allows_external_playback(true);
            session.engine.set_external_while_screen_active(true);
        }
    }

    fn on_asset_status(&mut self, status: AssetStatus) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match status {
            AssetStatus::Pending => tracing::trace!("asset still loading"),
            AssetStatus::Ready => {
                if session.phase == SessionPhase::Loading {
                    session.phase = SessionPhase::Presenting;
                }
                session.asset_ready = true;
                tracing::debug!(url = %session.source.url, "asset ready");
                self.try_begin_playback();
            }
            AssetStatus::Failed(reason) => {
                tracing::warn!(%reason, "asset loading failed; session degraded until stop");
                session.phase = SessionPhase::Degraded;
                let device_name = self.provider.snapshot().external_device_name();
                self.emit(CoordinatorEvent::RouteStateChanged(RouteActivity {
                    active: false,
                    device_name,
                }));
            }
        }
    }

    /// Issue play once the asset is ready and presentation has completed
    ///
    /// Play is never invoked before presentation completes.
    fn try_begin_playback(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.ready_to_play() {
            return;
        }

        session.engine.play();
        session.phase = SessionPhase::Playing;

        let snapshot = self.provider.snapshot();
        if snapshot.routed_externally() {
            session.bound_route = snapshot.current_route.clone();
        }

        tracing::debug!(
            url = %session.source.url,
            externally_routed = session.engine.external_playback_active(),
            position_ms = session.engine.position_ms(),
            "playback started"
        );

        let generation = session.generation;
        self.schedule(DeferredAction::ReconcileRouting, RECONCILIATION_DELAY, generation);
    }

    /// The one-shot corrective action when desired and actual routing diverge
    ///
    /// Not a retry loop: if the engine still fails to honor external routing
    /// after this single attempt, the session stays in Playing locally.
    fn reconcile_routing(&mut self) {
        let snapshot = self.provider.snapshot();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.phase != SessionPhase::Playing {
            return;
        }
        if !session.desired_external_routing || session.engine.external_playback_active() {
            tracing::trace!("routing matches desire; no reconciliation needed");
            return;
        }

        session.phase = SessionPhase::Reconciling;
        tracing::debug!("external routing desired but engine reports local; correcting");
        session.engine.set_allows_external_playback(true);
        session.engine.set_external_while_screen_active(true);
        if snapshot.has_second_display() {
            session.engine.bind_external_surface();
        }

        if !session.engine.external_playback_active() {
            // Known limitation, not a fatal error; the true state is already
            // visible through routeStateChanged
            tracing::warn!("route reconciliation shortfall: external routing not restored");
        }
        session.phase = SessionPhase::Playing;
    }

    fn schedule(&mut self, action: DeferredAction, delay: Duration, generation: u64) {
        self.deferred.push(Deferred {
            due: Instant::now() + delay,
            generation,
            action,
        });
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.deferred.iter().map(|item| item.due).min()
    }

    fn fire_due_deferred(&mut self) {
        let now = Instant::now();
        let mut due = Vec::new();
        self.deferred.retain(|item| {
            if item.due <= now {
                due.push(*item);
                false
            } else {
                true
            }
        });

        for item in due {
            if !self.is_current(item.generation) {
                tracing::trace!(
                    action = ?item.action,
                    "discarding deferred action from a released session"
                );
                continue;
            }
            match item.action {
                DeferredAction::BeginPlayback => self.on_play_deferral_elapsed(),
                DeferredAction::ReconcileRouting => self.reconcile_routing(),
            }
        }
    }

    fn on_play_deferral_elapsed(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.presentation_complete = true;
        self.try_begin_playback();
    }

    fn is_current(&self, generation: u64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.generation == generation)
    }

    fn emit(&self, event: CoordinatorEvent) {
        if self.outward_tx.send(event).is_err() {
            tracing::trace!("no outward event consumer; dropping event");
        }
    }

    async fn shutdown(&mut self) {
        self.teardown_session().await;
        self.observer.detach();
        self.provider.set_route_detection(false);
    }
}
