//! # Beamcast SDK - External Playback Route Coordination
//!
//! Hands a remote media URL to an external video-capable output route (a
//! wireless display or receiver) and keeps the local playback session
//! synchronized with whatever device is actually rendering it.
//!
//! The hard problem is not asking the platform to play a video - it is
//! reconciling three independently-evolving truths that can disagree at any
//! moment: what the application *wants* (an active session routed
//! externally), what the output subsystem *reports* (route availability,
//! active route, connected displays), and what the playback engine
//! *actually does* (its externally-routed flag, its item-ready status).
//!
//! ```rust,ignore
//! use beamcast_sdk::{CoordinatorEvent, RouteCoordinator};
//!
//! let coordinator = RouteCoordinator::new(provider, engines, chrome);
//!
//! // Start is sync-returning: true means the session exists, not that
//! // playback has begun. Actual start arrives through the event stream.
//! if coordinator.start("https://cdn.example.com/live/master.m3u8", None) {
//!     for event in coordinator.events() {
//!         match event {
//!             CoordinatorEvent::RouteAvailabilityChanged(available) => {
//!                 println!("wireless routes available: {available}");
//!             }
//!             CoordinatorEvent::RouteStateChanged(activity) => {
//!                 println!("routed externally: {}", activity.active);
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! RouteCoordinator (sync façade)
//!     | commands / replies
//!     v
//! worker thread (current-thread runtime = the designated execution context)
//!     owns: PlaybackSession + recovery state machine
//!     consumes: RouteObserver's ordered event stream
//!     queries: fresh RouteSnapshots from the OutputRouteProvider
//!     emits: CoordinatorEvents, drained via a blocking iterator
//! ```
//!
//! All session mutation happens on the worker context; signals from
//! arbitrary threads are redispatched in through one ordered channel.
//! Recovery runs `Idle -> Loading -> Presenting -> Playing`, with a
//! one-shot reconciliation pass when the engine fails to honor external
//! routing and a `Degraded` terminal for failed assets. Nothing here is
//! fatal to the host: every failure state is recoverable with `stop`
//! followed by a new `start`.

// Main exports
pub use coordinator::{validate_source, RouteCoordinator};
pub use error::{CoordinatorError, Result};
pub use events::{CoordinatorEvent, RouteActivity};
pub use picker::RoutePickerTrigger;
pub use session::SessionPhase;
pub use status::StatusQuery;

// Re-export commonly used types from the platform and observer layers
pub use beamcast_observer::EventIterator;
pub use beamcast_platform::{
    AssetSource, AssetStatus, EngineFactory, OutputRouteProvider, PlayerEngine, RouteDescriptor,
    RouteEvent, RouteKind, RouteSnapshot, SessionChrome, Url,
};

pub mod logging;

mod coordinator;
mod error;
mod events;
mod picker;
mod session;
mod status;
mod worker;

/// Prelude module for convenient imports
///
/// ```rust
/// use beamcast_sdk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AssetStatus, CoordinatorError, CoordinatorEvent, EventIterator, RouteActivity,
        RouteCoordinator, RouteEvent, RouteSnapshot, Result, StatusQuery,
    };
}
