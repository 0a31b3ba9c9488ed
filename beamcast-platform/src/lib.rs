//! # Beamcast Platform - Seams Between the Coordinator and the Host
//!
//! Defines the injected interfaces the route coordinator drives and the
//! data types that cross them. Production hosts bind these traits to the
//! platform's output subsystem, playback engine, and presentation surfaces;
//! tests inject the scripted fakes behind the `test-support` feature.
//!
//! ## The seams
//!
//! - [`OutputRouteProvider`] - system-wide route state: snapshots, raw
//!   signal subscription, the device-picker affordance, output-subsystem
//!   configuration
//! - [`PlayerEngine`] / [`EngineFactory`] - the per-session playback engine
//!   with its externally-routed flags and property observation
//! - [`SessionChrome`] - the presentation surface with async appear/dismiss
//!   completions
//!
//! ## Signal flow
//!
//! ```text
//! OutputRouteProvider --SystemSignal--> RouteObserver --RouteEvent--+
//!                                                                   v
//! PlayerEngine -------EngineSignal----------------------> session controller
//! ```
//!
//! Raw signals arrive on arbitrary threads; everything downstream of the
//! observer runs on the coordinator's single execution context.

// Main exports
pub use chrome::{ChromeCompletion, PresentationOptions, SessionChrome};
pub use engine::{
    is_streaming_playlist, AssetSource, EngineFactory, EngineObserver, PlayerEngine,
};
pub use error::{PlatformError, Result};
pub use provider::{OutputRouteProvider, ProviderSubscription, SignalHandler};
pub use route::{RouteDescriptor, RouteKind, RouteSnapshot};
pub use signal::{AssetStatus, EngineSignal, RouteChangeReason, RouteEvent, SystemSignal};

// Re-exported so downstream crates agree on the URL type
pub use url::Url;

mod chrome;
mod engine;
mod error;
mod provider;
mod route;
mod signal;

#[cfg(feature = "test-support")]
pub mod fake;
