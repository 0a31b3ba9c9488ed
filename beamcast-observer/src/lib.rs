//! # Beamcast Observer - Ordered Route-Signal Delivery
//!
//! Turns heterogeneous system notifications into the single ordered
//! [`RouteEvent`](beamcast_platform::RouteEvent) stream the session
//! controller consumes, and gives hosts a blocking iterator over the
//! coordinator's outward events.
//!
//! ## Guarantees
//!
//! - **Ordering**: events pass through in arrival order of the underlying
//!   signals, never reordered or coalesced across distinct signal kinds.
//! - **Teardown**: after [`RouteObserver::detach`] (or drop) no further
//!   events are delivered, even if the underlying system re-fires a
//!   historical notification.
//! - **Normalization only**: payloads are not transformed beyond mapping
//!   into the event union; business logic lives entirely in the controller.

pub use iter::{EventIterator, TimeoutIter, TryIter};
pub use observer::RouteObserver;

mod iter;
mod observer;
