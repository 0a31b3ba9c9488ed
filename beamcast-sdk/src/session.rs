//! The playback session and its recovery phases
//!
//! At most one [`PlaybackSession`] exists at any instant. It is created by
//! `start` after the previous session's teardown completes, destroyed by
//! `stop` or the next `start`, and referenced only from the coordinator's
//! execution context.

use beamcast_platform::{AssetSource, PlayerEngine, RouteDescriptor};

/// Phase of the recovery state machine
///
/// `Idle -> Loading -> Presenting -> Playing -> (Reconciling) -> Playing | Degraded`;
/// any phase returns to `Idle` on stop. `Idle` itself is represented by the
/// absence of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Asset loading underway; playback must not start
    Loading,
    /// Asset ready; waiting for presentation chrome and the play deferral
    Presenting,
    /// Play has been issued
    Playing,
    /// The one-shot corrective routing action is running
    Reconciling,
    /// Asset loading failed; session stays allocated but inert until stop
    Degraded,
}

/// The single unit of work the coordinator owns
pub struct PlaybackSession {
    /// What this session plays
    pub source: AssetSource,
    /// The engine rendering it; observation is torn down before release
    pub engine: Box<dyn PlayerEngine>,
    /// Identity captured by deferred work; stale generations are discarded
    pub generation: u64,
    /// Set at creation, cleared only by an explicit stop
    pub desired_external_routing: bool,
    /// Current recovery phase
    pub phase: SessionPhase,
    /// The asset reported terminal-success status
    pub asset_ready: bool,
    /// Presentation chrome finished appearing and the play deferral elapsed
    pub presentation_complete: bool,
    /// Route the video output was bound to when playback began externally
    pub bound_route: Option<RouteDescriptor>,
}

impl PlaybackSession {
    pub fn new(source: AssetSource, engine: Box<dyn PlayerEngine>, generation: u64) -> Self {
        Self {
            source,
            engine,
            generation,
            desired_external_routing: true,
            phase: SessionPhase::Loading,
            asset_ready: false,
            presentation_complete: false,
            bound_route: None,
        }
    }

    /// Both preconditions for issuing play are met
    pub fn ready_to_play(&self) -> bool {
        self.asset_ready
            && self.presentation_complete
            && matches!(self.phase, SessionPhase::Loading | SessionPhase::Presenting)
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("url", &self.source.url.as_str())
            .field("generation", &self.generation)
            .field("phase", &self.phase)
            .field("desired_external_routing", &self.desired_external_routing)
            .field("asset_ready", &self.asset_ready)
            .field("presentation_complete", &self.presentation_complete)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamcast_platform::fake::FakeEngineFactory;
    use beamcast_platform::{EngineFactory, Url};
    use std::collections::HashMap;

    fn test_session() -> PlaybackSession {
        let source = AssetSource::new(
            Url::parse("https://example.com/video.mp4").unwrap(),
            HashMap::new(),
        );
        let factory = FakeEngineFactory::new();
        let engine = factory.create(&source).unwrap();
        PlaybackSession::new(source, engine, 1)
    }

    #[test]
    fn test_new_session_wants_external_routing() {
        let session = test_session();
        assert!(session.desired_external_routing);
        assert_eq!(session.phase, SessionPhase::Loading);
        assert!(!session.ready_to_play());
    }

    #[test]
    fn test_ready_to_play_needs_both_preconditions() {
        let mut session = test_session();

        session.asset_ready = true;
        assert!(!session.ready_to_play());

        session.presentation_complete = true;
        assert!(session.ready_to_play());

        // Already playing: the window is closed
        session.phase = SessionPhase::Playing;
        assert!(!session.ready_to_play());
    }

    #[test]
    fn test_degraded_session_never_plays() {
        let mut session = test_session();
        session.phase = SessionPhase::Degraded;
        session.asset_ready = true;
        session.presentation_complete = true;
        assert!(!session.ready_to_play());
    }
}
