//! Playback-engine seam: one engine instance per session
//!
//! The engine is the component that actually renders media and owns the
//! externally-routed flag. The coordinator drives it exclusively from its
//! own execution context; observation callbacks may arrive on arbitrary
//! threads and are redispatched before they touch session state.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::error::Result;
use crate::signal::EngineSignal;

/// Validated description of what a session plays
#[derive(Debug, Clone)]
pub struct AssetSource {
    /// The remote media URL, already validated by the façade
    pub url: Url,
    /// HTTP header fields applied to asset requests
    pub headers: HashMap<String, String>,
    /// Apply loading options tuned for precise duration/timing
    ///
    /// Set for streaming-playlist (manifest) inputs, where duration is not
    /// knowable from a container header.
    pub precise_timing: bool,
}

impl AssetSource {
    pub fn new(url: Url, headers: HashMap<String, String>) -> Self {
        let precise_timing = is_streaming_playlist(url.as_str());
        Self {
            url,
            headers,
            precise_timing,
        }
    }
}

/// Best-effort detection of streaming-playlist (manifest) inputs
///
/// Suffix or substring match on the manifest extension. A heuristic, not a
/// format contract: false positives only cost stricter timing options.
pub fn is_streaming_playlist(url: &str) -> bool {
    url.ends_with(".m3u8") || url.contains("m3u8")
}

/// Observer invoked for engine property changes and asset status updates
///
/// May be called from arbitrary threads.
pub type EngineObserver = Arc<dyn Fn(EngineSignal) + Send + Sync>;

/// A playback engine bound to one asset
///
/// Created by [`EngineFactory::create`], which also begins asset loading.
/// Status progress is reported through the observer registered with
/// [`observe`](PlayerEngine::observe). All methods are invoked from the
/// coordinator's execution context only.
pub trait PlayerEngine: Send {
    /// Begin property observation, replacing any previous observer
    ///
    /// Watches the externally-routed flag, the allowed-to-route flag, and
    /// the asset status field.
    fn observe(&mut self, observer: EngineObserver);

    /// Deterministically end property observation
    ///
    /// After this returns the engine must not invoke the observer again,
    /// even if a property changes afterwards.
    fn stop_observing(&mut self);

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Seek to an offset in whole milliseconds
    ///
    /// Implementations convert to their native time representation without
    /// rounding loss beyond millisecond granularity.
    fn seek_to_ms(&mut self, position_ms: u64);

    /// Set the playback rate directly, no clamping
    ///
    /// A rate the engine rejects is the engine's failure to report, not the
    /// coordinator's to validate.
    fn set_rate(&mut self, rate: f64);

    /// Current position truncated to whole milliseconds
    fn position_ms(&self) -> u64;

    /// Allow or forbid the engine to route output externally
    fn set_allows_external_playback(&mut self, allowed: bool);

    /// Route video externally whenever an external screen is active
    fn set_external_while_screen_active(&mut self, enabled: bool);

    /// The engine's externally-routed flag, as it reports it right now
    ///
    /// Can lag reality; the status query ORs it with independent signals.
    fn external_playback_active(&self) -> bool;

    /// Force-bind the video output to a second available display surface
    ///
    /// The corrective half of reconciliation; a no-op when no second
    /// surface exists.
    fn bind_external_surface(&mut self);
}

/// Creates engines and begins asset loading
pub trait EngineFactory: Send + Sync {
    /// Create an engine for the source and start loading it
    ///
    /// Loading progress arrives through the engine's observer as
    /// [`EngineSignal::AssetStatusChanged`] transitions.
    fn create(&self, source: &AssetSource) -> Result<Box<dyn PlayerEngine>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_detection_by_suffix() {
        assert!(is_streaming_playlist("https://cdn.example.com/live/master.m3u8"));
        assert!(!is_streaming_playlist("https://cdn.example.com/movie.mp4"));
    }

    #[test]
    fn test_manifest_detection_by_substring() {
        // Manifest URLs behind token query strings still match
        assert!(is_streaming_playlist(
            "https://cdn.example.com/v1/m3u8/master?token=abc"
        ));
    }

    #[test]
    fn test_asset_source_sets_precise_timing() {
        let url = Url::parse("https://cdn.example.com/live/master.m3u8").unwrap();
        let source = AssetSource::new(url, HashMap::new());
        assert!(source.precise_timing);

        let url = Url::parse("https://cdn.example.com/movie.mp4").unwrap();
        let source = AssetSource::new(url, HashMap::new());
        assert!(!source.precise_timing);
    }
}
