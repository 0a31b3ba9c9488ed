//! Presentation-chrome seam
//!
//! The session chrome is the full-screen playback surface the host shows
//! while a session is live. Appearance and dismissal are animated and
//! complete asynchronously; the completions may arrive on arbitrary
//! threads, so the coordinator routes them back through its own context.

/// Completion callback for an appear/dismiss animation
pub type ChromeCompletion = Box<dyn FnOnce() + Send>;

/// Presentation choices applied when chrome appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationOptions {
    /// Enter full screen when playback begins
    pub enters_fullscreen_on_play: bool,
    /// Leave full screen up when playback ends
    pub stays_fullscreen_after_play: bool,
    /// Show transport controls on the chrome
    pub shows_playback_controls: bool,
    /// Publish now-playing metadata to the system
    pub updates_now_playing: bool,
    /// Allow picture-in-picture while presented
    pub allows_picture_in_picture: bool,
}

impl Default for PresentationOptions {
    /// The configuration used for externally-routed video sessions
    ///
    /// Picture-in-picture is off: it competes with the external route for
    /// the video output.
    fn default() -> Self {
        Self {
            enters_fullscreen_on_play: true,
            stays_fullscreen_after_play: true,
            shows_playback_controls: true,
            updates_now_playing: true,
            allows_picture_in_picture: false,
        }
    }
}

/// Host surface that presents and dismisses session chrome
///
/// Invoked from the coordinator's execution context. Implementations must
/// invoke the completion exactly once per call, from any thread.
pub trait SessionChrome: Send {
    /// Present the chrome; `done` fires when the appearance completes
    fn present(&mut self, options: PresentationOptions, done: ChromeCompletion);

    /// Dismiss the chrome; `done` fires when the dismissal completes
    fn dismiss(&mut self, done: ChromeCompletion);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_disable_pip() {
        let options = PresentationOptions::default();
        assert!(options.enters_fullscreen_on_play);
        assert!(options.shows_playback_controls);
        assert!(options.updates_now_playing);
        assert!(!options.allows_picture_in_picture);
    }
}
