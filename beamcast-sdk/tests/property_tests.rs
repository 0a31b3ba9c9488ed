//! Generative tests for the coordinator's pure argument handling
//!
//! Command validation and the manifest heuristic are plain functions; these
//! properties pin their behavior over arbitrary inputs.

use std::collections::HashMap;

use proptest::prelude::*;

use beamcast_platform::is_streaming_playlist;
use beamcast_sdk::validate_source;

/// Strategy for well-formed absolute media URLs
fn media_url_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("http"), Just("https")],
        "[a-z][a-z0-9]{2,12}",
        "[a-z0-9]{1,10}",
        prop_oneof![Just("mp4"), Just("mov"), Just("m3u8"), Just("ts")],
    )
        .prop_map(|(scheme, host, path, ext)| {
            format!("{scheme}://{host}.example.com/{path}.{ext}")
        })
}

/// Strategy for strings that cannot be absolute URLs (no scheme separator)
fn schemeless_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,40}"
}

/// Strategy for small header maps
fn headers_strategy() -> impl Strategy<Value = HashMap<String, String>> {
    proptest::collection::hash_map("[A-Za-z-]{1,16}", "[ -~]{0,32}", 0..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any absolute http(s) URL passes validation, with headers carried
    /// through untouched.
    #[test]
    fn prop_absolute_urls_validate(
        url in media_url_strategy(),
        headers in headers_strategy(),
    ) {
        let source = validate_source(&url, headers.clone()).unwrap();
        prop_assert_eq!(source.url.as_str(), url.as_str());
        prop_assert_eq!(source.headers, headers);
    }

    /// A string with no scheme separator is always rejected as an invalid
    /// argument, never a panic.
    #[test]
    fn prop_schemeless_strings_rejected(input in schemeless_strategy()) {
        let error = validate_source(&input, HashMap::new()).unwrap_err();
        prop_assert_eq!(error.kind(), "invalid_argument");
    }

    /// The manifest heuristic matches exactly the URLs carrying the
    /// manifest extension, as suffix or substring.
    #[test]
    fn prop_manifest_detection(url in media_url_strategy()) {
        prop_assert_eq!(is_streaming_playlist(&url), url.contains("m3u8"));
    }

    /// Precise-timing loading options follow the manifest heuristic.
    #[test]
    fn prop_precise_timing_tracks_manifest(url in media_url_strategy()) {
        let source = validate_source(&url, HashMap::new()).unwrap();
        prop_assert_eq!(source.precise_timing, url.contains("m3u8"));
    }
}
