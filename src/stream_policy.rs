//! Decides whether a stream URL can be handed straight to an audio element.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};
use thiserror::Error;
use url::Url;

use crate::stream_candidates::is_supported_playlist_url;

pub const DEFAULT_BLOCKED_HOST_SNIPPETS: &[&str] = &["youtube.com", "youtu.be", "facebook.com"];

pub const DEFAULT_TRUSTED_HOSTS: &[&str] = &[
    "eradioportal.com",
    "fastcast4u.com",
    "theanchor.app",
    "listen2myradio.com",
    "streamtheworld.com",
];

pub const DEFAULT_DIRECT_AUDIO_HINTS: &[&str] = &[
    ".mp3",
    ".aac",
    ".m3u8",
    ".ogg",
    ".opus",
    ".flac",
    ".weba",
    "/stream",
    "/radio.mp3",
    "zeno.fm",
    "radioca.st",
    "shoutca.st",
];

pub const DEFAULT_PLAYLIST_PATTERN: &str = r"(?i)\.(pls|m3u)(?:[?#]|$)";

static DEFAULT_PLAYLIST_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_PLAYLIST_PATTERN).expect("default playlist pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("Invalid stream URL.")]
    InvalidUrl,
    #[error("This stream host is blocked in the app.")]
    BlockedHost,
    #[error("Playlist URLs (.pls/.m3u) are not directly playable. Use a direct stream URL.")]
    UnsupportedPlaylist,
    #[error("This station does not provide a direct embeddable audio stream.")]
    NotEmbeddable,
}

/// Host and filename rules used to judge stream URLs. Entries are stored
/// lower-cased.
#[serde_as]
#[derive(Debug, Clone, Serialize)]
pub struct StreamPolicy {
    pub blocked_host_snippets: Vec<String>,
    pub trusted_hosts: Vec<String>,
    pub direct_audio_hints: Vec<String>,
    #[serde_as(as = "DisplayFromStr")]
    pub playlist_pattern: Regex,
}

impl StreamPolicy {
    pub fn new(
        blocked_host_snippets: Vec<String>,
        trusted_hosts: Vec<String>,
        direct_audio_hints: Vec<String>,
        playlist_pattern: Regex,
    ) -> Self {
        Self {
            blocked_host_snippets: lowercase_all(blocked_host_snippets),
            trusted_hosts: lowercase_all(trusted_hosts),
            direct_audio_hints: lowercase_all(direct_audio_hints),
            playlist_pattern,
        }
    }

    pub fn is_playlist_url(&self, url: &str) -> bool {
        self.playlist_pattern.is_match(url)
    }

    fn is_trusted_host(&self, hostname: &str) -> bool {
        self.trusted_hosts.iter().any(|host| {
            hostname == host
                || hostname
                    .strip_suffix(host.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

impl Default for StreamPolicy {
    fn default() -> Self {
        Self::new(
            to_owned_list(DEFAULT_BLOCKED_HOST_SNIPPETS),
            to_owned_list(DEFAULT_TRUSTED_HOSTS),
            to_owned_list(DEFAULT_DIRECT_AUDIO_HINTS),
            DEFAULT_PLAYLIST_REGEX.clone(),
        )
    }
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn lowercase_all(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

pub fn has_http_scheme(url: &str) -> bool {
    let trimmed = url.trim();
    ["http://", "https://"].iter().any(|scheme| {
        trimmed
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

pub fn is_blocked_url(url: &str, blocked_host_snippets: &[String]) -> bool {
    let lowered = url.trim().to_lowercase();
    blocked_host_snippets
        .iter()
        .filter(|snippet| !snippet.is_empty())
        .any(|snippet| lowered.contains(&snippet.to_lowercase()))
}

/// Classifies a stream URL. `Ok(())` means the player may try it directly.
pub fn classify(url: &str, policy: &StreamPolicy) -> Result<(), PlaybackError> {
    let lowered = url.trim().to_lowercase();
    if !has_http_scheme(&lowered) {
        return Err(PlaybackError::InvalidUrl);
    }
    if is_blocked_url(&lowered, &policy.blocked_host_snippets) {
        return Err(PlaybackError::BlockedHost);
    }
    if policy.is_playlist_url(&lowered) {
        return if is_supported_playlist_url(&lowered) {
            Ok(())
        } else {
            Err(PlaybackError::UnsupportedPlaylist)
        };
    }

    // Unparsable hosts skip the trusted-host check and fall through to hints.
    if let Some(hostname) = Url::parse(&lowered)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.trim().to_lowercase()))
    {
        if policy.is_trusted_host(&hostname) {
            return Ok(());
        }
    }

    if policy
        .direct_audio_hints
        .iter()
        .any(|hint| lowered.contains(hint.as_str()))
    {
        Ok(())
    } else {
        Err(PlaybackError::NotEmbeddable)
    }
}

pub fn is_likely_direct_audio_url(url: &str, policy: &StreamPolicy) -> bool {
    classify(url, policy).is_ok()
}

/// Message suitable for showing to a listener, or `None` when playable.
pub fn playback_error(url: &str, policy: &StreamPolicy) -> Option<String> {
    classify(url, policy).err().map(|err| err.to_string())
}
