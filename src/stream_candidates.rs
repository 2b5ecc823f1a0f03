//! Alternate playback URLs for panel-hosted stations.
//!
//! Some hosting panels publish a `.pls` playlist or an HTML player page
//! instead of a raw stream. [`build_stream_candidates`] guesses the direct
//! stream locations those panels usually expose, in the order a player
//! should try them.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

const PANEL_DEFAULT_PORT: &str = "2199";
const RADIOCAST_DOMAIN: &str = "radioca.st";

static TUNEIN_PLAYLIST_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^/tunein/([^/?#]+)\.pls$").expect("tunein path pattern"));
static STREAM_ID_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)-stream$").expect("stream id suffix pattern"));
static RAW_STREAM_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/stream(?:[/?#]|$)").expect("stream suffix pattern"));
static RAW_MP3_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.mp3(?:[?#]|$)").expect("mp3 suffix pattern"));

/// Paths tried on every origin of a `/tunein/<id>.pls` panel. `{raw}` and
/// `{id}` are replaced with the raw and normalized stream ids.
const TUNEIN_PATHS: &[&str] = &[
    "/proxy/{raw}?mp=/1",
    "/proxy/{id}?mp=/1",
    "/stream/{raw}",
    "/stream/{id}",
    "/stream",
    "/stream/",
    "/stream?type=http&nocache=1",
    "/;",
    "/;stream.mp3",
    "/listen.mp3",
    "/radio.mp3",
];

const RADIOCAST_PATHS: &[&str] = &[
    "/stream",
    "/stream/",
    "/stream?type=http&nocache=1",
    "/;stream.mp3",
    "/listen.mp3",
    "/radio.mp3",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuneinPlaylist {
    pub host: String,
    pub port: Option<u16>,
    pub raw_stream_id: String,
    pub stream_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadiocastPanel {
    pub host: String,
    pub sid: Option<String>,
    pub subdomain: Option<String>,
}

fn parse_url(url: &str) -> Option<Url> {
    Url::parse(url.trim()).ok()
}

pub fn parse_tunein_playlist(url: &str) -> Option<TuneinPlaylist> {
    let parsed = parse_url(url)?;
    let captures = TUNEIN_PLAYLIST_PATH.captures(parsed.path().trim())?;
    let raw_stream_id = captures.get(1)?.as_str().to_string();
    let host = parsed.host_str()?.trim().to_lowercase();
    if host.is_empty() || raw_stream_id.is_empty() {
        return None;
    }
    let stream_id = STREAM_ID_SUFFIX.replace(&raw_stream_id, "").into_owned();

    Some(TuneinPlaylist {
        host,
        port: parsed.port(),
        raw_stream_id,
        stream_id,
    })
}

pub fn parse_radiocast_panel(url: &str) -> Option<RadiocastPanel> {
    let parsed = parse_url(url)?;
    let host = parsed.host_str()?.to_lowercase();
    if !host.ends_with(RADIOCAST_DOMAIN) {
        return None;
    }
    if !parsed.path().to_lowercase().ends_with("/index.html") {
        return None;
    }

    let sid = parsed
        .query_pairs()
        .find(|(key, _)| key == "sid")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let subdomain = host
        .split('.')
        .next()
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string());

    Some(RadiocastPanel {
        host,
        sid,
        subdomain,
    })
}

/// Whether a playlist-style URL has the one panel shape we can resolve.
pub fn is_supported_playlist_url(url: &str) -> bool {
    parse_tunein_playlist(url).is_some()
}

/// Ordered, duplicate-free list of URLs worth trying for `url`.
pub fn build_stream_candidates(url: &str) -> Vec<String> {
    let base = url.trim().to_string();
    if base.is_empty() {
        return vec![base];
    }

    let mut candidates = Vec::new();
    if let Some(playlist) = parse_tunein_playlist(&base) {
        push_tunein_candidates(&mut candidates, &playlist);
        candidates.push(base);
    } else {
        candidates.push(base.clone());
        if let Some(panel) = parse_radiocast_panel(&base) {
            push_radiocast_candidates(&mut candidates, &panel);
        } else {
            match parse_url(&base).filter(|parsed| parsed.has_host()) {
                Some(parsed) => push_path_variants(&mut candidates, &parsed),
                None => push_raw_variants(&mut candidates, &base),
            }
        }
    }

    dedupe_preserving_order(candidates)
}

fn push_tunein_candidates(candidates: &mut Vec<String>, playlist: &TuneinPlaylist) {
    let panel_port = playlist
        .port
        .map(|port| port.to_string())
        .unwrap_or_else(|| PANEL_DEFAULT_PORT.to_string());
    let mut hosts = vec![playlist.host.as_str()];
    if let Some(bare) = playlist.host.strip_prefix("www.") {
        hosts.push(bare);
    }

    let mut origins = Vec::with_capacity(hosts.len() * 4);
    for port in [None, Some(panel_port.as_str())] {
        for scheme in ["https", "http"] {
            for host in &hosts {
                origins.push(match port {
                    Some(port) => format!("{scheme}://{host}:{port}"),
                    None => format!("{scheme}://{host}"),
                });
            }
        }
    }

    for origin in &origins {
        for path in TUNEIN_PATHS {
            let path = path
                .replace("{raw}", &playlist.raw_stream_id)
                .replace("{id}", &playlist.stream_id);
            candidates.push(format!("{origin}{path}"));
        }
    }
}

fn push_radiocast_candidates(candidates: &mut Vec<String>, panel: &RadiocastPanel) {
    let origins = [
        format!("https://{}", panel.host),
        format!("http://{}", panel.host),
    ];

    for path in RADIOCAST_PATHS {
        for origin in &origins {
            candidates.push(format!("{origin}{path}"));
        }
    }
    if let Some(subdomain) = &panel.subdomain {
        for origin in &origins {
            candidates.push(format!("{origin}/proxy/{subdomain}?mp=/1"));
        }
    }
    if let Some(sid) = &panel.sid {
        for origin in &origins {
            candidates.push(format!("{origin}/stream/{sid}"));
        }
    }
}

fn push_path_variants(candidates: &mut Vec<String>, parsed: &Url) {
    let origin = parsed.origin().ascii_serialization();
    let path = parsed.path().trim_end_matches('/');

    candidates.push(format!("{origin}{path}/"));
    if !path.to_lowercase().ends_with("/stream") {
        candidates.push(format!("{origin}{path}/stream"));
    }
    // A bare origin has no file name to give an extension to.
    if !path.is_empty() && !path.to_lowercase().ends_with(".mp3") {
        candidates.push(format!("{origin}{path}.mp3"));
    }
}

fn push_raw_variants(candidates: &mut Vec<String>, base: &str) {
    let trimmed = base.trim_end_matches('/');
    if !base.ends_with('/') {
        candidates.push(format!("{base}/"));
    }
    if !RAW_STREAM_SUFFIX.is_match(base) {
        candidates.push(format!("{trimmed}/stream"));
    }
    if !RAW_MP3_SUFFIX.is_match(base) {
        candidates.push(format!("{trimmed}.mp3"));
    }
}

fn dedupe_preserving_order(candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}
