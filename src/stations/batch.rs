use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

use super::normalize::normalize_station;
use super::sanitize::compare_names;
use super::Station;
use crate::stream_candidates::is_supported_playlist_url;
use crate::stream_policy::{has_http_scheme, is_blocked_url};

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions<'a> {
    pub max_stations: usize,
    pub default_country: &'a str,
    pub blocked_host_snippets: &'a [String],
    /// When set, playlist-style URLs survive only in the recognized panel
    /// shape.
    pub playlist_pattern: Option<&'a Regex>,
}

pub fn normalize_and_filter_batch(records: &[Value], options: &BatchOptions<'_>) -> Vec<Station> {
    rank_and_dedupe(
        records
            .iter()
            .map(|raw| normalize_station(raw, options.default_country)),
        options,
    )
}

fn is_usable(station: &Station, options: &BatchOptions<'_>) -> bool {
    if !station.is_active || station.name.is_empty() || station.stream_url.is_empty() {
        return false;
    }
    if !has_http_scheme(&station.stream_url) {
        return false;
    }
    if is_blocked_url(&station.stream_url, options.blocked_host_snippets) {
        return false;
    }
    match options.playlist_pattern {
        Some(pattern) if pattern.is_match(&station.stream_url) => {
            is_supported_playlist_url(&station.stream_url)
        }
        _ => true,
    }
}

/// Drops unusable records, keeps the first of every duplicate, orders by
/// votes then name and caps the batch size.
pub fn rank_and_dedupe<I>(stations: I, options: &BatchOptions<'_>) -> Vec<Station>
where
    I: IntoIterator<Item = Station>,
{
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for station in stations {
        if !is_usable(&station, options) {
            continue;
        }

        let key = format!(
            "{}|{}",
            station.name.to_lowercase(),
            station.stream_url.to_lowercase()
        );
        if !station.id.is_empty() && seen_ids.contains(&station.id) {
            continue;
        }
        if seen_keys.contains(&key) {
            continue;
        }

        if !station.id.is_empty() {
            seen_ids.insert(station.id.clone());
        }
        seen_keys.insert(key);
        out.push(station);
    }

    out.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| compare_names(&a.name, &b.name))
    });
    out.truncate(options.max_stations);
    out
}
