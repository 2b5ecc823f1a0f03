use std::env;
use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::stream_policy::{
    StreamPolicy, DEFAULT_BLOCKED_HOST_SNIPPETS, DEFAULT_DIRECT_AUDIO_HINTS,
    DEFAULT_PLAYLIST_PATTERN, DEFAULT_TRUSTED_HOSTS,
};

const DEFAULT_ENDPOINT: &str = "https://radio.fourwebminds.com/wp-json/wp/v2/station?per_page=100";
const DEFAULT_BACKUP_SOURCE_URL: &str = "https://all.api.radio-browser.info/json/stations/bycountrycodeexact/PH?hidebroken=true&order=clickcount&reverse=true&limit=1200";
const DEFAULT_BACKUP_OUTPUT_PATH: &str = "data/stations-backup.json";
const DEFAULT_USER_AGENT: &str = "radio-catalog-rs/0.1";
pub const DEFAULT_COUNTRY: &str = "Philippines";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub sources: SourcesConfig,
    pub stream_policy: StreamPolicy,
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcesConfig {
    pub endpoints: Vec<String>,
    pub timeout_ms: u64,
    pub max_stations: usize,
    pub default_country: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupConfig {
    pub source_url: String,
    pub output_path: PathBuf,
    pub max_stations: usize,
    pub blocked_host_snippets: Vec<String>,
    pub user_agent: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup: &lookup };
        let user_agent = env
            .string("STATION_USER_AGENT")
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let sources = SourcesConfig::from_env(&env, &user_agent)?;
        let stream_policy = stream_policy_from_env(&env)?;
        let backup = BackupConfig::from_env(&env, &user_agent)?;

        Ok(Self {
            sources,
            stream_policy,
            backup,
        })
    }
}

struct Env<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Env<'_> {
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn u64(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        match self.string(key) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Message(format!("{key} must be a valid u64"))),
            None => Ok(default),
        }
    }

    fn usize(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        match self.string(key) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Message(format!("{key} must be a valid usize"))),
            None => Ok(default),
        }
    }

    fn list(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.string(key) {
            Some(value) => split_list(&value),
            None => default.iter().map(|item| item.to_string()).collect(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in value.split(',') {
        let normalized = item.trim().to_lowercase();
        if normalized.is_empty() || items.contains(&normalized) {
            continue;
        }
        items.push(normalized);
    }
    items
}

impl SourcesConfig {
    fn from_env(env: &Env<'_>, user_agent: &str) -> Result<Self, ConfigError> {
        let endpoints: Vec<String> = match env.string("STATION_ENDPOINTS") {
            Some(raw) => raw
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            None => vec![DEFAULT_ENDPOINT.to_string()],
        };

        let config = Self {
            endpoints,
            timeout_ms: env.u64("STATION_FETCH_TIMEOUT_MS", 8000)?,
            max_stations: env.usize("STATION_MAX_RESULTS", 700)?,
            default_country: env
                .string("STATION_DEFAULT_COUNTRY")
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            user_agent: user_agent.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::Message(
                "STATION_ENDPOINTS must list at least one endpoint.".into(),
            ));
        }
        for endpoint in &self.endpoints {
            validate_http_url("STATION_ENDPOINTS", endpoint)?;
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "STATION_FETCH_TIMEOUT_MS must be greater than zero.".into(),
            ));
        }
        if self.max_stations == 0 {
            return Err(ConfigError::Message(
                "STATION_MAX_RESULTS must be greater than zero.".into(),
            ));
        }
        Ok(())
    }
}

fn stream_policy_from_env(env: &Env<'_>) -> Result<StreamPolicy, ConfigError> {
    let pattern = env
        .string("STREAM_PLAYLIST_PATTERN")
        .unwrap_or_else(|| DEFAULT_PLAYLIST_PATTERN.to_string());
    let playlist_pattern = Regex::new(&pattern).map_err(|err| {
        ConfigError::Message(format!("STREAM_PLAYLIST_PATTERN is not a valid regex: {err}"))
    })?;

    Ok(StreamPolicy::new(
        env.list("STREAM_BLOCKED_HOSTS", DEFAULT_BLOCKED_HOST_SNIPPETS),
        env.list("STREAM_TRUSTED_HOSTS", DEFAULT_TRUSTED_HOSTS),
        env.list("STREAM_AUDIO_HINTS", DEFAULT_DIRECT_AUDIO_HINTS),
        playlist_pattern,
    ))
}

impl BackupConfig {
    fn from_env(env: &Env<'_>, user_agent: &str) -> Result<Self, ConfigError> {
        let source_url = env
            .string("BACKUP_SOURCE_URL")
            .or_else(|| env.string("RADIO_BACKUP_SOURCE_URL"))
            .unwrap_or_else(|| DEFAULT_BACKUP_SOURCE_URL.to_string());
        validate_http_url("BACKUP_SOURCE_URL", &source_url)?;

        let max_stations = env.usize("BACKUP_MAX_STATIONS", 500)?;
        if max_stations == 0 {
            return Err(ConfigError::Message(
                "BACKUP_MAX_STATIONS must be greater than zero.".into(),
            ));
        }

        Ok(Self {
            source_url,
            output_path: PathBuf::from(
                env.string("BACKUP_OUTPUT_PATH")
                    .unwrap_or_else(|| DEFAULT_BACKUP_OUTPUT_PATH.to_string()),
            ),
            max_stations,
            blocked_host_snippets: env.list("BACKUP_BLOCKED_HOSTS", DEFAULT_BLOCKED_HOST_SNIPPETS),
            user_agent: user_agent.to_string(),
        })
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Message(format!("{key} has an invalid URL {value}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Message(format!(
            "{key} must use http or https, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_public_catalog() {
        let config = load(&[]).unwrap();
        assert_eq!(config.sources.endpoints, vec![DEFAULT_ENDPOINT.to_string()]);
        assert_eq!(config.sources.timeout_ms, 8000);
        assert_eq!(config.sources.max_stations, 700);
        assert_eq!(config.sources.default_country, "Philippines");
        assert_eq!(config.backup.max_stations, 500);
        assert_eq!(
            config.stream_policy.blocked_host_snippets,
            vec!["youtube.com", "youtu.be", "facebook.com"]
        );
        assert!(config.stream_policy.playlist_pattern.is_match("http://a.example/x.PLS"));
    }

    #[test]
    fn lists_are_trimmed_lowercased_and_deduped() {
        let config = load(&[("STREAM_TRUSTED_HOSTS", " Example.COM, ,example.com,cdn.test ")]).unwrap();
        assert_eq!(
            config.stream_policy.trusted_hosts,
            vec!["example.com", "cdn.test"]
        );
    }

    #[test]
    fn endpoints_keep_their_order() {
        let config = load(&[(
            "STATION_ENDPOINTS",
            "https://b.example/stations, https://a.example/stations",
        )])
        .unwrap();
        assert_eq!(
            config.sources.endpoints,
            vec!["https://b.example/stations", "https://a.example/stations"]
        );
    }

    #[test]
    fn rejects_malformed_values() {
        let err = load(&[("STATION_FETCH_TIMEOUT_MS", "soon")]).unwrap_err();
        assert_eq!(err.to_string(), "STATION_FETCH_TIMEOUT_MS must be a valid u64");

        let err = load(&[("STATION_ENDPOINTS", "ftp://files.example/list")]).unwrap_err();
        assert!(err.to_string().contains("must use http or https"));

        let err = load(&[("STREAM_PLAYLIST_PATTERN", "(")]).unwrap_err();
        assert!(err.to_string().starts_with("STREAM_PLAYLIST_PATTERN"));

        assert!(load(&[("STATION_MAX_RESULTS", "0")]).is_err());
    }

    #[test]
    fn backup_source_accepts_legacy_key() {
        let config = load(&[("RADIO_BACKUP_SOURCE_URL", "https://dir.example/json")]).unwrap();
        assert_eq!(config.backup.source_url, "https://dir.example/json");
    }

    #[test]
    fn serializes_for_check_config() {
        let config = load(&[]).unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value["stream_policy"]["playlist_pattern"],
            DEFAULT_PLAYLIST_PATTERN
        );
    }
}
