use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use reqwest::{header, Client};
use serde_json::{json, Value};

use crate::{
    config::{BackupConfig, DEFAULT_COUNTRY},
    logging::logger,
    stations::{normalize_directory_station, rank_and_dedupe, BatchOptions, Station},
};

pub struct BackupSummary {
    pub total: usize,
    pub output_path: PathBuf,
}

/// Snapshots one public directory into a JSON file used as an offline
/// fallback list.
pub async fn run_backup(config: &BackupConfig) -> anyhow::Result<BackupSummary> {
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .build()?;

    let stations = fetch_directory_stations(&client, config).await?;
    write_snapshot(&config.output_path, &stations).await?;

    logger().info(
        "backup.saved",
        json!({
            "total": stations.len(),
            "path": config.output_path.display().to_string(),
        }),
    );

    Ok(BackupSummary {
        total: stations.len(),
        output_path: config.output_path.clone(),
    })
}

async fn fetch_directory_stations(
    client: &Client,
    config: &BackupConfig,
) -> anyhow::Result<Vec<Station>> {
    let response = client
        .get(&config.source_url)
        .header(header::ACCEPT, "application/json")
        .send()
        .await
        .with_context(|| format!("failed to reach {}", config.source_url))?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to fetch stations ({}) from {}",
            response.status().as_u16(),
            config.source_url
        ));
    }

    let body: Value = response
        .json()
        .await
        .with_context(|| format!("invalid JSON from {}", config.source_url))?;
    let Value::Array(records) = body else {
        return Err(anyhow!(
            "Unexpected response format from {}",
            config.source_url
        ));
    };

    let options = BatchOptions {
        max_stations: config.max_stations,
        default_country: DEFAULT_COUNTRY,
        blocked_host_snippets: &config.blocked_host_snippets,
        playlist_pattern: None,
    };
    let stations = rank_and_dedupe(
        records
            .iter()
            .map(|raw| normalize_directory_station(raw, DEFAULT_COUNTRY)),
        &options,
    );
    if stations.is_empty() {
        return Err(anyhow!("No usable stations returned from API."));
    }
    Ok(stations)
}

async fn write_snapshot(path: &Path, stations: &[Station]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut document = serde_json::to_string_pretty(stations)?;
    document.push('\n');
    tokio::fs::write(path, document)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}
