use anyhow::Context;
use radio_catalog_rs::{
    backup::run_backup,
    build_stream_candidates,
    config::Config,
    logging::init_logger,
    stations::build_location_menu,
    stream_policy::playback_error,
    StationSourceClient,
};
use serde::Serialize;
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = init_logger("radio-catalog-rs");

    let config = Config::load().context("failed to load configuration")?;
    let command = env::args().nth(1);

    match command.as_deref() {
        Some("check-config") => {
            logger.info(
                "config.check_passed",
                serde_json::to_value(&config).unwrap_or_else(|_| json!({ "status": "ok" })),
            );
        }
        Some("candidates") => {
            let url = url_argument("candidates")?;
            print_json(&build_stream_candidates(&url))?;
        }
        Some("classify") => {
            let url = url_argument("classify")?;
            let error = playback_error(&url, &config.stream_policy);
            print_json(&json!({
                "url": url,
                "playable": error.is_none(),
                "error": error,
            }))?;
        }
        Some("backup") => {
            let summary = run_backup(&config.backup)
                .await
                .context("backup failed")?;
            logger.info(
                "backup.completed",
                json!({
                    "total": summary.total,
                    "path": summary.output_path.display().to_string(),
                }),
            );
        }
        None | Some("fetch") => {
            let default_country = config.sources.default_country.clone();
            let client = StationSourceClient::new(config.sources, config.stream_policy)
                .context("failed to build http client")?;
            let batch = match client.fetch().await {
                Ok(batch) => batch,
                Err(error) => {
                    logger.error("sources.exhausted", json!({ "error": error.to_string() }));
                    return Err(error).context("no station source succeeded");
                }
            };
            let locations = build_location_menu(&batch.stations, &default_country);
            print_json(&json!({
                "source": batch.source,
                "total": batch.stations.len(),
                "stations": batch.stations,
                "locations": locations,
            }))?;
        }
        Some(other) => {
            return Err(anyhow::anyhow!(
                "unknown command {other}; expected fetch, candidates, classify, backup or check-config"
            ));
        }
    }

    Ok(())
}

fn url_argument(command: &str) -> anyhow::Result<String> {
    env::args()
        .nth(2)
        .ok_or_else(|| anyhow::anyhow!("usage: radio-catalog-rs {command} <url>"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
