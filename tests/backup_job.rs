mod common;

use axum::{http::StatusCode, routing::get, Json, Router};
use pretty_assertions::assert_eq;
use radio_catalog_rs::{backup::run_backup, config::BackupConfig, Station};
use serde_json::json;

use common::spawn_upstream;

fn directory_router() -> Router {
    Router::new()
        .route(
            "/json/stations",
            get(|| async {
                Json(json!([
                    {
                        "stationuuid": "uuid-1",
                        "name": "DZRH 666 AM",
                        "url": "http://cast.example/dzrh",
                        "url_resolved": "https://cast.example/dzrh.mp3",
                        "state": "Metro Manila",
                        "country": "The Philippines",
                        "tags": "news,talk",
                        "codec": "mp3",
                        "bitrate": 128,
                        "votes": 40
                    },
                    {
                        "stationuuid": "uuid-1",
                        "name": "DZRH mirror",
                        "url": "https://cast.example/mirror.mp3",
                        "votes": 99
                    },
                    {
                        "changeuuid": "change-2",
                        "name": "Playlist FM",
                        "url": "https://cast.example/listen.pls",
                        "votes": 5
                    },
                    {
                        "stationuuid": "uuid-3",
                        "name": "Clip channel",
                        "url": "https://youtu.be/clip",
                        "votes": 500
                    },
                    {
                        "stationuuid": "uuid-4",
                        "name": "No stream"
                    }
                ]))
            }),
        )
        .route("/down", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/object", get(|| async { Json(json!({ "error": "nope" })) }))
}

fn backup_config(source_url: String, output_path: std::path::PathBuf) -> BackupConfig {
    BackupConfig {
        source_url,
        output_path,
        max_stations: 500,
        blocked_host_snippets: vec!["youtube.com".into(), "youtu.be".into(), "facebook.com".into()],
        user_agent: "radio-catalog-rs tests".into(),
    }
}

#[tokio::test]
async fn writes_a_ranked_snapshot() {
    let base = spawn_upstream(directory_router()).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested").join("stations.json");
    let config = backup_config(format!("{base}/json/stations"), output.clone());

    let summary = run_backup(&config).await.unwrap();
    assert_eq!(summary.total, 2);

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.ends_with("]\n"));
    let stations: Vec<Station> = serde_json::from_str(&written).unwrap();
    let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["uuid-1", "change-2"]);

    let dzrh = &stations[0];
    assert_eq!(dzrh.stream_url, "https://cast.example/dzrh.mp3");
    assert_eq!(dzrh.frequency, "666 AM");
    assert_eq!(dzrh.city, "Metro Manila");
    assert_eq!(dzrh.genre, "news,talk");
    assert_eq!(dzrh.codec, "MP3");
    assert!(dzrh.is_active);
}

#[tokio::test]
async fn truncates_to_the_backup_limit() {
    let base = spawn_upstream(directory_router()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = backup_config(format!("{base}/json/stations"), dir.path().join("out.json"));
    config.max_stations = 1;

    let summary = run_backup(&config).await.unwrap();
    assert_eq!(summary.total, 1);
}

#[tokio::test]
async fn reports_upstream_failures() {
    let base = spawn_upstream(directory_router()).await;
    let dir = tempfile::tempdir().unwrap();

    let config = backup_config(format!("{base}/down"), dir.path().join("out.json"));
    let err = run_backup(&config).await.err().unwrap();
    assert_eq!(
        err.to_string(),
        format!("Failed to fetch stations (500) from {base}/down")
    );

    let config = backup_config(format!("{base}/object"), dir.path().join("out.json"));
    let err = run_backup(&config).await.err().unwrap();
    assert_eq!(
        err.to_string(),
        format!("Unexpected response format from {base}/object")
    );
    assert!(!dir.path().join("out.json").exists());
}
