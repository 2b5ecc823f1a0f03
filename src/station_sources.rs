use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::time::timeout;

use crate::{
    config::SourcesConfig,
    logging::logger,
    stations::{normalize_and_filter_batch, BatchOptions, SourcedStations, Station},
    stream_policy::StreamPolicy,
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed ({status}) at {endpoint}")]
    UpstreamHttp { endpoint: String, status: StatusCode },
    #[error("Unexpected response format at {endpoint}")]
    UpstreamFormat { endpoint: String },
    #[error("Timeout after {timeout_ms}ms at {endpoint}")]
    UpstreamTimeout { endpoint: String, timeout_ms: u64 },
    #[error("Request to {endpoint} failed: {source}")]
    UpstreamRequest {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0}")]
    NoUsableStations(String),
}

const NO_USABLE_STATIONS: &str = "Station sources returned no usable stations.";

/// Fetches station lists from the configured endpoints, one at a time,
/// until one of them yields a usable batch.
#[derive(Clone)]
pub struct StationSourceClient {
    config: SourcesConfig,
    policy: StreamPolicy,
    client: Client,
}

impl StationSourceClient {
    pub fn new(config: SourcesConfig, policy: StreamPolicy) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            config,
            policy,
            client,
        })
    }

    /// Runs [`Self::fetch_from_sources`] over the configured endpoints.
    pub async fn fetch(&self) -> Result<SourcedStations, FetchError> {
        self.fetch_from_sources(
            &self.config.endpoints,
            Duration::from_millis(self.config.timeout_ms),
        )
        .await
    }

    pub async fn fetch_from_sources(
        &self,
        endpoints: &[String],
        timeout_duration: Duration,
    ) -> Result<SourcedStations, FetchError> {
        let mut last_error = None;
        for endpoint in endpoints {
            match self.fetch_endpoint(endpoint, timeout_duration).await {
                Ok(stations) => {
                    logger().info(
                        "sources.selected",
                        json!({
                            "endpoint": endpoint,
                            "total": stations.len(),
                        }),
                    );
                    return Ok(SourcedStations {
                        stations,
                        source: endpoint.clone(),
                    });
                }
                Err(error) => {
                    logger().warn(
                        "sources.endpoint_failed",
                        json!({
                            "endpoint": endpoint,
                            "error": error.to_string(),
                        }),
                    );
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| FetchError::NoUsableStations(NO_USABLE_STATIONS.into())))
    }

    async fn fetch_endpoint(
        &self,
        endpoint: &str,
        timeout_duration: Duration,
    ) -> Result<Vec<Station>, FetchError> {
        // Dropping the request future on timeout also drops its connection.
        let body = timeout(timeout_duration, self.fetch_json(endpoint))
            .await
            .map_err(|_| FetchError::UpstreamTimeout {
                endpoint: endpoint.to_string(),
                timeout_ms: timeout_duration.as_millis() as u64,
            })??;

        let Value::Array(records) = body else {
            return Err(FetchError::UpstreamFormat {
                endpoint: endpoint.to_string(),
            });
        };

        let options = BatchOptions {
            max_stations: self.config.max_stations,
            default_country: &self.config.default_country,
            blocked_host_snippets: &self.policy.blocked_host_snippets,
            playlist_pattern: Some(&self.policy.playlist_pattern),
        };
        let stations = normalize_and_filter_batch(&records, &options);
        logger().debug(
            "sources.batch_filtered",
            json!({
                "endpoint": endpoint,
                "received": records.len(),
                "kept": stations.len(),
            }),
        );
        if stations.is_empty() {
            return Err(FetchError::NoUsableStations(format!(
                "No usable stations at {endpoint}"
            )));
        }
        Ok(stations)
    }

    async fn fetch_json(&self, endpoint: &str) -> Result<Value, FetchError> {
        let request_error = |source| FetchError::UpstreamRequest {
            endpoint: endpoint.to_string(),
            source,
        };
        let response = self
            .client
            .get(endpoint)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_error)?;
        if !response.status().is_success() {
            return Err(FetchError::UpstreamHttp {
                endpoint: endpoint.to_string(),
                status: response.status(),
            });
        }
        response.json::<Value>().await.map_err(request_error)
    }
}
