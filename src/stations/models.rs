use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub frequency: String,
    pub city: String,
    pub country: String,
    pub genre: String,
    #[serde(rename = "streamUrl")]
    pub stream_url: String,
    pub language: String,
    pub codec: String,
    pub bitrate: u32,
    pub votes: u32,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// A ranked batch together with the endpoint that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct SourcedStations {
    pub stations: Vec<Station>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationMenuItem {
    pub name: String,
    pub count: usize,
}
