pub mod backup;
pub mod config;
pub mod logging;
pub mod station_sources;
pub mod stations;
pub mod stream_candidates;
pub mod stream_policy;

pub use station_sources::{FetchError, StationSourceClient};
pub use stations::{SourcedStations, Station};
pub use stream_candidates::build_stream_candidates;
pub use stream_policy::{classify, PlaybackError, StreamPolicy};
