mod batch;
mod locations;
mod models;
mod normalize;
mod sanitize;

pub use batch::{normalize_and_filter_batch, rank_and_dedupe, BatchOptions};
pub use locations::{build_location_menu, location_category};
pub use models::{LocationMenuItem, SourcedStations, Station};
pub use normalize::{normalize_directory_station, normalize_station};
pub use sanitize::{clean_location, derive_frequency};
