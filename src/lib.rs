//! vesselmap - daily vessel-position exports as GeoJSON
//!
//! Converts per-day AIS position CSVs into one GeoJSON FeatureCollection file
//! per day, enriched with attributes from a reference vessel list, and serves
//! date-ranged unions of those files over HTTP next to a browser front end.

pub mod actions;
pub mod aggregate;
pub mod cell;
pub mod commands;
pub mod converter;
pub mod daily_store;
pub mod date_range;
pub mod geojson;
pub mod log_format;
pub mod metrics;
pub mod position;
pub mod vessel_metadata;
pub mod web;

pub use aggregate::{DayLoader, aggregate_range};
pub use converter::convert_day;
pub use daily_store::DailyStore;
pub use geojson::{Feature, FeatureCollection};
pub use vessel_metadata::{MetadataIndex, VesselMetadata};
