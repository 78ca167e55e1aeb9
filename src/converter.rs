//! Daily position rows to GeoJSON features, joined with the vessel list.

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use crate::geojson::{Feature, FeatureCollection, VesselProperties};
use crate::position::{PositionRecord, read_positions_csv};
use crate::vessel_metadata::MetadataIndex;

/// Convert one day's rows into a FeatureCollection.
///
/// Rows without both coordinates are dropped. Output order follows input order.
pub fn convert_day(rows: &[PositionRecord], index: &MetadataIndex) -> FeatureCollection {
    let features: Vec<Feature> = rows
        .iter()
        .filter_map(|record| feature_from_record(record, index))
        .collect();

    let skipped = rows.len() - features.len();
    if skipped > 0 {
        debug!("Skipped {} rows without a position", skipped);
    }

    FeatureCollection::new(features)
}

/// Build the Point feature for a single row, or `None` if it has no position
pub fn feature_from_record(record: &PositionRecord, index: &MetadataIndex) -> Option<Feature> {
    let (longitude, latitude) = record.coordinates()?;
    let key = record.metadata_key();
    let metadata = index.lookup_key(&key);

    let properties = VesselProperties {
        timestamp: record.timestamp.clone(),
        mmsi: record.mmsi.as_ref().map(|_| key.mmsi.clone()),
        name: record.name.clone(),
        callsign: record.callsign.clone(),
        nav_status: record.nav_status.clone(),
        sog: record.sog.clone(),
        cog: record.cog.clone(),
        shiptype: record.shiptype.clone(),
        length: record.length.clone(),
        width: record.width.clone(),
        draught: record.draught.clone(),
        destination: record.destination.clone(),
        eta: record.eta.clone(),
        ..Default::default()
    }
    .with_metadata(metadata);

    Some(Feature::point(longitude, latitude, properties))
}

/// Read a daily position CSV and convert it
pub fn convert_csv<P: AsRef<Path>>(path: P, index: &MetadataIndex) -> Result<FeatureCollection> {
    let rows = read_positions_csv(path)?;
    Ok(convert_day(&rows, index))
}
