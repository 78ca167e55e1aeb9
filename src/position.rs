use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::cell::{TableRow, read_table, to_opt_f64};
use crate::vessel_metadata::MetadataKey;

/// Column names of the daily position export
pub mod columns {
    pub const LON: &str = "lon";
    pub const LAT: &str = "lat";
    pub const TIMESTAMP: &str = "bs_ts";
    pub const MMSI: &str = "mmsi";
    pub const NAME: &str = "name";
    pub const CALLSIGN: &str = "callsign";
    pub const NAV_STATUS: &str = "nav_status";
    pub const SOG: &str = "sog";
    pub const COG: &str = "cog";
    pub const SHIPTYPE: &str = "shiptype";
    pub const LENGTH: &str = "length";
    pub const WIDTH: &str = "width";
    pub const DRAUGHT: &str = "draught";
    pub const DESTINATION: &str = "destination";
    pub const ETA: &str = "eta";
}

/// One row of a daily position export.
///
/// Only longitude and latitude are interpreted; everything else is carried
/// through unchanged, or as `None` when the cell is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionRecord {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub timestamp: Option<Value>,
    pub mmsi: Option<String>,
    pub name: Option<String>,
    pub callsign: Option<Value>,
    pub nav_status: Option<Value>,
    pub sog: Option<Value>,
    pub cog: Option<Value>,
    pub shiptype: Option<Value>,
    pub length: Option<Value>,
    pub width: Option<Value>,
    pub draught: Option<Value>,
    pub destination: Option<String>,
    pub eta: Option<Value>,
}

impl PositionRecord {
    pub fn from_row(row: &TableRow) -> Self {
        Self {
            longitude: to_opt_f64(row.raw(columns::LON)),
            latitude: to_opt_f64(row.raw(columns::LAT)),
            timestamp: row.value(columns::TIMESTAMP),
            mmsi: row.text(columns::MMSI),
            name: row.text(columns::NAME),
            callsign: row.value(columns::CALLSIGN),
            nav_status: row.value(columns::NAV_STATUS),
            sog: row.value(columns::SOG),
            cog: row.value(columns::COG),
            shiptype: row.value(columns::SHIPTYPE),
            length: row.value(columns::LENGTH),
            width: row.value(columns::WIDTH),
            draught: row.value(columns::DRAUGHT),
            destination: row.text(columns::DESTINATION),
            eta: row.value(columns::ETA),
        }
    }

    /// Both coordinates, if the row is convertible
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.longitude?, self.latitude?))
    }

    pub fn metadata_key(&self) -> MetadataKey {
        MetadataKey::new(self.mmsi.as_deref(), self.name.as_deref())
    }
}

/// Read every row of a daily position CSV
pub fn read_positions_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PositionRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_positions(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn read_positions<R: Read>(reader: R) -> Result<Vec<PositionRecord>> {
    let rows = read_table(reader)?;
    Ok(rows.iter().map(PositionRecord::from_row).collect())
}
