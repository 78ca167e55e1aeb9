use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::cell::{TableRow, key_part, read_table, to_opt_f64};

pub const COL_MMSI: &str = "MMSI";
pub const COL_NAME: &str = "Name";
pub const COL_COUNTRY: &str = "Country";
pub const COL_DURATION: &str = "Duration";
pub const COL_DISTANCE: &str = "Distance [Nm]";
/// Accepted when the vessel list drops the unit suffix
pub const COL_DISTANCE_SHORT: &str = "Distance";

/// Static attributes of a vessel from the reference vessel list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VesselMetadata {
    pub country: Option<String>,
    pub duration: Option<f64>,
    /// Distance in nautical miles
    pub distance: Option<f64>,
}

impl VesselMetadata {
    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.duration.is_none() && self.distance.is_none()
    }
}

static EMPTY_METADATA: VesselMetadata = VesselMetadata {
    country: None,
    duration: None,
    distance: None,
};

/// Join key between position rows and the vessel list.
///
/// Both parts are trimmed; a missing cell becomes [`crate::cell::MISSING_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataKey {
    pub mmsi: String,
    pub name: String,
}

impl MetadataKey {
    pub fn new(mmsi: Option<&str>, name: Option<&str>) -> Self {
        Self {
            mmsi: key_part(mmsi),
            name: key_part(name),
        }
    }
}

/// In-memory vessel list keyed by (MMSI, name). Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    entries: HashMap<MetadataKey, VesselMetadata>,
}

impl MetadataIndex {
    /// Build the index from reference rows. Later rows win on duplicate keys.
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = TableRow>,
    {
        let mut entries = HashMap::new();
        for row in rows {
            let key = MetadataKey::new(row.raw(COL_MMSI), row.raw(COL_NAME));
            let distance = row.raw(COL_DISTANCE).or_else(|| row.raw(COL_DISTANCE_SHORT));

            let metadata = VesselMetadata {
                country: row.text(COL_COUNTRY),
                duration: to_opt_f64(row.raw(COL_DURATION)),
                distance: to_opt_f64(distance),
            };
            entries.insert(key, metadata);
        }
        Self { entries }
    }

    /// Read the vessel list from a CSV export
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open vessel list: {}", path.display()))?;
        let index = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read vessel list: {}", path.display()))?;

        info!("Loaded {} vessels from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let rows = read_table(reader)?;
        debug!("Read {} vessel list rows", rows.len());
        Ok(Self::build(rows))
    }

    /// Look up metadata by raw MMSI and name cells. A miss yields an empty record.
    pub fn lookup(&self, mmsi: Option<&str>, name: Option<&str>) -> &VesselMetadata {
        self.lookup_key(&MetadataKey::new(mmsi, name))
    }

    pub fn lookup_key(&self, key: &MetadataKey) -> &VesselMetadata {
        self.entries.get(key).unwrap_or(&EMPTY_METADATA)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
