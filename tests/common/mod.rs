//! Common fixtures for integration tests
//!
//! Each test gets its own scratch directory (dropped with the `TestData`
//! value) laid out like a deployment:
//!
//! ```text
//! raw_csv/          daily position exports
//! processed_geojson/ daily FeatureCollection files
//! vessel_list.csv   reference vessel list
//! dist/             built front end
//! ```

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use vesselmap::MetadataIndex;

pub const POSITION_HEADER: &str =
    "lon,lat,bs_ts,mmsi,name,callsign,nav_status,sog,cog,shiptype,length,width,draught,destination,eta";

pub const VESSEL_LIST: &str = "\
MMSI,Name,Country,Duration,Distance [Nm]
123,Polaris,NO,14,812.5
257000001,KV Svalbard,NO,31,4120.7
273000002,Akademik Fedorov,RU,22,
";

pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("raw_csv")).unwrap();
        fs::write(dir.path().join("vessel_list.csv"), VESSEL_LIST).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root().join("raw_csv")
    }

    pub fn geojson_dir(&self) -> PathBuf {
        self.root().join("processed_geojson")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root().join("dist")
    }

    pub fn vessel_list(&self) -> PathBuf {
        self.root().join("vessel_list.csv")
    }

    pub fn index(&self) -> MetadataIndex {
        MetadataIndex::load_csv(self.vessel_list()).expect("Failed to load vessel list")
    }

    /// Write a daily CSV from data rows (header added)
    pub fn write_day_csv(&self, file_name: &str, rows: &[&str]) -> PathBuf {
        let mut contents = String::from(POSITION_HEADER);
        contents.push('\n');
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        let path = self.raw_dir().join(file_name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_static(&self, relative: &str, contents: &str) {
        let path = self.static_dir().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// A position row with everything but the identity and position left blank
pub fn position_row(lon: &str, lat: &str, mmsi: &str, name: &str) -> String {
    format!("{lon},{lat},2024-01-01 12:00:00,{mmsi},{name},,,,,,,,,,")
}
