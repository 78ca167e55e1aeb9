//! One GeoJSON FeatureCollection file per calendar day.
//!
//! Files are named `<YYYY-MM-DD>.geojson` and are written to a hidden temp
//! file first, then renamed into place so readers never see a partial file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::geojson::FeatureCollection;

pub const FILE_EXTENSION: &str = "geojson";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct DailyStore {
    dir: PathBuf,
}

impl DailyStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name_for(date: NaiveDate) -> String {
        format!("{}.{}", date.format(DATE_FORMAT), FILE_EXTENSION)
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(Self::file_name_for(date))
    }

    /// Write (or overwrite) the file for `date`
    pub fn write_day(&self, date: NaiveDate, collection: &FeatureCollection) -> Result<PathBuf> {
        self.write_file(&Self::file_name_for(date), collection)
    }

    /// Write a collection under an explicit file name inside the store directory
    pub fn write_file(&self, file_name: &str, collection: &FeatureCollection) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let final_path = self.dir.join(file_name);
        let temp_path = self.dir.join(format!(".{}.tmp", file_name));

        {
            let file = File::create(&temp_path)
                .with_context(|| format!("Failed to create file: {}", temp_path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, collection)
                .with_context(|| format!("Failed to write {}", temp_path.display()))?;
            writer
                .flush()
                .with_context(|| format!("Failed to flush {}", temp_path.display()))?;
        }

        // Rename temp file to final file (atomic on same filesystem)
        fs::rename(&temp_path, &final_path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;

        debug!(
            "Wrote {} features to {}",
            collection.len(),
            final_path.display()
        );
        Ok(final_path)
    }

    /// Read the file for `date`. A missing file is `Ok(None)`.
    pub fn load_day(&self, date: NaiveDate) -> Result<Option<FeatureCollection>> {
        let path = self.path_for(date);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", path.display()));
            }
        };

        let collection: FeatureCollection = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(collection))
    }

    /// Dates that currently have a file, ascending
    pub fn days(&self) -> Result<Vec<NaiveDate>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to list {}", self.dir.display()));
            }
        };

        let mut days = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && let Ok(date) = NaiveDate::parse_from_str(stem, DATE_FORMAT)
            {
                days.push(date);
            }
        }
        days.sort();
        Ok(days)
    }
}
