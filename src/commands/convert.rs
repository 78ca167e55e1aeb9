use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

use crate::converter::convert_csv;
use crate::daily_store::{DailyStore, FILE_EXTENSION};
use crate::vessel_metadata::MetadataIndex;

/// A CSV that was converted and written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub features: usize,
}

/// A CSV that could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub source: PathBuf,
    pub error: String,
}

/// Per-file outcome of a batch conversion, in file name order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<ConvertedFile>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn total_features(&self) -> usize {
        self.converted.iter().map(|c| c.features).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Handle the convert command
pub async fn handle_convert(
    input_dir: PathBuf,
    output_dir: PathBuf,
    vessel_list: PathBuf,
    parallel: bool,
) -> Result<()> {
    let start = Instant::now();

    let report = tokio::task::spawn_blocking(move || -> Result<BatchReport> {
        let index = MetadataIndex::load_csv(&vessel_list)?;
        convert_directory(&input_dir, &output_dir, &index, parallel)
    })
    .await??;

    info!(
        "Conversion finished in {:.1}s: {} files converted ({} features), {} failed",
        start.elapsed().as_secs_f64(),
        report.converted.len(),
        report.total_features(),
        report.failed.len()
    );
    for failed in &report.failed {
        error!("  {}: {}", failed.source.display(), failed.error);
    }

    Ok(())
}

/// `*.csv` files directly inside `dir`, sorted by file name
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".csv"))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert every CSV in `input_dir` to a GeoJSON file of the same base name in
/// `output_dir`. A file that fails is logged and recorded; the rest still run.
pub fn convert_directory(
    input_dir: &Path,
    output_dir: &Path,
    index: &MetadataIndex,
    parallel: bool,
) -> Result<BatchReport> {
    let store = DailyStore::new(output_dir);
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let files = list_csv_files(input_dir)?;
    info!("Looking in: {}", input_dir.display());
    info!(
        "Files: {:?}",
        files
            .iter()
            .filter_map(|f| f.file_name().and_then(|n| n.to_str()))
            .collect::<Vec<_>>()
    );
    metrics::gauge!("convert.files.pending").set(files.len() as f64);

    let outcomes: Vec<(PathBuf, Result<ConvertedFile>)> = if parallel {
        files
            .par_iter()
            .map(|path| (path.clone(), convert_file(path, &store, index)))
            .collect()
    } else {
        files
            .iter()
            .map(|path| (path.clone(), convert_file(path, &store, index)))
            .collect()
    };

    let mut report = BatchReport::default();
    for (source, outcome) in outcomes {
        match outcome {
            Ok(converted) => {
                metrics::counter!("convert.files.converted").increment(1);
                report.converted.push(converted);
            }
            Err(e) => {
                metrics::counter!("convert.files.failed").increment(1);
                error!("Failed to process {}: {:#}", display_name(&source), e);
                report.failed.push(FailedFile {
                    source,
                    error: format!("{:#}", e),
                });
            }
        }
    }
    metrics::gauge!("convert.files.pending").set(0.0);

    Ok(report)
}

fn convert_file(csv_path: &Path, store: &DailyStore, index: &MetadataIndex) -> Result<ConvertedFile> {
    let csv_name = display_name(csv_path);
    info!("Processing: {}", csv_name);

    let collection = convert_csv(csv_path, index)?;
    let output_name = output_file_name(csv_path)?;
    let output = store.write_file(&output_name, &collection)?;

    info!(
        "Converted {} to {} ({} features)",
        csv_name,
        output_name,
        collection.len()
    );
    metrics::counter!("convert.features.written").increment(collection.len() as u64);

    Ok(ConvertedFile {
        source: csv_path.to_path_buf(),
        output,
        features: collection.len(),
    })
}

/// `2024-01-01.csv` -> `2024-01-01.geojson`
fn output_file_name(csv_path: &Path) -> Result<String> {
    let stem = csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid file name: {}", csv_path.display()))?;
    Ok(format!("{}.{}", stem, FILE_EXTENSION))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
