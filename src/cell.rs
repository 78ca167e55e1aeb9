//! Tabular cell handling shared by the vessel list and the daily position exports.
//!
//! Both inputs are loose spreadsheets exported to CSV. A cell is either missing
//! (blank or one of the usual NA spellings) or carries raw text which is passed
//! through with light numeric inference.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::io::Read;

/// Literal a missing key cell stringifies to. Rows with a missing MMSI or name
/// share this value and can therefore collide in the metadata index.
pub const MISSING_KEY: &str = "None";

/// Cell spellings treated as "no value"
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true if the raw cell text means "no value"
pub fn is_na(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

/// Filter out NA cells
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|v| !is_na(v))
}

/// Stringify a key cell: trimmed text, or the [`MISSING_KEY`] sentinel
pub fn key_part(raw: Option<&str>) -> String {
    match present(raw) {
        Some(v) => v.trim().to_string(),
        None => MISSING_KEY.to_string(),
    }
}

/// Infer a JSON value from a present cell.
///
/// Integer text becomes a JSON integer, other finite numeric text a JSON float,
/// anything else is kept verbatim as a string.
pub fn infer_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = raw.parse::<f64>()
        && let Some(n) = Number::from_f64(f)
    {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

/// Parse a cell as a finite float, tolerating surrounding whitespace
pub fn to_opt_f64(raw: Option<&str>) -> Option<f64> {
    present(raw)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}

/// One row of a CSV export, keyed by header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow(HashMap<String, String>);

impl TableRow {
    /// Raw cell text, including NA spellings. `None` only if the column is absent.
    pub fn raw(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Cell text if the column exists and the cell is not NA
    pub fn get(&self, column: &str) -> Option<&str> {
        present(self.raw(column))
    }

    /// Cell as an inferred JSON value, `None` if absent
    pub fn value(&self, column: &str) -> Option<Value> {
        self.get(column).map(infer_value)
    }

    /// Cell as owned text, `None` if absent
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).map(str::to_string)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TableRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
/// Read every data row of a headed CSV.
///
/// Short rows are accepted: their missing trailing cells are absent from the
/// row. Cells beyond the header are ignored.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<TableRow>> {
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers().context("Invalid header")?.clone();

    let mut rows = Vec::new();
    for (line, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("Invalid row {}", line + 1))?;
        rows.push(headers.iter().zip(record.iter()).collect());
    }
    Ok(rows)
}
