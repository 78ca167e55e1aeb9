//! Date-range union of the daily FeatureCollection files.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::daily_store::{DATE_FORMAT, DailyStore};
use crate::date_range::DateRange;
use crate::geojson::FeatureCollection;

/// Source of per-day collections. `Ok(None)` means there is no data for the day.
pub trait DayLoader {
    fn load_day(&self, date: NaiveDate) -> Result<Option<FeatureCollection>>;
}

impl DayLoader for DailyStore {
    fn load_day(&self, date: NaiveDate) -> Result<Option<FeatureCollection>> {
        DailyStore::load_day(self, date)
    }
}

impl DayLoader for BTreeMap<NaiveDate, FeatureCollection> {
    fn load_day(&self, date: NaiveDate) -> Result<Option<FeatureCollection>> {
        Ok(self.get(&date).cloned())
    }
}

/// Parse a `YYYY-MM-DD` query date
pub fn parse_query_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}

/// Concatenate the features of every day from `start` to `end`, inclusive.
///
/// Days are visited in ascending order and each day's features keep their
/// stored order. Missing days contribute nothing; `start > end` yields an
/// empty collection.
pub fn aggregate_range<L>(start: NaiveDate, end: NaiveDate, loader: &L) -> Result<FeatureCollection>
where
    L: DayLoader + ?Sized,
{
    let mut features = Vec::new();
    let mut days_found = 0usize;

    for date in DateRange::inclusive(start, end) {
        let day = loader
            .load_day(date)
            .with_context(|| format!("Failed to load vessel data for {}", date))?;

        if let Some(day) = day
            && !day.features.is_empty()
        {
            days_found += 1;
            features.extend(day.features);
        }
    }

    debug!(
        "Aggregated {} features from {} days between {} and {}",
        features.len(),
        days_found,
        start,
        end
    );

    Ok(FeatureCollection::new(features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{Feature, VesselProperties};
    use std::cell::RefCell;

    fn date(s: &str) -> NaiveDate {
        parse_query_date(s).unwrap()
    }

    fn day(tag: &str, n: usize) -> FeatureCollection {
        FeatureCollection::new(
            (0..n)
                .map(|i| {
                    Feature::point(
                        i as f64,
                        70.0,
                        VesselProperties {
                            name: Some(format!("{tag}-{i}")),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
        )
    }

    fn names(fc: &FeatureCollection) -> Vec<String> {
        fc.features
            .iter()
            .map(|f| f.property("name").as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_parse_query_date() {
        assert!(parse_query_date("2024-01-31").is_ok());
        assert!(parse_query_date("bad").is_err());
        assert!(parse_query_date("2024-02-30").is_err());
        assert!(parse_query_date("2024-01-01T00:00").is_err());
    }

    #[test]
    fn test_concatenates_in_date_order() {
        let mut days = BTreeMap::new();
        days.insert(date("2024-01-03"), day("c", 1));
        days.insert(date("2024-01-01"), day("a", 2));
        days.insert(date("2024-01-02"), day("b", 3));

        let fc = aggregate_range(date("2024-01-01"), date("2024-01-03"), &days).unwrap();
        assert_eq!(names(&fc), vec!["a-0", "a-1", "b-0", "b-1", "b-2", "c-0"]);
    }

    #[test]
    fn test_missing_days_contribute_nothing() {
        let mut days = BTreeMap::new();
        days.insert(date("2024-01-01"), day("a", 2));
        days.insert(date("2024-01-05"), day("e", 4));
        days.insert(date("2024-01-09"), day("outside", 7));

        let fc = aggregate_range(date("2024-01-01"), date("2024-01-06"), &days).unwrap();
        assert_eq!(fc.len(), 6);
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let mut days = BTreeMap::new();
        days.insert(date("2024-01-02"), day("b", 1));

        let fc = aggregate_range(date("2024-01-01"), date("2024-01-02"), &days).unwrap();
        assert_eq!(fc.len(), 1);
    }

    #[test]
    fn test_reversed_range_is_empty_and_loads_nothing() {
        struct CountingLoader(RefCell<usize>);
        impl DayLoader for CountingLoader {
            fn load_day(&self, _date: NaiveDate) -> Result<Option<FeatureCollection>> {
                *self.0.borrow_mut() += 1;
                Ok(Some(day("x", 1)))
            }
        }

        let loader = CountingLoader(RefCell::new(0));
        let fc = aggregate_range(date("2024-01-02"), date("2024-01-01"), &loader).unwrap();
        assert!(fc.is_empty());
        assert_eq!(fc.collection_type, "FeatureCollection");
        assert_eq!(*loader.0.borrow(), 0);
    }

    #[test]
    fn test_loader_error_propagates() {
        struct FailingLoader;
        impl DayLoader for FailingLoader {
            fn load_day(&self, _date: NaiveDate) -> Result<Option<FeatureCollection>> {
                anyhow::bail!("disk on fire")
            }
        }

        let err = aggregate_range(date("2024-01-01"), date("2024-01-01"), &FailingLoader)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("2024-01-01"));
    }

    #[test]
    fn test_one_load_per_day() {
        struct CountingLoader(RefCell<Vec<NaiveDate>>);
        impl DayLoader for CountingLoader {
            fn load_day(&self, date: NaiveDate) -> Result<Option<FeatureCollection>> {
                self.0.borrow_mut().push(date);
                Ok(None)
            }
        }

        let loader = CountingLoader(RefCell::new(Vec::new()));
        aggregate_range(date("2024-01-30"), date("2024-02-02"), &loader).unwrap();
        assert_eq!(loader.0.borrow().len(), 4);
    }
}
