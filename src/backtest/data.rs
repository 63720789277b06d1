use crate::models::{PriceRecord, PriceSeries};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CloseRow {
    date: NaiveDate,
    close: f64,
}

/// Load a `date,close` CSV into a dated close series.
pub fn load_close_csv(path: &Path) -> anyhow::Result<Vec<(NaiveDate, f64)>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening price CSV {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: CloseRow =
            result.with_context(|| format!("parsing price CSV {}", path.display()))?;
        rows.push((row.date, row.close));
    }
    Ok(rows)
}

/// Inner-join two dated close series on date, sorted chronologically.
/// Sessions present on only one side are dropped.
pub fn align_series(
    pair: [String; 2],
    first: Vec<(NaiveDate, f64)>,
    second: Vec<(NaiveDate, f64)>,
) -> PriceSeries {
    let second_by_date: HashMap<NaiveDate, f64> = second.into_iter().collect();

    let mut records: Vec<PriceRecord> = first
        .into_iter()
        .filter_map(|(date, first_close)| {
            second_by_date.get(&date).map(|second_close| PriceRecord {
                date,
                closes: [first_close, *second_close],
            })
        })
        .collect();
    records.sort_by_key(|r| r.date);

    PriceSeries { pair, records }
}

/// Load both legs from CSV and align them on common dates.
pub fn load_aligned_csv(
    pair: [String; 2],
    first_path: &Path,
    second_path: &Path,
) -> anyhow::Result<PriceSeries> {
    let first = load_close_csv(first_path)?;
    let second = load_close_csv(second_path)?;
    let series = align_series(pair, first, second);
    tracing::info!(
        sessions = series.records.len(),
        "loaded aligned price series"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_pair;
    use std::io::Write;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_align_drops_unmatched_dates_and_sorts() {
        let first = vec![(date(3), 103.0), (date(1), 101.0), (date(2), 102.0)];
        let second = vec![(date(1), 51.0), (date(3), 53.0), (date(9), 59.0)];

        let series = align_series(default_pair(), first, second);

        assert_eq!(series.records.len(), 2);
        assert_eq!(series.records[0].date, date(1));
        assert_eq!(series.records[0].closes, [101.0, 51.0]);
        assert_eq!(series.records[1].date, date(3));
        assert_eq!(series.records[1].closes, [103.0, 53.0]);
    }

    #[test]
    fn test_load_close_csv_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,close").unwrap();
        writeln!(file, "2024-01-02,101.25").unwrap();
        writeln!(file, "2024-01-03,102.50").unwrap();
        file.flush().unwrap();

        let rows = load_close_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (date(2), 101.25));
        assert_eq!(rows[1], (date(3), 102.50));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_close_csv(Path::new("/does/not/exist.csv"));
        assert!(result.is_err());
    }
}
