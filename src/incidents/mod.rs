mod aggregate;

pub use aggregate::{
    count_by, country_aggregate, group_aggregate, CountMap, GroupCount, TOP_GROUPS, UNKNOWN_GROUP,
};

use crate::error::LoadError;
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// CSV columns the loader needs; any other column is ignored.
const REQUIRED_COLUMNS: [&str; 3] = ["iyear", "country_txt", "gname"];

/// One row of the incident dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentRecord {
    pub year: i32,
    pub country_name: String,
    pub group_name: String,
}

impl IncidentRecord {
    pub fn new(year: i32, country_name: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            year,
            country_name: country_name.into(),
            group_name: group_name.into(),
        }
    }
}

/// Row shape as it appears in the CSV, before year coercion
#[derive(Debug, Deserialize)]
struct RawRow {
    iyear: String,
    country_txt: String,
    gname: String,
}

/// Coerce an integer-like string to a year.
///
/// Accepts surrounding whitespace and integral floats ("2019.0").
pub fn coerce_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(year) = s.parse::<i32>() {
        return Some(year);
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .filter(|v| *v >= i32::MIN as f64 && *v <= i32::MAX as f64)
        .map(|v| v as i32)
}

/// Records whose year equals `year`, in dataset order
pub fn filter_year(records: &[IncidentRecord], year: i32) -> Vec<&IncidentRecord> {
    records.iter().filter(|r| r.year == year).collect()
}

/// The loaded incident table. Read-only once built.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    records: Vec<IncidentRecord>,
    /// Rows dropped because `iyear` was not integer-like
    skipped: usize,
}

impl Dataset {
    pub fn from_records(records: Vec<IncidentRecord>) -> Self {
        Self {
            records,
            skipped: 0,
        }
    }

    /// Load the dataset from a CSV file on disk
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let start = Instant::now();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(BufReader::new(file), path)?;

        info!(
            path = %path.display(),
            records = dataset.len(),
            skipped = dataset.skipped,
            years = dataset.years().len(),
            "dataset loaded in {:.1}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(dataset)
    }

    /// Parse CSV from any reader. `origin` is only used in error messages.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, LoadError> {
        let csv_err = |source: csv::Error| LoadError::Csv {
            path: origin.to_path_buf(),
            source,
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        // Headers are decoded lossily too, the dataset is not guaranteed UTF-8
        let headers = StringRecord::from_byte_record_lossy(rdr.byte_headers().map_err(csv_err)?.clone());
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(LoadError::MissingColumn {
                    path: origin.to_path_buf(),
                    column,
                });
            }
        }

        let mut records = Vec::new();
        let mut skipped = 0;
        let mut raw = ByteRecord::new();

        while rdr.read_byte_record(&mut raw).map_err(csv_err)? {
            // Ragged rows are skipped like rows with an unusable year
            let parsed: Result<RawRow, _> =
                StringRecord::from_byte_record_lossy(raw.clone()).deserialize(Some(&headers));
            let Ok(row) = parsed else {
                skipped += 1;
                continue;
            };

            match coerce_year(&row.iyear) {
                Some(year) => records.push(IncidentRecord {
                    year,
                    country_name: row.country_txt,
                    group_name: row.gname,
                }),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(
                path = %origin.display(),
                skipped,
                "rows with missing fields or a non-numeric iyear were skipped"
            );
        }

        Ok(Self { records, skipped })
    }

    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Distinct years present, ascending
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Smallest and largest year present
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    pub fn filter_year(&self, year: i32) -> Vec<&IncidentRecord> {
        filter_year(&self.records, year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> Result<Dataset, LoadError> {
        Dataset::from_reader(csv.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn test_coerce_year() {
        assert_eq!(coerce_year("2019"), Some(2019));
        assert_eq!(coerce_year(" 2019 "), Some(2019));
        assert_eq!(coerce_year("2019.0"), Some(2019));
        assert_eq!(coerce_year("2019.5"), None);
        assert_eq!(coerce_year(""), None);
        assert_eq!(coerce_year("n/a"), None);
    }

    #[test]
    fn test_load_ignores_extra_columns() {
        let ds = parse(
            "eventid,iyear,imonth,country_txt,gname\n\
             1,2019,1,Iraq,Islamic State of Iraq and the Levant (ISIL)\n\
             2,2019,2,Syria,Unknown\n\
             3,2020,3,Iraq,\"Group, With Comma\"\n",
        )
        .unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records()[0].country_name, "Iraq");
        assert_eq!(ds.records()[1].group_name, "Unknown");
        assert_eq!(ds.records()[2].group_name, "Group, With Comma");
        assert_eq!(ds.years(), vec![2019, 2020]);
        assert_eq!(ds.year_range(), Some((2019, 2020)));
    }

    #[test]
    fn test_load_skips_bad_years() {
        let ds = parse("iyear,country_txt,gname\n2019,Iraq,A\nabc,Iraq,B\n,Syria,C\n").unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped(), 2);
    }

    #[test]
    fn test_load_skips_short_rows() {
        let ds = parse("iyear,country_txt,gname\n2019,Iraq,A\n2019,Syria\n2019,Iraq,B\n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped(), 1);
        assert_eq!(ds.records()[1].group_name, "B");
    }

    #[test]
    fn test_load_missing_column() {
        let err = parse("iyear,country_txt\n2019,Iraq\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "gname", .. }));
    }

    #[test]
    fn test_load_lossy_utf8() {
        let bytes: &[u8] = b"iyear,country_txt,gname\n2019,C\xf4te d'Ivoire,A\n";
        let ds = Dataset::from_reader(bytes, Path::new("latin1.csv")).unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.records()[0].country_name.starts_with('C'));
        assert!(ds.records()[0].country_name.ends_with("te d'Ivoire"));
    }

    #[test]
    fn test_filter_year_preserves_order() {
        let records = vec![
            IncidentRecord::new(2019, "Iraq", "A"),
            IncidentRecord::new(2020, "Iraq", "B"),
            IncidentRecord::new(2019, "Syria", "C"),
        ];
        let filtered = filter_year(&records, 2019);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].group_name, "A");
        assert_eq!(filtered[1].group_name, "C");
    }

    #[test]
    fn test_filter_missing_year_is_empty() {
        let ds = Dataset::from_records(vec![IncidentRecord::new(2019, "Iraq", "A")]);
        for year in [1970, 2018, 2021] {
            assert!(ds.filter_year(year).is_empty());
        }
    }

    #[test]
    fn test_empty_dataset() {
        let ds = parse("iyear,country_txt,gname\n").unwrap();
        assert!(ds.is_empty());
        assert!(ds.years().is_empty());
        assert_eq!(ds.year_range(), None);
    }
}
