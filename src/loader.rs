use crate::error::{ReportError, Result};
use crate::reshape::reshape;
use crate::types::{Location, LongRecord, Metric, RawTable};
use crate::util::{parse_count_safe, parse_f64_safe};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;

/// SubRegion, Region, Lat, Long. Every column after these is a date.
const IDENTITY_COLUMNS: usize = 4;

/// Per-table load diagnostics, printed by the CLI after option [1].
/// Table dimensions come from the store's `raw_table` accessor.
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub metric: Metric,
    /// Cells that were empty or unparseable and got materialized as zero.
    pub zero_filled_cells: usize,
    /// Rows dropped because the region name was missing.
    pub skipped_rows: usize,
}

/// Read one wide metric table.
///
/// The first four columns are identity columns; everything after is kept as
/// a raw date header and validated during reshape. Value cells that are
/// missing or unparseable become zero, matching the aggregation policy of
/// never propagating missing values.
pub fn read_wide_table<R: Read>(source: &str, reader: R) -> Result<(RawTable, usize, usize)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.len() < IDENTITY_COLUMNS {
        return Err(ReportError::MissingIdentityColumns {
            path: source.to_string(),
            expected: IDENTITY_COLUMNS,
            found: headers.len(),
        });
    }
    let date_columns: Vec<String> = headers
        .iter()
        .skip(IDENTITY_COLUMNS)
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    let mut zero_filled = 0usize;
    let mut skipped = 0usize;
    for result in rdr.records() {
        let record = result?;
        let region = match record.get(1).map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let sub_region = record
            .get(0)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let lat = parse_f64_safe(record.get(2)).unwrap_or(0.0);
        let long = parse_f64_safe(record.get(3)).unwrap_or(0.0);
        let values: Vec<u64> = (0..date_columns.len())
            .map(|i| match parse_count_safe(record.get(IDENTITY_COLUMNS + i)) {
                Some(v) => v,
                None => {
                    zero_filled += 1;
                    0
                }
            })
            .collect();
        rows.push(Location {
            sub_region,
            region,
            lat,
            long,
            values,
        });
    }
    if zero_filled > 0 {
        log::warn!("{}: zero-filled {} missing or malformed cells", source, zero_filled);
    }
    Ok((RawTable { date_columns, rows }, zero_filled, skipped))
}

fn load_table(path: &str) -> Result<(RawTable, usize, usize)> {
    let file = File::open(path)?;
    read_wide_table(path, file)
}

struct TableData {
    raw: RawTable,
    long: Vec<LongRecord>,
}

/// Owner of the three base tables and their derived long relations.
///
/// Constructed once per process; reports only ever borrow from it. The
/// distinct-region list and the overall date span are computed on first use
/// and memoized for the lifetime of the store.
pub struct DataStore {
    confirmed: TableData,
    deaths: TableData,
    recovered: TableData,
    regions: OnceCell<Vec<String>>,
    span: OnceCell<Option<(NaiveDate, NaiveDate)>>,
}

impl DataStore {
    /// Build a store from already-read wide tables, reshaping each one.
    ///
    /// This is where a malformed date column becomes fatal: no report can
    /// run against a table that failed to unpivot.
    pub fn from_tables(confirmed: RawTable, deaths: RawTable, recovered: RawTable) -> Result<Self> {
        let build = |raw: RawTable| -> Result<TableData> {
            let long = reshape(&raw)?;
            Ok(TableData { raw, long })
        };
        Ok(DataStore {
            confirmed: build(confirmed)?,
            deaths: build(deaths)?,
            recovered: build(recovered)?,
            regions: OnceCell::new(),
            span: OnceCell::new(),
        })
    }

    /// Load and reshape the three metric tables from disk.
    pub fn load(
        confirmed_path: &str,
        deaths_path: &str,
        recovered_path: &str,
    ) -> Result<(Self, Vec<LoadSummary>)> {
        let mut summaries = Vec::with_capacity(3);
        let mut read = |metric: Metric, path: &str| -> Result<RawTable> {
            let (table, zero_filled_cells, skipped_rows) = load_table(path)?;
            summaries.push(LoadSummary {
                metric,
                zero_filled_cells,
                skipped_rows,
            });
            Ok(table)
        };
        let confirmed = read(Metric::Confirmed, confirmed_path)?;
        let deaths = read(Metric::Deaths, deaths_path)?;
        let recovered = read(Metric::Recovered, recovered_path)?;
        let store = Self::from_tables(confirmed, deaths, recovered)?;
        Ok((store, summaries))
    }

    fn table(&self, metric: Metric) -> &TableData {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Deaths => &self.deaths,
            Metric::Recovered => &self.recovered,
        }
    }

    /// The long relation for one metric, derived once at construction.
    pub fn records(&self, metric: Metric) -> &[LongRecord] {
        &self.table(metric).long
    }

    pub fn raw_table(&self, metric: Metric) -> &RawTable {
        &self.table(metric).raw
    }

    /// Distinct region names across all three metrics, sorted.
    pub fn regions(&self) -> &[String] {
        self.regions.get_or_init(|| {
            let mut set = BTreeSet::new();
            for metric in [Metric::Confirmed, Metric::Deaths, Metric::Recovered] {
                for record in self.records(metric) {
                    set.insert(record.region.clone());
                }
            }
            set.into_iter().collect()
        })
    }

    /// Earliest and latest date across all three metrics, or `None` when
    /// the tables carry no date columns at all.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        *self.span.get_or_init(|| {
            let mut dates = [Metric::Confirmed, Metric::Deaths, Metric::Recovered]
                .iter()
                .flat_map(|m| self.records(*m))
                .map(|r| r.date);
            let first = dates.next()?;
            let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
            Some((min, max))
        })
    }
}
