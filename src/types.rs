use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

/// One metric table as shipped by the data source: wide layout, one row per
/// location, one column per date.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Raw date-column headers, in source (chronological) order. Parsing
    /// happens during reshape so a bad header can be reported by name.
    pub date_columns: Vec<String>,
    pub rows: Vec<Location>,
}

/// Identity columns plus the per-date values of a single wide-table row.
///
/// `values` is index-aligned with `RawTable::date_columns`. Missing cells
/// are materialized as zero at load time.
#[derive(Debug, Clone)]
pub struct Location {
    pub sub_region: Option<String>,
    pub region: String,
    pub lat: f64,
    pub long: f64,
    pub values: Vec<u64>,
}

/// One (location, date) observation of the long/tidy relation.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub sub_region: Option<String>,
    pub region: String,
    pub lat: f64,
    pub long: f64,
    pub date: NaiveDate,
    pub value: u64,
}

/// The three source metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed",
            Metric::Deaths => "Deaths",
            Metric::Recovered => "Recovered",
        }
    }
}

/// How the external renderer should draw a report table.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    /// Column holding the x-axis key.
    pub x: &'static str,
    /// Value columns to plot on the y axis.
    pub y: Vec<&'static str>,
    /// Column that splits rows into one series per distinct value, if any.
    pub color: Option<&'static str>,
    pub log_scale: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// A finished report: the rows plus the rendering contract for them.
#[derive(Debug, Clone)]
pub struct Report<T> {
    pub name: &'static str,
    pub spec: ChartSpec,
    pub rows: Vec<T>,
}

/// Worldwide confirmed/deaths totals for one date.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct TrendRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Confirmed")]
    #[tabled(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    #[tabled(rename = "Deaths")]
    pub deaths: u64,
}

/// Per-region confirmed/deaths totals over the selected period.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionTotalsRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Confirmed")]
    #[tabled(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    #[tabled(rename = "Deaths")]
    pub deaths: u64,
}

/// Per-region totals for all three metrics over the selected period.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ThreeMetricRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Recovered")]
    #[tabled(rename = "Recovered")]
    pub recovered: u64,
    #[serde(rename = "Confirmed")]
    #[tabled(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    #[tabled(rename = "Deaths")]
    pub deaths: u64,
}

/// One point of a per-region time series for a single metric.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionSeriesRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Cases")]
    #[tabled(rename = "Cases")]
    pub value: u64,
}

/// Confirmed/deaths joined on (region, date) with the derived mortality
/// rate. The rate is non-finite when confirmed is zero; the renderer plots
/// those points as gaps.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MortalityRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Confirmed")]
    #[tabled(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    #[tabled(rename = "Deaths")]
    pub deaths: u64,
    #[serde(rename = "MortalityRate")]
    #[tabled(rename = "MortalityRate")]
    pub mortality_rate: f64,
}
