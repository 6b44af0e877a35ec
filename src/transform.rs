// Filtering, grouped aggregation, joining and derived metrics.
//
// Everything here is a pure function over long records or aggregated
// series; the report assemblers in `reports.rs` compose these.
use crate::types::LongRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// An aggregated series: summed values keyed by the grouping dimension.
pub type Series<K> = BTreeMap<K, u64>;

/// Region selection for a report.
///
/// `None` means "no filter, include every region". `Some(empty)` means the
/// user has selected nothing yet and must produce an empty result, never a
/// fallback to everything.
pub type RegionSelection<'a> = Option<&'a BTreeSet<String>>;

/// Inclusive date range. `None` means the full available span.
pub type Period = Option<(NaiveDate, NaiveDate)>;

fn included(record: &LongRecord, regions: RegionSelection<'_>, period: Period) -> bool {
    if let Some(set) = regions {
        if !set.contains(&record.region) {
            return false;
        }
    }
    if let Some((start, end)) = period {
        // Inclusive on both ends; an inverted range matches nothing.
        if record.date < start || record.date > end {
            return false;
        }
    }
    true
}

/// Filter long records by region set and period, then sum values grouped by
/// `key`. The concrete `group_by_*` wrappers below pick the grouping
/// dimension.
pub fn filter_and_group<K, F>(
    records: &[LongRecord],
    regions: RegionSelection<'_>,
    period: Period,
    key: F,
) -> Series<K>
where
    K: Ord,
    F: Fn(&LongRecord) -> K,
{
    let mut series = Series::new();
    for record in records {
        if included(record, regions, period) {
            *series.entry(key(record)).or_insert(0) += record.value;
        }
    }
    series
}

/// Sum across included regions, one entry per date (time series).
pub fn group_by_date(
    records: &[LongRecord],
    regions: RegionSelection<'_>,
    period: Period,
) -> Series<NaiveDate> {
    filter_and_group(records, regions, period, |r| r.date)
}

/// Sum across included dates, one entry per region (per-region totals).
pub fn group_by_region(
    records: &[LongRecord],
    regions: RegionSelection<'_>,
    period: Period,
) -> Series<String> {
    filter_and_group(records, regions, period, |r| r.region.clone())
}

/// Sum across sub-regions only, one entry per (region, date) pair.
pub fn group_by_region_date(
    records: &[LongRecord],
    regions: RegionSelection<'_>,
    period: Period,
) -> Series<(String, NaiveDate)> {
    filter_and_group(records, regions, period, |r| (r.region.clone(), r.date))
}

/// The result of joining aggregated series on their shared key.
///
/// `columns` names every value column explicitly, in input order; each row
/// carries the values index-aligned with `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct Combined<K> {
    pub columns: Vec<String>,
    pub rows: Vec<(K, Vec<u64>)>,
}

/// Inner-join any number of series on their key.
///
/// Only keys present in every input survive. Every output column gets the
/// caller-supplied name, so two-way and three-way joins behave identically
/// instead of relying on suffix defaults for two inputs and a rename for
/// the third.
pub fn join<K>(inputs: &[(&str, &Series<K>)]) -> Combined<K>
where
    K: Ord + Clone,
{
    let columns = inputs.iter().map(|(name, _)| name.to_string()).collect();
    let mut rows = Vec::new();
    if let Some((_, first)) = inputs.first() {
        for key in first.keys() {
            let values: Option<Vec<u64>> = inputs
                .iter()
                .map(|(_, series)| series.get(key).copied())
                .collect();
            if let Some(values) = values {
                rows.push((key.clone(), values));
            }
        }
    }
    Combined { columns, rows }
}

/// Mortality rate in percent. Non-finite (NaN or infinity) when no cases
/// are confirmed; callers pass the value through untouched.
pub fn mortality_rate(deaths: u64, confirmed: u64) -> f64 {
    deaths as f64 / confirmed as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(region: &str, date: (i32, u32, u32), value: u64) -> LongRecord {
        LongRecord {
            sub_region: None,
            region: region.to_string(),
            lat: 0.0,
            long: 0.0,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            value,
        }
    }

    fn sample() -> Vec<LongRecord> {
        vec![
            record("A", (2020, 1, 22), 1),
            record("A", (2020, 1, 23), 2),
            record("B", (2020, 1, 22), 3),
            record("B", (2020, 1, 23), 4),
            record("C", (2020, 1, 24), 10),
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grouping_by_date_sums_across_regions() {
        let series = group_by_date(&sample(), None, None);
        assert_eq!(series.get(&date(2020, 1, 22)), Some(&4));
        assert_eq!(series.get(&date(2020, 1, 23)), Some(&6));
        assert_eq!(series.get(&date(2020, 1, 24)), Some(&10));
    }

    #[test]
    fn partition_totals_add_up_to_the_union_total() {
        let records = sample();
        let all = group_by_region(&records, None, None);
        let union_total: u64 = all.values().sum();

        let left: BTreeSet<String> = ["A".to_string()].into_iter().collect();
        let right: BTreeSet<String> = ["B".to_string(), "C".to_string()].into_iter().collect();
        let left_total: u64 = group_by_region(&records, Some(&left), None).values().sum();
        let right_total: u64 = group_by_region(&records, Some(&right), None)
            .values()
            .sum();
        assert_eq!(left_total + right_total, union_total);
    }

    #[test]
    fn period_bounds_are_inclusive() {
        let series = group_by_date(
            &sample(),
            None,
            Some((date(2020, 1, 22), date(2020, 1, 23))),
        );
        assert!(series.contains_key(&date(2020, 1, 22)));
        assert!(series.contains_key(&date(2020, 1, 23)));
        assert!(!series.contains_key(&date(2020, 1, 24)));
    }

    #[test]
    fn inverted_period_yields_empty_series() {
        let series = group_by_date(
            &sample(),
            None,
            Some((date(2020, 1, 24), date(2020, 1, 22))),
        );
        assert!(series.is_empty());
    }

    #[test]
    fn empty_selection_is_not_all_regions() {
        let records = sample();
        let empty = BTreeSet::new();
        assert!(group_by_region(&records, Some(&empty), None).is_empty());
        assert_eq!(group_by_region(&records, None, None).len(), 3);
    }

    #[test]
    fn join_keeps_only_shared_keys() {
        let a: Series<&str> = [("A", 1), ("B", 2), ("C", 3)].into_iter().collect();
        let b: Series<&str> = [("B", 20), ("C", 30), ("D", 40)].into_iter().collect();
        let combined = join(&[("left", &a), ("right", &b)]);
        assert_eq!(combined.columns, vec!["left", "right"]);
        assert_eq!(
            combined.rows,
            vec![("B", vec![2, 20]), ("C", vec![3, 30])]
        );
    }

    #[test]
    fn three_way_join_names_every_column() {
        let a: Series<&str> = [("X", 1)].into_iter().collect();
        let b: Series<&str> = [("X", 2)].into_iter().collect();
        let c: Series<&str> = [("X", 3)].into_iter().collect();
        let combined = join(&[("recovered", &a), ("confirmed", &b), ("deaths", &c)]);
        assert_eq!(combined.columns, vec!["recovered", "confirmed", "deaths"]);
        assert_eq!(combined.rows, vec![("X", vec![1, 2, 3])]);
    }

    #[test]
    fn mortality_rate_handles_zero_confirmed() {
        assert_eq!(mortality_rate(5, 100), 5.0);
        assert_eq!(mortality_rate(0, 200), 0.0);
        assert!(!mortality_rate(3, 0).is_finite());
        assert!(mortality_rate(0, 0).is_nan());
    }
}
