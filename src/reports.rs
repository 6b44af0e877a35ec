// The fixed report computations.
//
// Each assembler is a pipeline over the transform primitives: filter and
// group the long relations, inner-join the aggregated series, derive any
// ratio columns, and wrap the rows together with their chart contract.
use crate::loader::DataStore;
use crate::transform::{
    group_by_date, group_by_region, group_by_region_date, join, mortality_rate, Period,
    RegionSelection,
};
use crate::types::{
    ChartKind, ChartSpec, Metric, MortalityRow, Report, RegionSeriesRow, RegionTotalsRow,
    ThreeMetricRow, TrendRow,
};

/// Worldwide confirmed and deaths totals per date, joined on date.
///
/// With `period = None` this is the full-history trend; the temporal view
/// passes a user-selected range instead.
pub fn global_trend(store: &DataStore, period: Period) -> Report<TrendRow> {
    let confirmed = group_by_date(store.records(Metric::Confirmed), None, period);
    let deaths = group_by_date(store.records(Metric::Deaths), None, period);
    let combined = join(&[("Confirmed", &confirmed), ("Deaths", &deaths)]);
    let rows = combined
        .rows
        .into_iter()
        .map(|(date, values)| TrendRow {
            date,
            confirmed: values[0],
            deaths: values[1],
        })
        .collect();
    Report {
        name: "global_trend",
        spec: ChartSpec {
            title: "Worldwide confirmed cases and deaths".to_string(),
            kind: ChartKind::Line,
            x: "Date",
            y: vec!["Confirmed", "Deaths"],
            color: None,
            log_scale: true,
        },
        rows,
    }
}

/// Confirmed and deaths totals per selected region over a period, joined on
/// region. An empty selection produces an empty report.
pub fn region_comparison(
    store: &DataStore,
    regions: RegionSelection<'_>,
    period: Period,
) -> Report<RegionTotalsRow> {
    let confirmed = group_by_region(store.records(Metric::Confirmed), regions, period);
    let deaths = group_by_region(store.records(Metric::Deaths), regions, period);
    let combined = join(&[("Confirmed", &confirmed), ("Deaths", &deaths)]);
    let rows = combined
        .rows
        .into_iter()
        .map(|(region, values)| RegionTotalsRow {
            region,
            confirmed: values[0],
            deaths: values[1],
        })
        .collect();
    Report {
        name: "region_comparison",
        spec: ChartSpec {
            title: "Confirmed cases and deaths by region".to_string(),
            kind: ChartKind::Bar,
            x: "Region",
            y: vec!["Confirmed", "Deaths"],
            color: None,
            log_scale: false,
        },
        rows,
    }
}

/// Recovered, confirmed and deaths totals per region in one three-way join.
///
/// The source data has no vaccination series; the original dashboard's
/// "vaccination" view plots recoveries, and this report keeps that
/// computation under an honest name.
pub fn three_metric_comparison(
    store: &DataStore,
    regions: RegionSelection<'_>,
    period: Period,
) -> Report<ThreeMetricRow> {
    let recovered = group_by_region(store.records(Metric::Recovered), regions, period);
    let confirmed = group_by_region(store.records(Metric::Confirmed), regions, period);
    let deaths = group_by_region(store.records(Metric::Deaths), regions, period);
    let combined = join(&[
        ("Recovered", &recovered),
        ("Confirmed", &confirmed),
        ("Deaths", &deaths),
    ]);
    let rows = combined
        .rows
        .into_iter()
        .map(|(region, values)| ThreeMetricRow {
            region,
            recovered: values[0],
            confirmed: values[1],
            deaths: values[2],
        })
        .collect();
    Report {
        name: "three_metric_comparison",
        spec: ChartSpec {
            title: "Recovered, confirmed and deaths by region".to_string(),
            kind: ChartKind::Bar,
            x: "Region",
            y: vec!["Recovered", "Confirmed", "Deaths"],
            color: None,
            log_scale: false,
        },
        rows,
    }
}

/// One metric summed per (region, date): a time series per region, drawn as
/// one line per region on a log axis.
pub fn region_trend(
    store: &DataStore,
    metric: Metric,
    regions: RegionSelection<'_>,
    period: Period,
) -> Report<RegionSeriesRow> {
    let series = group_by_region_date(store.records(metric), regions, period);
    let rows = series
        .into_iter()
        .map(|((region, date), value)| RegionSeriesRow {
            region,
            date,
            value,
        })
        .collect();
    let (name, title) = match metric {
        Metric::Confirmed => ("confirmed_by_region", "Confirmed cases by region"),
        Metric::Deaths => ("deaths_by_region", "Deaths by region"),
        Metric::Recovered => ("recovered_by_region", "Recoveries by region"),
    };
    Report {
        name,
        spec: ChartSpec {
            title: title.to_string(),
            kind: ChartKind::Line,
            x: "Date",
            y: vec!["Cases"],
            color: Some("Region"),
            log_scale: true,
        },
        rows,
    }
}

/// Confirmed and deaths joined on (region, date) with the mortality rate
/// derived per row.
///
/// Returns the infection-count chart and the mortality-percentage chart
/// over the same joined rows, both log scale.
pub fn mortality_analysis(
    store: &DataStore,
    regions: RegionSelection<'_>,
    period: Period,
) -> (Report<MortalityRow>, Report<MortalityRow>) {
    let confirmed = group_by_region_date(store.records(Metric::Confirmed), regions, period);
    let deaths = group_by_region_date(store.records(Metric::Deaths), regions, period);
    let combined = join(&[("Confirmed", &confirmed), ("Deaths", &deaths)]);
    let rows: Vec<MortalityRow> = combined
        .rows
        .into_iter()
        .map(|((region, date), values)| MortalityRow {
            region,
            date,
            confirmed: values[0],
            deaths: values[1],
            mortality_rate: mortality_rate(values[1], values[0]),
        })
        .collect();
    let infection = Report {
        name: "infection_trend",
        spec: ChartSpec {
            title: "Infection counts by region".to_string(),
            kind: ChartKind::Line,
            x: "Date",
            y: vec!["Confirmed"],
            color: Some("Region"),
            log_scale: true,
        },
        rows: rows.clone(),
    };
    let mortality = Report {
        name: "mortality_trend",
        spec: ChartSpec {
            title: "Mortality rate by region".to_string(),
            kind: ChartKind::Line,
            x: "Date",
            y: vec!["MortalityRate"],
            color: Some("Region"),
            log_scale: true,
        },
        rows,
    };
    (infection, mortality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{read_wide_table, DataStore};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn store(confirmed: &str, deaths: &str, recovered: &str) -> DataStore {
        let parse = |name: &str, csv: &str| read_wide_table(name, csv.as_bytes()).unwrap().0;
        DataStore::from_tables(
            parse("confirmed", confirmed),
            parse("deaths", deaths),
            parse("recovered", recovered),
        )
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn regions(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    const HEADER: &str = "SubRegion,Region,Lat,Long,1/22/20,1/23/20\n";

    fn two_region_store() -> DataStore {
        let confirmed = format!("{HEADER},A,0,0,1,2\n,B,0,0,3,4\n");
        let deaths = format!("{HEADER},A,0,0,0,1\n,B,0,0,1,1\n");
        let recovered = format!("{HEADER},A,0,0,0,1\n,B,0,0,2,2\n");
        store(&confirmed, &deaths, &recovered)
    }

    #[test]
    fn global_trend_sums_all_regions_per_date() {
        let report = global_trend(&two_region_store(), None);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].date, date(2020, 1, 22));
        assert_eq!(report.rows[0].confirmed, 4);
        assert_eq!(report.rows[0].deaths, 1);
        assert_eq!(report.rows[1].confirmed, 6);
        assert_eq!(report.rows[1].deaths, 2);
        assert!(report.spec.log_scale);
    }

    #[test]
    fn region_comparison_respects_selection_states() {
        let store = two_region_store();
        let all = region_comparison(&store, None, None);
        assert_eq!(all.rows.len(), 2);

        let none = regions(&[]);
        assert!(region_comparison(&store, Some(&none), None).rows.is_empty());

        let only_b = regions(&["B"]);
        let picked = region_comparison(&store, Some(&only_b), None);
        assert_eq!(picked.rows.len(), 1);
        assert_eq!(picked.rows[0].region, "B");
        assert_eq!(picked.rows[0].confirmed, 7);
        assert_eq!(picked.rows[0].deaths, 2);
    }

    #[test]
    fn region_comparison_drops_regions_absent_from_one_metric() {
        // Region C exists only in the confirmed table, so the inner join
        // on region must drop it.
        let confirmed = format!("{HEADER},A,0,0,1,2\n,C,0,0,9,9\n");
        let deaths = format!("{HEADER},A,0,0,0,1\n");
        let recovered = format!("{HEADER},A,0,0,0,0\n");
        let report = region_comparison(&store(&confirmed, &deaths, &recovered), None, None);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].region, "A");
    }

    #[test]
    fn three_metric_comparison_joins_all_three() {
        let store = two_region_store();
        let report = three_metric_comparison(&store, Some(&regions(&["A", "B"])), None);
        assert_eq!(report.spec.y, vec!["Recovered", "Confirmed", "Deaths"]);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].region, "A");
        assert_eq!(report.rows[0].recovered, 1);
        assert_eq!(report.rows[0].confirmed, 3);
        assert_eq!(report.rows[0].deaths, 1);
    }

    #[test]
    fn region_trend_filters_by_period_inclusively() {
        let store = two_region_store();
        let selection = regions(&["A"]);
        let day = date(2020, 1, 23);
        let report = region_trend(
            &store,
            Metric::Confirmed,
            Some(&selection),
            Some((day, day)),
        );
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].region, "A");
        assert_eq!(report.rows[0].date, day);
        assert_eq!(report.rows[0].value, 2);
    }

    #[test]
    fn mortality_rates_per_region_and_date() {
        let confirmed = format!("{HEADER},X,0,0,100,200\n");
        let deaths = format!("{HEADER},X,0,0,5,0\n");
        let recovered = format!("{HEADER},X,0,0,0,0\n");
        let (infection, mortality) =
            mortality_analysis(&store(&confirmed, &deaths, &recovered), None, None);
        assert_eq!(infection.rows.len(), 2);
        assert_eq!(mortality.rows[0].mortality_rate, 5.0);
        assert_eq!(mortality.rows[1].mortality_rate, 0.0);
    }

    #[test]
    fn zero_confirmed_yields_non_finite_rate_without_failing() {
        let confirmed = format!("{HEADER},X,0,0,0,0\n");
        let deaths = format!("{HEADER},X,0,0,0,0\n");
        let recovered = format!("{HEADER},X,0,0,0,0\n");
        let (_, mortality) = mortality_analysis(&store(&confirmed, &deaths, &recovered), None, None);
        assert_eq!(mortality.rows.len(), 2);
        assert!(mortality.rows.iter().all(|r| !r.mortality_rate.is_finite()));
    }

    #[test]
    fn inverted_period_produces_an_empty_report() {
        let store = two_region_store();
        let report = global_trend(&store, Some((date(2020, 1, 23), date(2020, 1, 22))));
        assert!(report.rows.is_empty());
    }
}
