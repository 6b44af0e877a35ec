use crate::error::Result;
use crate::types::{ChartSpec, Report};
use serde::Serialize;
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the chart description consumed by the external renderer: the
/// column roles and log-scale flag next to the rows themselves. Non-finite
/// rate values serialize as `null`, which the renderer plots as a gap.
pub fn write_chart_json<T: Serialize>(path: &str, spec: &ChartSpec, rows: &[T]) -> Result<()> {
    let doc = json!({
        "chart": spec,
        "rows": serde_json::to_value(rows)?,
    });
    std::fs::write(path, serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

/// Print the first `max_rows` rows as a markdown table.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Export a report as `<name>.csv` (full rows) plus `<name>.json` (chart
/// spec and rows).
pub fn export_report<T>(report: &Report<T>) -> Result<()>
where
    T: Serialize,
{
    let csv_path = format!("{}.csv", report.name);
    let json_path = format!("{}.json", report.name);
    write_csv(&csv_path, &report.rows)?;
    write_chart_json(&json_path, &report.spec, &report.rows)?;
    log::info!(
        "exported {} rows to {} and {}",
        report.rows.len(),
        csv_path,
        json_path
    );
    Ok(())
}
