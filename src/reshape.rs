// Wide-to-long unpivoting.
//
// The source tables keep one column per date; everything downstream wants
// one row per (location, date) pair instead.
use crate::error::{ReportError, Result};
use crate::types::{LongRecord, RawTable};
use chrono::NaiveDate;

use crate::util::parse_date_header;

/// Parse every date-column header of a wide table.
///
/// Fails with `MalformedDateColumn` on the first header that is not a
/// calendar date; the loader calls this before any report can run, so a bad
/// source file is rejected up front.
pub fn parse_date_columns(headers: &[String]) -> Result<Vec<NaiveDate>> {
    headers
        .iter()
        .map(|h| {
            parse_date_header(h).ok_or_else(|| ReportError::MalformedDateColumn {
                column: h.clone(),
            })
        })
        .collect()
}

/// Unpivot a wide table into long records.
///
/// Produces exactly `rows × date-columns` records, grouped by source row
/// and then by date ascending within each row.
pub fn reshape(table: &RawTable) -> Result<Vec<LongRecord>> {
    let dates = parse_date_columns(&table.date_columns)?;
    let mut records = Vec::with_capacity(table.rows.len() * dates.len());
    for row in &table.rows {
        for (date, value) in dates.iter().zip(&row.values) {
            records.push(LongRecord {
                sub_region: row.sub_region.clone(),
                region: row.region.clone(),
                lat: row.lat,
                long: row.long,
                date: *date,
                value: *value,
            });
        }
    }
    Ok(records)
}
